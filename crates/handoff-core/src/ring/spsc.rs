//! Array-backed SPSC ring buffer.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::padding::CachePadded;

/// A fixed-capacity single-producer single-consumer FIFO.
///
/// Storage is an owned array of `N` slots; one slot stays reserved to tell
/// full from empty, so `N - 1` values fit. Indices wrap modulo `N` — any
/// `N >= 2` works, capacities are not rounded.
///
/// Head and tail are atomics with Acquire/Release ordering, so the buffer
/// is also correct when producer and consumer run on different cores. On a
/// single core (interrupt handler + main loop) the atomics cost one
/// uncontended store/load pair per operation.
///
/// # Safety
///
/// The buffer is safe with exactly one producer context calling
/// [`push`](Self::push) and exactly one consumer context calling
/// [`pop`](Self::pop)/[`peek`](Self::peek). The producer owns `tail` and
/// reads `head`; the consumer owns `head` and reads `tail`; neither ever
/// writes the other's index. Adding a second producer or consumer breaks
/// the discipline and needs compare-and-swap index advancement, which this
/// type deliberately does not provide.
///
/// # Example
///
/// ```rust
/// use handoff_core::RingBuffer;
///
/// let ring: RingBuffer<i32, 4> = RingBuffer::new();
///
/// assert!(ring.push(1).is_ok());
/// assert!(ring.push(2).is_ok());
/// assert!(ring.push(3).is_ok());
/// assert_eq!(ring.push(4), Err(4)); // 3 usable slots
///
/// assert_eq!(ring.pop(), Some(1));
/// assert_eq!(ring.pop(), Some(2));
/// assert_eq!(ring.pop(), Some(3));
/// assert_eq!(ring.pop(), None);
/// ```
pub struct RingBuffer<T, const N: usize> {
    /// Slot storage; a slot is initialized exactly while it sits between
    /// head (inclusive) and tail (exclusive).
    buffer: [UnsafeCell<MaybeUninit<T>>; N],
    /// Next read position, owned by the consumer.
    head: CachePadded<AtomicUsize>,
    /// Next write position, owned by the producer.
    tail: CachePadded<AtomicUsize>,
}

// SAFETY: Transferring the buffer between threads moves the T values with
// it, which is fine whenever T itself is Send.
#[allow(unsafe_code)]
unsafe impl<T: Send, const N: usize> Send for RingBuffer<T, N> {}

// SAFETY: Shared access is sound under the single-producer/single-consumer
// discipline documented on the type: the two contexts touch disjoint slots,
// and the Acquire/Release pairs on head and tail order the slot contents.
#[allow(unsafe_code)]
unsafe impl<T: Send, const N: usize> Sync for RingBuffer<T, N> {}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Create an empty ring.
    ///
    /// # Panics
    ///
    /// Panics if `N < 2` — with the reserved slot, a smaller ring could
    /// never hold anything.
    #[must_use]
    pub fn new() -> Self {
        assert!(N >= 2, "ring capacity must be at least 2");

        Self {
            buffer: std::array::from_fn(|_| UnsafeCell::new(MaybeUninit::uninit())),
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Total slot count, including the reserved slot.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// True if the ring holds no values.
    ///
    /// Snapshot only — the other context may change this immediately.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// True if a push would be rejected.
    ///
    /// Snapshot only — the other context may change this immediately.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        next_index::<N>(tail) == head
    }

    /// Number of values currently queued.
    ///
    /// Snapshot only — the other context may change this immediately.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (tail + N - head) % N
    }

    /// Number of further pushes that would currently succeed.
    #[inline]
    #[must_use]
    pub fn free_slots(&self) -> usize {
        N - 1 - self.len()
    }

    /// Append a value at the tail.
    ///
    /// Returns `Err(item)` without touching any state when the ring is
    /// full: the loss is the caller's to handle, never silent.
    ///
    /// # Errors
    ///
    /// The rejected value comes back to the caller.
    ///
    /// # Safety
    ///
    /// Must only be called from the single producer context.
    #[inline]
    pub fn push(&self, item: T) -> Result<(), T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let next_tail = next_index::<N>(tail);

        if next_tail == self.head.load(Ordering::Acquire) {
            return Err(item);
        }

        // SAFETY: We are the only producer and this slot is outside the
        // occupied range, so nothing reads it until the tail store below
        // publishes it.
        #[allow(unsafe_code)]
        unsafe {
            (*self.buffer[tail].get()).write(item);
        }

        self.tail.store(next_tail, Ordering::Release);

        Ok(())
    }

    /// Remove and return the value at the head.
    ///
    /// Returns `None` when the ring is empty.
    ///
    /// # Safety
    ///
    /// Must only be called from the single consumer context.
    #[inline]
    #[must_use]
    pub fn pop(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);

        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: We are the only consumer and the slot was published by
        // the producer's Release store of tail, which our Acquire load
        // above observed.
        #[allow(unsafe_code)]
        let item = unsafe { (*self.buffer[head].get()).assume_init_read() };

        self.head.store(next_index::<N>(head), Ordering::Release);

        Some(item)
    }

    /// Borrow the value at the head without removing it.
    ///
    /// # Safety
    ///
    /// Must only be called from the single consumer context.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        let head = self.head.load(Ordering::Relaxed);

        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: Same reasoning as `pop`, minus the head advance.
        #[allow(unsafe_code)]
        unsafe {
            Some((*self.buffer[head].get()).assume_init_ref())
        }
    }

    /// Append a value, displacing the oldest if the ring is full.
    ///
    /// Always accepts. Returns the displaced value, if any, so the loss is
    /// observable at the call site.
    ///
    /// Takes `&mut self` deliberately: the reject policy ([`push`](Self::push))
    /// and the overwrite policy must be chosen per call site, never mixed on
    /// a shared instance — and advancing `head` from the producer side is
    /// only sound with exclusive access. Use this from a single context
    /// that owns the ring (history buffers, trace logs), not across an
    /// ISR/main-loop split.
    #[inline]
    pub fn push_overwrite(&mut self, item: T) -> Option<T> {
        let head = *self.head.get_mut();
        let tail = *self.tail.get_mut();
        let next_tail = next_index::<N>(tail);

        let displaced = if next_tail == head {
            // SAFETY: Exclusive access; the head slot is initialized
            // because the ring is full.
            #[allow(unsafe_code)]
            let oldest = unsafe { (*self.buffer[head].get()).assume_init_read() };
            *self.head.get_mut() = next_index::<N>(head);
            Some(oldest)
        } else {
            None
        };

        // SAFETY: Exclusive access; the tail slot is outside the occupied
        // range (we just vacated the head slot if the ring was full).
        #[allow(unsafe_code)]
        unsafe {
            (*self.buffer[tail].get()).write(item);
        }
        *self.tail.get_mut() = next_tail;

        displaced
    }

    /// Pop values and feed each to `f`, stopping after `max` values, on an
    /// empty ring, or when `f` returns `false`.
    ///
    /// Returns the number of values consumed. No allocation.
    ///
    /// # Safety
    ///
    /// Must only be called from the single consumer context.
    #[inline]
    pub fn pop_each<F>(&self, max: usize, mut f: F) -> usize
    where
        F: FnMut(T) -> bool,
    {
        if max == 0 {
            return 0;
        }

        let mut cursor = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        let available = (tail + N - cursor) % N;
        let quota = available.min(max);

        let mut consumed = 0;
        for _ in 0..quota {
            // SAFETY: The slot sits inside the occupied range published by
            // the Acquire load of tail; we are the only consumer.
            #[allow(unsafe_code)]
            let item = unsafe { (*self.buffer[cursor].get()).assume_init_read() };

            consumed += 1;
            cursor = next_index::<N>(cursor);

            if !f(item) {
                break;
            }
        }

        if consumed > 0 {
            self.head.store(cursor, Ordering::Release);
        }

        consumed
    }
}

/// Advance an index by one slot with wrap-around.
#[inline]
const fn next_index<const N: usize>(index: usize) -> usize {
    (index + 1) % N
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for RingBuffer<T, N> {
    fn drop(&mut self) {
        // Drop whatever the consumer never got to.
        while self.pop().is_some() {}
    }
}

impl<T, const N: usize> std::fmt::Debug for RingBuffer<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("is_full", &self.is_full())
            .finish()
    }
}
