//! Pool-backed event bus: queue handles, not payloads.
//!
//! [`EventBus`] pairs a [`FixedPool`] holding the payloads with a
//! [`RingBuffer`] carrying pool handles, so a queued event is one slot
//! handle wide no matter how large the payload is. Payloads are written
//! once into their pool slot and moved out exactly once on delivery.
//!
//! The bus borrows its pool mutably on both ends, so it serves a single
//! execution context or two cooperative tasks sharing one borrow — the
//! standard main-loop dispatch case. For raw cross-core handoff use the
//! [`RingBuffer`](crate::RingBuffer) directly with small values.

use arrayvec::ArrayVec;
use tracing::warn;

use crate::pool::{FixedPool, PoolSlot};
use crate::ring::RingBuffer;

/// Error returned when the bus rejects an event, carrying it back.
#[derive(Debug, thiserror::Error)]
#[error("event queue is full")]
pub struct BusFull<T> {
    /// The rejected event.
    pub event: T,
}

impl<T> BusFull<T> {
    /// Recover the rejected event.
    pub fn into_inner(self) -> T {
        self.event
    }
}

/// Acceptance and loss counters for an [`EventBus`].
///
/// Loss is never silent: every event the bus turned away or displaced is
/// counted here, in addition to being returned at the call site.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BusStats {
    /// Events accepted into the queue.
    pub accepted: u64,
    /// Events rejected by [`push`](EventBus::push) on a full queue.
    pub rejected: u64,
    /// Oldest events displaced by [`push_overwrite`](EventBus::push_overwrite).
    pub displaced: u64,
}

/// Fixed-capacity FIFO of pooled events.
///
/// Holds up to `N - 1` events (the handle ring reserves one slot). Both
/// backpressure policies are explicit call sites: [`push`](Self::push)
/// rejects on a full queue and hands the event back;
/// [`push_overwrite`](Self::push_overwrite) always accepts and hands back
/// the displaced oldest event instead.
///
/// # Example
///
/// ```rust
/// use handoff_core::EventBus;
///
/// let mut bus: EventBus<[u8; 64], 4> = EventBus::new();
///
/// bus.push([1; 64]).unwrap();
/// bus.push([2; 64]).unwrap();
///
/// assert_eq!(bus.pop().map(|f| f[0]), Some(1));
/// assert_eq!(bus.pop().map(|f| f[0]), Some(2));
/// assert_eq!(bus.pop(), None);
/// ```
#[derive(Debug)]
pub struct EventBus<T, const N: usize> {
    /// Payload arena; a slot is live exactly while its handle is queued.
    pool: FixedPool<T, N>,
    /// FIFO of handles into the pool.
    queue: RingBuffer<PoolSlot, N>,
    stats: BusStats,
}

impl<T, const N: usize> EventBus<T, N> {
    /// Create an empty bus.
    ///
    /// # Panics
    ///
    /// Panics if `N < 2` (see [`RingBuffer::new`]).
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: FixedPool::new(),
            queue: RingBuffer::new(),
            stats: BusStats::default(),
        }
    }

    /// Enqueue an event; reject it when the queue is full.
    ///
    /// # Errors
    ///
    /// [`BusFull`] carries the rejected event back to the caller.
    pub fn push(&mut self, event: T) -> Result<(), BusFull<T>> {
        if self.queue.is_full() {
            if self.stats.rejected == 0 {
                warn!(capacity = N - 1, "event bus full, rejecting");
            }
            self.stats.rejected += 1;
            return Err(BusFull { event });
        }
        self.enqueue(event);
        Ok(())
    }

    /// Enqueue an event, displacing the oldest one when the queue is full.
    ///
    /// Always accepts. Returns the displaced event, if any.
    pub fn push_overwrite(&mut self, event: T) -> Option<T> {
        let displaced = if self.queue.is_full() {
            let oldest = self
                .queue
                .pop()
                .expect("full queue produced no head - handle leak");
            self.stats.displaced += 1;
            Some(self.pool.reclaim(oldest))
        } else {
            None
        };
        self.enqueue(event);
        displaced
    }

    /// Dequeue the oldest event, moving it out of its pool slot.
    pub fn pop(&mut self) -> Option<T> {
        let slot = self.queue.pop()?;
        Some(self.pool.reclaim(slot))
    }

    /// Dequeue events into a fixed-capacity buffer until either side runs
    /// out of room. Returns the number moved. No allocation.
    pub fn drain_into<const M: usize>(&mut self, out: &mut ArrayVec<T, M>) -> usize {
        let mut moved = 0;
        while !out.is_full() {
            let Some(event) = self.pop() else { break };
            out.push(event);
            moved += 1;
        }
        moved
    }

    /// Number of queued events.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if no event is queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// True if a [`push`](Self::push) would be rejected.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Maximum number of queued events.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Acceptance and loss counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Peak simultaneous queue occupancy, via the pool's high-water mark.
    #[inline]
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.pool.high_water()
    }

    /// Store the payload and queue its handle. Caller ensured queue space.
    fn enqueue(&mut self, event: T) {
        // A free pool slot exists whenever the queue has room: the pool
        // has one more slot than the queue can hold, and every queued
        // handle maps to exactly one live slot.
        let slot = self
            .pool
            .acquire_with(|| event)
            .expect("pool exhausted while queue had space - slot leak");
        if self.queue.push(slot).is_err() {
            unreachable!("ring rejected a push after reporting space");
        }
        self.stats.accepted += 1;
    }
}

impl<T, const N: usize> Default for EventBus<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_delivery() {
        let mut bus: EventBus<String, 4> = EventBus::new();

        bus.push(String::from("a")).unwrap();
        bus.push(String::from("b")).unwrap();
        bus.push(String::from("c")).unwrap();

        assert_eq!(bus.pop().as_deref(), Some("a"));
        assert_eq!(bus.pop().as_deref(), Some("b"));
        assert_eq!(bus.pop().as_deref(), Some("c"));
        assert_eq!(bus.pop(), None);
    }

    #[test]
    fn test_reject_returns_event() {
        let mut bus: EventBus<u32, 4> = EventBus::new();
        assert_eq!(bus.capacity(), 3);

        for i in 0..3 {
            bus.push(i).unwrap();
        }
        assert!(bus.is_full());

        let err = bus.push(99).unwrap_err();
        assert_eq!(err.into_inner(), 99);
        assert_eq!(bus.len(), 3);

        let stats = bus.stats();
        assert_eq!(stats.accepted, 3);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_push_overwrite_displaces_oldest() {
        let mut bus: EventBus<u32, 4> = EventBus::new();

        for i in 0..3 {
            assert_eq!(bus.push_overwrite(i), None);
        }
        assert_eq!(bus.push_overwrite(3), Some(0));
        assert_eq!(bus.push_overwrite(4), Some(1));

        assert_eq!(bus.pop(), Some(2));
        assert_eq!(bus.pop(), Some(3));
        assert_eq!(bus.pop(), Some(4));
        assert_eq!(bus.stats().displaced, 2);
    }

    #[test]
    fn test_slots_return_to_pool() {
        // Cycling far more events than slots proves handles and slots are
        // reclaimed, not leaked.
        let mut bus: EventBus<[u8; 128], 4> = EventBus::new();

        for round in 0..1000u32 {
            #[allow(clippy::cast_possible_truncation)]
            bus.push([round as u8; 128]).unwrap();
            assert!(bus.pop().is_some());
        }
        assert!(bus.is_empty());
        assert_eq!(bus.high_water(), 1);
    }

    #[test]
    fn test_drain_into() {
        let mut bus: EventBus<u32, 8> = EventBus::new();
        for i in 0..6 {
            bus.push(i).unwrap();
        }

        let mut out: ArrayVec<u32, 4> = ArrayVec::new();
        assert_eq!(bus.drain_into(&mut out), 4); // output buffer limits
        assert_eq!(out.as_slice(), &[0, 1, 2, 3]);

        out.clear();
        assert_eq!(bus.drain_into(&mut out), 2); // bus runs dry
        assert_eq!(out.as_slice(), &[4, 5]);
    }

    #[test]
    fn test_mixed_policies_account_separately() {
        let mut bus: EventBus<u32, 4> = EventBus::new();

        for i in 0..3 {
            bus.push(i).unwrap();
        }
        assert!(bus.push(3).is_err());
        assert_eq!(bus.push_overwrite(4), Some(0));

        let stats = bus.stats();
        assert_eq!(stats.accepted, 4);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.displaced, 1);
    }
}
