//! Cross-context double buffer with atomic role handoff.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::padding::CachePadded;

/// A double buffer whose role swap is an atomic publish.
///
/// [`split`](Self::split) hands a [`FrameWriter`] to the producer context
/// and a [`FrameReader`] to the consumer context. `commit` stores the new
/// role selector with Release ordering and the reader loads it with
/// Acquire ordering, so every write made to a half before its commit is
/// visible to the reader that observes that commit — without disabling
/// interrupts and without a lock.
///
/// # Safety
///
/// The structure gives each context a whole array at a time; it does not
/// police the exchange. The caller-enforced protocol is:
///
/// - the producer finishes writing a half before calling
///   [`commit`](FrameWriter::commit);
/// - the consumer finishes with a borrowed half before the *next* commit
///   hands that half back to the producer.
///
/// A producer that commits twice while the consumer is still holding a
/// borrow from [`half`](FrameReader::half) is writing into memory the
/// consumer is reading. Pace the producer (or detect the overrun with the
/// frame counter and discard the read) — the skipped-frame case is
/// expected and diagnosable, the torn-read case is a protocol violation.
///
/// # Example
///
/// ```rust
/// use handoff_core::SharedDoubleBuffer;
///
/// let mut buf: SharedDoubleBuffer<u16, 4> = SharedDoubleBuffer::new();
/// let (mut writer, mut reader) = buf.split();
///
/// writer.half().fill(300);
/// writer.commit();
///
/// let (seq, frame) = reader.frame();
/// assert_eq!(seq, 1);
/// assert_eq!(frame, &[300; 4]);
/// ```
pub struct SharedDoubleBuffer<T, const N: usize> {
    halves: [UnsafeCell<[T; N]>; 2],
    /// Index of the write half. Stored Release on commit, loaded Acquire
    /// by the reader; this pair is the handoff point.
    write_idx: CachePadded<AtomicUsize>,
    /// Total commits. Monotonic; gaps observed by the consumer are
    /// skipped frames.
    frames: CachePadded<AtomicU64>,
}

// SAFETY: Moving the buffer moves the T values; fine whenever T: Send.
#[allow(unsafe_code)]
unsafe impl<T: Send, const N: usize> Send for SharedDoubleBuffer<T, N> {}

// SAFETY: Shared access is divided by role: the writer touches only the
// write half, the reader only the read half, and the Release/Acquire pair
// on `write_idx` orders the role exchange. The residual overrun hazard is
// the documented caller protocol above.
#[allow(unsafe_code)]
unsafe impl<T: Send, const N: usize> Sync for SharedDoubleBuffer<T, N> {}

impl<T: Default, const N: usize> SharedDoubleBuffer<T, N> {
    /// Create a buffer with both halves default-filled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_init(T::default)
    }
}

impl<T, const N: usize> SharedDoubleBuffer<T, N> {
    /// Create a buffer with both halves filled from `init`.
    pub fn with_init(init: impl Fn() -> T) -> Self {
        Self {
            halves: [
                UnsafeCell::new(std::array::from_fn(|_| init())),
                UnsafeCell::new(std::array::from_fn(|_| init())),
            ],
            write_idx: CachePadded::new(AtomicUsize::new(0)),
            frames: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Split into a producer endpoint and a consumer endpoint.
    ///
    /// The `&mut` borrow guarantees at most one writer/reader pair exists
    /// at a time; each endpoint is then moved into its own context (the
    /// endpoints are `Send` when `T` is).
    pub fn split(&mut self) -> (FrameWriter<'_, T, N>, FrameReader<'_, T, N>) {
        (FrameWriter { shared: self }, FrameReader { shared: self })
    }

    /// Number of commits so far.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }
}

impl<T: Default, const N: usize> Default for SharedDoubleBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> std::fmt::Debug for SharedDoubleBuffer<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDoubleBuffer")
            .field("half_len", &N)
            .field("frames", &self.frames())
            .finish()
    }
}

/// Producer endpoint of a [`SharedDoubleBuffer`].
///
/// Not `Clone`: exactly one producer context may hold it.
#[derive(Debug)]
pub struct FrameWriter<'a, T, const N: usize> {
    shared: &'a SharedDoubleBuffer<T, N>,
}

impl<T, const N: usize> FrameWriter<'_, T, N> {
    /// The half currently owned by the producer.
    ///
    /// The borrow pins the writer, so the role cannot swap out from under
    /// a live reference.
    #[inline]
    pub fn half(&mut self) -> &mut [T; N] {
        let idx = self.shared.write_idx.load(Ordering::Relaxed);
        // SAFETY: We are the unique writer (split takes `&mut`, the writer
        // is not Clone) and the reader only touches the other half until a
        // commit republishes the roles.
        #[allow(unsafe_code)]
        unsafe {
            &mut *self.shared.halves[idx].get()
        }
    }

    /// Publish the write half and take over the other half.
    ///
    /// The Release store makes every prior write to the published half
    /// visible to a reader that observes the new role selector.
    #[inline]
    pub fn commit(&mut self) {
        let idx = self.shared.write_idx.load(Ordering::Relaxed);
        self.shared.write_idx.store(idx ^ 1, Ordering::Release);
        self.shared.frames.fetch_add(1, Ordering::Release);
    }

    /// Number of commits so far.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.shared.frames()
    }
}

/// Consumer endpoint of a [`SharedDoubleBuffer`].
///
/// Not `Clone`: exactly one consumer context may hold it.
#[derive(Debug)]
pub struct FrameReader<'a, T, const N: usize> {
    shared: &'a SharedDoubleBuffer<T, N>,
}

impl<T, const N: usize> FrameReader<'_, T, N> {
    /// The half most recently published by the producer.
    #[inline]
    pub fn half(&mut self) -> &[T; N] {
        self.frame().1
    }

    /// The current frame number together with its data.
    ///
    /// Consecutive calls returning numbers that differ by more than one
    /// mean the producer committed frames this consumer never saw. The
    /// count is exact; the skipped data is gone by design.
    #[inline]
    pub fn frame(&mut self) -> (u64, &[T; N]) {
        let seq = self.shared.frames.load(Ordering::Acquire);
        let idx = self.shared.write_idx.load(Ordering::Acquire);
        // SAFETY: We are the unique reader and this is the half the
        // producer last published; the Acquire load of `write_idx` pairs
        // with the Release store in `commit`, ordering the producer's
        // writes before our reads. The producer only reclaims this half
        // after another commit, which the documented protocol forbids
        // while the returned borrow is live.
        #[allow(unsafe_code)]
        let data = unsafe { &*self.shared.halves[idx ^ 1].get() };
        (seq, data)
    }

    /// Number of commits so far.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.shared.frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    #[test]
    fn test_commit_publishes_whole_frame() {
        let mut buf: SharedDoubleBuffer<i32, 2> = SharedDoubleBuffer::new();
        let (mut writer, mut reader) = buf.split();

        writer.half()[0] = 10;
        writer.half()[1] = 20;
        writer.commit();

        assert_eq!(reader.half(), &[10, 20]);
    }

    #[test]
    fn test_reader_sees_latest_committed_frame_only() {
        let mut buf: SharedDoubleBuffer<u8, 3> = SharedDoubleBuffer::new();
        let (mut writer, mut reader) = buf.split();

        writer.half().fill(1);
        // Uncommitted: reader still sees the initial frame.
        assert_eq!(reader.half(), &[0, 0, 0]);

        writer.commit();
        assert_eq!(reader.half(), &[1, 1, 1]);
    }

    #[test]
    fn test_frame_counter_counts_unseen_commits() {
        let mut buf: SharedDoubleBuffer<u8, 2> = SharedDoubleBuffer::new();
        let (mut writer, mut reader) = buf.split();

        let (before, _) = reader.frame();

        writer.half().fill(1);
        writer.commit();
        writer.half().fill(2);
        writer.commit();

        let (after, data) = reader.frame();
        assert_eq!(after - before, 2); // one frame was never observable
        assert_eq!(data, &[2, 2]);
    }

    #[test]
    fn test_cross_thread_handoff() {
        // Producer and consumer obey the documented pacing protocol: the
        // producer fills and commits one frame, then waits for the ack
        // before reusing the half the consumer holds.
        const ROUNDS: u64 = 200;

        let mut buf: SharedDoubleBuffer<u64, 16> = SharedDoubleBuffer::new();
        let consumed = AtomicBool::new(true);
        let (mut writer, mut reader) = buf.split();

        thread::scope(|s| {
            let consumed = &consumed;
            s.spawn(move || {
                for round in 1..=ROUNDS {
                    while !consumed.swap(false, Ordering::Acquire) {
                        thread::yield_now();
                    }
                    writer.half().fill(round);
                    writer.commit();
                }
            });

            s.spawn(move || {
                let mut last_seen = 0;
                while last_seen < ROUNDS {
                    let (seq, frame) = reader.frame();
                    if seq > last_seen {
                        // A committed frame is internally consistent: the
                        // producer fills the whole half with one value.
                        let first = frame[0];
                        assert!(frame.iter().all(|&v| v == first), "torn frame");
                        assert_eq!(first, seq);
                        last_seen = seq;
                        consumed.store(true, Ordering::Release);
                    } else {
                        thread::yield_now();
                    }
                }
            });
        });

        assert_eq!(buf.frames(), ROUNDS);
    }

    #[test]
    fn test_debug() {
        let buf: SharedDoubleBuffer<u8, 4> = SharedDoubleBuffer::new();
        let rendered = format!("{buf:?}");
        assert!(rendered.contains("SharedDoubleBuffer"));
        assert!(rendered.contains("frames"));
    }
}
