//! Cache-line padding for index variables shared between contexts.
//!
//! When producer and consumer run on different cores, a head and tail that
//! share a cache line ping-pong that line between cores on every operation.
//! Padding each index to its own line removes the false sharing. On a
//! single core the padding costs 64 bytes per index and nothing else.

/// Pads a value out to a full cache line (64 bytes).
///
/// Used for the head/tail indices of [`RingBuffer`](crate::RingBuffer) and
/// the role selector of [`SharedDoubleBuffer`](crate::SharedDoubleBuffer).
///
/// # Example
///
/// ```rust
/// use handoff_core::CachePadded;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let head = CachePadded::new(AtomicUsize::new(0));
/// let tail = CachePadded::new(AtomicUsize::new(0));
///
/// // Deref reaches the inner value
/// assert_eq!(head.load(Ordering::Relaxed), 0);
/// assert_eq!(tail.load(Ordering::Relaxed), 0);
/// ```
#[repr(C, align(64))]
#[derive(Default, Clone)]
pub struct CachePadded<T> {
    value: T,
}

impl<T> CachePadded<T> {
    /// Wrap a value in its own cache line.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    /// Unwrap, returning the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> std::ops::Deref for CachePadded<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> std::ops::DerefMut for CachePadded<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for CachePadded<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_alignment_is_a_cache_line() {
        assert_eq!(std::mem::align_of::<CachePadded<AtomicUsize>>(), 64);
        assert!(std::mem::size_of::<CachePadded<u8>>() >= 64);
    }

    #[test]
    fn test_deref_and_into_inner() {
        let mut padded = CachePadded::new(7u32);
        assert_eq!(*padded, 7);
        *padded = 9;
        assert_eq!(padded.into_inner(), 9);
    }

    #[test]
    fn test_distinct_lines() {
        // Two padded indices in one struct land on different cache lines.
        struct Indices {
            head: CachePadded<AtomicUsize>,
            tail: CachePadded<AtomicUsize>,
        }
        let idx = Indices {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
        };
        let head_addr = std::ptr::addr_of!(idx.head) as usize;
        let tail_addr = std::ptr::addr_of!(idx.tail) as usize;
        assert!(head_addr.abs_diff(tail_addr) >= 64);
    }
}
