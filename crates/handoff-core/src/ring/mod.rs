//! Single-producer single-consumer FIFO over a fixed array.
//!
//! [`RingBuffer`] hands values from exactly one producer context to exactly
//! one consumer context in strict FIFO order. Push and pop are O(1), never
//! block, and never allocate; fullness and emptiness are explicit return
//! values, not errors.
//!
//! The buffer reserves one slot to distinguish full from empty, so a
//! `RingBuffer<T, N>` holds at most `N - 1` values. Size `N` to absorb the
//! worst burst your producer can emit while the consumer is away.

mod spsc;

pub use spsc::RingBuffer;
