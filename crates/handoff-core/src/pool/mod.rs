//! Fixed-capacity object pool over a pre-allocated slot arena.
//!
//! [`FixedPool`] lends out individual objects from `N` pre-allocated slots
//! and reclaims them in O(1), with no heap traffic after construction. Free
//! slots are chained through an intrusive index list stored alongside the
//! arena, so exhaustion, acquire, and release are all a handful of array
//! operations with deterministic timing.
//!
//! The pool imposes no ordering: objects are interchangeable by identity,
//! not position. For FIFO handoff see [`ring`](crate::ring); to move whole
//! frames at once see [`frame`](crate::frame).

mod arena;

pub use arena::{FixedPool, PoolSlot};
