//! Double (ping-pong) buffering for whole-frame handoff.
//!
//! A double buffer lets a producer fill one whole array while a consumer
//! reads the other, then swaps the two roles in O(1). Unlike the
//! [`ring`](crate::ring), there is no queue depth: committing twice before
//! the consumer reads silently discards the intermediate frame. That is an
//! accepted property of the pattern, and both buffer types expose a
//! monotonic frame counter so skipped frames are diagnosable rather than
//! invisible.
//!
//! Two forms:
//! - [`DoubleBuffer`] — plain role selector, single execution context,
//!   nothing shared and nothing atomic.
//! - [`SharedDoubleBuffer`] — atomic role selector; [`split`] yields a
//!   [`FrameWriter`] for the producer context and a [`FrameReader`] for
//!   the consumer context, with Release/Acquire ordering across the swap.
//!
//! [`split`]: SharedDoubleBuffer::split

mod double;
mod shared;

pub use double::DoubleBuffer;
pub use shared::{FrameReader, FrameWriter, SharedDoubleBuffer};
