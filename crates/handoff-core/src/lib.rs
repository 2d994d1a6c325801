//! # Handoff Core
//!
//! Fixed-capacity, allocation-free primitives for handing data between one
//! producer context and one consumer context — conventionally an interrupt
//! handler and a main processing loop — in embedded control systems.
//!
//! This crate provides:
//! - **[`FixedPool`]**: object pool over a fixed slot arena with an
//!   intrusive index free list
//! - **[`RingBuffer`]**: array-backed SPSC FIFO with explicit full/empty
//!   policy
//! - **[`DoubleBuffer`] / [`SharedDoubleBuffer`]**: ping-pong frame buffers
//!   with an O(1) role swap
//! - **[`EventBus`]**: pool + ring composition that queues handles instead
//!   of payloads
//!
//! ## Design Principles
//!
//! 1. **Zero allocations after construction** - all storage is owned arrays
//! 2. **No blocking anywhere** - every operation returns immediately with a
//!    value or an explicit full/empty/exhausted signal
//! 3. **O(1) everything** - bounded worst-case latency, safe to call from
//!    the most timing-sensitive context in the system
//! 4. **Explicit backpressure** - reject and overwrite-oldest policies are
//!    separate entry points, never silently mixed
//!
//! ## Example
//!
//! ```rust
//! use handoff_core::RingBuffer;
//!
//! // Capacity 8 means 7 usable slots (one reserved to tell full from empty).
//! let samples: RingBuffer<u16, 8> = RingBuffer::new();
//!
//! // Producer side (e.g. sampling ISR)
//! assert!(samples.push(1024).is_ok());
//!
//! // Consumer side (main loop)
//! assert_eq!(samples.pop(), Some(1024));
//! assert_eq!(samples.pop(), None);
//! ```
//!
//! ## Concurrency Contract
//!
//! None of these structures runs a thread or takes a lock. [`RingBuffer`]
//! and [`SharedDoubleBuffer`] are safe across exactly one producer context
//! and one consumer context; everything else is single-context and enforced
//! by `&mut self`. See each type's documentation for the precise discipline.

#![deny(missing_docs)]
#![deny(unsafe_code)] // Selectively allowed per site, each with a SAFETY comment
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod alloc;
pub mod bus;
pub mod frame;
pub mod padding;
pub mod pool;
pub mod ring;


// Re-export key types
pub use bus::{BusFull, BusStats, EventBus};
pub use frame::{DoubleBuffer, FrameReader, FrameWriter, SharedDoubleBuffer};
pub use padding::CachePadded;
pub use pool::{FixedPool, PoolSlot};
pub use ring::RingBuffer;
