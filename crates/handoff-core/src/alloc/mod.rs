//! Allocation tracking for hot sections.
//!
//! Every post-construction operation in this crate is specified to be
//! allocation-free. With the `alloc-tracking` feature enabled, a build can
//! prove that instead of promising it: install [`TrackingAlloc`] as the
//! global allocator, wrap the timing-sensitive code in a
//! [`NoAllocGuard`], and any heap allocation inside the section panics
//! with the section name. Without the feature both types compile to
//! no-ops.
//!
//! ```rust,ignore
//! use handoff_core::alloc::{NoAllocGuard, TrackingAlloc};
//!
//! #[global_allocator]
//! static ALLOC: TrackingAlloc = TrackingAlloc::new();
//!
//! fn sample_isr(ring: &handoff_core::RingBuffer<u16, 64>, sample: u16) {
//!     let _guard = NoAllocGuard::enter("sample_isr");
//!     let _ = ring.push(sample); // a hidden Vec here would panic
//! }
//! ```

mod guard;
mod tracker;

pub use guard::NoAllocGuard;
pub use tracker::AllocStats;
#[cfg(feature = "alloc-tracking")]
pub use tracker::TrackingAlloc;
