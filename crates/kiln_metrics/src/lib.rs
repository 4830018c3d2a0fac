//! Kiln Metrics - Frame profiling and performance tracking
//!
//! Provides the frame profiler (rolling history, per-zone timings,
//! percentile statistics), tag-based memory counters, and the ring buffer
//! backing both.
//!
//! # Usage
//!
//! ```ignore
//! use kiln_metrics::profiler;
//!
//! profiler::init(120); // Keep the last 120 frames
//! profiler::begin_frame();
//! // ... run systems ...
//! profiler::end_frame();
//! println!("avg fps: {:.1}", profiler::stats().avg_fps);
//! ```
//!
//! An uninitialized profiler is inert: every call degrades to a no-op so
//! hosts can leave profiling off without touching the tick path.

mod frame;
pub mod memory;
pub mod profiler;
mod ring_buffer;

pub use frame::{FrameStats, Zone};
pub use memory::{MemoryCounter, MemorySnapshot, MemoryTracker};
pub use profiler::{Profiler, ProfilerStats, ZoneGuard};
pub use ring_buffer::RingBuffer;
