// frame.rs - Per-frame timing records
//
// FrameStats is the unit stored in the profiler's rolling history; Zone is
// a named interval inside a single frame. All durations are nanoseconds.

use serde::{Deserialize, Serialize};

/// Aggregate counters for one simulation frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    pub frame_number: u64,
    pub total_time: u64,
    pub update_time: u64,
    pub render_time: u64,
    pub entity_count: usize,
    pub system_count: usize,
    pub memory_used: u64,
    pub allocation_count: u64,
    pub deallocation_count: u64,
}

/// A timed interval within a frame, bracketed by begin/end.
///
/// `id` is the zone's index in the frame's zone vector. `self_time` is
/// `total_time` minus the total time of directly nested zones.
#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    pub id: u64,
    pub name: String,
    pub file: &'static str,
    pub line: u32,
    pub total_time: u64,
    pub self_time: u64,
    pub call_count: u32,
    pub parent_id: Option<u64>,
}
