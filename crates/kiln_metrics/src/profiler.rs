// profiler.rs - Frame profiler with rolling history and percentile stats
//
// The profiler can be used through an owned `Profiler` handle or through
// the process-wide instance behind the free functions at the bottom of
// this module. The uninitialized state is the disabled state: every entry
// point degrades to a no-op so the simulation tick stays live when
// profiling is off.

use crate::frame::{FrameStats, Zone};
use crate::ring_buffer::RingBuffer;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Summary statistics over the frame history. Durations are nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProfilerStats {
    pub sample_count: usize,
    pub avg_frame_time: u64,
    pub min_frame_time: u64,
    pub max_frame_time: u64,
    pub p95_frame_time: u64,
    pub p99_frame_time: u64,
    pub avg_fps: f64,
    pub min_fps: f64,
    pub max_fps: f64,
    pub spike_threshold: u64,
    pub spike_count: usize,
}

struct Inner {
    history: RingBuffer<FrameStats>,
    current: FrameStats,
    frame_start: Option<Instant>,
    zones: Vec<Zone>,
    zone_starts: Vec<Instant>,
    child_time: Vec<u64>,
    open_zones: Vec<u64>,
}

impl Inner {
    fn with_capacity(history_size: usize) -> Self {
        Self {
            history: RingBuffer::new(history_size.max(1)),
            current: FrameStats::default(),
            frame_start: None,
            zones: Vec::new(),
            zone_starts: Vec::new(),
            child_time: Vec::new(),
            open_zones: Vec::new(),
        }
    }
}

pub struct Profiler {
    initialized: AtomicBool,
    frame_counter: AtomicU64,
    inner: Mutex<Inner>,
}

impl Profiler {
    /// An initialized profiler keeping `history_size` frames of history.
    pub fn new(history_size: usize) -> Self {
        Self {
            initialized: AtomicBool::new(true),
            frame_counter: AtomicU64::new(0),
            inner: Mutex::new(Inner::with_capacity(history_size)),
        }
    }

    /// A profiler in the disabled state; every call is a no-op until `init`.
    pub fn disabled() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            frame_counter: AtomicU64::new(0),
            inner: Mutex::new(Inner::with_capacity(1)),
        }
    }

    pub fn init(&self, history_size: usize) {
        let mut inner = self.inner.lock().unwrap();
        *inner = Inner::with_capacity(history_size);
        self.frame_counter.store(0, Ordering::Relaxed);
        self.initialized.store(true, Ordering::Relaxed);
        tracing::info!(history_size, "profiler initialized");
    }

    pub fn shutdown(&self) {
        self.initialized.store(false, Ordering::Relaxed);
        let mut inner = self.inner.lock().unwrap();
        *inner = Inner::with_capacity(1);
        self.frame_counter.store(0, Ordering::Relaxed);
        tracing::info!("profiler shut down");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    pub fn begin_frame(&self) {
        if !self.is_initialized() {
            return;
        }
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        inner.current = FrameStats {
            frame_number: self.frame_counter.load(Ordering::Relaxed),
            ..FrameStats::default()
        };
        inner.zones.clear();
        inner.zone_starts.clear();
        inner.child_time.clear();
        inner.open_zones.clear();
        // Snapshot the timestamp last so reset work is excluded
        inner.frame_start = Some(Instant::now());
    }

    pub fn end_frame(&self) {
        if !self.is_initialized() {
            return;
        }
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        let Some(start) = inner.frame_start.take() else {
            return;
        };
        inner.current.total_time = start.elapsed().as_nanos() as u64;
        inner.history.push(inner.current);
        self.frame_counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn begin_zone(&self, name: &str, file: &'static str, line: u32) -> u64 {
        if !self.is_initialized() {
            return 0;
        }
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        let id = inner.zones.len() as u64;
        let parent_id = inner.open_zones.last().copied();
        inner.zones.push(Zone {
            id,
            name: name.to_string(),
            file,
            line,
            total_time: 0,
            self_time: 0,
            call_count: 1,
            parent_id,
        });
        inner.zone_starts.push(Instant::now());
        inner.child_time.push(0);
        inner.open_zones.push(id);
        id
    }

    pub fn end_zone(&self, id: u64) {
        if !self.is_initialized() {
            return;
        }
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        let index = id as usize;
        if index >= inner.zones.len() {
            return;
        }
        // Only an open zone can be ended; ending twice is a no-op
        let Some(stack_pos) = inner.open_zones.iter().rposition(|&open| open == id) else {
            return;
        };
        inner.open_zones.remove(stack_pos);
        let total = inner.zone_starts[index].elapsed().as_nanos() as u64;
        inner.zones[index].total_time = total;
        inner.zones[index].self_time = total.saturating_sub(inner.child_time[index]);
        if let Some(parent) = inner.zones[index].parent_id {
            inner.child_time[parent as usize] += total;
        }
    }

    /// Zones recorded since the last `begin_frame`.
    pub fn zones(&self) -> Vec<Zone> {
        self.inner.lock().unwrap().zones.clone()
    }

    pub fn current_frame(&self) -> u64 {
        self.frame_counter.load(Ordering::Relaxed)
    }

    /// Frame history, oldest first.
    pub fn history(&self) -> Vec<FrameStats> {
        self.inner.lock().unwrap().history.iter().copied().collect()
    }

    /// Append a pre-measured frame record, e.g. an imported capture.
    pub fn push_frame(&self, stats: FrameStats) {
        if !self.is_initialized() {
            return;
        }
        self.inner.lock().unwrap().history.push(stats);
    }

    pub fn reset_stats(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.history.clear();
        self.frame_counter.store(0, Ordering::Relaxed);
    }

    pub fn record_allocation(&self, bytes: u64) {
        if !self.is_initialized() {
            return;
        }
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        inner.current.memory_used += bytes;
        inner.current.allocation_count += 1;
    }

    pub fn record_deallocation(&self, bytes: u64) {
        if !self.is_initialized() {
            return;
        }
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        inner.current.memory_used = inner.current.memory_used.saturating_sub(bytes);
        inner.current.deallocation_count += 1;
    }

    pub fn record_update_time(&self, nanos: u64) {
        if !self.is_initialized() {
            return;
        }
        self.inner.lock().unwrap().current.update_time = nanos;
    }

    pub fn record_render_time(&self, nanos: u64) {
        if !self.is_initialized() {
            return;
        }
        self.inner.lock().unwrap().current.render_time = nanos;
    }

    pub fn record_counts(&self, entities: usize, systems: usize) {
        if !self.is_initialized() {
            return;
        }
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        inner.current.entity_count = entities;
        inner.current.system_count = systems;
    }

    pub fn stats(&self) -> ProfilerStats {
        if !self.is_initialized() {
            return ProfilerStats::default();
        }
        let inner = self.inner.lock().unwrap();
        let mut times: Vec<u64> = inner.history.iter().map(|frame| frame.total_time).collect();
        drop(inner);
        if times.is_empty() {
            return ProfilerStats::default();
        }
        times.sort_unstable();
        let count = times.len();
        let sum: u128 = times.iter().map(|&t| t as u128).sum();
        let avg = (sum / count as u128) as u64;
        let min = times[0];
        let max = times[count - 1];
        let spike_threshold = avg.saturating_mul(2);
        let spike_count = times.iter().filter(|&&t| t > spike_threshold).count();
        ProfilerStats {
            sample_count: count,
            avg_frame_time: avg,
            min_frame_time: min,
            max_frame_time: max,
            p95_frame_time: percentile(&times, 0.95),
            p99_frame_time: percentile(&times, 0.99),
            avg_fps: fps(avg),
            min_fps: fps(max),
            max_fps: fps(min),
            spike_threshold,
            spike_count,
        }
    }
}

/// Nearest-rank percentile over a sorted sample set.
fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = (p * (sorted.len() - 1) as f64).ceil() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

fn fps(frame_time_nanos: u64) -> f64 {
    if frame_time_nanos == 0 {
        0.0
    } else {
        1_000_000_000.0 / frame_time_nanos as f64
    }
}

/// Ends its zone when dropped.
pub struct ZoneGuard {
    id: u64,
}

impl ZoneGuard {
    pub fn begin(name: &str, file: &'static str, line: u32) -> Self {
        Self {
            id: begin_zone(name, file, line),
        }
    }
}

impl Drop for ZoneGuard {
    fn drop(&mut self) {
        end_zone(self.id);
    }
}

/// Time a scope under a named zone in the process-wide profiler.
#[macro_export]
macro_rules! zone_scope {
    ($name:expr) => {
        let _kiln_zone = $crate::ZoneGuard::begin($name, file!(), line!());
    };
}

// ============================================================================
// Process-wide profiler
// ============================================================================

static GLOBAL: Lazy<Profiler> = Lazy::new(Profiler::disabled);

pub fn global() -> &'static Profiler {
    &GLOBAL
}

pub fn init(history_size: usize) {
    GLOBAL.init(history_size);
}

pub fn shutdown() {
    GLOBAL.shutdown();
}

pub fn is_initialized() -> bool {
    GLOBAL.is_initialized()
}

pub fn begin_frame() {
    GLOBAL.begin_frame();
}

pub fn end_frame() {
    GLOBAL.end_frame();
}

pub fn begin_zone(name: &str, file: &'static str, line: u32) -> u64 {
    GLOBAL.begin_zone(name, file, line)
}

pub fn end_zone(id: u64) {
    GLOBAL.end_zone(id);
}

pub fn zones() -> Vec<Zone> {
    GLOBAL.zones()
}

pub fn current_frame() -> u64 {
    GLOBAL.current_frame()
}

pub fn history() -> Vec<FrameStats> {
    GLOBAL.history()
}

pub fn push_frame(stats: FrameStats) {
    GLOBAL.push_frame(stats);
}

pub fn stats() -> ProfilerStats {
    GLOBAL.stats()
}

pub fn reset_stats() {
    GLOBAL.reset_stats();
}

pub fn record_allocation(bytes: u64) {
    GLOBAL.record_allocation(bytes);
}

pub fn record_deallocation(bytes: u64) {
    GLOBAL.record_deallocation(bytes);
}

pub fn record_update_time(nanos: u64) {
    GLOBAL.record_update_time(nanos);
}

pub fn record_render_time(nanos: u64) {
    GLOBAL.record_render_time(nanos);
}

pub fn record_counts(entities: usize, systems: usize) {
    GLOBAL.record_counts(entities, systems);
}
