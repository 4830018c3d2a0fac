// memory.rs - Tag-based memory accounting
//
// Counters are updatable from any thread: current/allocation counts use
// relaxed fetch-add, peak maintenance is a compare-exchange loop. The
// per-frame memory counters live in the profiler; this tracker holds
// process-lifetime totals grouped by tag.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Point-in-time copy of one tag's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemorySnapshot {
    pub current: u64,
    pub peak: u64,
    pub allocations: u64,
    pub deallocations: u64,
}

#[derive(Default)]
pub struct MemoryCounter {
    current: AtomicU64,
    peak: AtomicU64,
    allocations: AtomicU64,
    deallocations: AtomicU64,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_alloc(&self, bytes: u64) {
        let now = self.current.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.allocations.fetch_add(1, Ordering::Relaxed);
        let mut peak = self.peak.load(Ordering::Relaxed);
        while now > peak {
            match self
                .peak
                .compare_exchange_weak(peak, now, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(observed) => peak = observed,
            }
        }
    }

    pub fn record_free(&self, bytes: u64) {
        // Saturate rather than underflow on unmatched frees
        let _ = self
            .current
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(bytes))
            });
        self.deallocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            current: self.current.load(Ordering::Relaxed),
            peak: self.peak.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            deallocations: self.deallocations.load(Ordering::Relaxed),
        }
    }
}

/// Named memory counters, created lazily per tag.
#[derive(Default)]
pub struct MemoryTracker {
    tags: RwLock<HashMap<String, Arc<MemoryCounter>>>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, tag: &str) -> Arc<MemoryCounter> {
        if let Some(counter) = self.tags.read().unwrap().get(tag) {
            return Arc::clone(counter);
        }
        let mut tags = self.tags.write().unwrap();
        Arc::clone(tags.entry(tag.to_string()).or_default())
    }

    pub fn record_alloc(&self, tag: &str, bytes: u64) {
        self.counter(tag).record_alloc(bytes);
    }

    pub fn record_free(&self, tag: &str, bytes: u64) {
        self.counter(tag).record_free(bytes);
    }

    pub fn snapshot(&self) -> Vec<(String, MemorySnapshot)> {
        let tags = self.tags.read().unwrap();
        let mut entries: Vec<(String, MemorySnapshot)> = tags
            .iter()
            .map(|(tag, counter)| (tag.clone(), counter.snapshot()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

static TRACKER: Lazy<MemoryTracker> = Lazy::new(MemoryTracker::new);

/// Process-wide tracker instance.
pub fn tracker() -> &'static MemoryTracker {
    &TRACKER
}
