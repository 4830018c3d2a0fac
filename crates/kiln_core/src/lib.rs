//! Kiln Core
//!
//! Runtime-adaptive simulation core:
//! - Entity Component System (sparse-set storage, per-arity joins)
//! - System registry with in-place hot swapping and variant selection
//! - Adaptive controller coupling profiler output to variant switches
//! - Typed event bus for decoupled signaling

pub mod ecs;
pub mod error;
pub mod event;
pub mod systems;

// Re-export metrics from kiln_metrics for convenience
pub use kiln_metrics as metrics;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
