// adaptive.rs - Rule-based variant switching driven by world load
//
// The controller runs on a coarser cadence than the tick. Each controller
// tick reads the live entity count and the profiler summary, then walks
// the variant-capable systems and applies the scaling rules at most once
// per system.

use crate::ecs::{Variant, World};
use crate::error::{CoreError, ErrorCode};
use serde::{Deserialize, Serialize};

/// Thresholds and cadence for the adaptive rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptivePolicy {
    /// Above this many live entities a Scalar system is widened to SIMD.
    pub simd_entity_threshold: usize,
    /// Below this many live entities a SIMD system falls back to Scalar.
    pub scalar_entity_threshold: usize,
    /// Frames between controller ticks.
    pub cadence_frames: u64,
}

impl Default for AdaptivePolicy {
    fn default() -> Self {
        Self {
            simd_entity_threshold: 500,
            scalar_entity_threshold: 100,
            cadence_frames: 60,
        }
    }
}

impl AdaptivePolicy {
    /// Parse and validate a policy from JSON.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let policy: Self = serde_json::from_str(text)
            .map_err(|err| CoreError::new(ErrorCode::InvalidArgument, err.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.scalar_entity_threshold >= self.simd_entity_threshold {
            return Err(CoreError::new(
                ErrorCode::ValidationFailed,
                format!(
                    "scalar threshold {} must be below simd threshold {}",
                    self.scalar_entity_threshold, self.simd_entity_threshold
                ),
            ));
        }
        if self.cadence_frames == 0 {
            return Err(CoreError::new(
                ErrorCode::InvalidArgument,
                "cadence must be at least one frame",
            ));
        }
        Ok(())
    }
}

/// Observes profiler output and world load, switching system variants.
pub struct AdaptiveController {
    policy: AdaptivePolicy,
    frames_since_tick: u64,
}

impl AdaptiveController {
    pub fn new() -> Self {
        Self::with_policy(AdaptivePolicy::default())
    }

    pub fn with_policy(policy: AdaptivePolicy) -> Self {
        Self {
            policy,
            frames_since_tick: 0,
        }
    }

    pub fn policy(&self) -> &AdaptivePolicy {
        &self.policy
    }

    /// Call once per frame; runs the rules every `cadence_frames` frames.
    /// Returns the number of variant switches performed.
    pub fn on_frame(&mut self, world: &mut World) -> usize {
        self.frames_since_tick += 1;
        if self.frames_since_tick < self.policy.cadence_frames {
            return 0;
        }
        self.frames_since_tick = 0;
        self.force_tick(world)
    }

    /// Run the rule set immediately, ignoring the cadence.
    pub fn force_tick(&mut self, world: &mut World) -> usize {
        let entity_count = world.entity_count();
        let frame_stats = kiln_metrics::profiler::stats();
        let policy = &self.policy;
        let mut switches = 0;

        world.systems_mut().for_each_system_mut(|name, system| {
            if system.available_variants().len() < 2 {
                return;
            }
            let current = system.current_variant();
            let target = if current == Variant::Scalar
                && entity_count > policy.simd_entity_threshold
            {
                Some(Variant::Simd)
            } else if current == Variant::Simd && entity_count < policy.scalar_entity_threshold {
                Some(Variant::Scalar)
            } else {
                None
            };
            let Some(target) = target else { return };
            if system.switch_variant(target) {
                switches += 1;
                tracing::info!(
                    system = name,
                    from = %current,
                    to = %target,
                    entity_count,
                    avg_frame_time_ns = frame_stats.avg_frame_time,
                    "adaptive variant switch"
                );
            }
        });
        switches
    }
}

impl Default for AdaptiveController {
    fn default() -> Self {
        Self::new()
    }
}
