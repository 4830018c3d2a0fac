// cleanup.rs - Expiry-driven entity removal
//
// Structural mutation is not allowed while iterating a component array,
// so expired entities are collected into a scratch buffer first and
// destroyed after the iteration finishes. The buffer is reused across
// ticks.

use crate::ecs::{Entity, System, World};

/// Remaining lifetime in seconds; the entity is destroyed at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Expiry {
    pub remaining: f32,
}

pub struct CleanupSystem {
    expired: Vec<Entity>,
}

impl CleanupSystem {
    pub fn new() -> Self {
        Self {
            expired: Vec::new(),
        }
    }
}

impl Default for CleanupSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CleanupSystem {
    fn update(&mut self, world: &mut World, dt: f32) {
        self.expired.clear();
        let expired = &mut self.expired;
        world.query::<(Expiry,)>().for_each_mut(|entity, expiry| {
            expiry.remaining -= dt;
            if expiry.remaining <= 0.0 {
                expired.push(entity);
            }
        });
        for &entity in &self.expired {
            world.destroy_entity(entity);
        }
        if !self.expired.is_empty() {
            tracing::trace!(count = self.expired.len(), "expired entities destroyed");
        }
    }
}
