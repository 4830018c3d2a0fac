// proxy.rs - Function-pointer system for externally generated updates
//
// An external code generator hands the engine a bare update function;
// the proxy gives it a registry slot so it can be hot-swapped between
// ticks with `replace_system_by_name`.

use crate::ecs::{System, World};

/// Signature the external generator must produce.
pub type UpdateFn = fn(&mut World, f32);

pub struct ProxySystem {
    target: UpdateFn,
}

impl ProxySystem {
    pub fn new(target: UpdateFn) -> Self {
        Self { target }
    }
}

impl System for ProxySystem {
    fn update(&mut self, world: &mut World, dt: f32) {
        (self.target)(world, dt);
    }
}
