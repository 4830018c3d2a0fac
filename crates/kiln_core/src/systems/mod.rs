// mod.rs - Built-in systems exercising the pipeline

mod cleanup;
mod movement;
mod proxy;

pub use cleanup::{CleanupSystem, Expiry};
pub use movement::{MovementSystem, Transform, Velocity};
pub use proxy::{ProxySystem, UpdateFn};
