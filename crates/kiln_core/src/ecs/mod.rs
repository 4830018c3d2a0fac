// mod.rs - ECS module exports
//
// Sparse-set component storage with a hot-swappable system pipeline.
// Queries join arrays by walking the first component's dense entities and
// probing the rest; see query.rs for the per-arity implementations.

mod adaptive;
mod entity;
mod query;
mod registry;
mod sparse_set;
mod system;
mod system_registry;
mod world;

// Public exports
pub use adaptive::{AdaptiveController, AdaptivePolicy};
pub use entity::{Entity, EntityManager};
pub use query::{
    Query1, Query2, Query3, Query4, Query5, Query6, QueryTuple, View1, View2, View3, View4,
    View5, View6,
};
pub use registry::{Component, ComponentRegistry, ErasedArray};
pub use sparse_set::ComponentArray;
pub use system::{System, Variant};
pub use system_registry::SystemRegistry;
pub use world::World;
