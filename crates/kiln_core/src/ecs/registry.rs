// registry.rs - Type-erased component array registry
//
// Arrays are boxed behind an erased trait and keyed by TypeId. Typed
// access downcasts; this is sound because the entry under a TypeId is
// only ever created by the generic accessor for that same type.

use crate::ecs::{ComponentArray, Entity};
use downcast_rs::{impl_downcast, Downcast};
use fxhash::FxHashMap;
use std::any::TypeId;

/// Marker for types storable as components. Blanket-implemented.
pub trait Component: 'static + Send + Sync {}

impl<T: 'static + Send + Sync> Component for T {}

/// Type-erased surface of a `ComponentArray<T>`.
pub trait ErasedArray: Downcast + Send + Sync {
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn component_name(&self) -> &'static str;
}

impl_downcast!(ErasedArray);

impl<T: Component> ErasedArray for ComponentArray<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity)
    }

    fn clear(&mut self) {
        ComponentArray::clear(self);
    }

    fn len(&self) -> usize {
        ComponentArray::len(self)
    }

    fn component_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Owns one `ComponentArray` per component type, created lazily.
pub struct ComponentRegistry {
    arrays: FxHashMap<TypeId, Box<dyn ErasedArray>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            arrays: FxHashMap::default(),
        }
    }

    /// Typed access; registers the array on first call.
    pub fn array<T: Component>(&mut self) -> &mut ComponentArray<T> {
        self.arrays
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentArray::<T>::new()))
            .downcast_mut::<ComponentArray<T>>()
            .expect("component array registered under foreign type id")
    }

    /// Typed access without registering.
    pub fn array_ref<T: Component>(&self) -> Option<&ComponentArray<T>> {
        self.arrays
            .get(&TypeId::of::<T>())?
            .downcast_ref::<ComponentArray<T>>()
    }

    /// Mutable typed access without registering.
    pub fn array_mut<T: Component>(&mut self) -> Option<&mut ComponentArray<T>> {
        self.arrays
            .get_mut(&TypeId::of::<T>())?
            .downcast_mut::<ComponentArray<T>>()
    }

    /// Erased access by type id.
    pub fn array_by_id(&self, type_id: TypeId) -> Option<&dyn ErasedArray> {
        self.arrays.get(&type_id).map(|array| array.as_ref())
    }

    /// Pointer to the boxed array for `T`, registering it if needed.
    ///
    /// The payload lives in its own heap allocation, so the pointer stays
    /// valid across map rehashes; queries rely on this to split mutable
    /// borrows over arrays with distinct type ids.
    pub(crate) fn array_raw<T: Component>(&mut self) -> *mut ComponentArray<T> {
        self.array::<T>() as *mut ComponentArray<T>
    }

    /// Drop every component attached to `entity`, in every array.
    pub fn on_entity_destroyed(&mut self, entity: Entity) {
        for array in self.arrays.values_mut() {
            array.remove_entity(entity);
        }
    }

    /// Empty all arrays without dropping registrations.
    pub fn clear(&mut self) {
        for array in self.arrays.values_mut() {
            array.clear();
        }
    }

    /// Number of registered component types.
    pub fn array_count(&self) -> usize {
        self.arrays.len()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityManager;
    use std::any::TypeId;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Health {
        value: i32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Armor {
        value: i32,
    }

    #[test]
    fn test_arrays_register_lazily() {
        let mut registry = ComponentRegistry::new();
        assert_eq!(registry.array_count(), 0);
        assert!(registry.array_ref::<Health>().is_none());

        registry.array::<Health>();
        assert_eq!(registry.array_count(), 1);
        assert!(registry.array_ref::<Health>().is_some());
        assert!(registry.array_by_id(TypeId::of::<ComponentArray<Health>>()).is_none());
        assert!(registry.array_by_id(TypeId::of::<Health>()).is_some());
    }

    #[test]
    fn test_destroy_fans_out_to_every_array() {
        let mut entities = EntityManager::new();
        let mut registry = ComponentRegistry::new();
        let e = entities.create();
        registry.array::<Health>().set(e, Health { value: 100 });
        registry.array::<Armor>().set(e, Armor { value: 50 });

        registry.on_entity_destroyed(e);
        assert!(!registry.array::<Health>().has(e));
        assert!(!registry.array::<Armor>().has(e));
    }

    #[test]
    fn test_clear_keeps_registrations() {
        let mut entities = EntityManager::new();
        let mut registry = ComponentRegistry::new();
        let e = entities.create();
        registry.array::<Health>().set(e, Health { value: 1 });

        registry.clear();
        assert_eq!(registry.array_count(), 1);
        assert_eq!(registry.array_ref::<Health>().map(|a| a.len()), Some(0));
    }

    #[test]
    fn test_erased_view_reports_len_and_name() {
        let mut entities = EntityManager::new();
        let mut registry = ComponentRegistry::new();
        let e = entities.create();
        registry.array::<Health>().set(e, Health { value: 1 });

        let erased = registry.array_by_id(TypeId::of::<Health>()).unwrap();
        assert_eq!(erased.len(), 1);
        assert!(erased.component_name().contains("Health"));
    }
}
