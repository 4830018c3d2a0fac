// sparse_set.rs - Sparse-set component storage
//
// Three parallel structures: a dense entity list, a dense component list
// of the same length, and a sparse index keyed by entity slot. Gives O(1)
// insert/remove/lookup with contiguous dense data for bulk iteration.

use crate::ecs::Entity;

const INVALID_SLOT: usize = usize::MAX;

/// Per-type component store.
///
/// Invariants: the dense vectors stay the same length, and for every dense
/// position `d`, `sparse[dense_entities[d].index] == d`. Removal swaps the
/// last entry into the vacated position, so dense order is not stable.
pub struct ComponentArray<T> {
    dense_entities: Vec<Entity>,
    dense_components: Vec<T>,
    sparse: Vec<usize>,
}

impl<T> ComponentArray<T> {
    pub fn new() -> Self {
        Self {
            dense_entities: Vec::new(),
            dense_components: Vec::new(),
            sparse: Vec::new(),
        }
    }

    fn dense_index(&self, entity: Entity) -> Option<usize> {
        let dense = *self.sparse.get(entity.index() as usize)?;
        if dense != INVALID_SLOT && self.dense_entities[dense] == entity {
            Some(dense)
        } else {
            None
        }
    }

    /// Insert or replace the component for `entity`.
    ///
    /// Growth may reallocate the dense vectors; references to other
    /// entries are invalidated.
    pub fn set(&mut self, entity: Entity, value: T) -> &mut T {
        debug_assert!(entity.is_valid(), "component attached to invalid entity");
        let slot = entity.index() as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, INVALID_SLOT);
        }
        let dense = self.sparse[slot];
        if dense == INVALID_SLOT {
            let dense = self.dense_entities.len();
            self.dense_entities.push(entity);
            self.dense_components.push(value);
            self.sparse[slot] = dense;
            &mut self.dense_components[dense]
        } else {
            // Same slot: replace in place. A recycled entity takes over
            // the entry its predecessor left behind.
            self.dense_entities[dense] = entity;
            self.dense_components[dense] = value;
            &mut self.dense_components[dense]
        }
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.dense_index(entity)
            .map(|dense| &self.dense_components[dense])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.dense_index(entity)
            .map(|dense| &mut self.dense_components[dense])
    }

    pub fn has(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Remove `entity`'s component; false if it had none.
    ///
    /// The formerly-last entry is swapped into the vacated dense position
    /// and its sparse index updated.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let Some(dense) = self.dense_index(entity) else {
            return false;
        };
        let last = self.dense_entities.len() - 1;
        self.dense_entities.swap(dense, last);
        self.dense_components.swap(dense, last);
        let moved = self.dense_entities[dense];
        self.sparse[moved.index() as usize] = dense;
        self.dense_entities.pop();
        self.dense_components.pop();
        self.sparse[entity.index() as usize] = INVALID_SLOT;
        true
    }

    /// Visit entries in dense order.
    pub fn for_each<F: FnMut(Entity, &T)>(&self, mut f: F) {
        for (entity, component) in self.dense_entities.iter().zip(&self.dense_components) {
            f(*entity, component);
        }
    }

    pub fn for_each_mut<F: FnMut(Entity, &mut T)>(&mut self, mut f: F) {
        for (entity, component) in self
            .dense_entities
            .iter()
            .zip(self.dense_components.iter_mut())
        {
            f(*entity, component);
        }
    }

    /// Dense entity list; parallel to `data()`.
    pub fn entities(&self) -> &[Entity] {
        &self.dense_entities
    }

    /// Contiguous dense component view for bulk access.
    pub fn data(&self) -> &[T] {
        &self.dense_components
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.dense_components
    }

    pub fn len(&self) -> usize {
        self.dense_entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense_entities.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.dense_entities.reserve(additional);
        self.dense_components.reserve(additional);
    }

    pub fn clear(&mut self) {
        self.dense_entities.clear();
        self.dense_components.clear();
        self.sparse.clear();
    }
}

impl<T> Default for ComponentArray<T> {
    fn default() -> Self {
        Self::new()
    }
}
