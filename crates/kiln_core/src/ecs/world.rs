// world.rs - World facade composing entities, components, and systems
//
// The tick path is single-threaded: systems run sequentially in
// registration order, each with exclusive world access. Lifecycle hooks
// receive `&mut World` by taking the system out of its registry slot for
// the duration of the call; only the running system is invisible to
// lookups while its hook executes.

use crate::ecs::system_registry::short_type_name;
use crate::ecs::{
    Component, ComponentRegistry, Entity, EntityManager, QueryTuple, System, SystemRegistry,
};
use kiln_metrics::profiler;
use std::any::TypeId;
use std::time::Instant;

pub struct World {
    entities: EntityManager,
    components: ComponentRegistry,
    systems: SystemRegistry,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityManager::new(),
            components: ComponentRegistry::new(),
            systems: SystemRegistry::new(),
        }
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Destroy `entity` and drop all of its components; false if it was
    /// not alive.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if self.entities.destroy(entity) {
            self.components.on_entity_destroyed(entity);
            true
        } else {
            false
        }
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn reserve_entities(&mut self, additional: usize) {
        self.entities.reserve(additional);
    }

    pub fn for_each_entity<F: FnMut(Entity)>(&self, f: F) {
        self.entities.for_each(f);
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Attach or replace a component; None if the entity is not alive.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        Some(self.components.array::<T>().set(entity, component))
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.components.array_ref::<T>()?.get(entity)
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.array_mut::<T>()?.get_mut(entity)
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components
            .array_ref::<T>()
            .map(|array| array.has(entity))
            .unwrap_or(false)
    }

    /// Detach a component; false if the entity did not have one.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> bool {
        self.components
            .array_mut::<T>()
            .map(|array| array.remove(entity))
            .unwrap_or(false)
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Read-only join over a component tuple.
    pub fn view<'w, Q: QueryTuple<'w>>(&'w self) -> Q::View {
        self.components.view::<Q>()
    }

    /// Read-write join over a component tuple.
    pub fn query<'w, Q: QueryTuple<'w>>(&'w mut self) -> Q::Query {
        self.components.query::<Q>()
    }

    // ------------------------------------------------------------------
    // Systems
    // ------------------------------------------------------------------

    /// Append a system; `init` runs later through `init()` or on
    /// replacement, never at registration.
    pub fn register_system<S: System>(&mut self, system: S) -> &mut S {
        let index = self.systems.push(None, system);
        self.systems.get_at::<S>(index).expect("registered system type")
    }

    pub fn register_system_named<S: System>(&mut self, name: &str, system: S) -> &mut S {
        let index = self.systems.push(Some(name.to_string()), system);
        self.systems.get_at::<S>(index).expect("registered system type")
    }

    pub fn get_system<S: System>(&mut self) -> Option<&mut S> {
        self.systems.get::<S>()
    }

    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.systems
    }

    /// Replace the first system of type `Old` in place: the old system
    /// shuts down, `system` takes its slot and initializes. Falls back to
    /// an appending registration (still initialized) when `Old` is absent.
    pub fn replace_system<Old: System, New: System>(&mut self, system: New) -> &mut New {
        match self.systems.index_of_type(TypeId::of::<Old>()) {
            Some(index) => {
                self.install_at(index, Some(short_type_name::<New>().to_string()), system)
            }
            None => self.append_initialized(None, system),
        }
    }

    /// Replace the first system whose display name is `name`, keeping the
    /// name so repeated swaps stay addressable. Appends under `name` when
    /// absent.
    pub fn replace_system_by_name<New: System>(&mut self, name: &str, system: New) -> &mut New {
        match self.systems.index_of_name(name) {
            Some(index) => self.install_at(index, None, system),
            None => self.append_initialized(Some(name.to_string()), system),
        }
    }

    fn install_at<New: System>(
        &mut self,
        index: usize,
        name: Option<String>,
        system: New,
    ) -> &mut New {
        if let Some(mut old) = self.systems.take_slot(index) {
            old.shutdown(self);
        }
        tracing::info!(
            slot = index,
            system = self.systems.name_at(index).unwrap_or(""),
            incoming = short_type_name::<New>(),
            "system replaced in place"
        );
        self.systems
            .install(index, TypeId::of::<New>(), name, Box::new(system));
        let mut fresh = self.systems.take_slot(index).expect("just installed");
        fresh.init(self);
        self.systems.put_slot(index, fresh);
        self.systems.get_at::<New>(index).expect("installed system type")
    }

    fn append_initialized<S: System>(&mut self, name: Option<String>, system: S) -> &mut S {
        let index = self.systems.push(name, system);
        let mut fresh = self.systems.take_slot(index).expect("just registered");
        fresh.init(self);
        self.systems.put_slot(index, fresh);
        self.systems.get_at::<S>(index).expect("registered system type")
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Run `init` on every system in registration order.
    pub fn init(&mut self) {
        for index in 0..self.systems.len() {
            if let Some(mut system) = self.systems.take_slot(index) {
                system.init(self);
                self.systems.put_slot(index, system);
            }
        }
    }

    /// Run `update` on every enabled system in registration order.
    pub fn update_systems(&mut self, dt: f32) {
        for index in 0..self.systems.len() {
            if !self.systems.is_enabled_at(index) {
                continue;
            }
            let Some(mut system) = self.systems.take_slot(index) else {
                continue;
            };
            let zone = {
                let name = self.systems.name_at(index).unwrap_or("system");
                profiler::begin_zone(name, file!(), line!())
            };
            system.update(self, dt);
            profiler::end_zone(zone);
            self.systems.put_slot(index, system);
        }
    }

    /// One simulation frame: profiler frame bracket around the system
    /// updates, with frame counters stamped before close.
    pub fn tick(&mut self, dt: f32) {
        profiler::begin_frame();
        let update_start = Instant::now();
        self.update_systems(dt);
        profiler::record_update_time(update_start.elapsed().as_nanos() as u64);
        profiler::record_counts(self.entities.len(), self.systems.len());
        profiler::end_frame();
    }

    /// Run `shutdown` on every system in reverse registration order.
    pub fn shutdown(&mut self) {
        for index in (0..self.systems.len()).rev() {
            if let Some(mut system) = self.systems.take_slot(index) {
                system.shutdown(self);
                self.systems.put_slot(index, system);
            }
        }
    }

    /// Drop all entities and components, leaving systems in place.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.components.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position {
        x: f32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Velocity {
        vx: f32,
    }

    type Log = Rc<RefCell<Vec<String>>>;

    struct Tracked<const ID: usize> {
        log: Log,
    }

    impl<const ID: usize> Tracked<ID> {
        const LABELS: [&'static str; 4] = ["A", "B", "B'", "C"];

        fn new(log: &Log) -> Self {
            Self {
                log: Rc::clone(log),
            }
        }

        fn label() -> &'static str {
            Self::LABELS[ID]
        }
    }

    impl<const ID: usize> System for Tracked<ID> {
        fn init(&mut self, _world: &mut World) {
            self.log.borrow_mut().push(format!("{}.init", Self::label()));
        }

        fn update(&mut self, _world: &mut World, _dt: f32) {
            self.log.borrow_mut().push(format!("{}.update", Self::label()));
        }

        fn shutdown(&mut self, _world: &mut World) {
            self.log
                .borrow_mut()
                .push(format!("{}.shutdown", Self::label()));
        }
    }

    #[test]
    fn test_destroy_entity_drops_components() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position { x: 1.0 });
        world.add_component(e, Velocity { vx: 2.0 });
        assert!(world.has_component::<Position>(e));

        assert!(world.destroy_entity(e));
        assert!(!world.is_alive(e));
        assert!(!world.has_component::<Position>(e));
        assert!(!world.has_component::<Velocity>(e));
        assert!(!world.destroy_entity(e));
    }

    #[test]
    fn test_add_component_requires_live_entity() {
        let mut world = World::new();
        let e = world.create_entity();
        world.destroy_entity(e);
        assert!(world.add_component(e, Position { x: 0.0 }).is_none());
        assert_eq!(world.get_component::<Position>(e), None);
    }

    #[test]
    fn test_component_accessors() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position { x: 3.0 });

        world.get_component_mut::<Position>(e).unwrap().x = 5.0;
        assert_eq!(world.get_component::<Position>(e), Some(&Position { x: 5.0 }));
        assert!(world.remove_component::<Position>(e));
        assert!(!world.remove_component::<Position>(e));
        assert!(world.is_alive(e));
    }

    #[test]
    fn test_world_query_roundtrip() {
        let mut world = World::new();
        for i in 0..5 {
            let e = world.create_entity();
            world.add_component(e, Position { x: i as f32 });
            if i < 2 {
                world.add_component(e, Velocity { vx: 1.0 });
            }
        }
        assert_eq!(world.view::<(Position, Velocity)>().count(), 2);
        world
            .query::<(Position, Velocity)>()
            .for_each_mut(|_, position, velocity| position.x += velocity.vx);
        let moved: f32 = world
            .view::<(Position, Velocity)>()
            .entities()
            .iter()
            .map(|&e| world.get_component::<Position>(e).unwrap().x)
            .sum();
        assert_eq!(moved, 3.0); // (0+1) + 2*1.0
    }

    #[test]
    fn test_replacement_preserves_order_and_lifecycle() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world.register_system(Tracked::<0>::new(&log)); // A
        world.register_system(Tracked::<1>::new(&log)); // B
        world.register_system(Tracked::<3>::new(&log)); // C
        world.init();
        assert_eq!(*log.borrow(), vec!["A.init", "B.init", "C.init"]);

        log.borrow_mut().clear();
        world.replace_system::<Tracked<1>, Tracked<2>>(Tracked::<2>::new(&log));
        // Old entry shuts down before the new one initializes; A and C
        // are untouched.
        assert_eq!(*log.borrow(), vec!["B.shutdown", "B'.init"]);

        log.borrow_mut().clear();
        world.tick(0.016);
        assert_eq!(*log.borrow(), vec!["A.update", "B'.update", "C.update"]);
        assert!(world.get_system::<Tracked<1>>().is_none());
        assert!(world.get_system::<Tracked<2>>().is_some());
    }

    #[test]
    fn test_replace_missing_type_appends_and_inits() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world.register_system(Tracked::<0>::new(&log));
        world.replace_system::<Tracked<1>, Tracked<2>>(Tracked::<2>::new(&log));
        assert_eq!(*log.borrow(), vec!["B'.init"]);
        assert_eq!(world.systems().len(), 2);

        log.borrow_mut().clear();
        world.tick(0.016);
        assert_eq!(*log.borrow(), vec!["A.update", "B'.update"]);
    }

    #[test]
    fn test_replace_by_name_keeps_display_name() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world.register_system_named("pipeline", Tracked::<1>::new(&log));
        world.replace_system_by_name("pipeline", Tracked::<2>::new(&log));
        assert_eq!(*log.borrow(), vec!["B.shutdown", "B'.init"]);
        assert_eq!(world.systems().name_at(0), Some("pipeline"));
        assert_eq!(world.systems().len(), 1);
    }

    #[test]
    fn test_disabled_systems_are_skipped() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world.register_system(Tracked::<0>::new(&log));
        world.register_system(Tracked::<3>::new(&log));
        world.systems_mut().set_enabled::<Tracked<0>>(false);

        world.tick(0.016);
        assert_eq!(*log.borrow(), vec!["C.update"]);

        world.systems_mut().set_enabled::<Tracked<0>>(true);
        log.borrow_mut().clear();
        world.tick(0.016);
        assert_eq!(*log.borrow(), vec!["A.update", "C.update"]);
    }

    #[test]
    fn test_shutdown_runs_in_reverse_order() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world.register_system(Tracked::<0>::new(&log));
        world.register_system(Tracked::<1>::new(&log));
        world.register_system(Tracked::<3>::new(&log));
        world.shutdown();
        assert_eq!(*log.borrow(), vec!["C.shutdown", "B.shutdown", "A.shutdown"]);
    }

    #[test]
    fn test_destruction_mid_tick_is_visible_downstream() {
        struct Destroyer {
            target: Entity,
        }
        impl System for Destroyer {
            fn update(&mut self, world: &mut World, _dt: f32) {
                world.destroy_entity(self.target);
            }
        }
        struct Checker {
            target: Entity,
            observed_alive: Rc<RefCell<Option<bool>>>,
        }
        impl System for Checker {
            fn update(&mut self, world: &mut World, _dt: f32) {
                *self.observed_alive.borrow_mut() = Some(world.is_alive(self.target));
            }
        }

        let mut world = World::new();
        let target = world.create_entity();
        world.add_component(target, Position { x: 0.0 });
        let observed = Rc::new(RefCell::new(None));
        world.register_system(Destroyer { target });
        world.register_system(Checker {
            target,
            observed_alive: Rc::clone(&observed),
        });

        world.tick(0.016);
        assert_eq!(*observed.borrow(), Some(false));
        assert!(!world.has_component::<Position>(target));
    }

    #[test]
    fn test_clear_keeps_systems() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position { x: 1.0 });
        world.register_system(Tracked::<0>::new(&log));

        world.clear();
        assert_eq!(world.entity_count(), 0);
        assert!(!world.has_component::<Position>(e));
        assert_eq!(world.systems().len(), 1);
    }
}
