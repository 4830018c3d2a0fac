// system_registry.rs - Ordered system storage with in-place replacement
//
// Entries keep registration order; replacement reuses the slot so the
// execution order of everything else is untouched. Lifecycle calls
// (init/update/shutdown) are driven by the World, which takes a system
// out of its slot, runs the hook against itself, and puts it back: a
// system that is mid-update occupies an empty slot, every other system
// stays visible.

use crate::ecs::{System, Variant};
use std::any::TypeId;

pub(crate) struct SystemEntry {
    type_id: TypeId,
    name: String,
    enabled: bool,
    system: Option<Box<dyn System>>,
}

/// Ordered sequence of systems keyed by concrete type id and display name.
pub struct SystemRegistry {
    entries: Vec<SystemEntry>,
}

/// Short name of a concrete type, without module path.
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn push<S: System>(&mut self, name: Option<String>, system: S) -> usize {
        let name = name.unwrap_or_else(|| short_type_name::<S>().to_string());
        tracing::debug!(system = %name, "system registered");
        self.entries.push(SystemEntry {
            type_id: TypeId::of::<S>(),
            name,
            enabled: true,
            system: Some(Box::new(system)),
        });
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First registered system of type `S`.
    pub fn get<S: System>(&mut self) -> Option<&mut S> {
        let type_id = TypeId::of::<S>();
        self.entries
            .iter_mut()
            .filter(|entry| entry.type_id == type_id)
            .find_map(|entry| entry.system.as_deref_mut()?.downcast_mut::<S>())
    }

    pub fn get_ref<S: System>(&self) -> Option<&S> {
        let type_id = TypeId::of::<S>();
        self.entries
            .iter()
            .filter(|entry| entry.type_id == type_id)
            .find_map(|entry| entry.system.as_deref()?.downcast_ref::<S>())
    }

    /// Erased access by display name (first match).
    pub fn get_by_name(&mut self, name: &str) -> Option<&mut dyn System> {
        self.entries
            .iter_mut()
            .filter(|entry| entry.name == name)
            .find_map(|entry| entry.system.as_deref_mut())
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.name.as_str())
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Rename the first system of type `S`.
    pub fn set_name<S: System>(&mut self, name: &str) -> bool {
        let type_id = TypeId::of::<S>();
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.type_id == type_id) {
            entry.name = name.to_string();
            true
        } else {
            false
        }
    }

    pub fn set_enabled<S: System>(&mut self, enabled: bool) -> bool {
        let type_id = TypeId::of::<S>();
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.type_id == type_id) {
            entry.enabled = enabled;
            true
        } else {
            false
        }
    }

    pub fn set_enabled_by_name(&mut self, name: &str, enabled: bool) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.name == name) {
            entry.enabled = enabled;
            true
        } else {
            false
        }
    }

    pub fn is_enabled_at(&self, index: usize) -> bool {
        self.entries.get(index).map(|entry| entry.enabled).unwrap_or(false)
    }

    pub(crate) fn index_of_type(&self, type_id: TypeId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.type_id == type_id)
    }

    pub(crate) fn index_of_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    /// Take the system out of its slot for a lifecycle call.
    pub(crate) fn take_slot(&mut self, index: usize) -> Option<Box<dyn System>> {
        self.entries.get_mut(index)?.system.take()
    }

    /// Return a system taken with `take_slot`.
    pub(crate) fn put_slot(&mut self, index: usize, system: Box<dyn System>) {
        let entry = &mut self.entries[index];
        debug_assert!(entry.system.is_none(), "system slot already occupied");
        entry.system = Some(system);
    }

    /// Install a different system into an existing slot, preserving order.
    pub(crate) fn install(
        &mut self,
        index: usize,
        type_id: TypeId,
        name: Option<String>,
        system: Box<dyn System>,
    ) {
        let entry = &mut self.entries[index];
        entry.type_id = type_id;
        if let Some(name) = name {
            entry.name = name;
        }
        entry.enabled = true;
        entry.system = Some(system);
    }

    /// Typed access to the slot at `index`.
    pub(crate) fn get_at<S: System>(&mut self, index: usize) -> Option<&mut S> {
        self.entries
            .get_mut(index)?
            .system
            .as_deref_mut()?
            .downcast_mut::<S>()
    }

    /// Visit every installed system with its display name.
    pub fn for_each_system_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut dyn System),
    {
        for entry in &mut self.entries {
            if let Some(system) = entry.system.as_deref_mut() {
                f(&entry.name, system);
            }
        }
    }

    /// Display names of systems exposing more than one variant.
    pub fn variant_capable(&self) -> Vec<(&str, Variant)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let system = entry.system.as_deref()?;
                if system.available_variants().len() > 1 {
                    Some((entry.name.as_str(), system.current_variant()))
                } else {
                    None
                }
            })
            .collect()
    }
}

impl Default for SystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}
