// system.rs - System trait and implementation variants

use crate::ecs::World;
use downcast_rs::{impl_downcast, Downcast};
use std::fmt;

/// Implementation strategy selectable on variant-capable systems.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Scalar,
    Simd,
    Gpu,
    Approximate,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Scalar => "Scalar",
            Variant::Simd => "SIMD",
            Variant::Gpu => "GPU",
            Variant::Approximate => "Approximate",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stateful update routine invoked once per tick.
///
/// Identity inside a registry is the concrete type's `TypeId` plus a
/// display name held by the registry entry. Systems that can run under
/// more than one strategy override the variant methods; the scalar
/// variant is always available.
pub trait System: Downcast {
    /// Called once when the system is installed into an initialized world.
    fn init(&mut self, _world: &mut World) {}

    /// Advances the system by `dt` seconds.
    fn update(&mut self, world: &mut World, dt: f32);

    /// Called when the system is replaced or the world shuts down.
    fn shutdown(&mut self, _world: &mut World) {}

    fn available_variants(&self) -> &'static [Variant] {
        &[Variant::Scalar]
    }

    fn current_variant(&self) -> Variant {
        Variant::Scalar
    }

    /// Selects `variant` starting with the next update; false if the
    /// system does not support it.
    fn switch_variant(&mut self, variant: Variant) -> bool {
        variant == Variant::Scalar
    }
}

impl_downcast!(System);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_string_forms() {
        assert_eq!(Variant::Scalar.to_string(), "Scalar");
        assert_eq!(Variant::Simd.to_string(), "SIMD");
        assert_eq!(Variant::Gpu.to_string(), "GPU");
        assert_eq!(Variant::Approximate.to_string(), "Approximate");
    }

    #[test]
    fn test_default_variant_capability() {
        struct Fixed;
        impl System for Fixed {
            fn update(&mut self, _world: &mut World, _dt: f32) {}
        }

        let mut system = Fixed;
        assert_eq!(system.available_variants(), &[Variant::Scalar]);
        assert_eq!(system.current_variant(), Variant::Scalar);
        assert!(system.switch_variant(Variant::Scalar));
        assert!(!system.switch_variant(Variant::Simd));
        assert!(!system.switch_variant(Variant::Gpu));
    }
}
