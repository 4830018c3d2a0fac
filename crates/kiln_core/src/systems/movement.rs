// movement.rs - Velocity integration with scalar and SIMD variants
//
// Storage is array-of-structs, so the SIMD path vectorizes per entity:
// each (Transform, Velocity) pair is widened to Vec3A and advanced with a
// fused multiply-add. Both paths agree up to floating-point
// associativity.

use crate::ecs::{System, Variant, World};
use glam::{Vec3, Vec3A};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub translation: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub linear: Vec3,
}

const MOVEMENT_VARIANTS: &[Variant] = &[Variant::Scalar, Variant::Simd];

/// Integrates `Transform.translation += Velocity.linear * dt`.
pub struct MovementSystem {
    variant: Variant,
}

impl MovementSystem {
    pub fn new() -> Self {
        Self {
            variant: Variant::Scalar,
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn update(&mut self, world: &mut World, dt: f32) {
        match self.variant {
            Variant::Simd => {
                world
                    .query::<(Transform, Velocity)>()
                    .for_each_mut(|_, transform, velocity| {
                        let position = Vec3A::from(transform.translation);
                        let step = Vec3A::from(velocity.linear);
                        transform.translation = Vec3::from(step.mul_add(Vec3A::splat(dt), position));
                    });
            }
            _ => {
                world
                    .query::<(Transform, Velocity)>()
                    .for_each_mut(|_, transform, velocity| {
                        transform.translation.x += velocity.linear.x * dt;
                        transform.translation.y += velocity.linear.y * dt;
                        transform.translation.z += velocity.linear.z * dt;
                    });
            }
        }
    }

    fn available_variants(&self) -> &'static [Variant] {
        MOVEMENT_VARIANTS
    }

    fn current_variant(&self) -> Variant {
        self.variant
    }

    fn switch_variant(&mut self, variant: Variant) -> bool {
        if MOVEMENT_VARIANTS.contains(&variant) {
            self.variant = variant;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;

    fn spawn_moving(world: &mut World, count: usize) -> Vec<Entity> {
        (0..count)
            .map(|i| {
                let e = world.create_entity();
                world.add_component(
                    e,
                    Transform {
                        translation: Vec3::new(i as f32, 0.0, -(i as f32)),
                    },
                );
                world.add_component(
                    e,
                    Velocity {
                        linear: Vec3::new(1.0, 2.0, 3.0),
                    },
                );
                e
            })
            .collect()
    }

    #[test]
    fn test_scalar_integration() {
        let mut world = World::new();
        let entities = spawn_moving(&mut world, 3);
        world.register_system(MovementSystem::new());

        world.tick(0.5);
        let moved = world.get_component::<Transform>(entities[1]).unwrap();
        assert_eq!(moved.translation, Vec3::new(1.5, 1.0, 0.5));
    }

    #[test]
    fn test_simd_matches_scalar() {
        let mut scalar_world = World::new();
        let scalar_entities = spawn_moving(&mut scalar_world, 16);
        scalar_world.register_system(MovementSystem::new());

        let mut simd_world = World::new();
        let simd_entities = spawn_moving(&mut simd_world, 16);
        let system = simd_world.register_system(MovementSystem::new());
        assert!(system.switch_variant(Variant::Simd));

        for _ in 0..4 {
            scalar_world.tick(0.25);
            simd_world.tick(0.25);
        }

        for (a, b) in scalar_entities.iter().zip(&simd_entities) {
            let scalar = scalar_world.get_component::<Transform>(*a).unwrap();
            let simd = simd_world.get_component::<Transform>(*b).unwrap();
            assert!(
                (scalar.translation - simd.translation).length() < 1e-4,
                "variants diverged: {:?} vs {:?}",
                scalar.translation,
                simd.translation
            );
        }
    }

    #[test]
    fn test_unsupported_variants_are_refused() {
        let mut system = MovementSystem::new();
        assert!(!system.switch_variant(Variant::Gpu));
        assert!(!system.switch_variant(Variant::Approximate));
        assert_eq!(system.current_variant(), Variant::Scalar);
        assert!(system.switch_variant(Variant::Simd));
        assert_eq!(system.current_variant(), Variant::Simd);
    }

    #[test]
    fn test_controller_scales_movement_system() {
        use crate::ecs::AdaptiveController;

        let mut world = World::new();
        world.register_system_named("velocity", MovementSystem::new());
        let entities = spawn_moving(&mut world, 600);

        let mut controller = AdaptiveController::new();
        controller.force_tick(&mut world);
        assert_eq!(
            world.get_system::<MovementSystem>().unwrap().current_variant(),
            Variant::Simd
        );

        for &e in &entities[50..] {
            world.destroy_entity(e);
        }
        assert_eq!(world.entity_count(), 50);
        controller.force_tick(&mut world);
        assert_eq!(
            world.get_system::<MovementSystem>().unwrap().current_variant(),
            Variant::Scalar
        );
    }
}
