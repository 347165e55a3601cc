use rustc_hash::FxHashMap;

use super::{BodyHandle, PhysicsBackend, StaticBox, FIXED_TIMESTEP};
use crate::constants::physics::MAX_SUBSTEPS;
use crate::error::{TerrainError, TerrainResult};

/// A static body as stored by `StaticBodyWorld`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticBodyRecord {
    pub shape: StaticBox,
    pub sleeping: bool,
}

/// In-memory static body registry with fixed-timestep stepping
#[derive(Debug, Default)]
pub struct StaticBodyWorld {
    bodies: FxHashMap<BodyHandle, StaticBodyRecord>,
    next_body_id: u64,
    accumulator: f32,
    steps: u64,
    simulated_time: f64,
    fail_next: u32,
}

impl StaticBodyWorld {
    pub fn new() -> Self {
        Self {
            next_body_id: 1,
            ..Default::default()
        }
    }

    // Fixed timestep update
    pub fn update(&mut self, delta_time: f32) -> u32 {
        self.accumulator += delta_time.max(0.0);

        let mut substeps = 0;
        while self.accumulator >= FIXED_TIMESTEP && substeps < MAX_SUBSTEPS {
            self.step(FIXED_TIMESTEP);
            self.accumulator -= FIXED_TIMESTEP;
            substeps += 1;
        }

        // Drop the backlog instead of spiralling when a frame runs long
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(FIXED_TIMESTEP);
        }
        substeps
    }

    /// Make the next `count` create/remove/sleep calls fail
    pub fn fail_next_calls(&mut self, count: u32) {
        self.fail_next = count;
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&StaticBodyRecord> {
        self.bodies.get(&handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &StaticBodyRecord)> {
        self.bodies.iter().map(|(handle, record)| (*handle, record))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn sleeping_count(&self) -> usize {
        self.bodies.values().filter(|b| b.sleeping).count()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }

    fn check_injected_failure(&mut self, operation: &str) -> TerrainResult<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(TerrainError::Physics {
                operation: operation.to_string(),
                error: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl PhysicsBackend for StaticBodyWorld {
    fn create_static_box(&mut self, shape: StaticBox) -> TerrainResult<BodyHandle> {
        self.check_injected_failure("create_static_box")?;
        if !(shape.center.is_finite() && shape.half_extents.is_finite()) {
            return Err(TerrainError::Physics {
                operation: "create_static_box".to_string(),
                error: format!("non-finite box {:?}", shape),
            });
        }

        let handle = BodyHandle(self.next_body_id);
        self.next_body_id += 1;
        self.bodies.insert(
            handle,
            StaticBodyRecord {
                shape,
                sleeping: false,
            },
        );
        Ok(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> TerrainResult<()> {
        self.check_injected_failure("remove_body")?;
        self.bodies
            .remove(&handle)
            .map(|_| ())
            .ok_or(TerrainError::UnknownHandle {
                kind: "body",
                id: handle.0,
            })
    }

    fn set_body_sleeping(&mut self, handle: BodyHandle, sleeping: bool) -> TerrainResult<()> {
        self.check_injected_failure("set_body_sleeping")?;
        let body = self
            .bodies
            .get_mut(&handle)
            .ok_or(TerrainError::UnknownHandle {
                kind: "body",
                id: handle.0,
            })?;
        body.sleeping = sleeping;
        Ok(())
    }

    fn step(&mut self, dt: f32) {
        self.steps += 1;
        self.simulated_time += f64::from(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn unit_box() -> StaticBox {
        StaticBox::axis_aligned(Vec3::ZERO, Vec3::splat(0.5))
    }

    #[test]
    fn test_create_and_remove() {
        let mut world = StaticBodyWorld::new();
        let a = world.create_static_box(unit_box()).unwrap();
        let b = world.create_static_box(unit_box()).unwrap();
        assert_ne!(a, b);
        assert_eq!(world.body_count(), 2);

        world.remove_body(a).unwrap();
        assert_eq!(world.body_count(), 1);
        assert!(matches!(
            world.remove_body(a),
            Err(TerrainError::UnknownHandle { kind: "body", .. })
        ));
    }

    #[test]
    fn test_sleeping_flag() {
        let mut world = StaticBodyWorld::new();
        let a = world.create_static_box(unit_box()).unwrap();
        world.set_body_sleeping(a, true).unwrap();
        assert_eq!(world.sleeping_count(), 1);
        world.set_body_sleeping(a, false).unwrap();
        assert_eq!(world.sleeping_count(), 0);
    }

    #[test]
    fn test_fixed_timestep_accumulates() {
        let mut world = StaticBodyWorld::new();
        assert_eq!(world.update(FIXED_TIMESTEP * 0.5), 0);
        assert_eq!(world.update(FIXED_TIMESTEP * 0.6), 1);
        assert_eq!(world.update(FIXED_TIMESTEP * 2.0), 2);
        assert_eq!(world.steps(), 3);
    }

    #[test]
    fn test_long_frame_is_bounded() {
        let mut world = StaticBodyWorld::new();
        assert_eq!(world.update(10.0), MAX_SUBSTEPS);
        assert!(world.update(0.0) <= 1);
    }

    #[test]
    fn test_injected_failures() {
        let mut world = StaticBodyWorld::new();
        world.fail_next_calls(1);
        assert!(world.create_static_box(unit_box()).is_err());
        assert!(world.create_static_box(unit_box()).is_ok());
    }

    #[test]
    fn test_rejects_non_finite_box() {
        let mut world = StaticBodyWorld::new();
        let shape = StaticBox::axis_aligned(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ONE);
        assert!(world.create_static_box(shape).is_err());
        assert_eq!(world.body_count(), 0);
    }
}
