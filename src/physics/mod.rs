//! Physics collaborator boundary
//!
//! Terrain only ever creates, removes and sleeps static boxes. The rigid-body
//! simulation itself lives behind `PhysicsBackend`; `StaticBodyWorld` is an
//! in-memory implementation for tests and headless tools.

pub mod world;

pub use world::{StaticBodyRecord, StaticBodyWorld};

use glam::{Quat, Vec3};

use crate::error::TerrainResult;

pub use crate::constants::physics::FIXED_TIMESTEP;

/// Opaque handle to a body owned by the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

/// Description of one static box collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

impl StaticBox {
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
            rotation: Quat::IDENTITY,
        }
    }

    /// Box rotated about the z axis by `angle` radians
    pub fn rotated_z(center: Vec3, half_extents: Vec3, angle: f32) -> Self {
        Self {
            center,
            half_extents,
            rotation: Quat::from_rotation_z(angle),
        }
    }

    /// World-space top surface point at local x offset `dx` from the center
    pub fn top_point(&self, dx: f32) -> Vec3 {
        self.center + self.rotation * Vec3::new(dx, self.half_extents.y, 0.0)
    }
}

/// Body management interface the terrain requires from a physics world
pub trait PhysicsBackend {
    fn create_static_box(&mut self, shape: StaticBox) -> TerrainResult<BodyHandle>;

    fn remove_body(&mut self, handle: BodyHandle) -> TerrainResult<()>;

    /// Put a body to sleep (excluded from contact generation) or wake it
    fn set_body_sleeping(&mut self, handle: BodyHandle, sleeping: bool) -> TerrainResult<()>;

    /// Advance the simulation by one fixed step
    fn step(&mut self, dt: f32);
}
