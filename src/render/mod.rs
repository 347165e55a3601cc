//! Render collaborator boundary
//!
//! Terrain hands the renderer extruded 2D profiles and decoration
//! placements; everything about GPU buffers and materials stays on the far
//! side of `RenderBackend`.

pub mod recorder;
pub mod vertex;

pub use recorder::{DecorationRecord, MeshRecord, SceneRecorder};
pub use vertex::ProfileVertex;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::TerrainResult;

/// Opaque handle to a surface mesh owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// Opaque handle to a decoration instance owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationHandle(pub u64);

/// Material band of an extruded surface strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceMaterial {
    /// Driving band
    Center,
    /// Border band on the +z side
    NearBorder,
    /// Border band on the -z side
    FarBorder,
}

impl SurfaceMaterial {
    pub const ALL: [SurfaceMaterial; 3] = [
        SurfaceMaterial::Center,
        SurfaceMaterial::NearBorder,
        SurfaceMaterial::FarBorder,
    ];
}

/// Decoration prop kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationKind {
    Tree,
    Rock,
    Bush,
    Sign,
}

impl DecorationKind {
    pub const ALL: [DecorationKind; 4] = [
        DecorationKind::Tree,
        DecorationKind::Rock,
        DecorationKind::Bush,
        DecorationKind::Sign,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DecorationKind::Tree => "tree",
            DecorationKind::Rock => "rock",
            DecorationKind::Bush => "bush",
            DecorationKind::Sign => "sign",
        }
    }
}

/// Closed 2D polygon in the x/y plane extruded along z.
///
/// `points` run along the surface from low x to high x, then back along the
/// bottom. The strip covers `z_offset - depth / 2 ..= z_offset + depth / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudedProfile {
    pub points: Vec<ProfileVertex>,
    pub depth: f32,
    pub z_offset: f32,
    pub material: SurfaceMaterial,
}

impl ExtrudedProfile {
    /// Number of vertices on the surface edge (excludes the two bottom corners)
    pub fn surface_len(&self) -> usize {
        self.points.len().saturating_sub(2)
    }
}

/// Per-mesh detail switches driven by LOD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshDetail {
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    /// Terrain never requests wireframe; kept so backends see an explicit value
    pub wireframe: bool,
}

impl MeshDetail {
    pub const FULL: MeshDetail = MeshDetail {
        cast_shadows: true,
        receive_shadows: true,
        wireframe: false,
    };
}

impl Default for MeshDetail {
    fn default() -> Self {
        Self::FULL
    }
}

/// World transform for a decoration instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationPlacement {
    pub position: Vec3,
    pub scale: f32,
    /// Rotation about the y axis in radians
    pub yaw: f32,
}

/// Scene interface the terrain requires from a renderer
pub trait RenderBackend {
    fn create_extruded_surface_mesh(&mut self, profile: &ExtrudedProfile) -> TerrainResult<MeshHandle>;

    fn dispose_mesh(&mut self, handle: MeshHandle) -> TerrainResult<()>;

    fn attach(&mut self, handle: MeshHandle) -> TerrainResult<()>;

    fn detach(&mut self, handle: MeshHandle) -> TerrainResult<()>;

    fn set_mesh_detail(&mut self, handle: MeshHandle, detail: MeshDetail) -> TerrainResult<()>;

    fn create_decoration(&mut self, kind: DecorationKind) -> TerrainResult<DecorationHandle>;

    fn place_decoration(
        &mut self,
        handle: DecorationHandle,
        placement: DecorationPlacement,
    ) -> TerrainResult<()>;

    fn set_decoration_visible(&mut self, handle: DecorationHandle, visible: bool) -> TerrainResult<()>;

    fn dispose_decoration(&mut self, handle: DecorationHandle) -> TerrainResult<()>;
}
