pub mod config;
pub mod constants;
pub mod error;
pub mod generation;
pub mod physics;
pub mod pool;
pub mod query;
pub mod render;
pub mod report;
pub mod seed;
pub mod segment;
pub mod streaming;
pub mod terrain;

pub use config::{ConfigFormat, DecorationDensity, LodDistances, PhysicsSimplification, TerrainConfig};
pub use error::{TerrainError, TerrainErrorContext, TerrainResult};
pub use generation::{ChunkType, PositionalNoise, ShapeGenerator, TerrainRng};
pub use physics::{BodyHandle, PhysicsBackend, StaticBodyWorld, StaticBox};
pub use query::{HeightProvider, HeightQuery};
pub use render::{
    DecorationHandle, DecorationKind, DecorationPlacement, ExtrudedProfile, MeshDetail, MeshHandle,
    RenderBackend, SceneRecorder, SurfaceMaterial,
};
pub use report::{BuildReport, StepOutcome, TickReport};
pub use seed::TerrainSeed;
pub use segment::{SamplePoint, Segment, SurfaceSample};
pub use streaming::{LodLevel, StreamingStats};
pub use terrain::Terrain;

/// Terrain with the in-memory collaborators, for tests and headless tools
pub type HeadlessTerrain = Terrain<StaticBodyWorld, SceneRecorder>;

/// Build a headless terrain with default configuration
pub fn headless(seed: u32) -> TerrainResult<HeadlessTerrain> {
    Terrain::new(
        TerrainSeed(seed),
        TerrainConfig::default(),
        StaticBodyWorld::new(),
        SceneRecorder::new(),
    )
}
