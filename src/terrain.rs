//! Terrain facade
//!
//! Owns the streaming manager together with the physics and render
//! collaborators it drives. The collaborators are built by the caller and
//! passed in, so a physics world always exists before the terrain does.

use crate::config::TerrainConfig;
use crate::error::TerrainResult;
use crate::generation::ChunkType;
use crate::physics::PhysicsBackend;
use crate::query::HeightProvider;
use crate::render::RenderBackend;
use crate::report::{BuildReport, TickReport};
use crate::seed::TerrainSeed;
use crate::segment::SurfaceSample;
use crate::streaming::{SegmentStore, StreamingManager, StreamingStats};

/// Procedurally streamed 2.5D terrain
#[derive(Debug)]
pub struct Terrain<P: PhysicsBackend, R: RenderBackend> {
    seed: TerrainSeed,
    manager: StreamingManager,
    physics: P,
    renderer: R,
}

impl<P: PhysicsBackend, R: RenderBackend> Terrain<P, R> {
    /// Create an empty terrain; nothing is built until the first `update`
    pub fn new(seed: TerrainSeed, config: TerrainConfig, physics: P, renderer: R) -> TerrainResult<Self> {
        let manager = StreamingManager::new(seed.value(), config)?;
        log::info!("[Terrain] Created with seed {}", seed);
        Ok(Self {
            seed,
            manager,
            physics,
            renderer,
        })
    }

    /// One streaming tick around `tracked_x`
    pub fn update(&mut self, tracked_x: f64) -> TickReport {
        self.manager
            .update(tracked_x, &mut self.physics, &mut self.renderer)
    }

    pub fn height_at(&self, x: f64) -> Option<f64> {
        self.manager.heights().height_at(x)
    }

    pub fn height_near(&self, x: f64) -> Option<SurfaceSample> {
        self.manager.heights().height_near(x)
    }

    /// Build the segment starting at `start_x` outside the streaming tick.
    /// `None` when it already exists.
    pub fn build_segment_at(&mut self, start_x: f64) -> Option<BuildReport> {
        let index = self.index_for(start_x);
        self.manager
            .build_segment(index, &mut self.physics, &mut self.renderer)
    }

    /// Drop the segment owning `x` and release its handles
    pub fn remove_segment_at(&mut self, x: f64) -> Option<TerrainResult<usize>> {
        let index = self.index_for(x);
        self.manager
            .remove_segment(index, &mut self.physics, &mut self.renderer)
    }

    /// Release every segment and stop generation. Safe to call repeatedly.
    pub fn dispose(&mut self) -> TerrainResult<usize> {
        self.manager.dispose(&mut self.physics, &mut self.renderer)
    }

    pub fn is_disposed(&self) -> bool {
        self.manager.is_disposed()
    }

    pub fn seed(&self) -> TerrainSeed {
        self.seed
    }

    pub fn config(&self) -> &TerrainConfig {
        self.manager.config()
    }

    pub fn segments(&self) -> &SegmentStore {
        self.manager.store()
    }

    /// `(index, type)` for every active segment, in order
    pub fn chunk_types(&self) -> Vec<(i64, ChunkType)> {
        self.manager.chunk_types()
    }

    pub fn stats(&self) -> StreamingStats {
        self.manager.stats()
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn index_for(&self, x: f64) -> i64 {
        (x / self.manager.config().segment_width).floor() as i64
    }
}

impl<P: PhysicsBackend, R: RenderBackend> HeightProvider for Terrain<P, R> {
    fn height_at(&self, x: f64) -> Option<f64> {
        Terrain::height_at(self, x)
    }

    fn height_near(&self, x: f64) -> Option<SurfaceSample> {
        Terrain::height_near(self, x)
    }
}

impl<P: PhysicsBackend, R: RenderBackend> Drop for Terrain<P, R> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            log::warn!("[Terrain] Dispose on drop failed: {}", e);
        }
    }
}
