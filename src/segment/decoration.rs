//! Decoration placement
//!
//! Placement is planned from a per-segment RNG that is independent of the
//! chunk-selection stream, then instantiated through per-kind pools so
//! evicted props are reused instead of recreated.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::config::{DecorationDensity, TerrainConfig};
use crate::constants::decoration::{ATTEMPTS_PER_ITEM, LATERAL_EXTENT, SEED_SALT};
use crate::error::TerrainResult;
use crate::generation::{mix_seed, ChunkType, TerrainRng};
use crate::pool::ObjectPool;
use crate::render::{DecorationHandle, DecorationKind, DecorationPlacement, RenderBackend};

use super::{Segment, SurfaceSample};

/// Fraction of the width at which hazard warning signs stand
const WARNING_SIGN_POSITION: f64 = 0.1;

/// Side of the track a decoration stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LateralZone {
    /// +z side
    Near,
    /// -z side
    Far,
}

impl LateralZone {
    fn sign(self) -> f64 {
        match self {
            LateralZone::Near => 1.0,
            LateralZone::Far => -1.0,
        }
    }
}

/// A decoration to be instantiated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationPlan {
    pub kind: DecorationKind,
    pub zone: LateralZone,
    pub position: Vec3,
    pub scale: f32,
    pub yaw: f32,
    /// Footprint radius used for overlap rejection
    pub radius: f64,
}

/// An instantiated decoration owned by a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedDecoration {
    pub handle: DecorationHandle,
    pub kind: DecorationKind,
    pub position: Vec3,
    pub radius: f64,
}

fn footprint(kind: DecorationKind) -> f64 {
    match kind {
        DecorationKind::Tree => 1.2,
        DecorationKind::Rock => 0.8,
        DecorationKind::Bush => 0.6,
        DecorationKind::Sign => 0.4,
    }
}

/// Probability of placing on the far side
fn far_bias(kind: DecorationKind) -> f64 {
    match kind {
        DecorationKind::Tree => 0.7,
        DecorationKind::Rock => 0.5,
        DecorationKind::Bush => 0.4,
        DecorationKind::Sign => 0.0,
    }
}

fn base_density(kind: DecorationKind, density: &DecorationDensity) -> f64 {
    match kind {
        DecorationKind::Tree => density.tree,
        DecorationKind::Rock => density.rock,
        DecorationKind::Bush => density.bush,
        DecorationKind::Sign => density.sign,
    }
}

/// Density multiplier of `kind` on a segment of `chunk_type`
fn type_weight(kind: DecorationKind, chunk_type: ChunkType) -> f64 {
    use DecorationKind::*;
    match (chunk_type, kind) {
        (ChunkType::Hills, Tree | Bush) => 1.0,
        (ChunkType::Hills, Rock) => 0.6,
        (ChunkType::Hills, Sign) => 0.2,
        (ChunkType::Plateau, Rock) => 1.4,
        (ChunkType::Plateau, Tree | Bush) => 0.6,
        (ChunkType::Plateau, Sign) => 0.2,
        (ChunkType::Ramp, Tree | Bush) => 0.5,
        (ChunkType::Ramp, Rock) => 0.8,
        (ChunkType::Ramp, Sign) => 1.0,
        (ChunkType::Gap, Tree | Bush) => 0.3,
        (ChunkType::Gap, Rock | Sign) => 1.0,
        (ChunkType::Washboard, Tree | Bush) => 0.8,
        (ChunkType::Washboard, Rock) => 1.2,
        (ChunkType::Washboard, Sign) => 0.5,
        (ChunkType::Valley, Bush) => 1.6,
        (ChunkType::Valley, Tree | Rock) => 0.7,
        (ChunkType::Valley, Sign) => 0.3,
    }
}

fn overlaps(plans: &[DecorationPlan], position: Vec3, radius: f64) -> bool {
    plans.iter().any(|other| {
        let dx = f64::from(other.position.x - position.x);
        let dz = f64::from(other.position.z - position.z);
        (dx * dx + dz * dz).sqrt() < other.radius + radius
    })
}

/// Seed of the decoration stream for segment `index`
pub fn decoration_seed(seed: u32, index: i64) -> u32 {
    mix_seed(seed ^ SEED_SALT, index as u32)
}

/// Plan every decoration of `segment`.
///
/// Deterministic in `(seed, segment.index)` and the sampled profile. Nothing
/// lands inside the lane `|z| < lane_half_width` or over a void.
pub fn plan_decorations(segment: &Segment, config: &TerrainConfig, seed: u32) -> Vec<DecorationPlan> {
    let density = &config.decoration_density;
    let lane = density.lane_half_width;
    let mut rng = TerrainRng::new(decoration_seed(seed, segment.index));
    let mut plans: Vec<DecorationPlan> = Vec::new();

    if matches!(segment.chunk_type, ChunkType::Gap | ChunkType::Ramp) {
        let radius = footprint(DecorationKind::Sign);
        let x = segment.start_x + segment.width * WARNING_SIGN_POSITION;
        let lateral = lane + radius + 0.5;
        if lateral + radius <= LATERAL_EXTENT {
            if let Some(SurfaceSample::Ground(y)) = segment.surface_at(x) {
                plans.push(DecorationPlan {
                    kind: DecorationKind::Sign,
                    zone: LateralZone::Near,
                    position: Vec3::new(x as f32, y as f32, lateral as f32),
                    scale: 1.0,
                    yaw: 0.0,
                    radius,
                });
            }
        }
    }

    for kind in [
        DecorationKind::Sign,
        DecorationKind::Tree,
        DecorationKind::Rock,
        DecorationKind::Bush,
    ] {
        let radius = footprint(kind);
        let inner = lane + radius;
        if inner >= LATERAL_EXTENT {
            continue;
        }

        let expected = base_density(kind, density) * type_weight(kind, segment.chunk_type) * segment.width / 100.0;
        let mut count = expected.floor() as usize;
        if rng.gen::<f64>() < expected.fract() {
            count += 1;
        }

        for _ in 0..count {
            for _ in 0..ATTEMPTS_PER_ITEM {
                let x = rng.gen_range(segment.start_x..segment.end_x());
                let zone = if rng.gen_bool(far_bias(kind)) {
                    LateralZone::Far
                } else {
                    LateralZone::Near
                };
                let z = zone.sign() * rng.gen_range(inner..LATERAL_EXTENT);
                let scale = rng.gen_range(0.8f32..1.25);
                let yaw = rng.gen_range(0.0f32..TAU);

                let Some(SurfaceSample::Ground(y)) = segment.surface_at(x) else {
                    continue;
                };
                let position = Vec3::new(x as f32, y as f32, z as f32);
                if overlaps(&plans, position, radius) {
                    continue;
                }
                plans.push(DecorationPlan {
                    kind,
                    zone,
                    position,
                    scale,
                    yaw,
                    radius,
                });
                break;
            }
        }
    }

    plans
}

/// Per-kind pools of decoration handles
#[derive(Debug)]
pub struct DecorationPools {
    pools: FxHashMap<DecorationKind, ObjectPool<DecorationHandle>>,
}

impl DecorationPools {
    pub fn new(capacity: usize) -> Self {
        Self {
            pools: DecorationKind::ALL
                .iter()
                .map(|kind| (*kind, ObjectPool::new(capacity)))
                .collect(),
        }
    }

    fn pool_mut(&mut self, kind: DecorationKind) -> &mut ObjectPool<DecorationHandle> {
        self.pools
            .entry(kind)
            .or_insert_with(|| ObjectPool::new(crate::constants::decoration::POOL_CAPACITY))
    }

    /// Acquire a handle for `plan`, place it and make it visible
    pub fn instantiate<R: RenderBackend>(
        &mut self,
        plan: &DecorationPlan,
        renderer: &mut R,
    ) -> TerrainResult<PlacedDecoration> {
        let handle = self
            .pool_mut(plan.kind)
            .acquire(|| renderer.create_decoration(plan.kind))?;
        let placed = PlacedDecoration {
            handle,
            kind: plan.kind,
            position: plan.position,
            radius: plan.radius,
        };

        let shown = renderer
            .place_decoration(
                handle,
                DecorationPlacement {
                    position: plan.position,
                    scale: plan.scale,
                    yaw: plan.yaw,
                },
            )
            .and_then(|_| renderer.set_decoration_visible(handle, true));

        match shown {
            Ok(()) => Ok(placed),
            Err(e) => {
                if let Err(dispose_error) = renderer.dispose_decoration(handle) {
                    log::warn!(
                        "[DecorationPools] Failed to dispose {} {}: {}",
                        plan.kind.name(),
                        handle.0,
                        dispose_error
                    );
                }
                Err(e)
            }
        }
    }

    /// Hide `placed` and return its handle to the pool
    pub fn recycle<R: RenderBackend>(&mut self, placed: PlacedDecoration, renderer: &mut R) -> TerrainResult<()> {
        if let Err(e) = renderer.set_decoration_visible(placed.handle, false) {
            // An instance that may still be visible must not be reused
            if let Err(dispose_error) = renderer.dispose_decoration(placed.handle) {
                log::warn!(
                    "[DecorationPools] Failed to dispose {} {} after hiding failed: {}",
                    placed.kind.name(),
                    placed.handle.0,
                    dispose_error
                );
            }
            return Err(e);
        }
        match self.pool_mut(placed.kind).release(placed.handle) {
            Some(overflow) => renderer.dispose_decoration(overflow),
            None => Ok(()),
        }
    }

    /// Dispose every pooled handle
    pub fn drain<R: RenderBackend>(&mut self, renderer: &mut R) -> TerrainResult<usize> {
        let mut disposed = 0;
        let mut first_error = None;
        for pool in self.pools.values_mut() {
            for handle in pool.drain() {
                match renderer.dispose_decoration(handle) {
                    Ok(()) => disposed += 1,
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(disposed),
        }
    }

    pub fn pooled(&self, kind: DecorationKind) -> usize {
        self.pools.get(&kind).map_or(0, ObjectPool::available)
    }

    pub fn total_pooled(&self) -> usize {
        self.pools.values().map(ObjectPool::available).sum()
    }

    pub fn total_reused(&self) -> usize {
        self.pools.values().map(ObjectPool::reused).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::TerrainRng;
    use crate::render::SceneRecorder;
    use crate::segment::{SegmentBuilder, SegmentNeighbours};

    fn segment_at(seed: u32, index: i64) -> Segment {
        let builder = SegmentBuilder::new(seed, &TerrainConfig::default());
        let mut rng = TerrainRng::new(seed);
        builder.generate(index, &mut rng, SegmentNeighbours::default())
    }

    #[test]
    fn test_plans_are_deterministic() {
        let config = TerrainConfig::default();
        let segment = segment_at(42, 4);
        let a = plan_decorations(&segment, &config, 42);
        let b = plan_decorations(&segment, &config, 42);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_lane_stays_clear_and_no_overlap() {
        let config = TerrainConfig::default();
        let lane = config.decoration_density.lane_half_width;
        for index in 0..40 {
            let segment = segment_at(7, index);
            let plans = plan_decorations(&segment, &config, 7);
            for (i, plan) in plans.iter().enumerate() {
                assert!(f64::from(plan.position.z.abs()) >= lane + plan.radius - 1e-4);
                assert!(segment.touches(f64::from(plan.position.x)));
                for other in &plans[i + 1..] {
                    let dx = f64::from(other.position.x - plan.position.x);
                    let dz = f64::from(other.position.z - plan.position.z);
                    assert!((dx * dx + dz * dz).sqrt() >= other.radius + plan.radius - 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_wide_lane_suppresses_everything() {
        let mut config = TerrainConfig::default();
        config.decoration_density.lane_half_width = LATERAL_EXTENT;
        let segment = segment_at(3, 2);
        assert!(plan_decorations(&segment, &config, 3).is_empty());
    }

    #[test]
    fn test_zero_density_places_nothing_on_hills() {
        let mut config = TerrainConfig::default();
        config.decoration_density.tree = 0.0;
        config.decoration_density.rock = 0.0;
        config.decoration_density.bush = 0.0;
        config.decoration_density.sign = 0.0;
        let segment = segment_at(42, 0);
        assert!(plan_decorations(&segment, &config, 42).is_empty());
    }

    #[test]
    fn test_pools_reuse_handles() {
        let mut scene = SceneRecorder::new();
        let mut pools = DecorationPools::new(8);
        let plan = DecorationPlan {
            kind: DecorationKind::Rock,
            zone: LateralZone::Far,
            position: Vec3::new(1.0, 2.0, -6.0),
            scale: 1.0,
            yaw: 0.0,
            radius: 0.8,
        };

        let placed = pools.instantiate(&plan, &mut scene).unwrap();
        assert_eq!(scene.visible_decoration_count(), 1);
        pools.recycle(placed, &mut scene).unwrap();
        assert_eq!(scene.visible_decoration_count(), 0);
        assert_eq!(pools.pooled(DecorationKind::Rock), 1);

        let again = pools.instantiate(&plan, &mut scene).unwrap();
        assert_eq!(again.handle, placed.handle);
        assert_eq!(scene.decorations_created(), 1);
        assert_eq!(pools.total_reused(), 1);
    }

    #[test]
    fn test_failed_placement_disposes_handle() {
        let mut scene = SceneRecorder::new();
        let mut pools = DecorationPools::new(8);
        let plan = DecorationPlan {
            kind: DecorationKind::Tree,
            zone: LateralZone::Near,
            position: Vec3::new(0.0, 0.0, 8.0),
            scale: 1.0,
            yaw: 0.0,
            radius: 1.2,
        };
        let handle = pools.instantiate(&plan, &mut scene).unwrap().handle;
        pools
            .recycle(
                PlacedDecoration {
                    handle,
                    kind: DecorationKind::Tree,
                    position: plan.position,
                    radius: plan.radius,
                },
                &mut scene,
            )
            .unwrap();

        // Reused handle, then place_decoration fails
        scene.fail_next_calls(1);
        assert!(pools.instantiate(&plan, &mut scene).is_err());
        assert_eq!(scene.decoration_count(), 0);
    }

    #[test]
    fn test_failed_hide_disposes_instead_of_pooling() {
        let mut scene = SceneRecorder::new();
        let mut pools = DecorationPools::new(8);
        let plan = DecorationPlan {
            kind: DecorationKind::Bush,
            zone: LateralZone::Near,
            position: Vec3::new(3.0, 1.0, 7.0),
            scale: 1.0,
            yaw: 0.0,
            radius: 0.6,
        };
        let placed = pools.instantiate(&plan, &mut scene).unwrap();

        scene.fail_next_calls(1);
        assert!(pools.recycle(placed, &mut scene).is_err());
        assert_eq!(pools.pooled(DecorationKind::Bush), 0);
        assert_eq!(scene.decoration_count(), 0);
    }
}
