use crate::config::TerrainConfig;
use crate::constants::segment::SMOOTHING_RADIUS;
use crate::constants::shapes::VOID_Y;
use crate::constants::streaming::MAX_SEGMENT_INDEX;
use crate::error::TerrainResult;
use crate::generation::{
    blend, difficulty_at, select_chunk_type, ChunkType, Easing, GapWindow, PositionalNoise,
    ShapeContext, ShapeGenerator, TerrainRng,
};
use crate::physics::PhysicsBackend;
use crate::render::RenderBackend;
use crate::report::BuildReport;
use crate::streaming::LodLevel;

use super::decoration::{plan_decorations, DecorationPools};
use super::geometry::{collision_boxes, surface_profiles};
use super::{SamplePoint, Segment};

/// Known heights of already-built terrain at a new segment's edges
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentNeighbours {
    /// Height at `start_x` from the segment ending there
    pub before: Option<f64>,
    /// Height at `start_x + width` from the segment starting there
    pub after: Option<f64>,
}

/// Samples segment profiles and turns them into collaborator objects
#[derive(Debug, Clone)]
pub struct SegmentBuilder {
    config: TerrainConfig,
    shapes: ShapeGenerator,
    seed: u32,
}

impl SegmentBuilder {
    pub fn new(seed: u32, config: &TerrainConfig) -> Self {
        Self {
            shapes: ShapeGenerator::new(
                PositionalNoise::new(seed),
                config.transition_fraction,
                config.plateau_transition_fraction,
            ),
            config: config.clone(),
            seed,
        }
    }

    pub fn shapes(&self) -> &ShapeGenerator {
        &self.shapes
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Index of the segment owning `x`, or `None` when `x` is not finite,
    /// lies before the origin or beyond the streamable range
    pub fn checked_index_for(&self, x: f64) -> Option<i64> {
        let index = (x / self.config.segment_width).floor();
        if index.is_finite() && index >= 0.0 && index <= MAX_SEGMENT_INDEX as f64 {
            Some(index as i64)
        } else {
            None
        }
    }

    pub fn start_for(&self, index: i64) -> f64 {
        index as f64 * self.config.segment_width
    }

    /// Pick the segment's type and sample its profile.
    ///
    /// Draws exactly once from `rng`. Creates no collaborator objects.
    pub fn generate(&self, index: i64, rng: &mut TerrainRng, neighbours: SegmentNeighbours) -> Segment {
        let width = self.config.segment_width;
        let start_x = self.start_for(index);
        let difficulty = difficulty_at(start_x, self.config.difficulty_range);
        let chunk_type = select_chunk_type(rng, difficulty);

        let mut ctx = ShapeContext::new(start_x, start_x + width, difficulty);
        ctx.start_height = neighbours.before;
        let spacing = self.config.sample_spacing();
        let gap = (chunk_type == ChunkType::Gap).then(|| self.shapes.gap_window(&ctx, spacing));

        let mut heights = self.sample_heights(chunk_type, &mut ctx, gap);
        self.stitch(&mut heights, neighbours);
        smooth(&mut heights, SMOOTHING_RADIUS);

        let points = heights
            .iter()
            .enumerate()
            .map(|(i, height)| SamplePoint {
                x: start_x + i as f64 * spacing,
                y: height.unwrap_or(VOID_Y),
                height: *height,
            })
            .collect();

        Segment {
            index,
            start_x,
            width,
            chunk_type,
            difficulty,
            points,
            gap,
            mesh_handles: Vec::new(),
            body_handles: Vec::new(),
            decorations: Vec::new(),
            lod: LodLevel::High,
            bodies_sleeping: false,
        }
    }

    /// Create meshes, collision bodies and decorations for `segment`.
    ///
    /// Each sub-step stops at its first failure but keeps the handles it has
    /// already created, so the segment can still be released cleanly.
    pub fn materialize<P, R>(
        &self,
        segment: &mut Segment,
        physics: &mut P,
        renderer: &mut R,
        pools: &mut DecorationPools,
    ) -> BuildReport
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        let mut report = BuildReport::new(segment.index, segment.start_x, segment.chunk_type);

        report.record("surface_mesh", self.build_surface(segment, renderer));
        report.record("collision", self.build_collision(segment, physics));
        report.record("decorations", self.build_decorations(segment, renderer, pools));

        log::debug!(
            "[SegmentBuilder] Built segment {} ({}) at x={} with {} handles",
            segment.index,
            segment.chunk_type,
            segment.start_x,
            segment.handle_count()
        );
        report
    }

    /// `generate` followed by `materialize`
    pub fn build<P, R>(
        &self,
        index: i64,
        rng: &mut TerrainRng,
        neighbours: SegmentNeighbours,
        physics: &mut P,
        renderer: &mut R,
        pools: &mut DecorationPools,
    ) -> (Segment, BuildReport)
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        let mut segment = self.generate(index, rng, neighbours);
        let report = self.materialize(&mut segment, physics, renderer, pools);
        (segment, report)
    }

    fn sample_heights(
        &self,
        chunk_type: ChunkType,
        ctx: &mut ShapeContext,
        gap: Option<GapWindow>,
    ) -> Vec<Option<f64>> {
        let count = self.config.samples_per_segment;
        let spacing = self.config.sample_spacing();
        let mut heights = Vec::with_capacity(count + 1);

        ctx.previous = ctx.start_height.map(|h| (ctx.segment_start - spacing, h));
        for i in 0..=count {
            let x = ctx.segment_start + i as f64 * spacing;
            let height = match chunk_type {
                ChunkType::Gap => self.shapes.gap(x, ctx, gap),
                other => self.shapes.height(other, x, ctx),
            };
            if let Some(h) = height {
                ctx.previous = Some((x, h));
            }
            heights.push(height);
        }
        heights
    }

    /// Pin the seam samples to the neighbours' heights and ease into them
    fn stitch(&self, heights: &mut [Option<f64>], neighbours: SegmentNeighbours) {
        let Some(last) = heights.len().checked_sub(1) else {
            return;
        };
        let blend_samples = self.config.join_blend_samples.min(last / 2);
        let denominator = (blend_samples + 1) as f64;

        if let Some(join) = neighbours.before {
            heights[0] = Some(join);
            for i in 1..=blend_samples {
                if let Some(h) = heights[i] {
                    heights[i] = Some(blend(i as f64 / denominator, join, h, Easing::Quintic));
                }
            }
        }

        if let Some(join) = neighbours.after {
            heights[last] = Some(join);
            for i in 1..=blend_samples {
                if let Some(h) = heights[last - i] {
                    heights[last - i] = Some(blend(i as f64 / denominator, join, h, Easing::Quintic));
                }
            }
        }
    }

    fn build_surface<R: RenderBackend>(&self, segment: &mut Segment, renderer: &mut R) -> TerrainResult<usize> {
        let profiles = surface_profiles(segment, &self.config);
        for profile in &profiles {
            let handle = renderer.create_extruded_surface_mesh(profile)?;
            segment.mesh_handles.push(handle);
            renderer.attach(handle)?;
        }
        Ok(profiles.len())
    }

    fn build_collision<P: PhysicsBackend>(&self, segment: &mut Segment, physics: &mut P) -> TerrainResult<usize> {
        let boxes = collision_boxes(segment, &self.config);
        for shape in &boxes {
            let handle = physics.create_static_box(*shape)?;
            segment.body_handles.push(handle);
        }
        Ok(boxes.len())
    }

    fn build_decorations<R: RenderBackend>(
        &self,
        segment: &mut Segment,
        renderer: &mut R,
        pools: &mut DecorationPools,
    ) -> TerrainResult<usize> {
        let plans = plan_decorations(segment, &self.config, self.seed);
        for plan in &plans {
            let placed = pools.instantiate(plan, renderer)?;
            segment.decorations.push(placed);
        }
        Ok(plans.len())
    }
}

/// Triangular-window smoothing over runs of ground samples.
///
/// Windows touching a void sample are skipped and the first and last
/// `radius` samples are never moved, so seams and gap lips stay put.
fn smooth(heights: &mut [Option<f64>], radius: usize) {
    if radius == 0 || heights.len() < 2 * radius + 1 {
        return;
    }
    let source = heights.to_vec();
    let weight_sum = ((radius + 1) * (radius + 1)) as f64;

    for i in radius..heights.len() - radius {
        let window = &source[i - radius..=i + radius];
        let mut total = 0.0;
        let mut complete = true;
        for (k, sample) in window.iter().enumerate() {
            match sample {
                Some(h) => total += h * (radius + 1 - k.abs_diff(radius)) as f64,
                None => {
                    complete = false;
                    break;
                }
            }
        }
        if complete {
            heights[i] = Some(total / weight_sum);
        }
    }
}
