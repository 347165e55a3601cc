//! Terrain segments
//!
//! A segment owns a fixed-width slice of the track: its sampled profile and
//! the collaborator handles built from it. Ownership of `x` is half-open,
//! `[start_x, start_x + width)`, but the sample array includes the end point
//! so the seam height is shared with the next segment.

pub mod builder;
pub mod decoration;
pub mod geometry;

pub use builder::{SegmentBuilder, SegmentNeighbours};
pub use decoration::{plan_decorations, DecorationPlan, DecorationPools, PlacedDecoration};
pub use geometry::{collision_boxes, ground_runs, surface_profiles};

use crate::error::{TerrainError, TerrainResult};
use crate::generation::{blend, ChunkType, Easing, GapWindow};
use crate::physics::{BodyHandle, PhysicsBackend};
use crate::render::{MeshHandle, RenderBackend};
use crate::streaming::LodLevel;

/// Offsets below this are treated as landing exactly on a sample
const SAMPLE_EPSILON: f64 = 1e-9;

/// One sampled point on a segment profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    /// Renderable height; a sentinel far below the track for void samples
    pub y: f64,
    /// Walkable height, `None` inside a gap
    pub height: Option<f64>,
}

impl SamplePoint {
    pub fn is_ground(&self) -> bool {
        self.height.is_some()
    }
}

/// What lies at a known position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceSample {
    Ground(f64),
    Void,
}

impl SurfaceSample {
    pub fn height(&self) -> Option<f64> {
        match self {
            SurfaceSample::Ground(h) => Some(*h),
            SurfaceSample::Void => None,
        }
    }

    fn from_height(height: Option<f64>) -> Self {
        height.map_or(SurfaceSample::Void, SurfaceSample::Ground)
    }
}

/// A generated slice of terrain and its collaborator handles
#[derive(Debug, Clone)]
pub struct Segment {
    pub index: i64,
    pub start_x: f64,
    pub width: f64,
    pub chunk_type: ChunkType,
    pub difficulty: f64,
    pub points: Vec<SamplePoint>,
    pub gap: Option<GapWindow>,
    pub mesh_handles: Vec<MeshHandle>,
    pub body_handles: Vec<BodyHandle>,
    pub decorations: Vec<PlacedDecoration>,
    pub lod: LodLevel,
    pub bodies_sleeping: bool,
}

impl Segment {
    pub fn end_x(&self) -> f64 {
        self.start_x + self.width
    }

    pub fn center_x(&self) -> f64 {
        self.start_x + self.width * 0.5
    }

    pub fn spacing(&self) -> f64 {
        self.width / (self.points.len().saturating_sub(1)).max(1) as f64
    }

    /// Half-open ownership test
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start_x && x < self.end_x()
    }

    /// Closed range test, including the shared end seam
    pub fn touches(&self, x: f64) -> bool {
        x >= self.start_x && x <= self.end_x()
    }

    pub fn first_height(&self) -> Option<f64> {
        self.points.first().and_then(|p| p.height)
    }

    pub fn last_height(&self) -> Option<f64> {
        self.points.last().and_then(|p| p.height)
    }

    pub fn has_void(&self) -> bool {
        self.points.iter().any(|p| p.height.is_none())
    }

    /// Surface at `x`, or `None` when `x` is outside `[start_x, end_x]`.
    ///
    /// Exact sample hits return that sample. Between samples the heights are
    /// cubic-eased, unless either neighbour is void.
    pub fn surface_at(&self, x: f64) -> Option<SurfaceSample> {
        if !self.touches(x) || self.points.is_empty() {
            return None;
        }
        let last = self.points.len() - 1;
        let f = (x - self.start_x) / self.spacing();
        let i0 = (f.floor().max(0.0) as usize).min(last);
        let frac = f - i0 as f64;

        if i0 == last || frac < SAMPLE_EPSILON {
            return Some(SurfaceSample::from_height(self.points[i0].height));
        }
        if 1.0 - frac < SAMPLE_EPSILON {
            return Some(SurfaceSample::from_height(self.points[i0 + 1].height));
        }

        match (self.points[i0].height, self.points[i0 + 1].height) {
            (Some(y0), Some(y1)) => Some(SurfaceSample::Ground(blend(frac, y0, y1, Easing::Cubic))),
            _ => Some(SurfaceSample::Void),
        }
    }

    /// Number of collaborator objects this segment still holds
    pub fn handle_count(&self) -> usize {
        self.mesh_handles.len() + self.body_handles.len() + self.decorations.len()
    }

    /// Release every collaborator handle.
    ///
    /// Keeps going after a failed call so one bad handle cannot leak the
    /// rest; the first error is returned once everything has been attempted.
    pub fn release<P, R>(
        &mut self,
        physics: &mut P,
        renderer: &mut R,
        pools: &mut DecorationPools,
    ) -> TerrainResult<usize>
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        let mut first_error: Option<TerrainError> = None;
        let mut released = 0;
        let mut note = |result: TerrainResult<()>| match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[Segment] Release failed: {}", e);
                first_error.get_or_insert(e);
                false
            }
        };

        for handle in self.mesh_handles.drain(..) {
            note(renderer.detach(handle));
            if note(renderer.dispose_mesh(handle)) {
                released += 1;
            }
        }
        for handle in self.body_handles.drain(..) {
            if note(physics.remove_body(handle)) {
                released += 1;
            }
        }
        for placed in self.decorations.drain(..) {
            if note(pools.recycle(placed, renderer)) {
                released += 1;
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(released),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment_with(heights: &[Option<f64>]) -> Segment {
        let spacing = 0.5;
        let points = heights
            .iter()
            .enumerate()
            .map(|(i, h)| SamplePoint {
                x: i as f64 * spacing,
                y: h.unwrap_or(-1000.0),
                height: *h,
            })
            .collect::<Vec<_>>();
        Segment {
            index: 0,
            start_x: 0.0,
            width: spacing * (heights.len() - 1) as f64,
            chunk_type: ChunkType::Gap,
            difficulty: 0.5,
            points,
            gap: None,
            mesh_handles: Vec::new(),
            body_handles: Vec::new(),
            decorations: Vec::new(),
            lod: LodLevel::High,
            bodies_sleeping: false,
        }
    }

    #[test]
    fn test_exact_sample_hits() {
        let segment = segment_with(&[Some(1.0), Some(2.0), None, Some(4.0)]);
        assert_eq!(segment.surface_at(0.5), Some(SurfaceSample::Ground(2.0)));
        assert_eq!(segment.surface_at(1.0), Some(SurfaceSample::Void));
        assert_eq!(segment.surface_at(1.5), Some(SurfaceSample::Ground(4.0)));
    }

    #[test]
    fn test_interpolation_between_samples() {
        let segment = segment_with(&[Some(0.0), Some(2.0), Some(2.0)]);
        let mid = segment.surface_at(0.25).and_then(|s| s.height()).unwrap();
        assert!((mid - 1.0).abs() < 1e-12);
        let eased = segment.surface_at(0.125).and_then(|s| s.height()).unwrap();
        assert!(eased < 0.5);
    }

    #[test]
    fn test_void_neighbour_makes_interval_void() {
        let segment = segment_with(&[Some(1.0), Some(2.0), None, Some(4.0)]);
        assert_eq!(segment.surface_at(0.75), Some(SurfaceSample::Void));
        assert_eq!(segment.surface_at(1.25), Some(SurfaceSample::Void));
        assert!(matches!(segment.surface_at(0.25), Some(SurfaceSample::Ground(_))));
    }

    #[test]
    fn test_ownership_is_half_open() {
        let segment = segment_with(&[Some(1.0), Some(2.0), Some(3.0)]);
        assert!(segment.contains(0.0));
        assert!(!segment.contains(1.0));
        assert!(segment.touches(1.0));
        assert_eq!(segment.surface_at(1.0), Some(SurfaceSample::Ground(3.0)));
        assert_eq!(segment.surface_at(1.01), None);
        assert_eq!(segment.surface_at(-0.01), None);
    }
}
