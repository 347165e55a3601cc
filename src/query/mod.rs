//! Height queries
//!
//! `height_at` is the gameplay query: ground height, `None` over a void, and
//! a read-only approximation where nothing has been built. `height_near` only
//! reports what built segments actually know.

use crate::generation::ShapeGenerator;
use crate::segment::SurfaceSample;
use crate::streaming::SegmentStore;

/// Anything that can answer terrain height queries
pub trait HeightProvider {
    /// Walkable height at `x`, `None` inside a gap
    fn height_at(&self, x: f64) -> Option<f64>;

    /// What built terrain knows at `x`, inclusive of segment end seams.
    /// `None` when no built segment touches `x`.
    fn height_near(&self, x: f64) -> Option<SurfaceSample>;
}

/// Read-only view over the active segments
#[derive(Debug, Clone, Copy)]
pub struct HeightQuery<'a> {
    store: &'a SegmentStore,
    shapes: &'a ShapeGenerator,
    spacing: f64,
}

impl<'a> HeightQuery<'a> {
    pub fn new(store: &'a SegmentStore, shapes: &'a ShapeGenerator, spacing: f64) -> Self {
        Self {
            store,
            shapes,
            spacing,
        }
    }
}

impl HeightProvider for HeightQuery<'_> {
    fn height_at(&self, x: f64) -> Option<f64> {
        if !x.is_finite() {
            return None;
        }
        match self.store.covering(x) {
            Some(segment) => segment.surface_at(x).and_then(|s| s.height()),
            None => Some(self.shapes.fallback_height(x, self.spacing)),
        }
    }

    fn height_near(&self, x: f64) -> Option<SurfaceSample> {
        if !x.is_finite() {
            return None;
        }
        self.store.touching(x).and_then(|segment| segment.surface_at(x))
    }
}
