use serde::Serialize;

use crate::config::LodDistances;
use crate::error::{TerrainError, TerrainResult};
use crate::physics::PhysicsBackend;
use crate::render::{DecorationKind, MeshDetail, RenderBackend};
use crate::segment::Segment;

/// Level of detail applied to a built segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LodLevel {
    /// Full detail
    High,
    /// No shadow casting; bodies behind the tracked position may sleep
    Medium,
    /// Additionally hides every decoration except signs
    Low,
}

impl LodLevel {
    /// Level for a segment whose center is `distance` from the tracked position
    pub fn for_distance(distance: f64, distances: &LodDistances) -> Self {
        if distance > distances.low {
            LodLevel::Low
        } else if distance > distances.medium {
            LodLevel::Medium
        } else {
            LodLevel::High
        }
    }

    pub fn mesh_detail(self) -> MeshDetail {
        match self {
            LodLevel::High => MeshDetail::FULL,
            LodLevel::Medium => MeshDetail {
                cast_shadows: false,
                receive_shadows: true,
                wireframe: false,
            },
            LodLevel::Low => MeshDetail {
                cast_shadows: false,
                receive_shadows: false,
                wireframe: false,
            },
        }
    }

    pub fn shows(self, kind: DecorationKind) -> bool {
        self != LodLevel::Low || kind == DecorationKind::Sign
    }
}

/// Whether the segment's bodies should be asleep after this tick.
///
/// Bodies go to sleep beyond the medium distance, but only behind the
/// tracked position, and wake again inside the high distance or once the
/// segment is ahead. Between the two the current state is kept.
pub fn bodies_should_sleep(
    segment: &Segment,
    tracked_x: f64,
    distances: &LodDistances,
) -> bool {
    let distance = (segment.center_x() - tracked_x).abs();
    let behind = segment.end_x() <= tracked_x;

    if !behind || distance <= distances.high {
        false
    } else if distance > distances.medium {
        true
    } else {
        segment.bodies_sleeping
    }
}

/// Apply LOD policies to one segment.
///
/// Collaborator calls are only issued when the level or sleep state actually
/// changes. Returns how many calls were made.
pub fn apply_lod<P, R>(
    segment: &mut Segment,
    tracked_x: f64,
    distances: &LodDistances,
    physics: &mut P,
    renderer: &mut R,
) -> TerrainResult<usize>
where
    P: PhysicsBackend,
    R: RenderBackend,
{
    let mut calls = 0;
    let mut first_error: Option<TerrainError> = None;

    let level = LodLevel::for_distance((segment.center_x() - tracked_x).abs(), distances);
    if level != segment.lod {
        let detail = level.mesh_detail();
        for handle in &segment.mesh_handles {
            calls += 1;
            if let Err(e) = renderer.set_mesh_detail(*handle, detail) {
                first_error.get_or_insert(e);
            }
        }
        for placed in &segment.decorations {
            let visible = level.shows(placed.kind);
            if visible != segment.lod.shows(placed.kind) {
                calls += 1;
                if let Err(e) = renderer.set_decoration_visible(placed.handle, visible) {
                    first_error.get_or_insert(e);
                }
            }
        }
        log::trace!(
            "[LOD] Segment {} {:?} -> {:?}",
            segment.index,
            segment.lod,
            level
        );
        segment.lod = level;
    }

    let sleep = bodies_should_sleep(segment, tracked_x, distances);
    if sleep != segment.bodies_sleeping {
        for handle in &segment.body_handles {
            calls += 1;
            if let Err(e) = physics.set_body_sleeping(*handle, sleep) {
                first_error.get_or_insert(e);
            }
        }
        segment.bodies_sleeping = sleep;
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(calls),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        let distances = LodDistances::default();
        assert_eq!(LodLevel::for_distance(0.0, &distances), LodLevel::High);
        assert_eq!(LodLevel::for_distance(120.0, &distances), LodLevel::High);
        assert_eq!(LodLevel::for_distance(150.0, &distances), LodLevel::Medium);
        assert_eq!(LodLevel::for_distance(250.0, &distances), LodLevel::Low);
    }

    #[test]
    fn test_never_wireframe() {
        for level in [LodLevel::High, LodLevel::Medium, LodLevel::Low] {
            assert!(!level.mesh_detail().wireframe);
        }
        assert!(!LodLevel::Medium.mesh_detail().cast_shadows);
    }

    #[test]
    fn test_low_keeps_signs() {
        assert!(LodLevel::Low.shows(DecorationKind::Sign));
        assert!(!LodLevel::Low.shows(DecorationKind::Tree));
        assert!(LodLevel::Medium.shows(DecorationKind::Tree));
    }
}
