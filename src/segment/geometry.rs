//! Surface profiles and collision layout for a sampled segment

use std::ops::Range;

use glam::{Vec2, Vec3};

use crate::config::TerrainConfig;
use crate::constants::physics::{
    FALL_FLOOR_MARGIN, FALL_FLOOR_Y, GROUND_THICKNESS, MINOR_SLOPE_EPSILON, RAIL_HEIGHT,
    RAIL_THICKNESS,
};
use crate::constants::render::{BORDER_DEPTH, SKIRT_DEPTH};
use crate::physics::StaticBox;
use crate::render::{ExtrudedProfile, ProfileVertex, SurfaceMaterial};

use super::{SamplePoint, Segment};

/// Index ranges of consecutive ground samples, at least two samples long
pub fn ground_runs(points: &[SamplePoint]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, point) in points.iter().enumerate() {
        match (point.is_ground(), run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                if i - start >= 2 {
                    runs.push(start..i);
                }
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        if points.len() - start >= 2 {
            runs.push(start..points.len());
        }
    }
    runs
}

/// Lateral offset of a band's center line
fn band_offset(material: SurfaceMaterial, segment_depth: f64) -> f64 {
    let border = (segment_depth + BORDER_DEPTH) * 0.5;
    match material {
        SurfaceMaterial::Center => 0.0,
        SurfaceMaterial::NearBorder => border,
        SurfaceMaterial::FarBorder => -border,
    }
}

/// Half of the full lateral extent covered by ground (center band plus borders)
fn ground_half_depth(segment_depth: f64) -> f32 {
    (segment_depth * 0.5 + BORDER_DEPTH) as f32
}

/// Three extruded strips per ground run: the driving band and two borders
pub fn surface_profiles(segment: &Segment, config: &TerrainConfig) -> Vec<ExtrudedProfile> {
    let mut profiles = Vec::new();

    for run in ground_runs(&segment.points) {
        let samples = &segment.points[run];
        let bottom = samples
            .iter()
            .filter_map(|p| p.height)
            .fold(f64::INFINITY, f64::min)
            - SKIRT_DEPTH;

        let mut outline: Vec<ProfileVertex> = samples
            .iter()
            .filter_map(|p| p.height.map(|h| ProfileVertex::new(p.x, h)))
            .collect();
        let (first_x, last_x) = (samples[0].x, samples[samples.len() - 1].x);
        outline.push(ProfileVertex::new(last_x, bottom));
        outline.push(ProfileVertex::new(first_x, bottom));

        for material in SurfaceMaterial::ALL {
            let depth = match material {
                SurfaceMaterial::Center => config.segment_depth,
                _ => BORDER_DEPTH,
            };
            profiles.push(ExtrudedProfile {
                points: outline.clone(),
                depth: depth as f32,
                z_offset: band_offset(material, config.segment_depth) as f32,
                material,
            });
        }
    }
    profiles
}

/// Box whose top face runs along the chord `a -> b`
fn chord_box(a: Vec2, b: Vec2, half_depth: f32) -> StaticBox {
    let d = b - a;
    let angle = d.y.atan2(d.x);
    let normal = Vec2::new(-angle.sin(), angle.cos());
    let center = (a + b) * 0.5 - normal * (GROUND_THICKNESS * 0.5);
    StaticBox::rotated_z(
        Vec3::new(center.x, center.y, 0.0),
        Vec3::new(d.length() * 0.5, GROUND_THICKNESS * 0.5, half_depth),
        angle,
    )
}

fn slope(a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    d.y.atan2(d.x)
}

/// Chords over one ground run, strided and optionally merged
fn run_chords(samples: &[SamplePoint], step: usize, merge_minor: bool) -> Vec<(Vec2, Vec2)> {
    let point = |p: &SamplePoint| Vec2::new(p.x as f32, p.y as f32);
    let last = samples.len() - 1;

    let mut chords = Vec::new();
    let mut i = 0;
    while i < last {
        let j = (i + step).min(last);
        chords.push((point(&samples[i]), point(&samples[j])));
        i = j;
    }

    if !merge_minor {
        return chords;
    }

    let mut merged: Vec<(Vec2, Vec2)> = Vec::with_capacity(chords.len());
    for (a, b) in chords {
        match merged.last_mut() {
            Some(current) if (slope(current.0, current.1) - slope(a, b)).abs() < MINOR_SLOPE_EPSILON => {
                current.1 = b;
            }
            _ => merged.push((a, b)),
        }
    }
    merged
}

/// Static colliders for a segment: surface chords, perimeter rails and,
/// for gaps, a floor that bounds the fall.
pub fn collision_boxes(segment: &Segment, config: &TerrainConfig) -> Vec<StaticBox> {
    let simplification = &config.physics_simplification;
    let step = simplification.segment_step.max(1);
    let half_depth = ground_half_depth(config.segment_depth);
    let mut boxes = Vec::new();

    for run in ground_runs(&segment.points) {
        for (a, b) in run_chords(&segment.points[run], step, simplification.skip_minor_segments) {
            boxes.push(chord_box(a, b, half_depth));
        }
    }

    let (min_y, max_y) = segment
        .points
        .iter()
        .filter_map(|p| p.height)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| (lo.min(h), hi.max(h)));

    if min_y <= max_y {
        let half_height = ((max_y - min_y) * 0.5) as f32 + RAIL_HEIGHT * 0.5 + GROUND_THICKNESS;
        let center_y = ((min_y + max_y) * 0.5) as f32 + RAIL_HEIGHT * 0.5;
        let rail_z = half_depth + RAIL_THICKNESS * 0.5;
        for side in [1.0f32, -1.0] {
            boxes.push(StaticBox::axis_aligned(
                Vec3::new(segment.center_x() as f32, center_y, side * rail_z),
                Vec3::new(segment.width as f32 * 0.5, half_height, RAIL_THICKNESS * 0.5),
            ));
        }
    }

    if let Some(gap) = segment.gap {
        let center_x = ((gap.start + gap.end) * 0.5) as f32;
        boxes.push(StaticBox::axis_aligned(
            Vec3::new(center_x, FALL_FLOOR_Y, 0.0),
            Vec3::new(
                gap.width() as f32 * 0.5 + FALL_FLOOR_MARGIN,
                GROUND_THICKNESS * 0.5,
                half_depth,
            ),
        ));
    }

    boxes
}
