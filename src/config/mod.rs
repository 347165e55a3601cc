//! Terrain configuration
//!
//! Every tunable the generators, the streaming manager and the collision
//! layout read at runtime. Defaults come from `crate::constants`.

mod loader;

pub use loader::ConfigFormat;

use serde::{Deserialize, Serialize};

use crate::constants::{decoration, lod, physics, segment, shapes, streaming};
use crate::error::{invalid_config, TerrainResult};

/// Distance thresholds for level-of-detail policies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodDistances {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for LodDistances {
    fn default() -> Self {
        Self {
            high: lod::HIGH_DISTANCE,
            medium: lod::MEDIUM_DISTANCE,
            low: lod::LOW_DISTANCE,
        }
    }
}

/// Collision body reduction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSimplification {
    /// Stride between sample pairs that receive a collision box
    pub segment_step: usize,
    /// Merge nearly collinear neighbouring boxes
    pub skip_minor_segments: bool,
}

impl Default for PhysicsSimplification {
    fn default() -> Self {
        Self {
            segment_step: physics::SEGMENT_STEP,
            skip_minor_segments: true,
        }
    }
}

/// Decoration density per type, in items per 100 units of terrain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationDensity {
    pub tree: f64,
    pub rock: f64,
    pub bush: f64,
    pub sign: f64,
    /// Half-width of the central lane that stays clear
    pub lane_half_width: f64,
}

impl Default for DecorationDensity {
    fn default() -> Self {
        Self {
            tree: decoration::TREE_DENSITY,
            rock: decoration::ROCK_DENSITY,
            bush: decoration::BUSH_DENSITY,
            sign: decoration::SIGN_DENSITY,
            lane_half_width: decoration::LANE_HALF_WIDTH,
        }
    }
}

/// Main terrain configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub segment_width: f64,
    pub samples_per_segment: usize,
    pub segment_depth: f64,
    pub segments_ahead: usize,
    pub segments_behind: usize,
    pub difficulty_range: f64,
    pub transition_fraction: f64,
    pub plateau_transition_fraction: f64,
    pub join_blend_samples: usize,
    pub window_slack: usize,
    pub max_builds_per_tick: usize,
    pub batch_cooldown_ticks: u32,
    pub max_pending_batches: u32,
    pub lod_distances: LodDistances,
    pub physics_simplification: PhysicsSimplification,
    pub decoration_density: DecorationDensity,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            segment_width: segment::SEGMENT_WIDTH,
            samples_per_segment: segment::SAMPLES_PER_SEGMENT,
            segment_depth: segment::SEGMENT_DEPTH,
            segments_ahead: streaming::SEGMENTS_AHEAD,
            segments_behind: streaming::SEGMENTS_BEHIND,
            difficulty_range: segment::DIFFICULTY_RANGE,
            transition_fraction: shapes::TRANSITION_FRACTION,
            plateau_transition_fraction: shapes::PLATEAU_TRANSITION_FRACTION,
            join_blend_samples: segment::JOIN_BLEND_SAMPLES,
            window_slack: streaming::WINDOW_SLACK,
            max_builds_per_tick: streaming::MAX_BUILDS_PER_TICK,
            batch_cooldown_ticks: streaming::BATCH_COOLDOWN_TICKS,
            max_pending_batches: streaming::MAX_PENDING_BATCHES,
            lod_distances: LodDistances::default(),
            physics_simplification: PhysicsSimplification::default(),
            decoration_density: DecorationDensity::default(),
        }
    }
}

impl TerrainConfig {
    /// Long-view preset with a 15/15 window
    pub fn extended_view() -> Self {
        Self {
            segments_ahead: streaming::EXTENDED_SEGMENTS,
            segments_behind: streaming::EXTENDED_SEGMENTS,
            max_builds_per_tick: streaming::EXTENDED_SEGMENTS * 2 + 1,
            ..Self::default()
        }
    }

    /// Distance between neighbouring samples
    pub fn sample_spacing(&self) -> f64 {
        self.segment_width / self.samples_per_segment as f64
    }

    /// Upper bound on the active window after a completed tick
    pub fn window_capacity(&self) -> usize {
        self.segments_ahead + self.segments_behind + self.window_slack
    }

    /// Check every field for values the pipeline cannot work with
    pub fn validate(&self) -> TerrainResult<()> {
        if !(self.segment_width.is_finite() && self.segment_width > 0.0) {
            return Err(invalid_config("segment_width", "must be a positive finite number"));
        }
        if self.samples_per_segment < 2 * segment::SMOOTHING_RADIUS + 1 {
            return Err(invalid_config(
                "samples_per_segment",
                format!("must be at least {}", 2 * segment::SMOOTHING_RADIUS + 1),
            ));
        }
        if !(self.segment_depth.is_finite() && self.segment_depth > 0.0) {
            return Err(invalid_config("segment_depth", "must be a positive finite number"));
        }
        if !(self.difficulty_range.is_finite() && self.difficulty_range > 0.0) {
            return Err(invalid_config("difficulty_range", "must be a positive finite number"));
        }
        for (field, fraction) in [
            ("transition_fraction", self.transition_fraction),
            ("plateau_transition_fraction", self.plateau_transition_fraction),
        ] {
            if !(fraction > 0.0 && fraction < 0.5) {
                return Err(invalid_config(field, "must lie in (0, 0.5)"));
            }
        }
        if self.join_blend_samples >= self.samples_per_segment {
            return Err(invalid_config(
                "join_blend_samples",
                "must be smaller than samples_per_segment",
            ));
        }
        if self.max_builds_per_tick == 0 {
            return Err(invalid_config("max_builds_per_tick", "must be at least 1"));
        }
        let lod = &self.lod_distances;
        if !(lod.high > 0.0 && lod.high <= lod.medium && lod.medium <= lod.low) {
            return Err(invalid_config(
                "lod_distances",
                "expected 0 < high <= medium <= low",
            ));
        }
        if self.physics_simplification.segment_step == 0 {
            return Err(invalid_config("physics_simplification.segment_step", "must be at least 1"));
        }
        let density = &self.decoration_density;
        for (field, value) in [
            ("decoration_density.tree", density.tree),
            ("decoration_density.rock", density.rock),
            ("decoration_density.bush", density.bush),
            ("decoration_density.sign", density.sign),
            ("decoration_density.lane_half_width", density.lane_half_width),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid_config(field, "must be a non-negative finite number"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TerrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.segment_width, 40.0);
        assert_eq!(config.segments_ahead, 5);
        assert_eq!(config.segments_behind, 5);
        assert!((config.sample_spacing() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_extended_view_preset() {
        let config = TerrainConfig::extended_view();
        assert_eq!(config.segments_ahead, 15);
        assert_eq!(config.segments_behind, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_lod_order() {
        let mut config = TerrainConfig::default();
        config.lod_distances.medium = 500.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_step_and_width() {
        let mut config = TerrainConfig::default();
        config.physics_simplification.segment_step = 0;
        assert!(config.validate().is_err());

        let mut config = TerrainConfig::default();
        config.segment_width = 0.0;
        assert!(config.validate().is_err());

        let mut config = TerrainConfig::default();
        config.transition_fraction = 0.6;
        assert!(config.validate().is_err());
    }
}
