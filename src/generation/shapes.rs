//! Terrain-shape generators.
//!
//! Each generator maps a position inside a segment and the segment's
//! difficulty to a height, or `None` for "no terrain" inside a gap. All of
//! them meet the underlying hills profile at the segment end and ease in from
//! the neighbour's known boundary height at the segment start.

use std::f64::consts::{PI, TAU};

use super::chunk_type::ChunkType;
use super::interpolation::{bezier_cubic, blend, quintic_ease, Easing};
use super::noise::PositionalNoise;
use crate::constants::shapes::*;

/// Tolerance used when comparing sample positions against gap edges
const EDGE_EPSILON: f64 = 1e-6;

/// Everything a generator needs besides `x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeContext {
    pub segment_start: f64,
    pub segment_end: f64,
    pub difficulty: f64,
    /// Known height of the neighbouring terrain at `segment_start`
    pub start_height: Option<f64>,
    /// Most recently generated nearby sample as `(x, height)`
    pub previous: Option<(f64, f64)>,
}

impl ShapeContext {
    pub fn new(segment_start: f64, segment_end: f64, difficulty: f64) -> Self {
        Self {
            segment_start,
            segment_end,
            difficulty,
            start_height: None,
            previous: None,
        }
    }

    pub fn width(&self) -> f64 {
        self.segment_end - self.segment_start
    }

    pub fn center(&self) -> f64 {
        (self.segment_start + self.segment_end) * 0.5
    }
}

/// Void window of a gap segment, snapped to the sample grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapWindow {
    pub start: f64,
    pub end: f64,
}

impl GapWindow {
    /// True when `x` lies strictly between the edges
    pub fn contains_strict(&self, x: f64) -> bool {
        x > self.start + EDGE_EPSILON && x < self.end - EDGE_EPSILON
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// `min + gain * difficulty`, capped at `max`
#[inline]
fn scaled(min: f64, gain: f64, max: f64, difficulty: f64) -> f64 {
    (min + gain * difficulty).min(max)
}

/// The six shape generators over one positional noise source
#[derive(Debug, Clone)]
pub struct ShapeGenerator {
    noise: PositionalNoise,
    transition_fraction: f64,
    plateau_transition_fraction: f64,
}

impl ShapeGenerator {
    pub fn new(noise: PositionalNoise, transition_fraction: f64, plateau_transition_fraction: f64) -> Self {
        Self {
            noise,
            transition_fraction,
            plateau_transition_fraction,
        }
    }

    pub fn noise(&self) -> &PositionalNoise {
        &self.noise
    }

    /// Height for `chunk_type` at `x`
    pub fn height(&self, chunk_type: ChunkType, x: f64, ctx: &ShapeContext) -> Option<f64> {
        match chunk_type {
            ChunkType::Hills => Some(self.hills(x, ctx)),
            ChunkType::Plateau => Some(self.plateau(x, ctx)),
            ChunkType::Ramp => Some(self.ramp(x, ctx)),
            ChunkType::Gap => self.gap(x, ctx, None),
            ChunkType::Washboard => Some(self.washboard(x, ctx)),
            ChunkType::Valley => Some(self.valley(x, ctx)),
        }
    }

    /// Unclamped rolling profile every other shape is laid over
    pub fn base_height(&self, x: f64, difficulty: f64) -> f64 {
        let amplitude = HILLS_BASE_AMPLITUDE
            + (difficulty * HILLS_AMPLITUDE_GAIN).min(HILLS_MAX_EXTRA_AMPLITUDE);
        let n = self.noise.fractal_noise(
            x,
            HILLS_FREQUENCY,
            HILLS_OCTAVES,
            HILLS_PERSISTENCE,
            HILLS_LACUNARITY,
        );
        BASE_HEIGHT + n * amplitude
    }

    pub fn hills(&self, x: f64, ctx: &ShapeContext) -> f64 {
        let raw = self.base_height(x, ctx.difficulty);

        let limited = match ctx.previous {
            Some((prev_x, prev_h)) => {
                let dx = (x - prev_x).abs().max(EDGE_EPSILON);
                let limit = HILLS_MAX_SLOPE * dx;
                let delta = raw - prev_h;
                if delta.abs() <= limit {
                    raw
                } else {
                    let excess = ((delta.abs() - limit) / limit).min(1.0);
                    let magnitude = limit * (1.0 + HILLS_SOFT_MARGIN * quintic_ease(excess));
                    prev_h + magnitude.copysign(delta)
                }
            }
            None => raw,
        };

        let transition = self.transition_fraction * ctx.width();
        let eased_end = if x > ctx.segment_end - transition {
            let t = ((ctx.segment_end - x) / transition).clamp(0.0, 1.0);
            blend(t, raw, limited, Easing::Quintic)
        } else {
            limited
        };

        self.stitch_start(x, eased_end, ctx)
    }

    pub fn plateau(&self, x: f64, ctx: &ShapeContext) -> f64 {
        let lift = scaled(PLATEAU_BASE_LIFT, PLATEAU_LIFT_GAIN, PLATEAU_MAX_LIFT, ctx.difficulty);
        let level = self.base_height(ctx.center(), ctx.difficulty) + lift;
        let ripple = PLATEAU_RIPPLE * (x * 0.8).sin()
            + 0.5 * PLATEAU_RIPPLE * self.noise.smooth_noise_1d(x * 0.5 + 300.0);
        let flat = level + ripple;

        let transition = self.plateau_transition_fraction * ctx.width();
        let into = x - ctx.segment_start;
        let out_of = ctx.segment_end - x;

        if into < transition {
            let edge = ctx
                .start_height
                .unwrap_or_else(|| self.base_height(x, ctx.difficulty));
            blend((into / transition).max(0.0), edge, flat, Easing::Quintic)
        } else if out_of < transition {
            let edge = self.base_height(x, ctx.difficulty);
            blend((out_of / transition).max(0.0), edge, flat, Easing::Quintic)
        } else {
            flat
        }
    }

    pub fn ramp(&self, x: f64, ctx: &ShapeContext) -> f64 {
        let base = self.base_height(x, ctx.difficulty);
        let apex = scaled(RAMP_MIN_APEX, RAMP_APEX_GAIN, RAMP_MAX_APEX, ctx.difficulty);

        let zone_width = ctx.width() * RAMP_ZONE_FRACTION;
        let zone_start = ctx.center() - zone_width * 0.5;
        let zone_end = zone_start + zone_width;
        let apex_x = zone_start + zone_width * RAMP_APEX_POSITION;

        let lift = if x <= zone_start || x >= zone_end {
            0.0
        } else if x <= apex_x {
            let t = (x - zone_start) / (apex_x - zone_start);
            bezier_cubic(t, 0.0, 0.0, apex, apex)
        } else {
            let t = (zone_end - x) / (zone_end - apex_x);
            bezier_cubic(t, 0.0, 0.0, apex, apex)
        };

        self.stitch_start(x, base + lift, ctx)
    }

    /// Void window for a gap segment on a grid of `spacing`
    pub fn gap_window(&self, ctx: &ShapeContext, spacing: f64) -> GapWindow {
        let width = scaled(GAP_MIN_WIDTH, GAP_WIDTH_GAIN, GAP_MAX_WIDTH, ctx.difficulty);
        let center = ctx.center();
        let first = ((center - width * 0.5 - ctx.segment_start) / spacing).ceil();
        let last = ((center + width * 0.5 - ctx.segment_start) / spacing).floor();
        GapWindow {
            start: ctx.segment_start + first * spacing,
            end: ctx.segment_start + last.max(first) * spacing,
        }
    }

    /// `None` strictly inside the void, lips dipping to the pit depth around it.
    ///
    /// Pass the grid-snapped window when sampling a segment; without one the
    /// unsnapped window is used.
    pub fn gap(&self, x: f64, ctx: &ShapeContext, window: Option<GapWindow>) -> Option<f64> {
        let window = window.unwrap_or_else(|| {
            let width = scaled(GAP_MIN_WIDTH, GAP_WIDTH_GAIN, GAP_MAX_WIDTH, ctx.difficulty);
            GapWindow {
                start: ctx.center() - width * 0.5,
                end: ctx.center() + width * 0.5,
            }
        });

        if window.contains_strict(x) {
            return None;
        }

        let base = self.base_height(x, ctx.difficulty);
        let dip = if x <= window.start + EDGE_EPSILON && x > window.start - GAP_EDGE_LENGTH {
            let t = (x - (window.start - GAP_EDGE_LENGTH)) / GAP_EDGE_LENGTH;
            GAP_PIT_DEPTH * quintic_ease(t.clamp(0.0, 1.0))
        } else if x >= window.end - EDGE_EPSILON && x < window.end + GAP_EDGE_LENGTH {
            let t = ((window.end + GAP_EDGE_LENGTH) - x) / GAP_EDGE_LENGTH;
            GAP_PIT_DEPTH * quintic_ease(t.clamp(0.0, 1.0))
        } else {
            0.0
        };

        Some(self.stitch_start(x, base - dip, ctx))
    }

    pub fn washboard(&self, x: f64, ctx: &ShapeContext) -> f64 {
        let base = self.base_height(x, ctx.difficulty);
        let transition = self.transition_fraction * ctx.width();
        let zone_start = ctx.segment_start + transition;
        let zone_end = ctx.segment_end - transition;

        let ripple = if x > zone_start && x < zone_end {
            let fade = WASHBOARD_FADE_FRACTION * ctx.width();
            let fade_in = quintic_ease(((x - zone_start) / fade).min(1.0));
            let fade_out = quintic_ease(((zone_end - x) / fade).min(1.0));
            let u = (x - zone_start) / (zone_end - zone_start);
            let amplitude = scaled(
                WASHBOARD_MIN_AMPLITUDE,
                WASHBOARD_AMPLITUDE_GAIN,
                WASHBOARD_MAX_AMPLITUDE,
                ctx.difficulty,
            ) * (-WASHBOARD_DAMPING * u).exp();
            let phase = TAU * x / WASHBOARD_WAVELENGTH;
            fade_in * fade_out * amplitude * (phase.sin() + WASHBOARD_HARMONIC * (2.0 * phase).sin())
        } else {
            0.0
        };

        self.stitch_start(x, base + ripple, ctx)
    }

    pub fn valley(&self, x: f64, ctx: &ShapeContext) -> f64 {
        let base = self.base_height(x, ctx.difficulty);
        let transition = self.transition_fraction * ctx.width();
        let zone_start = ctx.segment_start + transition;
        let zone_end = ctx.segment_end - transition;

        let depression = if x > zone_start && x < zone_end {
            let u = (x - zone_start) / (zone_end - zone_start);
            let depth = scaled(VALLEY_MIN_DEPTH, VALLEY_DEPTH_GAIN, VALLEY_MAX_DEPTH, ctx.difficulty);
            let bowl = depth * (1.0 - (TAU * u).cos()) * 0.5;
            let irregular = VALLEY_IRREGULARITY
                * self.noise.smooth_noise_1d(x * 0.3 + 500.0)
                * (PI * u).sin();
            bowl - irregular
        } else {
            0.0
        };

        self.stitch_start(x, base - depression, ctx)
    }

    /// Read-only approximation for positions no segment covers.
    ///
    /// Walks the hills generator over a short span ending at `x` at a low
    /// fixed difficulty. Touches no RNG and persists nothing.
    pub fn fallback_height(&self, x: f64, spacing: f64) -> f64 {
        let half_span = FALLBACK_HALF_SPAN as f64 * spacing;
        let mut ctx = ShapeContext::new(x - half_span, x + half_span, FALLBACK_DIFFICULTY);
        let mut height = self.hills(ctx.segment_start, &ctx);
        for i in 1..=FALLBACK_HALF_SPAN {
            let sample_x = ctx.segment_start + i as f64 * spacing;
            ctx.previous = Some((sample_x - spacing, height));
            height = self.hills(sample_x, &ctx);
        }
        height
    }

    fn stitch_start(&self, x: f64, height: f64, ctx: &ShapeContext) -> f64 {
        let Some(start_height) = ctx.start_height else {
            return height;
        };
        let transition = self.transition_fraction * ctx.width();
        let into = x - ctx.segment_start;
        if into < transition {
            blend((into / transition).max(0.0), start_height, height, Easing::Quintic)
        } else {
            height
        }
    }
}
