// Ridgeline Constants - SINGLE SOURCE OF TRUTH
//
// Default values for every tunable in the terrain pipeline. Runtime code reads
// these through `TerrainConfig`; only the defaults live here.
//
// Do NOT scatter numeric tuning constants through the generators.

/// Segment layout
pub mod segment {
    /// Width of one segment in world units
    pub const SEGMENT_WIDTH: f64 = 40.0;
    /// Sample intervals per segment (points = intervals + 1, spacing 0.5)
    pub const SAMPLES_PER_SEGMENT: usize = 80;
    /// Extrusion depth of the center driving band
    pub const SEGMENT_DEPTH: f64 = 12.0;
    /// Distance over which difficulty ramps from 0 to its cap
    pub const DIFFICULTY_RANGE: f64 = 4000.0;
    /// Difficulty never reaches 1.0
    pub const MAX_DIFFICULTY: f64 = 0.99;
    /// Samples after the seam that ease from the join height to the shape
    pub const JOIN_BLEND_SAMPLES: usize = 4;
    /// Half-width of the triangular smoothing window (window = 5)
    pub const SMOOTHING_RADIUS: usize = 2;
}

/// Terrain-shape tuning
pub mod shapes {
    /// Ground level the hills oscillate around
    pub const BASE_HEIGHT: f64 = 10.0;
    /// Renderable y written for samples with no terrain
    pub const VOID_Y: f64 = -1000.0;

    /// Fraction of the segment width used for boundary blending
    pub const TRANSITION_FRACTION: f64 = 0.15;
    pub const PLATEAU_TRANSITION_FRACTION: f64 = 0.20;

    // Hills
    pub const HILLS_FREQUENCY: f64 = 0.018;
    pub const HILLS_OCTAVES: u32 = 4;
    pub const HILLS_PERSISTENCE: f64 = 0.5;
    pub const HILLS_LACUNARITY: f64 = 2.0;
    pub const HILLS_BASE_AMPLITUDE: f64 = 4.0;
    pub const HILLS_AMPLITUDE_GAIN: f64 = 10.0;
    pub const HILLS_MAX_EXTRA_AMPLITUDE: f64 = 8.0;
    /// Max height change per unit of x before the soft clamp engages
    pub const HILLS_MAX_SLOPE: f64 = 0.7;
    /// Overshoot allowed past the slope limit, as a fraction of the limit
    pub const HILLS_SOFT_MARGIN: f64 = 0.25;

    // Plateau
    pub const PLATEAU_BASE_LIFT: f64 = 1.5;
    pub const PLATEAU_LIFT_GAIN: f64 = 3.0;
    pub const PLATEAU_MAX_LIFT: f64 = 4.0;
    pub const PLATEAU_RIPPLE: f64 = 0.15;

    // Ramp
    pub const RAMP_ZONE_FRACTION: f64 = 0.7;
    /// Apex position within the ramp zone (longer run-up, shorter drop)
    pub const RAMP_APEX_POSITION: f64 = 0.6;
    pub const RAMP_MIN_APEX: f64 = 3.0;
    pub const RAMP_APEX_GAIN: f64 = 10.0;
    pub const RAMP_MAX_APEX: f64 = 9.0;

    // Gap
    pub const GAP_MIN_WIDTH: f64 = 4.0;
    pub const GAP_WIDTH_GAIN: f64 = 10.0;
    pub const GAP_MAX_WIDTH: f64 = 10.0;
    /// How far the lips dip below the base height at the void edge
    pub const GAP_PIT_DEPTH: f64 = 3.0;
    pub const GAP_EDGE_LENGTH: f64 = 6.0;

    // Washboard
    pub const WASHBOARD_WAVELENGTH: f64 = 5.0;
    pub const WASHBOARD_MIN_AMPLITUDE: f64 = 0.3;
    pub const WASHBOARD_AMPLITUDE_GAIN: f64 = 0.6;
    pub const WASHBOARD_MAX_AMPLITUDE: f64 = 0.8;
    pub const WASHBOARD_DAMPING: f64 = 0.8;
    pub const WASHBOARD_HARMONIC: f64 = 0.3;
    pub const WASHBOARD_FADE_FRACTION: f64 = 0.1;

    // Valley
    pub const VALLEY_MIN_DEPTH: f64 = 3.0;
    pub const VALLEY_DEPTH_GAIN: f64 = 8.0;
    pub const VALLEY_MAX_DEPTH: f64 = 8.0;
    pub const VALLEY_IRREGULARITY: f64 = 0.3;

    /// Difficulty used by the read-only fallback height query
    pub const FALLBACK_DIFFICULTY: f64 = 0.05;
    /// Samples taken on either side of x by the fallback query
    pub const FALLBACK_HALF_SPAN: usize = 4;
}

/// Streaming window
pub mod streaming {
    pub const SEGMENTS_AHEAD: usize = 5;
    pub const SEGMENTS_BEHIND: usize = 5;
    /// Extended window used by the long-view preset
    pub const EXTENDED_SEGMENTS: usize = 15;
    /// Extra segments tolerated while a burst is in flight
    pub const WINDOW_SLACK: usize = 2;
    pub const MAX_BUILDS_PER_TICK: usize = 12;
    pub const BATCH_COOLDOWN_TICKS: u32 = 2;
    /// Upper bound on consecutive throttled batches before the schedule resets
    pub const MAX_PENDING_BATCHES: u32 = 64;
    /// Largest segment index the window will stream to. Keeps index
    /// arithmetic in range and sample positions precise in f64.
    pub const MAX_SEGMENT_INDEX: i64 = 1 << 32;
}

/// Level of detail thresholds (distance from tracked x to segment center)
pub mod lod {
    pub const HIGH_DISTANCE: f64 = 60.0;
    pub const MEDIUM_DISTANCE: f64 = 120.0;
    pub const LOW_DISTANCE: f64 = 200.0;
}

/// Collision layout
pub mod physics {
    /// Nominal fixed timestep of the external world
    pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
    /// Maximum catch-up steps per frame
    pub const MAX_SUBSTEPS: u32 = 8;
    pub const GROUND_THICKNESS: f32 = 1.0;
    pub const SEGMENT_STEP: usize = 2;
    /// Slope change (radians) below which neighbouring boxes are merged
    pub const MINOR_SLOPE_EPSILON: f32 = 0.02;
    pub const RAIL_THICKNESS: f32 = 0.5;
    pub const RAIL_HEIGHT: f32 = 20.0;
    /// Static floor placed below gaps to bound fall distance
    pub const FALL_FLOOR_Y: f32 = -60.0;
    pub const FALL_FLOOR_MARGIN: f32 = 4.0;
}

/// Decoration placement
pub mod decoration {
    /// Densities are items per 100 units of segment width
    pub const TREE_DENSITY: f64 = 6.0;
    pub const ROCK_DENSITY: f64 = 4.0;
    pub const BUSH_DENSITY: f64 = 5.0;
    pub const SIGN_DENSITY: f64 = 0.5;
    /// Half-width of the driving lane kept free of decorations
    pub const LANE_HALF_WIDTH: f64 = 3.0;
    /// Outer lateral extent of decoration placement
    pub const LATERAL_EXTENT: f64 = 14.0;
    /// Candidate draws per accepted item before giving up
    pub const ATTEMPTS_PER_ITEM: usize = 6;
    pub const POOL_CAPACITY: usize = 256;
    /// Salt mixed into the per-segment decoration seed
    pub const SEED_SALT: u32 = 0x9E37_79B9;
}

/// Rendering profile
pub mod render {
    /// Depth of each border band
    pub const BORDER_DEPTH: f64 = 6.0;
    /// Profile bottom sits this far below the lowest surface sample
    pub const SKIRT_DEPTH: f64 = 8.0;
}
