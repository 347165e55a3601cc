//! Deterministic terrain generation
//!
//! Two independent deterministic sources feed the generators:
//! - `TerrainRng`: stateful, sequential, drives chunk-type selection only
//! - `PositionalNoise`: stateless in `x`, drives every height value
//!
//! Keeping them apart means height queries can be replayed in any order
//! without shifting which shape the next segment receives.

pub mod chunk_type;
pub mod interpolation;
pub mod noise;
pub mod rng;
pub mod shapes;

pub use chunk_type::{classify_roll, select_chunk_type, ChunkType};
pub use interpolation::{bezier_cubic, blend, cubic_ease, quintic_ease, Easing};
pub use noise::{mix_seed, PositionalNoise};
pub use rng::TerrainRng;
pub use shapes::{GapWindow, ShapeContext, ShapeGenerator};

use crate::constants::segment::MAX_DIFFICULTY;

/// Difficulty of the segment starting at `start_x`.
///
/// Pure function of distance from the origin, so it does not depend on the
/// order in which segments are generated.
pub fn difficulty_at(start_x: f64, difficulty_range: f64) -> f64 {
    (start_x.abs() / difficulty_range).min(MAX_DIFFICULTY)
}
