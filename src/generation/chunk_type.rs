use serde::{Deserialize, Serialize};

use super::rng::TerrainRng;

/// Procedural shape category of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    Hills,
    Plateau,
    Ramp,
    Gap,
    Washboard,
    Valley,
}

impl ChunkType {
    pub const ALL: [ChunkType; 6] = [
        ChunkType::Hills,
        ChunkType::Plateau,
        ChunkType::Ramp,
        ChunkType::Gap,
        ChunkType::Washboard,
        ChunkType::Valley,
    ];

    /// Gap, washboard and valley
    pub fn is_hazard(self) -> bool {
        matches!(self, ChunkType::Gap | ChunkType::Washboard | ChunkType::Valley)
    }

    /// Lowest difficulty at which this type can be selected
    pub fn introduction_difficulty(self) -> f64 {
        match self {
            ChunkType::Hills | ChunkType::Plateau => 0.0,
            ChunkType::Ramp => DIFFICULTY_BANDS[1].min_difficulty,
            ChunkType::Gap | ChunkType::Washboard => DIFFICULTY_BANDS[2].min_difficulty,
            ChunkType::Valley => DIFFICULTY_BANDS[3].min_difficulty,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChunkType::Hills => "hills",
            ChunkType::Plateau => "plateau",
            ChunkType::Ramp => "ramp",
            ChunkType::Gap => "gap",
            ChunkType::Washboard => "washboard",
            ChunkType::Valley => "valley",
        }
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the selection table: cumulative upper bounds per type
struct DifficultyBand {
    min_difficulty: f64,
    bins: &'static [(f64, ChunkType)],
}

/// Piecewise-constant selection weights, ordered by ascending difficulty.
/// Each bin holds the cumulative upper bound of its slice of [0, 1).
const DIFFICULTY_BANDS: [DifficultyBand; 5] = [
    DifficultyBand {
        min_difficulty: 0.0,
        bins: &[(0.70, ChunkType::Hills), (1.0, ChunkType::Plateau)],
    },
    DifficultyBand {
        min_difficulty: 0.15,
        bins: &[
            (0.50, ChunkType::Hills),
            (0.75, ChunkType::Plateau),
            (1.0, ChunkType::Ramp),
        ],
    },
    DifficultyBand {
        min_difficulty: 0.3,
        bins: &[
            (0.40, ChunkType::Hills),
            (0.55, ChunkType::Plateau),
            (0.75, ChunkType::Ramp),
            (0.85, ChunkType::Gap),
            (1.0, ChunkType::Washboard),
        ],
    },
    DifficultyBand {
        min_difficulty: 0.5,
        bins: &[
            (0.30, ChunkType::Hills),
            (0.40, ChunkType::Plateau),
            (0.60, ChunkType::Ramp),
            (0.75, ChunkType::Gap),
            (0.90, ChunkType::Washboard),
            (1.0, ChunkType::Valley),
        ],
    },
    DifficultyBand {
        min_difficulty: 0.7,
        bins: &[
            (0.25, ChunkType::Hills),
            (0.30, ChunkType::Plateau),
            (0.50, ChunkType::Ramp),
            (0.70, ChunkType::Gap),
            (0.85, ChunkType::Washboard),
            (1.0, ChunkType::Valley),
        ],
    },
];

fn band_for(difficulty: f64) -> &'static DifficultyBand {
    DIFFICULTY_BANDS
        .iter()
        .rev()
        .find(|band| difficulty >= band.min_difficulty)
        .unwrap_or(&DIFFICULTY_BANDS[0])
}

/// Pick the shape of the next segment.
///
/// Draws exactly one value from `rng`. Call it once per built segment and in
/// build order; any extra or skipped call forks every later selection.
pub fn select_chunk_type(rng: &mut TerrainRng, difficulty: f64) -> ChunkType {
    let roll = rng.next_f64();
    classify_roll(roll, difficulty)
}

/// Map a roll in [0, 1) to a chunk type for the band containing `difficulty`
pub fn classify_roll(roll: f64, difficulty: f64) -> ChunkType {
    let band = band_for(difficulty);
    band.bins
        .iter()
        .find(|(upper, _)| roll < *upper)
        .map(|(_, chunk_type)| *chunk_type)
        .unwrap_or(ChunkType::Hills)
}
