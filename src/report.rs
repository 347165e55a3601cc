//! Result accumulators for segment builds and streaming ticks.
//!
//! Collaborator failures never abort a whole build or tick. Each sub-step
//! records its own outcome and the caller inspects the report afterwards.

use crate::error::TerrainError;
use crate::generation::ChunkType;

/// Result of one sub-step: number of items produced or the failure
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub step: &'static str,
    pub result: Result<usize, TerrainError>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn record_outcome(
    outcomes: &mut Vec<StepOutcome>,
    context: &str,
    step: &'static str,
    result: Result<usize, TerrainError>,
) {
    if let Err(e) = &result {
        log::warn!("[{}] {} failed: {}", context, step, e);
    }
    outcomes.push(StepOutcome { step, result });
}

/// Outcome of building one segment
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub index: i64,
    pub start_x: f64,
    pub chunk_type: ChunkType,
    pub outcomes: Vec<StepOutcome>,
}

impl BuildReport {
    pub fn new(index: i64, start_x: f64, chunk_type: ChunkType) -> Self {
        Self {
            index,
            start_x,
            chunk_type,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, step: &'static str, result: Result<usize, TerrainError>) {
        record_outcome(&mut self.outcomes, "SegmentBuilder", step, result);
    }

    /// True when every sub-step succeeded
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(StepOutcome::is_ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn produced(&self, step: &str) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.step == step)
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }
}

/// Outcome of one streaming tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    pub tracked_x: f64,
    pub current_index: Option<i64>,
    pub outcomes: Vec<StepOutcome>,
    pub builds: Vec<BuildReport>,
    /// Set when the tick was refused before touching any state
    pub aborted: Option<TerrainError>,
}

impl TickReport {
    pub fn new(tracked_x: f64) -> Self {
        Self {
            tracked_x,
            ..Default::default()
        }
    }

    pub fn aborted(tracked_x: f64, error: TerrainError) -> Self {
        log::warn!("[StreamingManager] Tick at x={} aborted: {}", tracked_x, error);
        Self {
            tracked_x,
            aborted: Some(error),
            ..Default::default()
        }
    }

    pub fn record(&mut self, step: &'static str, result: Result<usize, TerrainError>) {
        record_outcome(&mut self.outcomes, "StreamingManager", step, result);
    }

    /// True when the tick ran and neither it nor any build recorded a failure
    pub fn is_clean(&self) -> bool {
        self.aborted.is_none()
            && self.outcomes.iter().all(StepOutcome::is_ok)
            && self.builds.iter().all(BuildReport::is_complete)
    }

    pub fn produced(&self, step: &str) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.step == step)
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }

    pub fn segments_built(&self) -> usize {
        self.builds.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_report_tracks_failures() {
        let mut report = BuildReport::new(0, 0.0, ChunkType::Hills);
        report.record("surface_mesh", Ok(3));
        assert!(report.is_complete());
        report.record("collision", Err(TerrainError::Disposed));
        assert!(!report.is_complete());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.produced("surface_mesh"), 3);
    }

    #[test]
    fn test_tick_report_clean_requires_clean_builds() {
        let mut tick = TickReport::new(10.0);
        tick.record("generate_ahead", Ok(1));
        let mut build = BuildReport::new(0, 0.0, ChunkType::Plateau);
        build.record("decorations", Err(TerrainError::Disposed));
        tick.builds.push(build);
        assert!(!tick.is_clean());
        assert_eq!(tick.segments_built(), 1);
    }

    #[test]
    fn test_aborted_tick_is_not_clean() {
        let tick = TickReport::aborted(f64::NAN, TerrainError::InvalidTrackedPosition { x: -1.0 });
        assert!(!tick.is_clean());
        assert!(tick.outcomes.is_empty());
    }
}
