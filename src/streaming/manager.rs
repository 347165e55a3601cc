use serde::Serialize;

use crate::config::TerrainConfig;
use crate::constants::decoration::POOL_CAPACITY;
use crate::constants::streaming::MAX_SEGMENT_INDEX;
use crate::error::{TerrainError, TerrainResult};
use crate::generation::{ChunkType, TerrainRng};
use crate::physics::PhysicsBackend;
use crate::query::{HeightProvider, HeightQuery};
use crate::render::RenderBackend;
use crate::report::{BuildReport, TickReport};
use crate::segment::{DecorationPools, SegmentBuilder, SegmentNeighbours};

use super::lod::apply_lod;
use super::schedule::GenerationSchedule;
use super::store::SegmentStore;

/// Streaming counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamingStats {
    pub ticks: u64,
    pub segments_built: u64,
    pub segments_evicted: u64,
    pub self_heals: u64,
    pub duplicates_removed: u64,
    pub deferred_batches: u64,
    pub lod_calls: u64,
    /// Builds where at least one sub-step failed
    pub incomplete_builds: u64,
    pub active_segments: usize,
    pub first_index: Option<i64>,
    pub last_index: Option<i64>,
    pub pooled_decorations: usize,
}

/// Keeps a window of segments built around a tracked position
#[derive(Debug)]
pub struct StreamingManager {
    config: TerrainConfig,
    store: SegmentStore,
    builder: SegmentBuilder,
    rng: TerrainRng,
    pools: DecorationPools,
    schedule: GenerationSchedule,
    stats: StreamingStats,
    disposed: bool,
}

impl StreamingManager {
    pub fn new(seed: u32, config: TerrainConfig) -> TerrainResult<Self> {
        config.validate()?;
        log::info!(
            "[StreamingManager] Seed {} with window {} behind / {} ahead, width {}",
            seed,
            config.segments_behind,
            config.segments_ahead,
            config.segment_width
        );
        Ok(Self {
            builder: SegmentBuilder::new(seed, &config),
            rng: TerrainRng::new(seed),
            pools: DecorationPools::new(POOL_CAPACITY),
            store: SegmentStore::new(),
            schedule: GenerationSchedule::new(),
            stats: StreamingStats::default(),
            disposed: false,
            config,
        })
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn schedule(&self) -> &GenerationSchedule {
        &self.schedule
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn heights(&self) -> HeightQuery<'_> {
        HeightQuery::new(&self.store, self.builder.shapes(), self.config.sample_spacing())
    }

    pub fn chunk_types(&self) -> Vec<(i64, ChunkType)> {
        self.store.chunk_types()
    }

    pub fn stats(&self) -> StreamingStats {
        let mut stats = self.stats.clone();
        stats.active_segments = self.store.len();
        stats.first_index = self.store.first().map(|s| s.index);
        stats.last_index = self.store.last().map(|s| s.index);
        stats.pooled_decorations = self.pools.total_pooled();
        stats
    }

    /// Run one streaming tick for `tracked_x`.
    ///
    /// Order: dedupe, generate ahead, evict, self-heal, LOD. A non-finite
    /// position, one before the origin or one beyond `MAX_SEGMENT_INDEX`
    /// segments is refused before any state changes.
    pub fn update<P, R>(&mut self, tracked_x: f64, physics: &mut P, renderer: &mut R) -> TickReport
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        if self.disposed {
            return TickReport::aborted(tracked_x, TerrainError::Disposed);
        }
        let Some(current) = self.builder.checked_index_for(tracked_x) else {
            return TickReport::aborted(tracked_x, TerrainError::InvalidTrackedPosition { x: tracked_x });
        };

        let mut report = TickReport::new(tracked_x);
        self.stats.ticks += 1;

        let result = self.dedupe(physics, renderer);
        report.record("dedupe", result);

        report.current_index = Some(current);

        let built = self.generate_ahead(current, physics, renderer, &mut report);
        report.record("generate_ahead", Ok(built));

        let result = self.evict_stale(current, physics, renderer);
        report.record("evict_stale", result);

        if self.store.covering(tracked_x).is_none() {
            log::info!(
                "[StreamingManager] No segment under x={}, rebuilding segment {}",
                tracked_x,
                current
            );
            let build = self.build_and_insert(current, physics, renderer);
            self.stats.self_heals += 1;
            report.builds.push(build);
            report.record("self_heal", Ok(1));
        }

        let result = self.apply_lod(tracked_x, physics, renderer);
        report.record("lod", result);

        report
    }

    /// Build the segment with `index` out of band. `None` if it already
    /// exists or lies beyond `MAX_SEGMENT_INDEX` either side of the origin.
    pub fn build_segment<P, R>(&mut self, index: i64, physics: &mut P, renderer: &mut R) -> Option<BuildReport>
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        if self.disposed
            || !(-MAX_SEGMENT_INDEX..=MAX_SEGMENT_INDEX).contains(&index)
            || self.store.contains_index(index)
        {
            return None;
        }
        Some(self.build_and_insert(index, physics, renderer))
    }

    /// Drop the segment with `index` and release its handles
    pub fn remove_segment<P, R>(
        &mut self,
        index: i64,
        physics: &mut P,
        renderer: &mut R,
    ) -> Option<TerrainResult<usize>>
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        let mut segment = self.store.remove(index)?;
        Some(segment.release(physics, renderer, &mut self.pools))
    }

    /// Cancel pending generation and release everything. Safe to call twice.
    pub fn dispose<P, R>(&mut self, physics: &mut P, renderer: &mut R) -> TerrainResult<usize>
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        if self.disposed {
            return Ok(0);
        }
        self.disposed = true;
        self.schedule.cancel();

        let mut released = 0;
        let mut first_error = None;
        for mut segment in self.store.drain_all() {
            match segment.release(physics, renderer, &mut self.pools) {
                Ok(n) => released += n,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match self.pools.drain(renderer) {
            Ok(n) => released += n,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }

        log::info!("[StreamingManager] Disposed, released {} handles", released);
        match first_error {
            Some(e) => Err(e),
            None => Ok(released),
        }
    }

    fn build_and_insert<P, R>(&mut self, index: i64, physics: &mut P, renderer: &mut R) -> BuildReport
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        let neighbours = {
            let heights = self.heights();
            let start = self.builder.start_for(index);
            SegmentNeighbours {
                before: heights.height_near(start).and_then(|s| s.height()),
                after: heights
                    .height_near(start + self.config.segment_width)
                    .and_then(|s| s.height()),
            }
        };

        let (mut segment, report) = self.builder.build(
            index,
            &mut self.rng,
            neighbours,
            physics,
            renderer,
            &mut self.pools,
        );
        self.stats.segments_built += 1;
        if !report.is_complete() {
            self.stats.incomplete_builds += 1;
        }

        if self.store.contains_index(index) {
            log::warn!("[StreamingManager] Segment {} already present, discarding rebuild", index);
            if let Err(e) = segment.release(physics, renderer, &mut self.pools) {
                log::warn!("[StreamingManager] Release of discarded segment failed: {}", e);
            }
        } else {
            self.store.append(segment);
        }
        report
    }

    fn dedupe<P, R>(&mut self, physics: &mut P, renderer: &mut R) -> TerrainResult<usize>
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        let removed = self.store.dedupe();
        let count = removed.len();
        let mut first_error = None;
        for mut segment in removed {
            log::warn!("[StreamingManager] Removing duplicate segment {}", segment.index);
            if let Err(e) = segment.release(physics, renderer, &mut self.pools) {
                first_error.get_or_insert(e);
            }
        }
        self.stats.duplicates_removed += count as u64;
        match first_error {
            Some(e) => Err(e),
            None => Ok(count),
        }
    }

    fn generate_ahead<P, R>(
        &mut self,
        current: i64,
        physics: &mut P,
        renderer: &mut R,
        report: &mut TickReport,
    ) -> usize
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        if !self.schedule.ready() {
            return 0;
        }

        let behind = self.config.segments_behind as i64;
        let target = current + self.config.segments_ahead as i64;
        // Resume after the window while it still reaches the trailing edge,
        // otherwise the vehicle jumped and the window restarts under it
        let mut next = match self.store.last() {
            Some(last) if (current - behind..=target).contains(&last.index) => last.index + 1,
            _ => current,
        };
        let mut built = 0;

        while next <= target {
            if built >= self.config.max_builds_per_tick {
                self.schedule
                    .defer(self.config.batch_cooldown_ticks, self.config.max_pending_batches);
                self.stats.deferred_batches += 1;
                log::debug!(
                    "[StreamingManager] Build cap reached at segment {}, {} left",
                    next,
                    target - next + 1
                );
                break;
            }
            if !self.store.contains_index(next) {
                let build = self.build_and_insert(next, physics, renderer);
                report.builds.push(build);
                built += 1;
            }
            next += 1;
        }

        if next > target {
            self.schedule.complete();
        }
        built
    }

    /// Drop segments more than `segments_behind` back, and segments left
    /// far ahead after the tracked position jumped backwards
    fn evict_stale<P, R>(&mut self, current: i64, physics: &mut P, renderer: &mut R) -> TerrainResult<usize>
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        let behind = self.config.segments_behind as i64;
        let ahead_limit = current + (self.config.segments_ahead + self.config.segments_behind) as i64;
        let mut stale = Vec::new();

        while let Some(first) = self.store.first() {
            if first.index >= current - behind {
                break;
            }
            match self.store.pop_first() {
                Some(segment) => stale.push(segment),
                None => break,
            }
        }
        while let Some(last) = self.store.last() {
            if last.index <= ahead_limit {
                break;
            }
            let index = last.index;
            match self.store.remove(index) {
                Some(segment) => stale.push(segment),
                None => break,
            }
        }

        let evicted = stale.len();
        let mut first_error = None;
        for mut segment in stale {
            log::trace!("[StreamingManager] Evicting segment {}", segment.index);
            if let Err(e) = segment.release(physics, renderer, &mut self.pools) {
                first_error.get_or_insert(e);
            }
        }

        self.stats.segments_evicted += evicted as u64;
        match first_error {
            Some(e) => Err(e),
            None => Ok(evicted),
        }
    }

    fn apply_lod<P, R>(&mut self, tracked_x: f64, physics: &mut P, renderer: &mut R) -> TerrainResult<usize>
    where
        P: PhysicsBackend,
        R: RenderBackend,
    {
        let distances = self.config.lod_distances;
        let mut calls = 0;
        let mut first_error = None;

        for segment in self.store.iter_mut() {
            match apply_lod(segment, tracked_x, &distances, physics, renderer) {
                Ok(n) => calls += n,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        self.stats.lod_calls += calls as u64;
        match first_error {
            Some(e) => Err(e),
            None => Ok(calls),
        }
    }
}
