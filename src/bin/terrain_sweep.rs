use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use ridgeline::{
    ChunkType, SceneRecorder, StaticBodyWorld, StreamingStats, Terrain, TerrainConfig, TerrainSeed,
};

/// Command line options
#[derive(Debug)]
struct SweepOptions {
    seeds: Vec<TerrainSeed>,
    distance: f64,
    step: f64,
    config: Option<PathBuf>,
    json: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            distance: 4000.0,
            step: 10.0,
            config: None,
            json: false,
        }
    }
}

/// Result of driving one seed across the sweep distance
#[derive(Debug, Serialize)]
struct SweepSummary {
    seed: String,
    ticks: usize,
    chunk_types: BTreeMap<String, usize>,
    incomplete_builds: usize,
    max_window: usize,
    max_seam_jump: f64,
    min_height: f64,
    max_height: f64,
    elapsed_ms: u128,
    stats: StreamingStats,
}

fn parse_args() -> Result<SweepOptions> {
    let mut options = SweepOptions::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().with_context(|| format!("{} needs a value", name));
        match arg.as_str() {
            "--seed" => {
                let raw = value("--seed")?;
                options.seeds.push(raw.parse().with_context(|| format!("bad seed {}", raw))?);
            }
            "--random-seeds" => {
                let count: usize = value("--random-seeds")?.parse()?;
                options.seeds.extend((0..count).map(|_| TerrainSeed::random()));
            }
            "--distance" => options.distance = value("--distance")?.parse()?,
            "--step" => options.step = value("--step")?.parse()?,
            "--config" => options.config = Some(PathBuf::from(value("--config")?)),
            "--json" => options.json = true,
            "--help" | "-h" => {
                println!(
                    "usage: terrain_sweep [--seed S]... [--random-seeds N] [--distance D] [--step S] [--config FILE] [--json]"
                );
                std::process::exit(0);
            }
            other => bail!("unknown argument {}", other),
        }
    }

    if options.seeds.is_empty() {
        options.seeds.push(TerrainSeed(42));
    }
    if !(options.step > 0.0 && options.distance >= 0.0) {
        bail!("step must be positive and distance non-negative");
    }
    Ok(options)
}

fn sweep(seed: TerrainSeed, config: &TerrainConfig, options: &SweepOptions) -> Result<SweepSummary> {
    let start = Instant::now();
    let mut terrain = Terrain::new(
        seed,
        config.clone(),
        StaticBodyWorld::new(),
        SceneRecorder::new(),
    )?;

    let mut chunk_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut incomplete_builds = 0;
    let mut max_window = 0;
    let mut ticks = 0;
    let mut x = 0.0;

    while x <= options.distance {
        let report = terrain.update(x);
        if let Some(error) = report.aborted {
            bail!("tick at x={} aborted: {}", x, error);
        }
        for build in &report.builds {
            *chunk_types.entry(build.chunk_type.to_string()).or_default() += 1;
            if !build.is_complete() {
                incomplete_builds += 1;
            }
        }
        max_window = max_window.max(terrain.segments().len());
        if !terrain.segments().is_disjoint() {
            bail!("overlapping segments at x={}", x);
        }
        ticks += 1;
        x += options.step;
    }

    let mut max_seam_jump: f64 = 0.0;
    let mut min_height = f64::INFINITY;
    let mut max_height = f64::NEG_INFINITY;
    let segments: Vec<_> = terrain.segments().iter().collect();
    for pair in segments.windows(2) {
        if let (Some(a), Some(b)) = (pair[0].last_height(), pair[1].first_height()) {
            max_seam_jump = max_seam_jump.max((a - b).abs());
        }
    }
    for height in segments.iter().flat_map(|s| s.points.iter().filter_map(|p| p.height)) {
        min_height = min_height.min(height);
        max_height = max_height.max(height);
    }

    let stats = terrain.stats();
    terrain.dispose()?;

    Ok(SweepSummary {
        seed: seed.to_string(),
        ticks,
        chunk_types,
        incomplete_builds,
        max_window,
        max_seam_jump,
        min_height,
        max_height,
        elapsed_ms: start.elapsed().as_millis(),
        stats,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = parse_args()?;
    let config = match &options.config {
        Some(path) => TerrainConfig::from_path(path)?,
        None => TerrainConfig::default(),
    };

    log::info!(
        "[terrain_sweep] Sweeping {} seed(s) over {} units in steps of {}",
        options.seeds.len(),
        options.distance,
        options.step
    );

    let summaries = options
        .seeds
        .par_iter()
        .map(|seed| sweep(*seed, &config, &options))
        .collect::<Result<Vec<_>>>()?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        println!("Seed {}", summary.seed);
        println!("  ticks: {}  elapsed: {} ms", summary.ticks, summary.elapsed_ms);
        println!(
            "  window max: {}  incomplete builds: {}",
            summary.max_window, summary.incomplete_builds
        );
        println!(
            "  heights: {:.2} .. {:.2}  max seam jump: {:.6}",
            summary.min_height, summary.max_height, summary.max_seam_jump
        );
        for chunk_type in ChunkType::ALL {
            let count = summary.chunk_types.get(chunk_type.name()).copied().unwrap_or(0);
            println!("  {:>10}: {}", chunk_type, count);
        }
    }
    Ok(())
}
