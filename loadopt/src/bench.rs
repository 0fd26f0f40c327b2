use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use itertools::{Itertools, iproduct};
use log::{info, warn};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use thousands::Separable;
use truckload::entities::{Item, TruckSpec};

use crate::config::LoadOptConfig;
use crate::io;
use crate::io::report::PlanReport;
use crate::plan::{LoadPlan, plan_candidates};
use crate::sequence::SequencerConfig;

/// Lane percentiles tried per dataset
pub const LANE_PCTS: [u32; 3] = [60, 70, 80];
/// Candidate pool sizes tried per dataset, `None` keeps all eligible items
pub const POOL_SIZES: [Option<usize>; 3] = [Some(180), Some(260), None];
/// Sequencer settings tried per dataset: `(population, generations)`, `None` disables the sequencer
pub const SEQUENCER_CHOICES: [Option<(usize, usize)>; 2] = [None, Some((48, 18))];

/// Minimum number of eligible items, below which the largest footprints are used instead
pub const MIN_ELIGIBLE: usize = 150;
/// Datasets with fewer items are skipped
pub const MIN_DATASET_SIZE: usize = 10;

/// File name prefixes of files written by the planner, which are not datasets
const IGNORE_PREFIXES: [&str; 6] = ["packed_layout", "bench_results", "report", "plot", "layout", "plot3d"];

/// A point of the benchmark grid
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GridPoint {
    pub lane_pct: u32,
    pub pool_size: Option<usize>,
    pub sequencer: Option<(usize, usize)>,
    /// Lane width (m) resulting from `lane_pct`
    pub lane_width: f64,
    /// Number of candidates handed to the selector
    pub n_candidates: usize,
}

/// Best plan found for a dataset
#[derive(Clone, Debug)]
pub struct BenchOutcome {
    pub plan: LoadPlan,
    pub grid_point: GridPoint,
    pub config: LoadOptConfig,
}

/// Linearly interpolated `pct`-th percentile of the narrowest usable widths of `items`,
/// capped so that two lanes fit side by side in the truck.
pub fn lane_width(items: &[Item], pct: u32, truck: &TruckSpec) -> f64 {
    let cap = truck.width / 1.95;
    let widths = items
        .iter()
        .map(|i| match i.can_rotate {
            true => f64::min(i.length, i.width),
            false => i.width,
        })
        .filter(|w| w.is_finite())
        .sorted_by_key(|w| OrderedFloat(*w))
        .collect_vec();

    match widths.is_empty() {
        true => cap,
        false => f64::min(percentile(&widths, pct as f64), cap),
    }
}

/// Percentile of `sorted` with linear interpolation between the closest ranks
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let (lo, hi) = (rank.floor() as usize, rank.ceil() as usize);
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Items which fit in a lane of width `lane` in some orientation, ordered by descending drop order,
/// height, footprint and stack limit.
/// If fewer than [`MIN_ELIGIBLE`] items qualify, the ones with the largest footprint are used instead.
pub fn eligible_pool(items: &[Item], lane: f64, truck: &TruckSpec) -> Vec<Item> {
    let fits_lane = |i: &Item| {
        i.orientations(true)
            .any(|(l, w)| w <= lane && l <= truck.length && i.height <= truck.height)
    };
    let eligible = items
        .iter()
        .filter(|i| fits_lane(i))
        .sorted_by_key(|i| {
            (
                Reverse(i.drop_order),
                Reverse(OrderedFloat(i.height)),
                Reverse(OrderedFloat(i.footprint_area())),
                Reverse(i.stack_limit),
            )
        })
        .cloned()
        .collect_vec();

    match eligible.len() < MIN_ELIGIBLE {
        true => items
            .iter()
            .sorted_by_key(|i| Reverse(OrderedFloat(i.footprint_area())))
            .take(MIN_ELIGIBLE)
            .cloned()
            .collect(),
        false => eligible,
    }
}

/// All points of the grid for a dataset, in evaluation order
pub fn grid(items: &[Item], truck: &TruckSpec) -> impl Iterator<Item = (GridPoint, Vec<Item>)> {
    iproduct!(LANE_PCTS, POOL_SIZES, SEQUENCER_CHOICES).map(move |(lane_pct, pool_size, sequencer)| {
        let lane = lane_width(items, lane_pct, truck);
        let mut candidates = eligible_pool(items, lane, truck);
        if let Some(size) = pool_size {
            candidates.truncate(size);
        }
        let grid_point = GridPoint {
            lane_pct,
            pool_size,
            sequencer,
            lane_width: lane,
            n_candidates: candidates.len(),
        };
        (grid_point, candidates)
    })
}

/// Configuration used to plan a grid point
pub fn grid_config(base: &LoadOptConfig, grid_point: &GridPoint) -> LoadOptConfig {
    let sequencer = grid_point.sequencer.map(|(population, generations)| SequencerConfig {
        population,
        generations,
        ..base.sequencer.unwrap_or_default()
    });
    LoadOptConfig { sequencer, ..*base }
}

/// Plans every grid point for `items` and returns the one with the highest volume utilization
pub fn bench_dataset(items: &[Item], base: &LoadOptConfig) -> Option<BenchOutcome> {
    let mut best: Option<BenchOutcome> = None;
    for (grid_point, candidates) in grid(items, &base.truck) {
        let config = grid_config(base, &grid_point);
        let plan = plan_candidates(&candidates, &config);
        info!(
            "[BENCH] lane={} pool={} seq={:?} -> vol={:.2}% placed={}",
            grid_point.lane_pct,
            grid_point.pool_size.map_or("ALL".to_string(), |s| s.to_string()),
            grid_point.sequencer,
            plan.volume_utilization_pct,
            plan.placements.len()
        );
        let improved = best
            .as_ref()
            .is_none_or(|b| plan.volume_utilization_pct > b.plan.volume_utilization_pct);
        if improved {
            best = Some(BenchOutcome {
                plan,
                grid_point,
                config,
            });
        }
    }
    best
}

/// CSV files in `folder` which are not planner outputs, sorted by name
pub fn dataset_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(folder).with_context(|| format!("could not read folder: {}", folder.display()))?;
    let mut files = vec![];
    for entry in entries {
        let path = entry?.path();
        let is_csv = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        match (is_csv, IGNORE_PREFIXES.iter().any(|p| stem.starts_with(p))) {
            (true, false) => files.push(path),
            (true, true) => info!("[BENCH] skipping generated file: {}", path.display()),
            _ => {}
        }
    }
    files.sort();
    Ok(files)
}

/// Benchmarks every dataset in `dataset_folder` and writes the best layout, report and plot of each to `output_folder`
pub fn run(dataset_folder: &Path, output_folder: &Path, base: &LoadOptConfig) -> Result<()> {
    fs::create_dir_all(output_folder)
        .with_context(|| format!("could not create output folder: {}", output_folder.display()))?;

    for path in dataset_files(dataset_folder)? {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_owned();
        let items = match io::items::read_items_csv(&path) {
            Ok(items) => items,
            Err(e) => {
                warn!("[BENCH] skipping {}: {e:#}", path.display());
                continue;
            }
        };
        if items.len() < MIN_DATASET_SIZE {
            warn!("[BENCH] skipping {name}: too few items ({})", items.len());
            continue;
        }

        info!("[BENCH] dataset {name}: {} items", items.len().separate_with_commas());
        let start = Instant::now();
        let Some(best) = bench_dataset(&items, base) else {
            continue;
        };
        let run_time = start.elapsed().as_secs_f64();
        info!(
            "[BENCH] best for {name}: vol={:.2}% {:?} in {:.3}s",
            best.plan.volume_utilization_pct, best.grid_point, run_time
        );

        let prefix = format!("{name}_best");
        io::layout::write_layout_csv(
            &best.plan.placements,
            &output_folder.join(format!("{prefix}_packed_layout.csv")),
        )?;
        let report = PlanReport::new(&best.plan, &best.config, run_time, Some(best.grid_point));
        io::write_json(&report, &output_folder.join(format!("{prefix}_report.json")))?;
        let title = format!("{name} best (lane {}%)", best.grid_point.lane_pct);
        let svg = io::svg::layout_to_svg(&best.plan.placements, &best.config.truck, best.config.svg_draw_options, &title);
        io::write_svg(&svg, &output_folder.join(format!("{prefix}_plot.svg")))?;
    }
    Ok(())
}
