use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use loadopt::config::LoadOptConfig;
use loadopt::io::cli::{BenchArgs, Cli, Command, GenerateArgs, PlanArgs};
use loadopt::io::report::PlanReport;
use loadopt::sampler::CartonSampler;
use loadopt::select::SelectionStrategy;
use loadopt::sequence::SequencerConfig;
use loadopt::{bench, io, plan};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    match args.command {
        Command::Plan(plan_args) => main_plan(plan_args),
        Command::Bench(bench_args) => main_bench(bench_args),
        Command::Generate(generate_args) => main_generate(generate_args),
    }
}

fn load_config(config_file: Option<&Path>) -> Result<LoadOptConfig> {
    let config = match config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config-file to provide a custom config");
            LoadOptConfig::default()
        }
        Some(config_file) => io::read_json(config_file).context("incorrect config file format")?,
    };
    info!("[MAIN] Successfully parsed LoadOptConfig: {config:?}");
    Ok(config)
}

fn main_plan(args: PlanArgs) -> Result<()> {
    let mut config = load_config(args.config_file.as_deref())?;

    if let Some(use_exact) = args.use_exact {
        config.selector.strategy = match use_exact {
            true => SelectionStrategy::Exact,
            false => SelectionStrategy::PassThrough,
        };
    }
    if let Some(use_sequencer) = args.use_sequencer {
        config.sequencer = match use_sequencer {
            true => Some(config.sequencer.unwrap_or_default()),
            false => None,
        };
    }
    if let Some(seq_config) = config.sequencer.as_mut() {
        *seq_config = SequencerConfig {
            population: args.population.unwrap_or(seq_config.population),
            generations: args.generations.unwrap_or(seq_config.generations),
            ..*seq_config
        };
    }
    config.prefilter.n_small = args.prefilter_small.unwrap_or(config.prefilter.n_small);
    config.prefilter.n_large = args.prefilter_large.unwrap_or(config.prefilter.n_large);

    let items = io::items::read_items_csv(&args.items)?;
    let stem = args
        .items
        .file_stem()
        .and_then(|s| s.to_str())
        .context("items file has no valid name")?;

    fs::create_dir_all(&args.output_folder)
        .with_context(|| format!("could not create output folder: {}", args.output_folder.display()))?;

    let start = Instant::now();
    let load_plan = plan::plan(&items, &config);
    let run_time = start.elapsed().as_secs_f64();

    io::layout::write_layout_csv(&load_plan.placements, &args.output_folder.join(format!("layout_{stem}.csv")))?;
    {
        let report = PlanReport::new(&load_plan, &config, run_time, None);
        io::write_json(&report, &args.output_folder.join(format!("report_{stem}.json")))?;
    }
    {
        let svg = io::svg::layout_to_svg(&load_plan.placements, &config.truck, config.svg_draw_options, stem);
        io::write_svg(&svg, &args.output_folder.join(format!("plot_{stem}.svg")))?;
    }

    println!(
        "Placed: {} | Vol Util: {:.2}% | Wt Util: {:.2}%",
        load_plan.placements.len(),
        load_plan.volume_utilization_pct,
        load_plan.weight_utilization_pct
    );
    Ok(())
}

fn main_bench(args: BenchArgs) -> Result<()> {
    let config = load_config(args.config_file.as_deref())?;
    let output_folder: PathBuf = args
        .output_folder
        .unwrap_or_else(|| args.dataset_folder.join("bench_results"));
    bench::run(&args.dataset_folder, &output_folder, &config)
}

fn main_generate(args: GenerateArgs) -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let items = CartonSampler::default().sample_n(args.n_items, &mut rng);
    io::items::write_items_csv(&items, &args.output)
}
