use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plans the load of a single items file
    Plan(PlanArgs),
    /// Sweeps the benchmark grid over every dataset in a folder
    Bench(BenchArgs),
    /// Writes a synthetic carton dataset
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[arg(short, long, value_name = "FILE")]
    pub items: PathBuf,
    #[arg(short, long, value_name = "FOLDER")]
    pub output_folder: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    /// Select with the exact solver instead of keeping all candidates
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub use_exact: Option<bool>,
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub use_sequencer: Option<bool>,
    #[arg(long)]
    pub population: Option<usize>,
    #[arg(long)]
    pub generations: Option<usize>,
    #[arg(long)]
    pub prefilter_small: Option<usize>,
    #[arg(long)]
    pub prefilter_large: Option<usize>,
}

#[derive(Args, Debug)]
pub struct BenchArgs {
    #[arg(short, long, value_name = "FOLDER")]
    pub dataset_folder: PathBuf,
    /// Defaults to `bench_results` inside the dataset folder
    #[arg(short, long, value_name = "FOLDER")]
    pub output_folder: Option<PathBuf>,
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
    #[arg(short, long, default_value_t = 500)]
    pub n_items: usize,
    #[arg(short, long, default_value_t = 42)]
    pub seed: u64,
}
