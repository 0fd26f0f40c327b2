use std::time::Instant;

use anyhow::{Result, ensure};
use itertools::Itertools;
use log::{debug, info, warn};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use truckload::entities::{Flags, Item, TruckSpec};
use truckload::packer::pack;
use truckload::util::PackerConfig;

use crate::sequence::fitness::ProxyModel;

/// Capacity-based proxy fitness of orders
pub mod fitness;

/// Permutation population and its genetic operators
pub mod population;

/// Configuration of the genetic sequencer
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct SequencerConfig {
    pub population: usize,
    pub generations: usize,
    pub seed: u64,
    /// Fraction of the population carried over unchanged to the next generation (at least 2 rows)
    pub elite_fraction: f64,
    /// Probability of a swap mutation per child
    pub mutation_rate: f64,
    /// Number of best rows of the final population which are packed to find the best order
    pub refine_top_k: usize,
    /// Fewer items than this are not reordered
    pub min_items: usize,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            population: 64,
            generations: 20,
            seed: 1234,
            elite_fraction: 0.2,
            mutation_rate: 0.2,
            refine_top_k: 8,
            min_items: 4,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceStatus {
    /// The input order is returned
    Unchanged,
    /// The best order according to the proxy fitness is returned
    Incumbent,
    /// The order that packed the most volume is returned
    Refined,
}

#[derive(Clone, Debug)]
pub struct Sequence {
    /// Permutation of the input items
    pub items: Vec<Item>,
    pub status: SequenceStatus,
}

/// Result of the genetic search, before refinement
struct SearchOutcome {
    incumbent: Vec<usize>,
    population: Array2<usize>,
    fitness: Vec<f64>,
}

/// Searches for an order of `items` which makes the packer load as much volume as possible.
///
/// A genetic algorithm over permutations evaluates orders with a cheap capacity-based proxy.
/// The best orders it finds are then packed for real and the one with the most placed volume wins.
/// Never fails: if the search cannot run, the input order is returned.
pub fn reorder(
    items: &[Item],
    truck: &TruckSpec,
    flags: Flags,
    packer: &PackerConfig,
    config: &SequencerConfig,
) -> Sequence {
    let unchanged = || Sequence {
        items: items.to_vec(),
        status: SequenceStatus::Unchanged,
    };
    if items.len() < config.min_items {
        debug!("[SEQ] only {} items, keeping the input order", items.len());
        return unchanged();
    }

    let start = Instant::now();
    let outcome = match search(items, truck, config) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("[SEQ] search failed, keeping the input order: {e:#}");
            return unchanged();
        }
    };

    let sequence = refine(items, truck, flags, packer, config, &outcome);
    info!(
        "[SEQ] reordered {} items ({:?}) in {:.3}ms",
        items.len(),
        sequence.status,
        start.elapsed().as_secs_f64() * 1000.0
    );
    sequence
}

fn search(items: &[Item], truck: &TruckSpec, config: &SequencerConfig) -> Result<SearchOutcome> {
    ensure!(config.population >= 2, "population too small: {}", config.population);
    let model = ProxyModel::new(items, truck)?;
    let mut rng = SmallRng::seed_from_u64(config.seed);

    let n_elites = usize::min(
        config.population,
        usize::max(2, (config.population as f64 * config.elite_fraction) as usize),
    );

    let base = population::base_order(items);
    let mut pop = population::initial_population(&base, config.population, &mut rng)?;
    let mut incumbent: (f64, Vec<usize>) = (f64::NEG_INFINITY, base);

    for generation in 0..config.generations {
        let fitness = model.evaluate(&pop)?;
        let ranked = fitness::ranked(&fitness);
        if fitness[ranked[0]] > incumbent.0 {
            incumbent = (fitness[ranked[0]], pop.row(ranked[0]).to_vec());
        }
        debug!(
            "[SEQ] generation {}: best {:.4}, incumbent {:.4}",
            generation, fitness[ranked[0]], incumbent.0
        );
        pop = population::breed(&pop, &ranked[..n_elites], config.mutation_rate, &mut rng)?;
    }

    let fitness = model.evaluate(&pop)?;
    let ranked = fitness::ranked(&fitness);
    if fitness[ranked[0]] > incumbent.0 {
        incumbent = (fitness[ranked[0]], pop.row(ranked[0]).to_vec());
    }

    Ok(SearchOutcome {
        incumbent: incumbent.1,
        population: pop,
        fitness,
    })
}

/// Packs the incumbent and the best rows of the final population, keeps the order with the most placed volume.
fn refine(
    items: &[Item],
    truck: &TruckSpec,
    flags: Flags,
    packer: &PackerConfig,
    config: &SequencerConfig,
    outcome: &SearchOutcome,
) -> Sequence {
    let ordered = |order: &[usize]| order.iter().map(|&i| items[i].clone()).collect_vec();

    let candidates = std::iter::once(outcome.incumbent.clone())
        .chain(
            fitness::ranked(&outcome.fitness)
                .into_iter()
                .take(config.refine_top_k)
                .map(|r| outcome.population.row(r).to_vec()),
        )
        .unique()
        .collect_vec();

    let volumes = candidates
        .par_iter()
        .map(|order| pack(truck, flags, &ordered(order), packer).placed_volume())
        .collect::<Vec<f64>>();

    let mut best: Option<(usize, f64)> = None;
    for (i, &volume) in volumes.iter().enumerate() {
        if volume > best.map_or(0.0, |(_, v)| v) {
            best = Some((i, volume));
        }
    }

    match best {
        Some((i, volume)) => {
            debug!(
                "[SEQ] candidate {}/{} packs the most volume: {:.3}m3",
                i + 1,
                candidates.len(),
                volume
            );
            Sequence {
                items: ordered(&candidates[i]),
                status: SequenceStatus::Refined,
            }
        }
        None => Sequence {
            items: ordered(&outcome.incumbent),
            status: SequenceStatus::Incumbent,
        },
    }
}
