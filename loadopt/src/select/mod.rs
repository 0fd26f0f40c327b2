use std::time::Instant;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use truckload::entities::{Item, TruckSpec};

use crate::select::exact::{ExactConfig, ExactOutcome};
use crate::select::heuristic::HeuristicConfig;

/// Branch-and-bound over the two capacity constraints
pub mod exact;

/// Capacity-agnostic scoring of individual items
pub mod heuristic;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Maximize the weighted volume and weight of the subset under the truck's payload and volume
    Exact,
    /// Keep the best scoring items, capacities are not enforced
    Heuristic,
    /// Keep all candidates
    PassThrough,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionStatus {
    /// The exact selector proved its subset optimal
    Optimal,
    /// The exact selector ran out of time, its subset respects the capacities
    Feasible,
    /// The subset was chosen by the scoring selector
    Heuristic,
    /// All candidates were kept
    Unchanged,
}

/// Configuration of the selector
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    pub strategy: SelectionStrategy,
    pub exact: ExactConfig,
    pub heuristic: HeuristicConfig,
    /// Run the scoring selector when the exact selector cannot produce a subset
    pub heuristic_fallback: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::Exact,
            exact: ExactConfig::default(),
            heuristic: HeuristicConfig::default(),
            heuristic_fallback: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Selection {
    /// Subset of the candidates, in candidate order
    pub items: Vec<Item>,
    pub status: SelectionStatus,
}

/// Chooses which of the `candidates` to attempt to load.
/// Never fails, the status tells which guarantee the subset carries.
pub fn select(candidates: &[Item], truck: &TruckSpec, config: &SelectorConfig) -> Selection {
    let start = Instant::now();
    let selection = match config.strategy {
        SelectionStrategy::PassThrough => unchanged(candidates),
        SelectionStrategy::Heuristic => by_heuristic(candidates, truck, &config.heuristic),
        SelectionStrategy::Exact => match exact::solve(candidates, truck, &config.exact) {
            ExactOutcome::Optimal(chosen) => Selection {
                items: pick(candidates, &chosen),
                status: SelectionStatus::Optimal,
            },
            ExactOutcome::Feasible(chosen) => Selection {
                items: pick(candidates, &chosen),
                status: SelectionStatus::Feasible,
            },
            ExactOutcome::Degenerate => {
                warn!("[SELECT] exact selection not possible for {} candidates", candidates.len());
                match config.heuristic_fallback {
                    true => by_heuristic(candidates, truck, &config.heuristic),
                    false => unchanged(candidates),
                }
            }
        },
    };
    info!(
        "[SELECT] selected {}/{} candidates ({:?}) in {:.3}ms",
        selection.items.len(),
        candidates.len(),
        selection.status,
        start.elapsed().as_secs_f64() * 1000.0
    );
    selection
}

fn unchanged(candidates: &[Item]) -> Selection {
    Selection {
        items: candidates.to_vec(),
        status: SelectionStatus::Unchanged,
    }
}

fn by_heuristic(candidates: &[Item], truck: &TruckSpec, config: &HeuristicConfig) -> Selection {
    let chosen = heuristic::top_k(candidates, truck, config);
    Selection {
        items: pick(candidates, &chosen),
        status: SelectionStatus::Heuristic,
    }
}

fn pick(candidates: &[Item], indices: &[usize]) -> Vec<Item> {
    indices.iter().map(|&i| candidates[i].clone()).collect()
}
