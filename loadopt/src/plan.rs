use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};
use truckload::entities::{Item, Placement};
use truckload::packer::{PackStatus, pack};

use crate::config::LoadOptConfig;
use crate::pool;
use crate::select::{self, SelectionStatus};
use crate::sequence::{self, SequenceStatus};

/// Outcome of a planning run: the placements and how they were obtained
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LoadPlan {
    pub placements: Vec<Placement>,
    pub total_weight: f64,
    pub volume_utilization_pct: f64,
    pub weight_utilization_pct: f64,
    /// Number of items in the candidate pool
    pub n_candidates: usize,
    /// Number of items kept by the selector
    pub n_selected: usize,
    pub selection_status: SelectionStatus,
    pub sequence_status: SequenceStatus,
    pub pack_status: PackStatus,
}

/// Runs the full pipeline: prefilter, select, sequence and pack.
pub fn plan(items: &[Item], config: &LoadOptConfig) -> LoadPlan {
    let candidates = pool::candidate_pool(items, &config.prefilter);
    plan_candidates(&candidates, config)
}

/// Runs select, sequence and pack on an already prefiltered candidate pool.
pub fn plan_candidates(candidates: &[Item], config: &LoadOptConfig) -> LoadPlan {
    let start = Instant::now();
    let truck = &config.truck;

    let selection = select::select(candidates, truck, &config.selector);

    let sequence = match &config.sequencer {
        Some(seq_config) => sequence::reorder(
            &selection.items,
            truck,
            config.flags,
            &config.packer,
            seq_config,
        ),
        None => sequence::Sequence {
            items: selection.items.clone(),
            status: SequenceStatus::Unchanged,
        },
    };

    let result = pack(truck, config.flags, &sequence.items, &config.packer);

    let plan = LoadPlan {
        volume_utilization_pct: result.volume_utilization(truck) * 100.0,
        weight_utilization_pct: result.weight_utilization(truck) * 100.0,
        total_weight: result.total_weight,
        placements: result.placements,
        n_candidates: candidates.len(),
        n_selected: selection.items.len(),
        selection_status: selection.status,
        sequence_status: sequence.status,
        pack_status: result.status,
    };

    info!(
        "[PLAN] placed {}/{} selected items, {:.1}% volume, {:.1}% weight in {:.3}ms",
        plan.placements.len(),
        plan.n_selected,
        plan.volume_utilization_pct,
        plan.weight_utilization_pct,
        start.elapsed().as_secs_f64() * 1000.0
    );
    plan
}
