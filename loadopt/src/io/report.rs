use serde::{Deserialize, Serialize};
use truckload::packer::PackStatus;

use crate::bench::GridPoint;
use crate::config::LoadOptConfig;
use crate::plan::LoadPlan;
use crate::select::SelectionStatus;
use crate::sequence::SequenceStatus;

/// Summary of a planning run, written next to the layout
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlanReport {
    pub placed_items: usize,
    pub volume_utilization_pct: f64,
    pub weight_utilization_pct: f64,
    pub total_weight_kg: f64,
    pub n_candidates: usize,
    pub n_selected: usize,
    pub selection_status: SelectionStatus,
    pub sequence_status: SequenceStatus,
    pub pack_status: PackStatus,
    /// Wall time of the run (s)
    pub run_time_sec: f64,
    /// Benchmark parameters that produced this plan, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub grid_point: Option<GridPoint>,
    pub config: LoadOptConfig,
}

impl PlanReport {
    pub fn new(plan: &LoadPlan, config: &LoadOptConfig, run_time_sec: f64, grid_point: Option<GridPoint>) -> Self {
        Self {
            placed_items: plan.placements.len(),
            volume_utilization_pct: round2(plan.volume_utilization_pct),
            weight_utilization_pct: round2(plan.weight_utilization_pct),
            total_weight_kg: round2(plan.total_weight),
            n_candidates: plan.n_candidates,
            n_selected: plan.n_selected,
            selection_status: plan.selection_status,
            sequence_status: plan.sequence_status,
            pack_status: plan.pack_status,
            run_time_sec,
            grid_point,
            config: *config,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
