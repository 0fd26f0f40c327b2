use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use truckload::entities::{Item, TruckSpec};

/// Configuration of the scoring selector
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct HeuristicConfig {
    /// Number of best scoring items to keep
    pub top_k: usize,
    /// Item height (m) at which the height term peaks
    pub h_ref: f64,
    /// Margin (m) subtracted from half the truck width to obtain the lane width
    pub lane_margin: f64,
    pub w_volume: f64,
    /// Only awarded to items which fit in a lane
    pub w_footprint: f64,
    pub w_height: f64,
    pub w_light: f64,
    pub fragile_penalty: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            top_k: 180,
            h_ref: 0.45,
            lane_margin: 0.01,
            w_volume: 1.0,
            w_footprint: 0.5,
            w_height: 0.2,
            w_light: 0.1,
            fragile_penalty: 0.3,
        }
    }
}

pub fn lane_width(truck: &TruckSpec, config: &HeuristicConfig) -> f64 {
    truck.width / 2.0 - config.lane_margin
}

/// Composite desirability of an item, higher is better
pub fn score(item: &Item, truck: &TruckSpec, config: &HeuristicConfig) -> f64 {
    let lane = lane_width(truck, config);
    let fits_lane = item
        .orientations(true)
        .any(|(l, w)| w <= lane && l <= truck.length);

    let footprint = match fits_lane {
        true => item.footprint_area(),
        false => 0.0,
    };
    let height_dev = (item.height - config.h_ref) / config.h_ref;
    let fragile = match item.fragile {
        true => config.fragile_penalty,
        false => 0.0,
    };

    config.w_volume * item.volume()
        + config.w_footprint * footprint
        + config.w_height / (1.0 + height_dev * height_dev)
        + config.w_light / (1.0 + item.weight)
        - fragile
}

/// Indices of the `top_k` best scoring candidates, in ascending order.
/// Capacities are not taken into account.
pub fn top_k(candidates: &[Item], truck: &TruckSpec, config: &HeuristicConfig) -> Vec<usize> {
    candidates
        .iter()
        .enumerate()
        .sorted_by_key(|(_, item)| std::cmp::Reverse(OrderedFloat(score(item, truck, config))))
        .take(config.top_k)
        .map(|(i, _)| i)
        .sorted()
        .collect_vec()
}
