use crate::EPS;
use crate::entities::{Flags, Item, Placement, TruckSpec};
use crate::packer::layer::{LayerContext, LayerSim};
use crate::packer::support::Support;
use crate::util::PackerConfig;
use itertools::Itertools;
use log::debug;
use ordered_float::OrderedFloat;
use rayon::prelude::*;

/// Outcome of packing the truck in equal shelves of a fixed height.
#[derive(Clone, Debug)]
pub struct ShelfPacking {
    pub shelf_height: f64,
    pub placements: Vec<Placement>,
    pub total_weight: f64,
}

/// Shelf heights to try: the configured ones, the smallest item height and the median distinct item height.
pub fn shelf_heights(items: &[&Item], config: &PackerConfig) -> Vec<f64> {
    let distinct = items
        .iter()
        .map(|i| OrderedFloat(i.height))
        .sorted()
        .dedup()
        .map(|h| h.0)
        .collect_vec();

    let mut heights = config.shelf_heights.to_vec();
    if let (Some(min), Some(median)) = (distinct.first(), distinct.get(distinct.len() / 2)) {
        heights.push(f64::max(config.min_layer_height, *min));
        heights.push(*median);
    }
    heights
}

/// Packs `items` (in order) into `max(1, min(H / shelf_height, max_layers))` shelves stacked from the floor.
/// Every shelf only accepts items that fit its height, using the shelf support rule.
pub fn pack_shelves(
    items: &[&Item],
    truck: &TruckSpec,
    flags: Flags,
    shelf_height: f64,
    config: &PackerConfig,
) -> ShelfPacking {
    let n_shelves = usize::max(1, usize::min((truck.height / shelf_height) as usize, config.max_layers));

    let mut placements: Vec<Placement> = vec![];
    let mut is_placed = vec![false; items.len()];
    let mut total_weight = 0.0;

    for s in 0..n_shelves {
        let z = s as f64 * shelf_height;
        let remaining = (0..items.len())
            .filter(|&i| {
                !is_placed[i]
                    && items[i].height <= shelf_height + EPS
                    && z + items[i].height <= truck.height + EPS
            })
            .collect_vec();
        if remaining.is_empty() {
            continue;
        }

        let ctx = LayerContext {
            truck,
            flags,
            z,
            committed_weight: total_weight,
            support: Support {
                placed: &placements,
                requirement: &config.support,
                rule: config.shelf_support,
                allow_stacking_on_fragile: flags.allow_stacking_on_fragile,
            },
        };
        let sim = LayerSim::run(items, remaining.into_iter(), shelf_height, &ctx);
        let committed = sim.placements(items, z).collect_vec();
        sim.placed.iter().for_each(|sp| is_placed[sp.idx] = true);
        total_weight += sim.weight;
        placements.extend(committed);
    }

    ShelfPacking {
        shelf_height,
        placements,
        total_weight,
    }
}

/// Tries every shelf height in parallel and returns the first packing whose volume utilization
/// exceeds `to_beat` (and all earlier shelf heights).
pub fn best_shelf_packing(
    items: &[&Item],
    truck: &TruckSpec,
    flags: Flags,
    config: &PackerConfig,
    to_beat: f64,
) -> Option<ShelfPacking> {
    let packings = shelf_heights(items, config)
        .into_par_iter()
        .map(|sh| pack_shelves(items, truck, flags, sh, config))
        .collect::<Vec<_>>();

    let mut best: Option<ShelfPacking> = None;
    let mut best_util = to_beat;
    for packing in packings {
        let util = packing.placements.iter().map(|p| p.volume()).sum::<f64>() / truck.volume();
        debug!(
            "[PACK] shelf height {:.3}m: {} items, {:.2}% volume",
            packing.shelf_height,
            packing.placements.len(),
            util * 100.0
        );
        if util > best_util + 1e-6 {
            best_util = util;
            best = Some(packing);
        }
    }
    best
}
