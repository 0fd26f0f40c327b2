use crate::EPS;
use crate::entities::{Flags, Item, Placement, TruckSpec};
use crate::packer::layer::{LayerContext, LayerSim, candidate_heights};
use crate::packer::support::Support;
use crate::util::{PackerConfig, assertions};
use itertools::Itertools;
use log::{debug, info};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

/// Best-fit simulation of a single layer and the selection of layer heights
pub mod layer;

/// Fixed-height shelves, used when layering leaves the truck mostly empty
pub mod shelf;

/// Vertical support validation
pub mod support;

/// How the placements of a [`PackResult`] were obtained
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum PackStatus {
    /// Nothing could be placed
    Empty,
    Layered { n_layers: usize },
    ShelfFallback { shelf_height: f64 },
}

#[derive(Clone, Debug)]
pub struct PackResult {
    pub placements: Vec<Placement>,
    pub total_weight: f64,
    pub status: PackStatus,
}

impl PackResult {
    pub fn placed_volume(&self) -> f64 {
        self.placements.iter().map(|p| p.volume()).sum()
    }

    /// Placed volume as a fraction of the truck volume
    pub fn volume_utilization(&self, truck: &TruckSpec) -> f64 {
        self.placed_volume() / truck.volume()
    }

    /// Placed weight as a fraction of the payload
    pub fn weight_utilization(&self, truck: &TruckSpec) -> f64 {
        match truck.payload_kg > 0.0 {
            true => self.total_weight / truck.payload_kg,
            false => 0.0,
        }
    }
}

/// Packs (a subset of) `items` into the truck, layer by layer.
///
/// The items are sorted by height first, so the order in which they are passed in
/// only matters among items with identical sort keys.
/// If the layered packing ends up with a single level or a poor utilization,
/// a packing in fixed-height shelves is attempted and kept if it is strictly better.
///
/// Never fails: items that cannot be placed are simply left out.
pub fn pack(truck: &TruckSpec, flags: Flags, items: &[Item], config: &PackerConfig) -> PackResult {
    let start = Instant::now();
    let order = packing_order(items, flags);

    let mut result = pack_layers(truck, flags, &order, config);

    let n_levels = result
        .placements
        .iter()
        .map(|p| OrderedFloat(p.z))
        .unique()
        .count();
    let layered_util = result.volume_utilization(truck);
    if !order.is_empty() && (n_levels <= 1 || layered_util < config.shelf_trigger_utilization) {
        debug!(
            "[PACK] layered packing reached {:.2}% volume on {n_levels} level(s), trying shelves",
            layered_util * 100.0
        );
        if let Some(shelves) = shelf::best_shelf_packing(&order, truck, flags, config, layered_util) {
            result = PackResult {
                placements: shelves.placements,
                total_weight: shelves.total_weight,
                status: PackStatus::ShelfFallback {
                    shelf_height: shelves.shelf_height,
                },
            };
        }
    }

    if result.placements.is_empty() {
        result.status = PackStatus::Empty;
    }

    debug_assert!(assertions::packing_is_valid(
        &result.placements,
        items,
        truck,
        flags,
        config
    ));

    info!(
        "[PACK] placed {}/{} items ({:.2}% volume, {:.1} kg, {:?}) in {:.3}ms",
        result.placements.len(),
        items.len(),
        result.volume_utilization(truck) * 100.0,
        result.total_weight,
        result.status,
        start.elapsed().as_secs_f64() * 1000.0
    );

    result
}

/// Ascending height, then descending footprint, weight and stack limit.
/// With `delivery_sequence` enabled, later drops go first among otherwise equal items.
/// The sort is stable.
pub fn packing_order(items: &[Item], flags: Flags) -> Vec<&Item> {
    items
        .iter()
        .sorted_by(|a, b| {
            OrderedFloat(a.height)
                .cmp(&OrderedFloat(b.height))
                .then(OrderedFloat(b.footprint_area()).cmp(&OrderedFloat(a.footprint_area())))
                .then(OrderedFloat(b.weight).cmp(&OrderedFloat(a.weight)))
                .then(b.stack_limit.cmp(&a.stack_limit))
                .then(match flags.delivery_sequence {
                    true => b.drop_order.cmp(&a.drop_order),
                    false => Ordering::Equal,
                })
        })
        .collect_vec()
}

/// Number of layers allowed, bounded by how many of the lowest items fit on top of each other
pub fn layer_cap(items: &[&Item], truck: &TruckSpec, config: &PackerConfig) -> usize {
    let min_height = items
        .iter()
        .map(|i| i.height)
        .fold(f64::INFINITY, f64::min);
    if !min_height.is_finite() {
        return 1;
    }
    let fitting = (truck.height / f64::max(min_height, config.min_layer_height)) as usize;
    usize::max(1, usize::min(config.max_layers, fitting))
}

/// Layer-by-layer packing of `items` in the given order, without the shelf fallback
pub fn pack_layers(truck: &TruckSpec, flags: Flags, items: &[&Item], config: &PackerConfig) -> PackResult {
    let max_layers = layer_cap(items, truck, config);

    let mut placements: Vec<Placement> = vec![];
    let mut is_placed = vec![false; items.len()];
    let mut total_weight = 0.0;
    let mut z = 0.0;
    let mut n_layers = 0;

    while n_layers < max_layers && z + EPS < truck.height {
        let remaining = (0..items.len())
            .filter(|&i| !is_placed[i] && z + items[i].height <= truck.height + EPS)
            .collect_vec();
        if remaining.is_empty() {
            break;
        }

        let remaining_items = remaining.iter().map(|&i| items[i]).collect_vec();
        let heights = candidate_heights(&remaining_items, truck.height - z, config);

        let ctx = LayerContext {
            truck,
            flags,
            z,
            committed_weight: total_weight,
            support: Support {
                placed: &placements,
                requirement: &config.support,
                rule: config.layer_support,
                allow_stacking_on_fragile: flags.allow_stacking_on_fragile,
            },
        };

        //simulate all candidate heights in parallel, reduce in candidate order
        let sims = heights
            .par_iter()
            .map(|&h| LayerSim::best_of_both_scans(items, &remaining, h, &ctx, config))
            .collect::<Vec<_>>();

        let Some(best) = choose_layer(sims) else {
            break;
        };

        let committed = best.placements(items, z).collect_vec();
        best.placed.iter().for_each(|sp| is_placed[sp.idx] = true);
        total_weight += best.weight;
        debug!(
            "[PACK] layer {} at z={:.3}m: {} items, height {:.3}m, {:.1} kg",
            n_layers,
            z,
            committed.len(),
            best.height,
            total_weight
        );
        placements.extend(committed);
        z += best.height;
        n_layers += 1;
    }

    PackResult {
        placements,
        total_weight,
        status: PackStatus::Layered { n_layers },
    }
}

/// Highest scoring simulation which placed anything. Ties go to the larger placed area, then to the first.
fn choose_layer(sims: Vec<(LayerSim, f64)>) -> Option<LayerSim> {
    let mut best: Option<(LayerSim, f64)> = None;
    for (sim, score) in sims {
        if sim.placed.is_empty() || sim.area <= EPS {
            continue;
        }
        let better = match &best {
            None => true,
            Some((b_sim, b_score)) => {
                score > b_score + EPS || ((score - b_score).abs() <= EPS && sim.area > b_sim.area)
            }
        };
        if better {
            best = Some((sim, score));
        }
    }
    best.map(|(sim, _)| sim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_sorts_by_height_then_footprint() {
        let items = vec![
            Item::plain(0, 1.0, 1.0, 0.5, 10.0).unwrap(),
            Item::plain(1, 2.0, 1.0, 0.5, 10.0).unwrap(),
            Item::plain(2, 3.0, 1.0, 0.2, 10.0).unwrap(),
        ];
        let ids = packing_order(&items, Flags::default())
            .iter()
            .map(|i| i.id)
            .collect_vec();
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[test]
    fn delivery_sequence_breaks_ties_by_drop_order() {
        let mut items = vec![
            Item::plain(0, 1.0, 1.0, 0.5, 10.0).unwrap(),
            Item::plain(1, 1.0, 1.0, 0.5, 10.0).unwrap(),
        ];
        items[1].drop_order = 3;

        let with = packing_order(&items, Flags::default());
        assert_eq!(with[0].id, 1);

        let flags = Flags {
            delivery_sequence: false,
            ..Flags::default()
        };
        let without = packing_order(&items, flags);
        assert_eq!(without[0].id, 0);
    }

    #[test]
    fn layer_cap_is_bounded() {
        let config = PackerConfig::default();
        let truck = TruckSpec::default();
        let low = Item::plain(0, 1.0, 1.0, 0.01, 1.0).unwrap();
        let high = Item::plain(1, 1.0, 1.0, 1.5, 1.0).unwrap();
        assert_eq!(layer_cap(&[&low], &truck, &config), config.max_layers);
        assert_eq!(layer_cap(&[&high], &truck, &config), 1);
        assert_eq!(layer_cap(&[], &truck, &config), 1);
    }
}
