use crate::EPS;
use crate::entities::{Flags, Item, Placement, TruckSpec};
use crate::geometry::{FreeRectArena, Rect};
use crate::packer::support::Support;
use crate::util::PackerConfig;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::collections::HashMap;

/// Everything a layer simulation needs to know about the state of the truck below it.
#[derive(Clone, Copy, Debug)]
pub struct LayerContext<'a> {
    pub truck: &'a TruckSpec,
    pub flags: Flags,
    /// Floor height of the layer
    pub z: f64,
    /// Weight already committed to the truck
    pub committed_weight: f64,
    pub support: Support<'a>,
}

/// An item accepted by a [`LayerSim`], not yet committed to the truck.
#[derive(Clone, Debug, PartialEq)]
pub struct SimPlacement {
    /// Index of the item in the slice passed to [`LayerSim::run`]
    pub idx: usize,
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub width: f64,
}

/// Best-fit simulation of a single layer with a bounded height.
#[derive(Clone, Debug)]
pub struct LayerSim {
    pub placed: Vec<SimPlacement>,
    pub free: FreeRectArena,
    /// Total footprint area of the accepted items
    pub area: f64,
    /// Height of the tallest accepted item
    pub height: f64,
    /// Total weight of the accepted items
    pub weight: f64,
}

impl LayerSim {
    /// Offers the items in `scan` (indices into `items`) one by one to the free floor of the layer.
    /// Each item goes into the free rectangle with the least leftover area, in the first allowed
    /// orientation that fits and is supported.
    pub fn run(
        items: &[&Item],
        scan: impl Iterator<Item = usize>,
        max_height: f64,
        ctx: &LayerContext,
    ) -> Self {
        let truck = ctx.truck;
        let mut sim = LayerSim {
            placed: vec![],
            free: FreeRectArena::new(Rect::from_origin(0.0, 0.0, truck.length, truck.width)),
            area: 0.0,
            height: 0.0,
            weight: 0.0,
        };

        for idx in scan {
            let item = items[idx];
            if item.height > max_height + EPS {
                continue;
            }
            if ctx.flags.enforce_payload
                && ctx.committed_weight + sim.weight + item.weight > truck.payload_kg + EPS
            {
                continue;
            }
            for (l, w) in item.orientations(ctx.flags.allow_rotation) {
                if l > truck.length + EPS || w > truck.width + EPS {
                    continue;
                }
                let Some(key) = sim.free.best_fit(l, w) else {
                    continue;
                };
                let (footprint, free) = sim.free.occupy(key, l, w);
                if !ctx.support.holds(&footprint, ctx.z, item.weight) {
                    //the free rectangle stays available, try the next orientation
                    continue;
                }
                sim.free = free;
                sim.placed.push(SimPlacement {
                    idx,
                    x: footprint.x_min,
                    y: footprint.y_min,
                    length: l,
                    width: w,
                });
                sim.area += l * w;
                sim.height = f64::max(sim.height, item.height);
                sim.weight += item.weight;
                break;
            }
        }
        sim
    }

    /// Rewards dense layers which leave a large contiguous free area and few fragments behind.
    pub fn score(&self, truck: &TruckSpec, config: &PackerConfig) -> f64 {
        let largest_free = self.free.merged().largest_area();
        self.area / f64::max(self.height, 1e-6)
            + config.free_area_bonus * largest_free / truck.floor_area()
            - config.fragmentation_penalty * self.free.len() as f64
    }

    /// Runs a forward and a reverse scan over `remaining` and keeps the better one.
    /// The forward scan wins ties.
    pub fn best_of_both_scans(
        items: &[&Item],
        remaining: &[usize],
        max_height: f64,
        ctx: &LayerContext,
        config: &PackerConfig,
    ) -> (Self, f64) {
        let forward = Self::run(items, remaining.iter().copied(), max_height, ctx);
        let reverse = Self::run(items, remaining.iter().rev().copied(), max_height, ctx);
        let (f_score, r_score) = (
            forward.score(ctx.truck, config),
            reverse.score(ctx.truck, config),
        );
        match r_score > f_score {
            true => (reverse, r_score),
            false => (forward, f_score),
        }
    }

    /// Turns the simulation into placements at height `z`
    pub fn placements<'a>(&'a self, items: &'a [&Item], z: f64) -> impl Iterator<Item = Placement> + 'a {
        self.placed
            .iter()
            .map(move |sp| Placement::new(items[sp.idx], (sp.x, sp.y, z), (sp.length, sp.width)))
    }
}

/// Layer heights worth simulating for the `remaining` items, with `space` left above the layer floor.
///
/// Combines the most frequent heights, a set of quantiles of the distinct heights and the minimum height.
/// The result is clamped to `space`, de-duplicated, sorted ascending and truncated.
pub fn candidate_heights(remaining: &[&Item], space: f64, config: &PackerConfig) -> Vec<f64> {
    if remaining.is_empty() {
        return vec![];
    }

    let mut counts: HashMap<OrderedFloat<f64>, usize> = HashMap::new();
    for item in remaining {
        let rounded = (item.height * 1e6).round() / 1e6;
        *counts.entry(OrderedFloat(rounded)).or_default() += 1;
    }
    let frequent = counts
        .into_iter()
        .sorted_by_key(|&(h, count)| (std::cmp::Reverse(count), h))
        .take(config.n_frequent_heights)
        .map(|(h, _)| h.0);

    let distinct = remaining
        .iter()
        .map(|i| OrderedFloat(i.height))
        .sorted()
        .dedup()
        .map(|h| h.0)
        .collect_vec();
    let n = distinct.len();
    let quantiles = config
        .height_quantiles
        .iter()
        .map(|q| distinct[usize::min(n - 1, (q * n as f64) as usize)]);

    frequent
        .chain(quantiles)
        .chain([distinct[0]])
        .map(|h| f64::min(h, space))
        .filter(|&h| h > EPS)
        .map(OrderedFloat)
        .sorted()
        .dedup()
        .take(config.max_candidate_heights)
        .map(|h| h.0)
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::PackerConfig;

    fn items(heights: &[f64]) -> Vec<Item> {
        heights
            .iter()
            .enumerate()
            .map(|(i, &h)| Item::plain(i, 0.5, 0.5, h, 5.0).unwrap())
            .collect()
    }

    #[test]
    fn candidate_heights_are_sorted_unique_and_clamped() {
        let config = PackerConfig::default();
        let items = items(&[0.3, 0.3, 0.3, 0.5, 0.8, 1.2, 0.3, 0.5]);
        let refs = items.iter().collect_vec();
        let heights = candidate_heights(&refs, 1.0, &config);
        assert_eq!(heights, vec![0.3, 0.5, 0.8, 1.0]);
    }

    #[test]
    fn candidate_heights_are_truncated() {
        let config = PackerConfig::default();
        let hs = (1..=30).map(|i| i as f64 * 0.05).collect_vec();
        let items = items(&hs);
        let refs = items.iter().collect_vec();
        let heights = candidate_heights(&refs, 10.0, &config);
        assert_eq!(heights.len(), config.max_candidate_heights);
        assert!(heights.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn floor_layer_fills_side_by_side() {
        let config = PackerConfig::default();
        let truck = TruckSpec::try_new(2.0, 1.0, 1.0, 1000.0).unwrap();
        let items = items(&[0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]);
        let refs = items.iter().collect_vec();
        let ctx = LayerContext {
            truck: &truck,
            flags: Flags::default(),
            z: 0.0,
            committed_weight: 0.0,
            support: Support {
                placed: &[],
                requirement: &config.support,
                rule: config.layer_support,
                allow_stacking_on_fragile: true,
            },
        };
        let sim = LayerSim::run(&refs, 0..refs.len(), 0.5, &ctx);
        //a 2 x 1 floor holds 8 squares of 0.5 x 0.5
        assert_eq!(sim.placed.len(), 8);
        assert!((sim.area - 2.0).abs() < 1e-9);
        assert!(sim.free.is_empty());
    }

    #[test]
    fn weight_gate_counts_simulated_weight() {
        let config = PackerConfig::default();
        let truck = TruckSpec::try_new(2.0, 1.0, 1.0, 12.0).unwrap();
        let items = items(&[0.5, 0.5, 0.5]);
        let refs = items.iter().collect_vec();
        let ctx = LayerContext {
            truck: &truck,
            flags: Flags::default(),
            z: 0.0,
            committed_weight: 0.0,
            support: Support {
                placed: &[],
                requirement: &config.support,
                rule: config.layer_support,
                allow_stacking_on_fragile: true,
            },
        };
        let sim = LayerSim::run(&refs, 0..refs.len(), 0.5, &ctx);
        assert_eq!(sim.placed.len(), 2);
        assert!(sim.weight <= truck.payload_kg);
    }
}
