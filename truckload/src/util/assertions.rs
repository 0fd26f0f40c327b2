use crate::EPS;
use crate::entities::{Flags, Item, Placement, TruckSpec};
use crate::geometry::geo_traits::CollidesWith;
use crate::packer::support::Support;
use crate::util::PackerConfig;
use float_cmp::approx_eq;
use itertools::Itertools;
use log::error;
use std::collections::{HashMap, HashSet};
//Various checks to verify correctness of a packing result
//Used in debug_assert!() blocks and in tests

pub fn placements_do_not_overlap(placements: &[Placement]) -> bool {
    for (a, b) in placements.iter().tuple_combinations() {
        if a.cuboid().collides_with(&b.cuboid()) {
            error!("placements of items {} and {} overlap: {a:?}, {b:?}", a.id, b.id);
            return false;
        }
    }
    true
}

pub fn placements_within_truck(placements: &[Placement], truck: &TruckSpec) -> bool {
    placements.iter().all(|p| {
        let inside = p.x >= -EPS
            && p.y >= -EPS
            && p.z >= -EPS
            && p.x + p.length <= truck.length + EPS
            && p.y + p.width <= truck.width + EPS
            && p.top() <= truck.height + EPS;
        if !inside {
            error!("placement of item {} exceeds the truck: {p:?}", p.id);
        }
        inside
    })
}

/// Every placement refers to an item of `items`, and no item is placed twice
pub fn placement_ids_valid(placements: &[Placement], items: &[Item]) -> bool {
    let known: HashSet<usize> = items.iter().map(|i| i.id).collect();
    let mut seen = HashSet::new();
    placements.iter().all(|p| {
        let valid = known.contains(&p.id) && seen.insert(p.id);
        if !valid {
            error!("placement of item {} is unknown or duplicated", p.id);
        }
        valid
    })
}

pub fn payload_respected(placements: &[Placement], truck: &TruckSpec, flags: Flags) -> bool {
    let total = placements.iter().map(|p| p.weight).sum::<f64>();
    let respected = !flags.enforce_payload || total <= truck.payload_kg + EPS;
    if !respected {
        error!("placed weight {total} exceeds payload {}", truck.payload_kg);
    }
    respected
}

/// Non-rotatable items keep their original footprint
pub fn orientations_respected(placements: &[Placement], items: &[Item], flags: Flags) -> bool {
    let by_id: HashMap<usize, &Item> = items.iter().map(|i| (i.id, i)).collect();
    placements.iter().all(|p| {
        let Some(item) = by_id.get(&p.id) else {
            return false;
        };
        let same = |a: f64, b: f64| approx_eq!(f64, a, b, epsilon = EPS);
        let original = same(p.length, item.length) && same(p.width, item.width);
        let swapped = same(p.length, item.width) && same(p.width, item.length);
        let respected = original || (swapped && item.can_rotate && flags.allow_rotation);
        if !respected {
            error!("item {} is placed in a forbidden orientation: {p:?}", p.id);
        }
        respected
    })
}

/// Every elevated placement is supported by the placements strictly below it,
/// according to either the layer or the shelf support rule.
pub fn placements_supported(placements: &[Placement], flags: Flags, config: &PackerConfig) -> bool {
    placements.iter().filter(|p| p.z > EPS).all(|p| {
        let below = placements
            .iter()
            .filter(|q| q.z + EPS < p.z)
            .cloned()
            .collect_vec();
        let supported = [config.layer_support, config.shelf_support]
            .into_iter()
            .any(|rule| {
                Support {
                    placed: &below,
                    requirement: &config.support,
                    rule,
                    allow_stacking_on_fragile: flags.allow_stacking_on_fragile,
                }
                .holds(&p.footprint(), p.z, p.weight)
            });
        if !supported {
            error!("placement of item {} is not sufficiently supported: {p:?}", p.id);
        }
        supported
    })
}

/// Runs all checks that hold for any packing result
pub fn packing_is_valid(
    placements: &[Placement],
    items: &[Item],
    truck: &TruckSpec,
    flags: Flags,
    config: &PackerConfig,
) -> bool {
    placements_do_not_overlap(placements)
        && placements_within_truck(placements, truck)
        && placement_ids_valid(placements, items)
        && payload_respected(placements, truck, flags)
        && orientations_respected(placements, items, flags)
        && placements_supported(placements, flags, config)
}
