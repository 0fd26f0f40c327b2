use itertools::Itertools;
use log::info;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use truckload::entities::Item;

/// Configuration of the candidate-pool prefilter
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct PrefilterConfig {
    /// Maximum number of small items in the pool
    pub n_small: usize,
    /// Maximum number of large items in the pool
    pub n_large: usize,
    /// Items with a footprint up to this area (m2) are small
    pub small_area_threshold: f64,
}

impl Default for PrefilterConfig {
    fn default() -> Self {
        Self {
            n_small: 180,
            n_large: 40,
            small_area_threshold: 1.0,
        }
    }
}

/// Narrows the full item list down to the candidates worth selecting from.
///
/// Small items are ranked by stack limit, drop order and volume (all descending),
/// large items by volume alone. The pool holds the best small items followed by the best large ones.
pub fn candidate_pool(items: &[Item], config: &PrefilterConfig) -> Vec<Item> {
    let (small, large): (Vec<&Item>, Vec<&Item>) = items
        .iter()
        .partition(|i| i.footprint_area() <= config.small_area_threshold);

    let small = small
        .into_iter()
        .sorted_by_key(|i| (Reverse(i.stack_limit), Reverse(i.drop_order), Reverse(OrderedFloat(i.volume()))))
        .take(config.n_small)
        .collect_vec();
    let large = large
        .into_iter()
        .sorted_by_key(|i| Reverse(OrderedFloat(i.volume())))
        .take(config.n_large)
        .collect_vec();

    info!(
        "[PLAN] candidate pool: {} (small={}, large={})",
        small.len() + large.len(),
        small.len(),
        large.len()
    );

    small.into_iter().chain(large).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_takes_best_small_then_best_large() {
        let mut items = vec![
            Item::plain(0, 0.5, 0.5, 0.5, 5.0).unwrap(),
            Item::plain(1, 1.5, 1.0, 0.5, 5.0).unwrap(),
            Item::plain(2, 0.6, 0.6, 0.6, 5.0).unwrap(),
            Item::plain(3, 2.0, 1.0, 0.5, 5.0).unwrap(),
            Item::plain(4, 0.4, 0.4, 0.4, 5.0).unwrap(),
        ];
        items[0].stack_limit = 3;
        let config = PrefilterConfig {
            n_small: 2,
            n_large: 1,
            ..PrefilterConfig::default()
        };
        let ids = candidate_pool(&items, &config).iter().map(|i| i.id).collect_vec();
        assert_eq!(ids, vec![0, 2, 3]);
    }
}
