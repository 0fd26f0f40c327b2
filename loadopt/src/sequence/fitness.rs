use anyhow::{Result, ensure};
use itertools::Itertools;
use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayView1, Axis};
use ordered_float::OrderedFloat;
use truckload::entities::{Item, TruckSpec};

/// Share of the volume utilization in the proxy fitness, the remainder goes to weight utilization
const VOLUME_SHARE: f64 = 0.9;

/// Per-item quantities needed to evaluate orders without packing them
#[derive(Clone, Debug)]
pub struct ProxyModel {
    volumes: Vec<f64>,
    weights: Vec<f64>,
    cap_volume: f64,
    cap_weight: f64,
}

impl ProxyModel {
    pub fn new(items: &[Item], truck: &TruckSpec) -> Result<Self> {
        let (cap_volume, cap_weight) = (truck.volume(), truck.payload_kg);
        ensure!(
            cap_volume > 0.0 && cap_weight > 0.0,
            "truck capacities must be positive, volume: {cap_volume}, payload: {cap_weight}"
        );
        Ok(Self {
            volumes: items.iter().map(|i| i.volume()).collect(),
            weights: items.iter().map(|i| i.weight).collect(),
            cap_volume,
            cap_weight,
        })
    }

    /// Fitness of a single order: the items count as long as the cumulative volume and weight
    /// along the order stay within capacity.
    pub fn fitness(&self, order: ArrayView1<usize>) -> f64 {
        let (mut cum_volume, mut cum_weight) = (0.0, 0.0);
        let (mut counted_volume, mut counted_weight) = (0.0, 0.0);
        for &i in order.iter() {
            cum_volume += self.volumes[i];
            cum_weight += self.weights[i];
            if cum_volume <= self.cap_volume && cum_weight <= self.cap_weight {
                counted_volume += self.volumes[i];
                counted_weight += self.weights[i];
            }
        }
        VOLUME_SHARE * counted_volume / self.cap_volume
            + (1.0 - VOLUME_SHARE) * counted_weight / self.cap_weight
    }

    /// Evaluates every row of the population in parallel, in row order.
    pub fn evaluate(&self, population: &Array2<usize>) -> Result<Vec<f64>> {
        let fitness = population
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| self.fitness(row))
            .collect::<Vec<f64>>();
        ensure!(
            fitness.iter().all(|f| f.is_finite()),
            "non-finite fitness in population"
        );
        Ok(fitness)
    }
}

/// Row indices sorted by descending fitness, ties keep row order
pub fn ranked(fitness: &[f64]) -> Vec<usize> {
    (0..fitness.len())
        .sorted_by_key(|&i| std::cmp::Reverse(OrderedFloat(fitness[i])))
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use ndarray::array;

    #[test]
    fn items_beyond_capacity_stop_counting() {
        let truck = TruckSpec::try_new(1.0, 1.0, 1.0, 100.0).unwrap();
        let items = vec![
            Item::plain(0, 1.0, 1.0, 0.5, 10.0).unwrap(),
            Item::plain(1, 1.0, 1.0, 0.6, 10.0).unwrap(),
            Item::plain(2, 1.0, 1.0, 0.4, 10.0).unwrap(),
        ];
        let model = ProxyModel::new(&items, &truck).unwrap();
        let population = array![[0, 2, 1], [0, 1, 2]];
        let fitness = model.evaluate(&population).unwrap();
        //0.5 + 0.4 fit, after which the cumulative volume exceeds the truck
        assert!(approx_eq!(f64, fitness[0], 0.9 * 0.9 + 0.1 * 0.2, epsilon = 1e-12));
        //0.5 fits, 0.5 + 0.6 does not and neither does anything after it
        assert!(approx_eq!(f64, fitness[1], 0.9 * 0.5 + 0.1 * 0.1, epsilon = 1e-12));
        assert_eq!(ranked(&fitness), vec![0, 1]);
    }

    #[test]
    fn zero_payload_is_rejected() {
        let truck = TruckSpec::try_new(1.0, 1.0, 1.0, 0.0).unwrap();
        assert!(ProxyModel::new(&[], &truck).is_err());
    }
}
