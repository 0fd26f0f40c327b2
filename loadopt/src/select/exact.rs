use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use itertools::Itertools;
use log::debug;
use ordered_float::OrderedFloat;
use rand::SeedableRng;
use rand::prelude::SliceRandom;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thousands::Separable;
use truckload::entities::{Item, TruckSpec};

/// Number of nodes between two deadline checks
const DEADLINE_CHECK_INTERVAL: u64 = 256;

/// Configuration of the exact (branch-and-bound) selector
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ExactConfig {
    /// Wall-clock budget shared by all workers
    pub time_budget_ms: u64,
    /// Number of portfolio workers, each with its own branching order
    pub n_workers: usize,
    /// Objective weight of volume (litres)
    pub alpha: u64,
    /// Objective weight of weight (kg)
    pub beta: u64,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: 1800,
            n_workers: 4,
            alpha: 10,
            beta: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExactOutcome {
    /// The search tree of at least one worker was exhausted
    Optimal(Vec<usize>),
    /// The deadline expired, the best subset found so far is returned
    Feasible(Vec<usize>),
    /// The model could not be built, or the search timed out without an incumbent
    Degenerate,
}

/// 0/1 knapsack with a weight and a volume constraint, in integer units (kg and litres).
#[derive(Clone, Debug)]
struct Knapsack {
    value: Vec<u64>,
    weight: Vec<u64>,
    volume: Vec<u64>,
    cap_weight: u64,
    cap_volume: u64,
    /// Items sorted by value per kg, descending
    by_weight_density: Vec<usize>,
    /// Items sorted by value per litre, descending
    by_volume_density: Vec<usize>,
}

impl Knapsack {
    fn build(candidates: &[Item], truck: &TruckSpec, config: &ExactConfig) -> Option<Self> {
        let cap_weight = truck.payload_kg;
        let cap_volume = truck.volume() * 1000.0;
        if !(cap_weight.is_finite() && cap_volume.is_finite()) || cap_weight < 0.0 || cap_volume < 0.0 {
            return None;
        }
        let mut weight = Vec::with_capacity(candidates.len());
        let mut volume = Vec::with_capacity(candidates.len());
        for item in candidates {
            //rounded up, so that integer feasibility implies feasibility of the real quantities
            let (w, v) = (item.weight.ceil(), (item.volume() * 1000.0).ceil());
            if !(w.is_finite() && v.is_finite()) || w < 0.0 || v < 0.0 {
                return None;
            }
            weight.push(w as u64);
            volume.push(v as u64);
        }
        let value = weight
            .iter()
            .zip(&volume)
            .map(|(&w, &v)| config.alpha * v + config.beta * w)
            .collect_vec();

        let by_density = |resource: &[u64]| {
            (0..value.len())
                .sorted_by_key(|&i| Reverse(density(value[i], resource[i])))
                .collect_vec()
        };
        let by_weight_density = by_density(weight.as_slice());
        let by_volume_density = by_density(volume.as_slice());

        Some(Self {
            value,
            weight,
            volume,
            cap_weight: cap_weight as u64,
            cap_volume: cap_volume as u64,
            by_weight_density,
            by_volume_density,
        })
    }

    fn len(&self) -> usize {
        self.value.len()
    }

    /// Order in which worker `worker_id` decides on the items
    fn branching_order(&self, worker_id: usize) -> Vec<usize> {
        let n = self.len();
        let mut order = match worker_id % 4 {
            0 => self.by_weight_density.clone(),
            1 => self.by_volume_density.clone(),
            2 => (0..n).sorted_by_key(|&i| Reverse(self.value[i])).collect(),
            _ => {
                //value relative to the share of both capacities an item consumes
                let share = |i: usize| {
                    self.weight[i] as f64 / f64::max(self.cap_weight as f64, 1.0)
                        + self.volume[i] as f64 / f64::max(self.cap_volume as f64, 1.0)
                };
                (0..n)
                    .sorted_by_key(|&i| Reverse(OrderedFloat(self.value[i] as f64 / f64::max(share(i), 1e-12))))
                    .collect()
            }
        };
        if worker_id >= 4 {
            //workers beyond the four base orders search from a shuffled order
            order.shuffle(&mut SmallRng::seed_from_u64(worker_id as u64));
        }
        order
    }
}

fn density(value: u64, resource: u64) -> OrderedFloat<f64> {
    match resource {
        0 => OrderedFloat(f64::INFINITY),
        r => OrderedFloat(value as f64 / r as f64),
    }
}

/// Maximizes `alpha * volume + beta * weight` of a subset of `candidates`
/// under the payload and volume of the truck.
///
/// A portfolio of depth-first branch-and-bound workers runs on the rayon pool, sharing the best objective value for pruning.
/// Returns the indices of the chosen candidates, in ascending order.
pub fn solve(candidates: &[Item], truck: &TruckSpec, config: &ExactConfig) -> ExactOutcome {
    if config.time_budget_ms == 0 || config.n_workers == 0 {
        return ExactOutcome::Degenerate;
    }
    let Some(knapsack) = Knapsack::build(candidates, truck, config) else {
        return ExactOutcome::Degenerate;
    };

    let deadline = Instant::now() + Duration::from_millis(config.time_budget_ms);
    let shared_best = AtomicU64::new(0);
    let proven = AtomicBool::new(false);

    let results = (0..config.n_workers)
        .into_par_iter()
        .map(|worker_id| {
            let mut worker = Worker::new(&knapsack, worker_id, &shared_best, &proven, deadline);
            worker.search(0, 0, knapsack.cap_weight, knapsack.cap_volume);
            if !worker.timed_out && !proven.load(Ordering::Relaxed) {
                proven.store(true, Ordering::Relaxed);
                worker.exhausted = true;
            }
            debug!(
                "[SELECT] worker {} explored {} nodes (best: {}, exhausted: {})",
                worker_id,
                worker.n_nodes.separate_with_commas(),
                worker.best_value,
                worker.exhausted
            );
            worker
        })
        .collect::<Vec<_>>();

    let exhausted = results.iter().any(|w| w.exhausted);
    //highest value, first worker wins ties
    let best = results
        .into_iter()
        .rev()
        .max_by_key(|w| w.best_value)
        .map(|w| w.best_taken.iter().positions(|&t| t).collect_vec())
        .unwrap_or_default();

    match (exhausted, best.is_empty()) {
        (true, _) => ExactOutcome::Optimal(best),
        //deadline expired before any item was taken
        (false, true) => ExactOutcome::Degenerate,
        (false, false) => ExactOutcome::Feasible(best),
    }
}

struct Worker<'a> {
    knapsack: &'a Knapsack,
    order: Vec<usize>,
    /// Position of every item in `order`
    position: Vec<usize>,
    taken: Vec<bool>,
    best_value: u64,
    best_taken: Vec<bool>,
    shared_best: &'a AtomicU64,
    proven: &'a AtomicBool,
    deadline: Instant,
    n_nodes: u64,
    timed_out: bool,
    exhausted: bool,
}

impl<'a> Worker<'a> {
    fn new(
        knapsack: &'a Knapsack,
        worker_id: usize,
        shared_best: &'a AtomicU64,
        proven: &'a AtomicBool,
        deadline: Instant,
    ) -> Self {
        let order = knapsack.branching_order(worker_id);
        let mut position = vec![0; order.len()];
        for (pos, &i) in order.iter().enumerate() {
            position[i] = pos;
        }
        Self {
            knapsack,
            order,
            position,
            taken: vec![false; knapsack.len()],
            best_value: 0,
            best_taken: vec![false; knapsack.len()],
            shared_best,
            proven,
            deadline,
            n_nodes: 0,
            timed_out: false,
            exhausted: false,
        }
    }

    fn should_stop(&mut self) -> bool {
        self.n_nodes += 1;
        if self.n_nodes % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= self.deadline {
            self.timed_out = true;
        }
        self.timed_out || self.proven.load(Ordering::Relaxed)
    }

    fn search(&mut self, depth: usize, value: u64, left_weight: u64, left_volume: u64) {
        if self.should_stop() {
            return;
        }
        if value > self.best_value {
            self.best_value = value;
            self.best_taken.copy_from_slice(&self.taken);
            self.shared_best.fetch_max(value, Ordering::Relaxed);
        }
        if depth == self.order.len() {
            return;
        }

        let ks = self.knapsack;
        let bound = value as f64
            + f64::min(
                self.fractional_bound(&ks.by_weight_density, &ks.weight, left_weight, depth),
                self.fractional_bound(&ks.by_volume_density, &ks.volume, left_volume, depth),
            );
        if (bound + 1e-6).floor() as u64 <= self.shared_best.load(Ordering::Relaxed) {
            return;
        }

        let i = self.order[depth];
        if ks.weight[i] <= left_weight && ks.volume[i] <= left_volume {
            self.taken[i] = true;
            self.search(
                depth + 1,
                value + ks.value[i],
                left_weight - ks.weight[i],
                left_volume - ks.volume[i],
            );
            self.taken[i] = false;
        }
        self.search(depth + 1, value, left_weight, left_volume);
    }

    /// Value of the undecided items that fits in `capacity` of a single resource, allowing a fractional item
    fn fractional_bound(&self, sorted: &[usize], resource: &[u64], capacity: u64, depth: usize) -> f64 {
        let mut left = capacity as f64;
        let mut bound = 0.0;
        for &i in sorted.iter().filter(|&&i| self.position[i] >= depth) {
            let (r, v) = (resource[i] as f64, self.knapsack.value[i] as f64);
            if r <= left {
                bound += v;
                left -= r;
            } else {
                bound += v * left / r;
                break;
            }
        }
        bound
    }
}
