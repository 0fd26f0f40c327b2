use anyhow::{Context, Result};
use itertools::Itertools;
use ndarray::{Array2, ArrayView1};
use ordered_float::OrderedFloat;
use rand::Rng;
use truckload::entities::Item;

/// Base desirability of an item when ordering: mostly volume, then weight and drop order.
pub fn base_score(item: &Item) -> f64 {
    10.0 * item.volume() + item.weight / 1000.0 + 0.01 * item.drop_order as f64
}

/// Indices of `items` by descending [`base_score`], ties keep their input order.
pub fn base_order(items: &[Item]) -> Vec<usize> {
    (0..items.len())
        .sorted_by_key(|&i| std::cmp::Reverse(OrderedFloat(base_score(&items[i]))))
        .collect_vec()
}

/// Population of `size` rows: the base order followed by perturbations of it, each with `max(1, n / 20)` random swaps.
pub fn initial_population(base: &[usize], size: usize, rng: &mut impl Rng) -> Result<Array2<usize>> {
    let n = base.len();
    let n_swaps = usize::max(1, n / 20);
    let mut genes = Vec::with_capacity(size * n);
    genes.extend_from_slice(base);
    for _ in 1..size {
        let mut row = base.to_vec();
        for _ in 0..n_swaps {
            row.swap(rng.random_range(0..n), rng.random_range(0..n));
        }
        genes.extend(row);
    }
    Array2::from_shape_vec((size, n), genes).context("malformed initial population")
}

/// Order crossover (OX) with two random cut points.
pub fn order_crossover(p1: ArrayView1<usize>, p2: ArrayView1<usize>, rng: &mut impl Rng) -> Vec<usize> {
    let n = p1.len();
    let (x, y) = (rng.random_range(0..n), rng.random_range(0..n));
    order_crossover_at(p1, p2, usize::min(x, y), usize::max(x, y))
}

/// Copies `p1[a..b]` into the child and fills the other positions, starting at `b` and wrapping around,
/// with the genes of `p2` not in that segment, in the order they appear in `p2`.
pub fn order_crossover_at(p1: ArrayView1<usize>, p2: ArrayView1<usize>, a: usize, b: usize) -> Vec<usize> {
    let n = p1.len();
    let mut child = vec![usize::MAX; n];
    let mut used = vec![false; n];
    for i in a..b {
        child[i] = p1[i];
        used[p1[i]] = true;
    }
    let mut pos = b;
    for &gene in p2.iter().filter(|&&g| !used[g]) {
        if pos >= n {
            pos = 0;
        }
        child[pos] = gene;
        pos += 1;
    }
    child
}

/// Swaps two random positions with probability `rate`
pub fn swap_mutation(child: &mut [usize], rate: f64, rng: &mut impl Rng) {
    if rng.random_bool(rate.clamp(0.0, 1.0)) {
        let n = child.len();
        child.swap(rng.random_range(0..n), rng.random_range(0..n));
    }
}

/// Next generation: the `elites` (row indices into `population`) followed by their offspring, up to the same number of rows.
pub fn breed(
    population: &Array2<usize>,
    elites: &[usize],
    mutation_rate: f64,
    rng: &mut impl Rng,
) -> Result<Array2<usize>> {
    let (size, n) = population.dim();
    let mut genes = Vec::with_capacity(size * n);
    for &e in elites {
        genes.extend(population.row(e).iter().copied());
    }
    for _ in elites.len()..size {
        let p1 = population.row(elites[rng.random_range(0..elites.len())]);
        let p2 = population.row(elites[rng.random_range(0..elites.len())]);
        let mut child = order_crossover(p1, p2, rng);
        swap_mutation(&mut child, mutation_rate, rng);
        genes.extend(child);
    }
    Array2::from_shape_vec((size, n), genes).context("malformed offspring population")
}
