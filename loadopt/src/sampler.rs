use rand::Rng;
use truckload::entities::Item;

/// Samples realistic cartons: dimensions in whole millimetres and a weight
/// derived from a random packing density, kept within what one person can lift.
#[derive(Clone, Copy, Debug)]
pub struct CartonSampler {
    /// Range of the length in mm (upper bound exclusive)
    pub length_mm: (u32, u32),
    pub width_mm: (u32, u32),
    pub height_mm: (u32, u32),
    /// Range of the density in kg/m3
    pub density: (f64, f64),
    /// Weight bounds in kg
    pub weight: (f64, f64),
}

impl Default for CartonSampler {
    fn default() -> Self {
        Self {
            length_mm: (250, 1200),
            width_mm: (200, 1000),
            height_mm: (150, 800),
            density: (150.0, 450.0),
            weight: (2.0, 60.0),
        }
    }
}

impl CartonSampler {
    /// Samples a non-fragile, rotatable carton with `id`
    pub fn sample(&self, id: usize, rng: &mut impl Rng) -> Item {
        let l = rng.random_range(self.length_mm.0..self.length_mm.1) as f64 / 1000.0;
        let w = rng.random_range(self.width_mm.0..self.width_mm.1) as f64 / 1000.0;
        let h = rng.random_range(self.height_mm.0..self.height_mm.1) as f64 / 1000.0;
        let density = rng.random_range(self.density.0..self.density.1);
        let weight = ((l * w * h * density) * 100.0).round() / 100.0;
        Item {
            id,
            length: l,
            width: w,
            height: h,
            weight: weight.clamp(self.weight.0, self.weight.1),
            fragile: false,
            stack_limit: 1,
            can_rotate: true,
            drop_order: 1,
        }
    }

    /// Samples `n` cartons with ids `1..=n`
    pub fn sample_n(&self, n: usize, rng: &mut impl Rng) -> Vec<Item> {
        (1..=n).map(|id| self.sample(id, rng)).collect()
    }
}
