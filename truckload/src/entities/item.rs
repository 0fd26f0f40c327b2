use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// A box that is a candidate to be loaded in the truck.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Item {
    pub id: usize,
    /// Dimension along the x-axis when placed in its original orientation (m)
    pub length: f64,
    /// Dimension along the y-axis when placed in its original orientation (m)
    pub width: f64,
    /// Vertical dimension (m), items are never tipped over
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
    pub fragile: bool,
    /// Maximum number of items allowed to rest on this one. Only reported, not enforced.
    pub stack_limit: u32,
    /// Whether length and width may be swapped
    pub can_rotate: bool,
    /// Delivery stop of the item
    pub drop_order: i32,
}

impl Item {
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        id: usize,
        length: f64,
        width: f64,
        height: f64,
        weight: f64,
        fragile: bool,
        stack_limit: u32,
        can_rotate: bool,
        drop_order: i32,
    ) -> Result<Self> {
        ensure!(
            [length, width, height].iter().all(|d| d.is_finite() && *d > 0.0),
            "item {id} has invalid dimensions: {length} x {width} x {height}"
        );
        ensure!(
            weight.is_finite() && weight >= 0.0,
            "item {id} has invalid weight: {weight}"
        );
        Ok(Self {
            id,
            length,
            width,
            height,
            weight,
            fragile,
            stack_limit,
            can_rotate,
            drop_order,
        })
    }

    /// A non-fragile, rotatable item with stack limit 1 and drop order 1.
    pub fn plain(id: usize, length: f64, width: f64, height: f64, weight: f64) -> Result<Self> {
        Self::try_new(id, length, width, height, weight, false, 1, true, 1)
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    pub fn footprint_area(&self) -> f64 {
        self.length * self.width
    }

    /// Footprints `(length, width)` in which the item may be placed.
    /// The original orientation always comes first.
    pub fn orientations(&self, allow_swap: bool) -> impl Iterator<Item = (f64, f64)> + use<> {
        let swapped = (allow_swap && self.can_rotate).then_some((self.width, self.length));
        std::iter::once((self.length, self.width)).chain(swapped)
    }
}
