use serde::{Deserialize, Serialize};

use crate::entities::Item;
use crate::geometry::{Cuboid, Rect};

/// An [`Item`] committed to a position and orientation inside the truck.
/// Created only by the packer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Placement {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Oriented footprint along the x-axis
    #[serde(rename = "L")]
    pub length: f64,
    /// Oriented footprint along the y-axis
    #[serde(rename = "W")]
    pub width: f64,
    #[serde(rename = "H")]
    pub height: f64,
    pub weight: f64,
    pub drop_order: i32,
    pub fragile: bool,
    pub stack_limit: u32,
}

impl Placement {
    pub(crate) fn new(item: &Item, (x, y, z): (f64, f64, f64), (length, width): (f64, f64)) -> Self {
        Self {
            id: item.id,
            x,
            y,
            z,
            length,
            width,
            height: item.height,
            weight: item.weight,
            drop_order: item.drop_order,
            fragile: item.fragile,
            stack_limit: item.stack_limit,
        }
    }

    pub fn footprint(&self) -> Rect {
        Rect::from_origin(self.x, self.y, self.length, self.width)
    }

    pub fn cuboid(&self) -> Cuboid {
        Cuboid::new(self.footprint(), self.z, self.z + self.height)
    }

    /// z-coordinate of the top face
    pub fn top(&self) -> f64 {
        self.z + self.height
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}
