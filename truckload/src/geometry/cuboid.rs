use crate::EPS;
use crate::geometry::Rect;
use crate::geometry::geo_traits::CollidesWith;

/// Axis-aligned box: a footprint extruded between `z_min` and `z_max`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cuboid {
    pub footprint: Rect,
    pub z_min: f64,
    pub z_max: f64,
}

impl Cuboid {
    pub fn new(footprint: Rect, z_min: f64, z_max: f64) -> Self {
        debug_assert!(z_min <= z_max);
        Self {
            footprint,
            z_min,
            z_max,
        }
    }

    pub fn volume(&self) -> f64 {
        self.footprint.area() * (self.z_max - self.z_min)
    }
}

impl CollidesWith<Cuboid> for Cuboid {
    #[inline(always)]
    fn collides_with(&self, other: &Cuboid) -> bool {
        self.footprint.collides_with(&other.footprint)
            && f64::max(self.z_min, other.z_min) + EPS < f64::min(self.z_max, other.z_max)
    }
}
