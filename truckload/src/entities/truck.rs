use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// The cargo volume of a truck, with its maximum payload.
/// Coordinates of placements are expressed in a frame with the origin in a bottom corner of the cargo volume:
/// x along the length, y along the width and z upwards.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TruckSpec {
    /// Inner length in meters
    pub length: f64,
    /// Inner width in meters
    pub width: f64,
    /// Inner height in meters
    pub height: f64,
    /// Maximum payload in kg
    pub payload_kg: f64,
}

impl TruckSpec {
    pub fn try_new(length: f64, width: f64, height: f64, payload_kg: f64) -> Result<Self> {
        ensure!(
            [length, width, height].iter().all(|d| d.is_finite() && *d > 0.0),
            "invalid truck dimensions: {length} x {width} x {height}"
        );
        ensure!(
            payload_kg.is_finite() && payload_kg >= 0.0,
            "invalid truck payload: {payload_kg}"
        );
        Ok(Self {
            length,
            width,
            height,
            payload_kg,
        })
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    pub fn floor_area(&self) -> f64 {
        self.length * self.width
    }
}

impl Default for TruckSpec {
    /// A 20 ft box truck
    fn default() -> Self {
        Self {
            length: 6.32,
            width: 2.15,
            height: 2.25,
            payload_kg: 8500.0,
        }
    }
}
