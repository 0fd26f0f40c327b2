use serde::{Deserialize, Serialize};

use crate::EPS;

///Configuration of the layered packer
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PackerConfig {
    ///Maximum number of layers (and shelves) stacked in the truck
    pub max_layers: usize,
    ///Lower bound on the item height used to derive the layer budget
    pub min_layer_height: f64,
    ///Number of most frequent item heights considered as layer height
    pub n_frequent_heights: usize,
    ///Quantiles of the distinct item heights considered as layer height
    pub height_quantiles: [f64; 5],
    ///Maximum number of layer heights evaluated per layer
    pub max_candidate_heights: usize,
    ///Weight of the largest free rectangle (as fraction of the floor) in the layer score
    pub free_area_bonus: f64,
    ///Penalty per free rectangle left over in the layer score
    pub fragmentation_penalty: f64,
    ///Volume utilization under which the shelf fallback is attempted
    pub shelf_trigger_utilization: f64,
    ///Fixed shelf heights tried by the shelf fallback (besides the minimum and median item height)
    pub shelf_heights: [f64; 5],
    ///Required support per weight class
    pub support: SupportConfig,
    ///Support rule used in the layered loop
    pub layer_support: SupportRule,
    ///Support rule used in the shelf fallback
    pub shelf_support: SupportRule,
}

///Minimum fraction of the footprint of an elevated item that needs to rest on items below
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SupportConfig {
    ///Items lighter than this (kg) are cartons
    pub carton_max_kg: f64,
    ///Items lighter than this (kg), but not cartons, are standard. Anything heavier is heavy.
    pub standard_max_kg: f64,
    pub carton_ratio: f64,
    pub standard_ratio: f64,
    pub heavy_ratio: f64,
    ///Global floor on the required fraction, regardless of weight class
    pub min_fraction: f64,
}

impl SupportConfig {
    /// Fraction of the footprint that has to be supported for an item of `weight` kg
    pub fn required_fraction(&self, weight: f64) -> f64 {
        let tier = if weight < self.carton_max_kg {
            self.carton_ratio
        } else if weight < self.standard_max_kg {
            self.standard_ratio
        } else {
            self.heavy_ratio
        };
        f64::max(tier, self.min_fraction)
    }
}

///Tolerances of the support check
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SupportRule {
    ///Placements with their top within this distance of the candidate z provide contact area
    pub contact_tolerance: f64,
    ///Placements with their top within this distance of the candidate z can support its center
    pub center_tolerance: f64,
    ///Fraction of the required contact area that suffices when the center is supported
    pub center_fallback_fraction: f64,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_layers: 8,
            min_layer_height: 0.05,
            n_frequent_heights: 6,
            height_quantiles: [0.1, 0.25, 0.5, 0.75, 1.0],
            max_candidate_heights: 10,
            free_area_bonus: 0.5,
            fragmentation_penalty: 0.05,
            shelf_trigger_utilization: 0.20,
            shelf_heights: [0.25, 0.30, 0.35, 0.40, 0.50],
            support: SupportConfig {
                carton_max_kg: 18.0,
                standard_max_kg: 70.0,
                carton_ratio: 0.18,
                standard_ratio: 0.28,
                heavy_ratio: 0.38,
                min_fraction: 0.35,
            },
            layer_support: SupportRule {
                contact_tolerance: 0.05,
                center_tolerance: EPS,
                center_fallback_fraction: 0.25,
            },
            shelf_support: SupportRule {
                contact_tolerance: EPS,
                center_tolerance: EPS,
                center_fallback_fraction: 0.20,
            },
        }
    }
}
