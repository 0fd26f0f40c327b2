use serde::{Deserialize, Serialize};

/// Business rules toggled per planning run.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Flags {
    /// Never exceed the payload of the truck
    pub enforce_payload: bool,
    /// Fragile items may carry other items
    pub allow_stacking_on_fragile: bool,
    /// Use the drop order as a tie-break when sorting items for packing
    pub delivery_sequence: bool,
    /// Items that allow it may be placed with their length and width swapped
    pub allow_rotation: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            enforce_payload: true,
            allow_stacking_on_fragile: true,
            delivery_sequence: true,
            allow_rotation: true,
        }
    }
}
