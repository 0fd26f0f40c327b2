//! The `truckload` engine: everything needed to turn an ordered list of boxes into a
//! physically valid load plan for a single truck.

/// Items, trucks, planning flags and placements
pub mod entities;

/// Axis-aligned rectangles, cuboids and the free-rectangle arena
pub mod geometry;

/// The layered packer and its shelf fallback
pub mod packer;

/// Helper functions which do not belong to any specific module
pub mod util;

/// Tolerance used for all floating point comparisons in the engine
pub const EPS: f64 = 1e-9;
