mod cuboid;
mod free_rects;
mod rect;

/// Set of traits which define geometric relations between primitives
pub mod geo_traits;

#[doc(inline)]
pub use cuboid::Cuboid;

#[doc(inline)]
pub use free_rects::FreeRectArena;

#[doc(inline)]
pub use free_rects::FreeRectKey;

#[doc(inline)]
pub use rect::Rect;
