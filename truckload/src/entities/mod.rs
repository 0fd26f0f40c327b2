mod flags;
mod item;
mod placement;
mod truck;

#[doc(inline)]
pub use flags::Flags;

#[doc(inline)]
pub use item::Item;

#[doc(inline)]
pub use placement::Placement;

#[doc(inline)]
pub use truck::TruckSpec;
