/// Set of functions used throughout to assure the correctness of the engine.
pub mod assertions;

mod config;

#[doc(inline)]
pub use config::PackerConfig;
#[doc(inline)]
pub use config::SupportConfig;
#[doc(inline)]
pub use config::SupportRule;
