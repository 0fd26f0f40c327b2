use std::sync::LazyLock;
use std::time::Instant;

pub mod bench;
pub mod config;
pub mod io;
pub mod plan;
pub mod pool;
pub mod sampler;
pub mod select;
pub mod sequence;

pub static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);
