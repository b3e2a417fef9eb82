//! Misc utilities.

mod checkpoint;
mod rate_counter;

pub use checkpoint::*;
pub use rate_counter::*;

pub const FILE_STRFTIME: &str = "%Y-%m-%d-%H-%M-%S";
