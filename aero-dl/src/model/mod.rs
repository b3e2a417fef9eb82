//! The backbone-selectable multi-task model.

mod backbone;
mod heads;
mod model;

pub use backbone::*;
pub use heads::*;
pub use model::*;
