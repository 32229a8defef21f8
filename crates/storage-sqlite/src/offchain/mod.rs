//! Storage for mirrored off-chain rows and sync cursors.

mod model;
mod repository;

pub use model::*;
pub use repository::*;
