//! Storage for voting power deltas and on-chain cause event tables.

mod model;
mod repository;

pub use model::*;
pub use repository::*;
