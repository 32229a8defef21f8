//! Storage for feed base rows and per-type detail tables.

mod model;
mod repository;

pub use model::*;
pub use repository::*;
