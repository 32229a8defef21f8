//! Diesel/sqlite implementations of the govlens-core persistence traits.
//!
//! Reads go straight through the r2d2 pool; every mutation is funneled
//! through a single writer actor that wraps each job in one immediate
//! transaction, so a sync tick's rows and cursor commit together or not
//! at all.

pub mod db;
pub mod errors;
pub mod feed;
pub mod offchain;
pub mod power;
pub mod schema;

pub(crate) mod util;
