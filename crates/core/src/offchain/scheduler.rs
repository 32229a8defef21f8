//! Polling cadence constants for the off-chain sync engine.

/// Interval between sync ticks in seconds.
pub const OFFCHAIN_SYNC_INTERVAL_SECS: u64 = 60;

/// Page size requested from the governance hub per fetch.
pub const OFFCHAIN_SYNC_PAGE_SIZE: usize = 100;
