//! HTTP provider for the off-chain governance hub.
//!
//! Implements `govlens_core::offchain::OffchainProviderTrait` over the
//! hub's REST API. The client does no retrying of its own — the sync
//! engine's fixed polling interval is the retry.

mod client;
mod error;

pub use client::GovernanceHubClient;
pub use error::{ApiRetryClass, OffchainApiError, Result};
