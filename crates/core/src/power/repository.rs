//! Persistence boundary for voting power records and cause events.

use async_trait::async_trait;

use super::model::{DelegationEvent, TransferEvent, VotingPowerDelta};
use crate::errors::Result;

/// Store for delta records and the on-chain event tables they are
/// attributed against. Event lookups are batched by transaction hash —
/// one query per event table, never one per delta row.
#[async_trait]
pub trait PowerEventRepositoryTrait: Send + Sync {
    fn load_unattributed_deltas(&self, limit: i64) -> Result<Vec<VotingPowerDelta>>;

    fn delegations_for_transactions(
        &self,
        transaction_hashes: &[String],
    ) -> Result<Vec<DelegationEvent>>;

    fn transfers_for_transactions(
        &self,
        transaction_hashes: &[String],
    ) -> Result<Vec<TransferEvent>>;

    /// Persists the enriched rows in one transaction.
    async fn save_deltas(&self, deltas: Vec<VotingPowerDelta>) -> Result<()>;
}
