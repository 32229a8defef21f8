//! Causal attribution of voting power deltas to on-chain events.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::model::{DelegationEvent, PowerChangeCause, TransferEvent, VotingPowerDelta};
use super::repository::PowerEventRepositoryTrait;
use crate::errors::{AttributionError, Result};

/// Resolves the on-chain cause of one voting power delta.
///
/// The cause is the event in the same transaction with the greatest log
/// index strictly below the delta's. When a delegation and a transfer both
/// qualify, the nearer one (larger log index) wins and the other is
/// discarded. Candidates sharing a log index violate the per-transaction
/// uniqueness of event logs and fail the batch rather than picking a side.
/// No candidate at all leaves the record unattributed.
pub fn attribute_cause(
    delta: &VotingPowerDelta,
    delegations: &[DelegationEvent],
    transfers: &[TransferEvent],
) -> Result<Option<PowerChangeCause>> {
    let delegation = delegations
        .iter()
        .filter(|event| {
            event.transaction_hash == delta.transaction_hash && event.log_index < delta.log_index
        })
        .max_by_key(|event| event.log_index);
    let transfer = transfers
        .iter()
        .filter(|event| {
            event.transaction_hash == delta.transaction_hash && event.log_index < delta.log_index
        })
        .max_by_key(|event| event.log_index);

    match (delegation, transfer) {
        (Some(d), Some(t)) if d.log_index == t.log_index => {
            Err(AttributionError::AmbiguousCause {
                transaction_hash: delta.transaction_hash.clone(),
                log_index: delta.log_index,
                candidate_log_index: d.log_index,
            }
            .into())
        }
        (Some(d), Some(t)) => Ok(Some(if d.log_index > t.log_index {
            PowerChangeCause::Delegation(d.clone())
        } else {
            PowerChangeCause::Transfer(t.clone())
        })),
        (Some(d), None) => Ok(Some(PowerChangeCause::Delegation(d.clone()))),
        (None, Some(t)) => Ok(Some(PowerChangeCause::Transfer(t.clone()))),
        (None, None) => Ok(None),
    }
}

/// Batch attribution pipeline over the power event store.
pub struct PowerAttributionService {
    repository: Arc<dyn PowerEventRepositoryTrait>,
}

impl PowerAttributionService {
    pub fn new(repository: Arc<dyn PowerEventRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Attributes up to `limit` pending deltas and persists the enriched
    /// rows in one transaction. Returns the number of rows written.
    pub async fn attribute_pending(&self, limit: i64) -> Result<usize> {
        let deltas = self.repository.load_unattributed_deltas(limit)?;
        if deltas.is_empty() {
            return Ok(0);
        }

        let mut transaction_hashes: Vec<String> = deltas
            .iter()
            .map(|delta| delta.transaction_hash.clone())
            .collect();
        transaction_hashes.sort();
        transaction_hashes.dedup();

        let delegations = self
            .repository
            .delegations_for_transactions(&transaction_hashes)?;
        let transfers = self
            .repository
            .transfers_for_transactions(&transaction_hashes)?;

        let mut delegations_by_tx: HashMap<String, Vec<DelegationEvent>> = HashMap::new();
        for event in delegations {
            delegations_by_tx
                .entry(event.transaction_hash.clone())
                .or_default()
                .push(event);
        }
        let mut transfers_by_tx: HashMap<String, Vec<TransferEvent>> = HashMap::new();
        for event in transfers {
            transfers_by_tx
                .entry(event.transaction_hash.clone())
                .or_default()
                .push(event);
        }

        let attributed = deltas
            .into_iter()
            .map(|mut delta| {
                let delegations = delegations_by_tx
                    .get(&delta.transaction_hash)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let transfers = transfers_by_tx
                    .get(&delta.transaction_hash)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                delta.cause = attribute_cause(&delta, delegations, transfers)?;
                Ok(delta)
            })
            .collect::<Result<Vec<_>>>()?;

        let count = attributed.len();
        self.repository.save_deltas(attributed).await?;
        debug!("Attributed {} voting power deltas", count);
        Ok(count)
    }
}
