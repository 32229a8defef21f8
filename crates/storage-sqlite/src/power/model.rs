//! DB row types for the power tracking tables.

use diesel::prelude::*;
use govlens_core::power::{DelegationEvent, PowerChangeCause, TransferEvent, VotingPowerDelta};

use crate::errors::StorageError;
use crate::schema::{delegation_events, transfer_events, voting_power_deltas};
use crate::util::parse_decimal;

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = voting_power_deltas, primary_key(transaction_hash, log_index))]
pub struct VotingPowerDeltaDB {
    pub transaction_hash: String,
    pub log_index: i64,
    pub account_id: String,
    pub timestamp: i64,
    pub delta: String,
    pub delta_abs: String,
    pub voting_power_after: String,
    pub cause_kind: Option<String>,
    pub cause_log_index: Option<i64>,
    /// Set once the attribution step has examined the row; a row can be
    /// attributed to no cause (a balance snapshot refresh) and must not be
    /// rescanned.
    pub attributed: bool,
}

impl From<VotingPowerDelta> for VotingPowerDeltaDB {
    fn from(delta: VotingPowerDelta) -> Self {
        let (cause_kind, cause_log_index) = match &delta.cause {
            Some(cause) => (Some(cause.as_str().to_string()), Some(cause.log_index())),
            None => (None, None),
        };
        let attributed = delta.cause.is_some();
        Self {
            transaction_hash: delta.transaction_hash,
            log_index: delta.log_index,
            account_id: delta.account_id,
            timestamp: delta.timestamp,
            delta: delta.delta.to_string(),
            delta_abs: delta.delta_abs.to_string(),
            voting_power_after: delta.voting_power_after.to_string(),
            cause_kind,
            cause_log_index,
            attributed,
        }
    }
}

impl TryFrom<VotingPowerDeltaDB> for VotingPowerDelta {
    type Error = StorageError;

    /// The cause columns are a reference, not an embedded payload; rows
    /// read back carry `cause: None` and the reference is re-joined from
    /// the event tables when a caller needs the full cause.
    fn try_from(row: VotingPowerDeltaDB) -> Result<Self, Self::Error> {
        Ok(Self {
            account_id: row.account_id,
            transaction_hash: row.transaction_hash,
            log_index: row.log_index,
            timestamp: row.timestamp,
            delta: parse_decimal(&row.delta, "delta")?,
            delta_abs: parse_decimal(&row.delta_abs, "delta_abs")?,
            voting_power_after: parse_decimal(&row.voting_power_after, "voting_power_after")?,
            cause: None,
        })
    }
}

/// Attribution output columns for an already-stored delta row.
pub(crate) fn cause_columns(cause: &Option<PowerChangeCause>) -> (Option<String>, Option<i64>) {
    match cause {
        Some(cause) => (Some(cause.as_str().to_string()), Some(cause.log_index())),
        None => (None, None),
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Identifiable)]
#[diesel(table_name = delegation_events, primary_key(transaction_hash, log_index))]
pub struct DelegationEventDB {
    pub transaction_hash: String,
    pub log_index: i64,
    pub timestamp: i64,
    pub delegator: String,
    pub from_delegate: String,
    pub to_delegate: String,
}

impl From<DelegationEvent> for DelegationEventDB {
    fn from(event: DelegationEvent) -> Self {
        Self {
            transaction_hash: event.transaction_hash,
            log_index: event.log_index,
            timestamp: event.timestamp,
            delegator: event.delegator,
            from_delegate: event.from_delegate,
            to_delegate: event.to_delegate,
        }
    }
}

impl From<DelegationEventDB> for DelegationEvent {
    fn from(row: DelegationEventDB) -> Self {
        Self {
            transaction_hash: row.transaction_hash,
            log_index: row.log_index,
            timestamp: row.timestamp,
            delegator: row.delegator,
            from_delegate: row.from_delegate,
            to_delegate: row.to_delegate,
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Identifiable)]
#[diesel(table_name = transfer_events, primary_key(transaction_hash, log_index))]
pub struct TransferEventDB {
    pub transaction_hash: String,
    pub log_index: i64,
    pub timestamp: i64,
    pub sender: String,
    pub recipient: String,
    pub amount: String,
}

impl From<TransferEvent> for TransferEventDB {
    fn from(event: TransferEvent) -> Self {
        Self {
            transaction_hash: event.transaction_hash,
            log_index: event.log_index,
            timestamp: event.timestamp,
            sender: event.sender,
            recipient: event.recipient,
            amount: event.amount.to_string(),
        }
    }
}

impl TryFrom<TransferEventDB> for TransferEvent {
    type Error = StorageError;

    fn try_from(row: TransferEventDB) -> Result<Self, Self::Error> {
        Ok(Self {
            transaction_hash: row.transaction_hash,
            log_index: row.log_index,
            timestamp: row.timestamp,
            sender: row.sender,
            recipient: row.recipient,
            amount: parse_decimal(&row.amount, "amount")?,
        })
    }
}
