//! Models for voting power deltas and their on-chain cause events.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// On-chain delegation change event. Keyed by (transaction_hash,
/// log_index); several may share a transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationEvent {
    pub transaction_hash: String,
    pub log_index: i64,
    pub timestamp: i64,
    pub delegator: String,
    pub from_delegate: String,
    pub to_delegate: String,
}

/// On-chain token transfer event. Keyed by (transaction_hash, log_index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEvent {
    pub transaction_hash: String,
    pub log_index: i64,
    pub timestamp: i64,
    pub sender: String,
    pub recipient: String,
    pub amount: Decimal,
}

/// The single on-chain event attributed as the cause of a voting power
/// change. The enum makes "at most one cause" structural — a delta cannot
/// carry both a delegation and a transfer reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PowerChangeCause {
    Delegation(DelegationEvent),
    Transfer(TransferEvent),
}

impl PowerChangeCause {
    pub fn log_index(&self) -> i64 {
        match self {
            PowerChangeCause::Delegation(event) => event.log_index,
            PowerChangeCause::Transfer(event) => event.log_index,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerChangeCause::Delegation(_) => "delegation",
            PowerChangeCause::Transfer(_) => "transfer",
        }
    }
}

/// Voting power change record derived from balance tracking. Ordering key
/// is (transaction_hash, log_index); `cause` is populated by attribution.
/// An unattributed record is still valid — a pure balance snapshot refresh
/// has no triggering event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingPowerDelta {
    pub account_id: String,
    pub transaction_hash: String,
    pub log_index: i64,
    pub timestamp: i64,
    pub delta: Decimal,
    pub delta_abs: Decimal,
    pub voting_power_after: Decimal,
    pub cause: Option<PowerChangeCause>,
}
