//! Domain models mirrored from the off-chain governance hub.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an off-chain proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    Pending,
    Active,
    Closed,
}

impl ProposalState {
    /// Terminal proposals can no longer mutate upstream; only terminal
    /// items are safe for the sync cursor to pass.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalState::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalState::Pending => "pending",
            ProposalState::Active => "active",
            ProposalState::Closed => "closed",
        }
    }

    /// Maps a raw provider state string. Unknown states are treated as
    /// still-mutable so the stall policy keeps re-fetching them instead of
    /// finalizing a state it does not understand.
    pub fn from_provider(value: &str) -> Self {
        match value {
            "closed" => ProposalState::Closed,
            "active" => ProposalState::Active,
            _ => ProposalState::Pending,
        }
    }
}

/// Proposal row mirrored from the hub. Identity is `id`; `created` (epoch
/// seconds) is the field cursors are derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffchainProposal {
    pub id: String,
    pub space_id: String,
    pub author: String,
    pub title: String,
    pub body: String,
    pub proposal_type: String,
    pub start: i64,
    pub end: i64,
    pub state: ProposalState,
    pub created: i64,
    pub updated: i64,
    pub flagged: bool,
}

/// Vote row mirrored from the hub. Identity is (voter, proposal_id); a
/// revote overwrites the earlier row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffchainVote {
    pub space_id: String,
    pub voter: String,
    pub proposal_id: String,
    /// Opaque choice payload; single-choice, ranked and weighted voting
    /// systems all encode differently, so the value is kept as-is.
    pub choice: serde_json::Value,
    pub voting_power: Decimal,
    pub reason: String,
    pub created: i64,
}
