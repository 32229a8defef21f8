//! Feed row models. Base rows carry classification only; payloads live in
//! per-type detail records sharing the (transaction_hash, log_index) key.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::power::{DelegationEvent, TransferEvent};

/// Event kinds surfaced in the unified activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedEventType {
    Vote,
    Proposal,
    Transfer,
    Delegation,
}

impl FeedEventType {
    pub const ALL: [FeedEventType; 4] = [
        FeedEventType::Vote,
        FeedEventType::Proposal,
        FeedEventType::Transfer,
        FeedEventType::Delegation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedEventType::Vote => "VOTE",
            FeedEventType::Proposal => "PROPOSAL",
            FeedEventType::Transfer => "TRANSFER",
            FeedEventType::Delegation => "DELEGATION",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "VOTE" => Some(FeedEventType::Vote),
            "PROPOSAL" => Some(FeedEventType::Proposal),
            "TRANSFER" => Some(FeedEventType::Transfer),
            "DELEGATION" => Some(FeedEventType::Delegation),
            _ => None,
        }
    }
}

/// Relevance bucket assigned at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedRelevance {
    High,
    Medium,
    Low,
    None,
}

impl FeedRelevance {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedRelevance::High => "HIGH",
            FeedRelevance::Medium => "MEDIUM",
            FeedRelevance::Low => "LOW",
            FeedRelevance::None => "NONE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "HIGH" => Some(FeedRelevance::High),
            "MEDIUM" => Some(FeedRelevance::Medium),
            "LOW" => Some(FeedRelevance::Low),
            "NONE" => Some(FeedRelevance::None),
            _ => None,
        }
    }
}

/// Natural key of an on-chain log row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventKey {
    pub transaction_hash: String,
    pub log_index: i64,
}

/// Base feed row. Identity is (transaction_hash, log_index); the payload
/// lives in the detail table matching `event_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEventBase {
    pub transaction_hash: String,
    pub log_index: i64,
    pub dao_id: String,
    pub event_type: FeedEventType,
    pub relevance: FeedRelevance,
    pub timestamp: i64,
}

impl FeedEventBase {
    pub fn key(&self) -> EventKey {
        EventKey {
            transaction_hash: self.transaction_hash.clone(),
            log_index: self.log_index,
        }
    }
}

/// On-chain vote cast payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCastDetail {
    pub transaction_hash: String,
    pub log_index: i64,
    pub voter: String,
    pub proposal_id: String,
    pub support: i32,
    pub weight: Decimal,
    pub reason: String,
}

/// On-chain proposal creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalCreatedDetail {
    pub transaction_hash: String,
    pub log_index: i64,
    pub proposal_id: String,
    pub proposer: String,
    pub description: String,
}

/// Type-specific payload of an assembled feed entry. Transfers and
/// delegations reuse the power event models — they are read from the same
/// tables attribution joins against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum FeedEventDetail {
    Vote(VoteCastDetail),
    Proposal(ProposalCreatedDetail),
    Transfer(TransferEvent),
    Delegation(DelegationEvent),
}

/// Assembled feed entry: the base row plus its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub base: FeedEventBase,
    pub detail: FeedEventDetail,
}
