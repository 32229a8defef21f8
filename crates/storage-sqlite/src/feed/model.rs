//! DB row types for the feed tables.

use diesel::prelude::*;
use govlens_core::feed::{
    FeedEventBase, FeedEventType, FeedRelevance, ProposalCreatedDetail, VoteCastDetail,
};

use crate::errors::StorageError;
use crate::schema::{feed_events, proposal_created_events, vote_cast_events};
use crate::util::parse_decimal;

#[derive(Debug, Clone, Queryable, Insertable, Identifiable)]
#[diesel(table_name = feed_events, primary_key(transaction_hash, log_index))]
pub struct FeedEventBaseDB {
    pub transaction_hash: String,
    pub log_index: i64,
    pub dao_id: String,
    pub event_type: String,
    pub relevance: String,
    pub timestamp: i64,
}

impl From<FeedEventBase> for FeedEventBaseDB {
    fn from(event: FeedEventBase) -> Self {
        Self {
            transaction_hash: event.transaction_hash,
            log_index: event.log_index,
            dao_id: event.dao_id,
            event_type: event.event_type.as_str().to_string(),
            relevance: event.relevance.as_str().to_string(),
            timestamp: event.timestamp,
        }
    }
}

impl TryFrom<FeedEventBaseDB> for FeedEventBase {
    type Error = StorageError;

    fn try_from(row: FeedEventBaseDB) -> Result<Self, Self::Error> {
        let event_type = FeedEventType::parse(&row.event_type).ok_or_else(|| {
            StorageError::CorruptValue(format!("event_type='{}'", row.event_type))
        })?;
        let relevance = FeedRelevance::parse(&row.relevance)
            .ok_or_else(|| StorageError::CorruptValue(format!("relevance='{}'", row.relevance)))?;
        Ok(Self {
            transaction_hash: row.transaction_hash,
            log_index: row.log_index,
            dao_id: row.dao_id,
            event_type,
            relevance,
            timestamp: row.timestamp,
        })
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Identifiable)]
#[diesel(table_name = vote_cast_events, primary_key(transaction_hash, log_index))]
pub struct VoteCastEventDB {
    pub transaction_hash: String,
    pub log_index: i64,
    pub voter: String,
    pub proposal_id: String,
    pub support: i32,
    pub weight: String,
    pub reason: String,
}

impl From<VoteCastDetail> for VoteCastEventDB {
    fn from(detail: VoteCastDetail) -> Self {
        Self {
            transaction_hash: detail.transaction_hash,
            log_index: detail.log_index,
            voter: detail.voter,
            proposal_id: detail.proposal_id,
            support: detail.support,
            weight: detail.weight.to_string(),
            reason: detail.reason,
        }
    }
}

impl TryFrom<VoteCastEventDB> for VoteCastDetail {
    type Error = StorageError;

    fn try_from(row: VoteCastEventDB) -> Result<Self, Self::Error> {
        Ok(Self {
            transaction_hash: row.transaction_hash,
            log_index: row.log_index,
            voter: row.voter,
            proposal_id: row.proposal_id,
            support: row.support,
            weight: parse_decimal(&row.weight, "weight")?,
            reason: row.reason,
        })
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Identifiable)]
#[diesel(table_name = proposal_created_events, primary_key(transaction_hash, log_index))]
pub struct ProposalCreatedEventDB {
    pub transaction_hash: String,
    pub log_index: i64,
    pub proposal_id: String,
    pub proposer: String,
    pub description: String,
}

impl From<ProposalCreatedDetail> for ProposalCreatedEventDB {
    fn from(detail: ProposalCreatedDetail) -> Self {
        Self {
            transaction_hash: detail.transaction_hash,
            log_index: detail.log_index,
            proposal_id: detail.proposal_id,
            proposer: detail.proposer,
            description: detail.description,
        }
    }
}

impl From<ProposalCreatedEventDB> for ProposalCreatedDetail {
    fn from(row: ProposalCreatedEventDB) -> Self {
        Self {
            transaction_hash: row.transaction_hash,
            log_index: row.log_index,
            proposal_id: row.proposal_id,
            proposer: row.proposer,
            description: row.description,
        }
    }
}
