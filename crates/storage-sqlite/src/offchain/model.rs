//! DB row types for the off-chain mirror tables.

use diesel::prelude::*;
use govlens_core::offchain::{
    OffchainProposal, OffchainVote, ProposalState, SyncCursor, SyncEntityKind,
};

use crate::errors::StorageError;
use crate::schema::{offchain_proposals, offchain_votes, sync_cursors};
use crate::util::parse_decimal;

#[derive(Debug, Clone, Queryable, Insertable, Identifiable)]
#[diesel(table_name = sync_cursors, primary_key(entity))]
pub struct SyncCursorDB {
    pub entity: String,
    pub cursor_value: Option<String>,
    pub last_synced_at: i64,
}

impl TryFrom<SyncCursorDB> for SyncCursor {
    type Error = StorageError;

    fn try_from(row: SyncCursorDB) -> Result<Self, Self::Error> {
        let entity = SyncEntityKind::parse(&row.entity)
            .ok_or_else(|| StorageError::CorruptValue(format!("entity='{}'", row.entity)))?;
        Ok(Self {
            entity,
            cursor_value: row.cursor_value,
            last_synced_at: row.last_synced_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = offchain_proposals)]
pub struct OffchainProposalDB {
    pub id: String,
    pub space_id: String,
    pub author: String,
    pub title: String,
    pub body: String,
    pub proposal_type: String,
    pub start_at: i64,
    pub end_at: i64,
    pub state: String,
    pub created: i64,
    pub updated: i64,
    pub flagged: bool,
}

impl From<OffchainProposal> for OffchainProposalDB {
    fn from(proposal: OffchainProposal) -> Self {
        Self {
            id: proposal.id,
            space_id: proposal.space_id,
            author: proposal.author,
            title: proposal.title,
            body: proposal.body,
            proposal_type: proposal.proposal_type,
            start_at: proposal.start,
            end_at: proposal.end,
            state: proposal.state.as_str().to_string(),
            created: proposal.created,
            updated: proposal.updated,
            flagged: proposal.flagged,
        }
    }
}

impl From<OffchainProposalDB> for OffchainProposal {
    fn from(row: OffchainProposalDB) -> Self {
        Self {
            id: row.id,
            space_id: row.space_id,
            author: row.author,
            title: row.title,
            body: row.body,
            proposal_type: row.proposal_type,
            start: row.start_at,
            end: row.end_at,
            state: ProposalState::from_provider(&row.state),
            created: row.created,
            updated: row.updated,
            flagged: row.flagged,
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = offchain_votes, primary_key(voter, proposal_id))]
pub struct OffchainVoteDB {
    pub voter: String,
    pub proposal_id: String,
    pub space_id: String,
    pub choice: String,
    pub voting_power: String,
    pub reason: String,
    pub created: i64,
}

impl TryFrom<OffchainVote> for OffchainVoteDB {
    type Error = StorageError;

    fn try_from(vote: OffchainVote) -> Result<Self, Self::Error> {
        Ok(Self {
            voter: vote.voter,
            proposal_id: vote.proposal_id,
            space_id: vote.space_id,
            choice: serde_json::to_string(&vote.choice)
                .map_err(|e| StorageError::CorruptValue(format!("choice: {e}")))?,
            voting_power: vote.voting_power.to_string(),
            reason: vote.reason,
            created: vote.created,
        })
    }
}

impl TryFrom<OffchainVoteDB> for OffchainVote {
    type Error = StorageError;

    fn try_from(row: OffchainVoteDB) -> Result<Self, Self::Error> {
        Ok(Self {
            voter: row.voter,
            proposal_id: row.proposal_id,
            space_id: row.space_id,
            choice: serde_json::from_str(&row.choice)
                .map_err(|e| StorageError::CorruptValue(format!("choice='{}': {e}", row.choice)))?,
            voting_power: parse_decimal(&row.voting_power, "voting_power")?,
            reason: row.reason,
            created: row.created,
        })
    }
}
