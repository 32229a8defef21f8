//! Repository implementing the core feed read trait.
//!
//! Filters compose through diesel's typed query builder — the boxed query
//! is the replacement for the SQL fragment concatenation the original
//! dashboard built by hand. Detail lookups run one query per event table
//! over the transaction-hash set, then narrow to exact (hash, log) pairs
//! in memory.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use govlens_core::errors::{DatabaseError, Error};
use govlens_core::feed::{
    EventKey, FeedEventBase, FeedFilter, FeedRepositoryTrait, ProposalCreatedDetail, SortOrder,
    VoteCastDetail,
};
use govlens_core::power::{DelegationEvent, TransferEvent};
use govlens_core::Result;

use super::model::{FeedEventBaseDB, ProposalCreatedEventDB, VoteCastEventDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::power::{DelegationEventDB, TransferEventDB};
use crate::schema::{
    delegation_events, feed_events, proposal_created_events, transfer_events, vote_cast_events,
};

pub struct FeedRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl FeedRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn filtered(filter: &FeedFilter) -> feed_events::BoxedQuery<'static, Sqlite> {
        let mut query = feed_events::table.into_boxed();
        if let Some(dao_id) = &filter.dao_id {
            query = query.filter(feed_events::dao_id.eq(dao_id.clone()));
        }
        if let Some(from) = filter.from_timestamp {
            query = query.filter(feed_events::timestamp.ge(from));
        }
        if let Some(to) = filter.to_timestamp {
            query = query.filter(feed_events::timestamp.le(to));
        }
        if let Some(types) = &filter.types {
            let names: Vec<String> = types.iter().map(|t| t.as_str().to_string()).collect();
            query = query.filter(feed_events::event_type.eq_any(names));
        }
        if let Some(relevances) = &filter.relevances {
            let names: Vec<String> = relevances.iter().map(|r| r.as_str().to_string()).collect();
            query = query.filter(feed_events::relevance.eq_any(names));
        }
        query
    }

    /// Ingest write for the classifier boundary.
    pub async fn insert_feed_events(&self, events: Vec<FeedEventBase>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                for event in events {
                    diesel::insert_into(feed_events::table)
                        .values(FeedEventBaseDB::from(event))
                        .on_conflict((feed_events::transaction_hash, feed_events::log_index))
                        .do_nothing()
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }

    pub async fn insert_vote_details(&self, details: Vec<VoteCastDetail>) -> Result<()> {
        if details.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                for detail in details {
                    diesel::insert_into(vote_cast_events::table)
                        .values(VoteCastEventDB::from(detail))
                        .on_conflict((
                            vote_cast_events::transaction_hash,
                            vote_cast_events::log_index,
                        ))
                        .do_nothing()
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }

    pub async fn insert_proposal_details(
        &self,
        details: Vec<ProposalCreatedDetail>,
    ) -> Result<()> {
        if details.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                for detail in details {
                    diesel::insert_into(proposal_created_events::table)
                        .values(ProposalCreatedEventDB::from(detail))
                        .on_conflict((
                            proposal_created_events::transaction_hash,
                            proposal_created_events::log_index,
                        ))
                        .do_nothing()
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }
}

fn wanted_pairs(keys: &[EventKey]) -> (Vec<String>, HashSet<(String, i64)>) {
    let hashes: Vec<String> = keys.iter().map(|k| k.transaction_hash.clone()).collect();
    let pairs: HashSet<(String, i64)> = keys
        .iter()
        .map(|k| (k.transaction_hash.clone(), k.log_index))
        .collect();
    (hashes, pairs)
}

fn blocking_join_error(e: tokio::task::JoinError) -> Error {
    Error::Database(DatabaseError::Internal(format!(
        "Detail load worker failed: {e}"
    )))
}

#[async_trait]
impl FeedRepositoryTrait for FeedRepository {
    fn count_events(&self, filter: &FeedFilter) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = Self::filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    fn load_event_page(
        &self,
        filter: &FeedFilter,
        limit: i64,
        offset: i64,
        order: SortOrder,
    ) -> Result<Vec<FeedEventBase>> {
        let mut conn = get_connection(&self.pool)?;
        let query = match order {
            SortOrder::Asc => Self::filtered(filter)
                .order((feed_events::timestamp.asc(), feed_events::log_index.asc())),
            SortOrder::Desc => Self::filtered(filter)
                .order((feed_events::timestamp.desc(), feed_events::log_index.desc())),
        };
        let rows = query
            .limit(limit)
            .offset(offset)
            .load::<FeedEventBaseDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| FeedEventBase::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn load_vote_details(&self, keys: &[EventKey]) -> Result<Vec<VoteCastDetail>> {
        let pool = Arc::clone(&self.pool);
        let (hashes, pairs) = wanted_pairs(keys);
        tokio::task::spawn_blocking(move || -> Result<Vec<VoteCastDetail>> {
            let mut conn = get_connection(&pool)?;
            let rows = vote_cast_events::table
                .filter(vote_cast_events::transaction_hash.eq_any(hashes))
                .load::<VoteCastEventDB>(&mut conn)
                .map_err(StorageError::from)?;
            rows.into_iter()
                .filter(|row| pairs.contains(&(row.transaction_hash.clone(), row.log_index)))
                .map(|row| VoteCastDetail::try_from(row).map_err(Into::into))
                .collect()
        })
        .await
        .map_err(blocking_join_error)?
    }

    async fn load_proposal_details(&self, keys: &[EventKey]) -> Result<Vec<ProposalCreatedDetail>> {
        let pool = Arc::clone(&self.pool);
        let (hashes, pairs) = wanted_pairs(keys);
        tokio::task::spawn_blocking(move || -> Result<Vec<ProposalCreatedDetail>> {
            let mut conn = get_connection(&pool)?;
            let rows = proposal_created_events::table
                .filter(proposal_created_events::transaction_hash.eq_any(hashes))
                .load::<ProposalCreatedEventDB>(&mut conn)
                .map_err(StorageError::from)?;
            Ok(rows
                .into_iter()
                .filter(|row| pairs.contains(&(row.transaction_hash.clone(), row.log_index)))
                .map(ProposalCreatedDetail::from)
                .collect())
        })
        .await
        .map_err(blocking_join_error)?
    }

    async fn load_transfer_details(&self, keys: &[EventKey]) -> Result<Vec<TransferEvent>> {
        let pool = Arc::clone(&self.pool);
        let (hashes, pairs) = wanted_pairs(keys);
        tokio::task::spawn_blocking(move || -> Result<Vec<TransferEvent>> {
            let mut conn = get_connection(&pool)?;
            let rows = transfer_events::table
                .filter(transfer_events::transaction_hash.eq_any(hashes))
                .load::<TransferEventDB>(&mut conn)
                .map_err(StorageError::from)?;
            rows.into_iter()
                .filter(|row| pairs.contains(&(row.transaction_hash.clone(), row.log_index)))
                .map(|row| TransferEvent::try_from(row).map_err(Into::into))
                .collect()
        })
        .await
        .map_err(blocking_join_error)?
    }

    async fn load_delegation_details(&self, keys: &[EventKey]) -> Result<Vec<DelegationEvent>> {
        let pool = Arc::clone(&self.pool);
        let (hashes, pairs) = wanted_pairs(keys);
        tokio::task::spawn_blocking(move || -> Result<Vec<DelegationEvent>> {
            let mut conn = get_connection(&pool)?;
            let rows = delegation_events::table
                .filter(delegation_events::transaction_hash.eq_any(hashes))
                .load::<DelegationEventDB>(&mut conn)
                .map_err(StorageError::from)?;
            Ok(rows
                .into_iter()
                .filter(|row| pairs.contains(&(row.transaction_hash.clone(), row.log_index)))
                .map(DelegationEvent::from)
                .collect())
        })
        .await
        .map_err(blocking_join_error)?
    }
}
