//! Repository implementing the core power event trait, plus the ingest
//! writes used by the on-chain indexer boundary.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use govlens_core::power::{
    DelegationEvent, PowerEventRepositoryTrait, TransferEvent, VotingPowerDelta,
};
use govlens_core::Result;

use super::model::{cause_columns, DelegationEventDB, TransferEventDB, VotingPowerDeltaDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{delegation_events, transfer_events, voting_power_deltas};

pub struct PowerEventRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PowerEventRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Ingest write for the indexer boundary: raw delta rows land
    /// unattributed.
    pub async fn insert_raw_deltas(&self, deltas: Vec<VotingPowerDelta>) -> Result<()> {
        if deltas.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                for delta in deltas {
                    let row = VotingPowerDeltaDB::from(delta);
                    diesel::insert_into(voting_power_deltas::table)
                        .values(&row)
                        .on_conflict((
                            voting_power_deltas::transaction_hash,
                            voting_power_deltas::log_index,
                        ))
                        .do_nothing()
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }

    pub async fn insert_delegation_events(&self, events: Vec<DelegationEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                for event in events {
                    diesel::insert_into(delegation_events::table)
                        .values(DelegationEventDB::from(event))
                        .on_conflict((
                            delegation_events::transaction_hash,
                            delegation_events::log_index,
                        ))
                        .do_nothing()
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }

    pub async fn insert_transfer_events(&self, events: Vec<TransferEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                for event in events {
                    diesel::insert_into(transfer_events::table)
                        .values(TransferEventDB::from(event))
                        .on_conflict((
                            transfer_events::transaction_hash,
                            transfer_events::log_index,
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

#[async_trait]
impl PowerEventRepositoryTrait for PowerEventRepository {
    fn load_unattributed_deltas(&self, limit: i64) -> Result<Vec<VotingPowerDelta>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = voting_power_deltas::table
            .filter(voting_power_deltas::attributed.eq(false))
            .order((
                voting_power_deltas::timestamp.asc(),
                voting_power_deltas::log_index.asc(),
            ))
            .limit(limit)
            .load::<VotingPowerDeltaDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| VotingPowerDelta::try_from(row).map_err(Into::into))
            .collect()
    }

    fn delegations_for_transactions(
        &self,
        transaction_hashes: &[String],
    ) -> Result<Vec<DelegationEvent>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = delegation_events::table
            .filter(delegation_events::transaction_hash.eq_any(transaction_hashes))
            .order((
                delegation_events::transaction_hash.asc(),
                delegation_events::log_index.asc(),
            ))
            .load::<DelegationEventDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(DelegationEvent::from).collect())
    }

    fn transfers_for_transactions(
        &self,
        transaction_hashes: &[String],
    ) -> Result<Vec<TransferEvent>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transfer_events::table
            .filter(transfer_events::transaction_hash.eq_any(transaction_hashes))
            .order((
                transfer_events::transaction_hash.asc(),
                transfer_events::log_index.asc(),
            ))
            .load::<TransferEventDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| TransferEvent::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn save_deltas(&self, deltas: Vec<VotingPowerDelta>) -> Result<()> {
        if deltas.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                for delta in deltas {
                    let (cause_kind, cause_log_index) = cause_columns(&delta.cause);
                    diesel::update(
                        voting_power_deltas::table
                            .find((delta.transaction_hash.clone(), delta.log_index)),
                    )
                    .set((
                        voting_power_deltas::cause_kind.eq(cause_kind),
                        voting_power_deltas::cause_log_index.eq(cause_log_index),
                        voting_power_deltas::attributed.eq(true),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }
}
