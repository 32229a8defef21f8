//! Repository implementing the core sync persistence trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use govlens_core::offchain::{
    OffchainProposal, OffchainSyncRepositoryTrait, OffchainVote, SyncCursor, SyncEntityKind,
};
use govlens_core::Result;

use super::model::{OffchainProposalDB, OffchainVoteDB, SyncCursorDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{offchain_proposals, offchain_votes, sync_cursors};

pub struct OffchainSyncRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OffchainSyncRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Full cursor row for status surfaces; `get_last_cursor` is what the
    /// engine itself consumes.
    pub fn get_cursor_state(&self, entity: SyncEntityKind) -> Result<Option<SyncCursor>> {
        let mut conn = get_connection(&self.pool)?;
        let row = sync_cursors::table
            .find(entity.as_str())
            .first::<SyncCursorDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(|r| SyncCursor::try_from(r).map_err(Into::into))
            .transpose()
    }
}

fn upsert_cursor(
    conn: &mut SqliteConnection,
    entity: SyncEntityKind,
    cursor: &str,
) -> std::result::Result<(), StorageError> {
    let now = Utc::now().timestamp();
    let row = SyncCursorDB {
        entity: entity.as_str().to_string(),
        cursor_value: Some(cursor.to_string()),
        last_synced_at: now,
    };

    diesel::insert_into(sync_cursors::table)
        .values(&row)
        .on_conflict(sync_cursors::entity)
        .do_update()
        .set((
            sync_cursors::cursor_value.eq(Some(cursor.to_string())),
            sync_cursors::last_synced_at.eq(now),
        ))
        .execute(conn)?;
    Ok(())
}

#[async_trait]
impl OffchainSyncRepositoryTrait for OffchainSyncRepository {
    fn get_last_cursor(&self, entity: SyncEntityKind) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let row = sync_cursors::table
            .find(entity.as_str())
            .first::<SyncCursorDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.and_then(|r| r.cursor_value))
    }

    async fn reset_cursor(&self, entity: SyncEntityKind) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let now = Utc::now().timestamp();
                diesel::insert_into(sync_cursors::table)
                    .values(SyncCursorDB {
                        entity: entity.as_str().to_string(),
                        cursor_value: None,
                        last_synced_at: now,
                    })
                    .on_conflict(sync_cursors::entity)
                    .do_update()
                    .set((
                        sync_cursors::cursor_value.eq::<Option<String>>(None),
                        sync_cursors::last_synced_at.eq(now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn save_proposals(&self, items: Vec<OffchainProposal>, cursor: String) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        self.writer
            .exec(move |conn| {
                for item in items {
                    let row = OffchainProposalDB::from(item);
                    diesel::insert_into(offchain_proposals::table)
                        .values(&row)
                        .on_conflict(offchain_proposals::id)
                        .do_update()
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                upsert_cursor(conn, SyncEntityKind::Proposals, &cursor)?;
                Ok(())
            })
            .await
    }

    async fn save_votes(&self, items: Vec<OffchainVote>, cursor: String) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        self.writer
            .exec(move |conn| {
                for item in items {
                    let row = OffchainVoteDB::try_from(item)?;
                    diesel::insert_into(offchain_votes::table)
                        .values(&row)
                        .on_conflict((offchain_votes::voter, offchain_votes::proposal_id))
                        .do_update()
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                upsert_cursor(conn, SyncEntityKind::Votes, &cursor)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use govlens_core::offchain::ProposalState;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};

    fn setup_repository() -> (Arc<DbPool>, OffchainSyncRepository) {
        let app_data = tempdir()
            .expect("tempdir")
            .keep()
            .to_string_lossy()
            .to_string();
        let db_path = init(&app_data).expect("init db");
        run_migrations(&db_path).expect("migrate db");
        let pool = create_pool(&db_path).expect("create pool");
        let writer = spawn_writer(pool.as_ref().clone());
        let repository = OffchainSyncRepository::new(pool.clone(), writer);
        (pool, repository)
    }

    fn proposal(id: &str, created: i64, state: ProposalState) -> OffchainProposal {
        OffchainProposal {
            id: id.to_string(),
            space_id: "ens.eth".to_string(),
            author: "0xabc".to_string(),
            title: format!("Proposal {id}"),
            body: "body".to_string(),
            proposal_type: "single-choice".to_string(),
            start: created,
            end: created + 86_400,
            state,
            created,
            updated: created,
            flagged: false,
        }
    }

    fn vote(voter: &str, proposal_id: &str, power: rust_decimal::Decimal) -> OffchainVote {
        OffchainVote {
            space_id: "ens.eth".to_string(),
            voter: voter.to_string(),
            proposal_id: proposal_id.to_string(),
            choice: json!({"1": 60, "2": 40}),
            voting_power: power,
            reason: "because".to_string(),
            created: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn cursor_round_trips_and_resets() {
        let (_pool, repository) = setup_repository();

        assert_eq!(
            repository
                .get_last_cursor(SyncEntityKind::Proposals)
                .expect("cursor"),
            None
        );

        repository
            .save_proposals(
                vec![proposal("p1", 100, ProposalState::Closed)],
                "100".to_string(),
            )
            .await
            .expect("save");
        assert_eq!(
            repository
                .get_last_cursor(SyncEntityKind::Proposals)
                .expect("cursor"),
            Some("100".to_string())
        );

        repository
            .reset_cursor(SyncEntityKind::Proposals)
            .await
            .expect("reset");
        assert_eq!(
            repository
                .get_last_cursor(SyncEntityKind::Proposals)
                .expect("cursor"),
            None
        );

        // The reset keeps the row with its sync timestamp for status reads.
        let state = repository
            .get_cursor_state(SyncEntityKind::Proposals)
            .expect("state")
            .expect("row");
        assert_eq!(state.entity, SyncEntityKind::Proposals);
        assert_eq!(state.cursor_value, None);
        assert!(state.last_synced_at > 0);
    }

    #[tokio::test]
    async fn cursors_are_tracked_per_entity() {
        let (_pool, repository) = setup_repository();

        repository
            .save_proposals(
                vec![proposal("p1", 100, ProposalState::Closed)],
                "100".to_string(),
            )
            .await
            .expect("save proposals");
        repository
            .save_votes(vec![vote("0x1", "p1", dec!(10))], "v-7".to_string())
            .await
            .expect("save votes");

        assert_eq!(
            repository
                .get_last_cursor(SyncEntityKind::Proposals)
                .expect("cursor"),
            Some("100".to_string())
        );
        assert_eq!(
            repository
                .get_last_cursor(SyncEntityKind::Votes)
                .expect("cursor"),
            Some("v-7".to_string())
        );
    }

    #[tokio::test]
    async fn proposal_rows_and_cursor_persist_together() {
        let (pool, repository) = setup_repository();

        repository
            .save_proposals(
                vec![
                    proposal("p1", 100, ProposalState::Closed),
                    proposal("p2", 200, ProposalState::Active),
                ],
                "100".to_string(),
            )
            .await
            .expect("save");

        let mut conn = get_connection(&pool).expect("conn");
        let rows = offchain_proposals::table
            .order(offchain_proposals::created.asc())
            .load::<OffchainProposalDB>(&mut conn)
            .expect("load");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].state, "active");
    }

    #[tokio::test]
    async fn refetched_proposal_overwrites_mutable_state() {
        let (pool, repository) = setup_repository();

        repository
            .save_proposals(
                vec![proposal("p1", 100, ProposalState::Active)],
                "0".to_string(),
            )
            .await
            .expect("save");
        repository
            .save_proposals(
                vec![proposal("p1", 100, ProposalState::Closed)],
                "100".to_string(),
            )
            .await
            .expect("save again");

        let mut conn = get_connection(&pool).expect("conn");
        let rows = offchain_proposals::table
            .load::<OffchainProposalDB>(&mut conn)
            .expect("load");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state, "closed");
    }

    #[tokio::test]
    async fn revote_overwrites_by_voter_and_proposal() {
        let (pool, repository) = setup_repository();

        repository
            .save_votes(vec![vote("0x1", "p1", dec!(10))], "c1".to_string())
            .await
            .expect("save");
        repository
            .save_votes(vec![vote("0x1", "p1", dec!(25))], "c2".to_string())
            .await
            .expect("revote");

        let mut conn = get_connection(&pool).expect("conn");
        let rows = offchain_votes::table
            .load::<OffchainVoteDB>(&mut conn)
            .expect("load");
        assert_eq!(rows.len(), 1);
        let domain = OffchainVote::try_from(rows[0].clone()).expect("convert");
        assert_eq!(domain.voting_power, dec!(25));
        assert_eq!(domain.choice, json!({"1": 60, "2": 40}));
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let (_pool, repository) = setup_repository();

        repository
            .save_proposals(Vec::new(), "999".to_string())
            .await
            .expect("save");

        assert_eq!(
            repository
                .get_last_cursor(SyncEntityKind::Proposals)
                .expect("cursor"),
            None
        );
    }

    #[tokio::test]
    async fn failed_write_job_rolls_back_all_statements() {
        let (pool, repository) = setup_repository();

        let result = repository
            .writer
            .exec(move |conn| {
                diesel::insert_into(sync_cursors::table)
                    .values(SyncCursorDB {
                        entity: "votes".to_string(),
                        cursor_value: Some("partial".to_string()),
                        last_synced_at: 0,
                    })
                    .execute(conn)
                    .map_err(StorageError::from)?;
                // Duplicate PK without conflict handling: the whole job,
                // including the cursor write above, must roll back.
                diesel::insert_into(sync_cursors::table)
                    .values(SyncCursorDB {
                        entity: "votes".to_string(),
                        cursor_value: Some("partial".to_string()),
                        last_synced_at: 0,
                    })
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await;

        assert!(result.is_err(), "duplicate PK insert must fail");
        let mut conn = get_connection(&pool).expect("conn");
        let rows = sync_cursors::table
            .load::<SyncCursorDB>(&mut conn)
            .expect("load");
        assert!(rows.is_empty(), "partial cursor write must be rolled back");
    }
}
