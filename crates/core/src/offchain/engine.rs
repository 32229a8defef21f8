//! Timer-driven incremental sync engine.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error};
use tokio::time::{interval, MissedTickBehavior};

use super::cursor::{next_proposals_cursor, next_votes_cursor, SyncEntityKind};
use super::provider::OffchainProviderTrait;
use super::repository::OffchainSyncRepositoryTrait;
use super::scheduler::OFFCHAIN_SYNC_INTERVAL_SECS;
use crate::errors::Result;

/// Configuration for the polling loop.
#[derive(Debug, Clone)]
pub struct SyncEngineConfig {
    pub poll_interval: Duration,
    /// Reset every tracked cursor before the first tick, re-fetching the
    /// entity streams from the beginning.
    pub force_backfill: bool,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(OFFCHAIN_SYNC_INTERVAL_SECS),
            force_backfill: false,
        }
    }
}

/// Per-entity outcome of one sync tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncTickReport {
    pub proposals_synced: usize,
    pub votes_synced: usize,
    pub proposals_failed: bool,
    pub votes_failed: bool,
}

/// Polls the governance hub and mirrors proposals/votes into the store.
///
/// A single timer drives the loop; one tick fully completes — fetch,
/// persist, cursor update — before the timer re-arms, so ticks never
/// overlap and each entity is single-flight by construction.
pub struct OffchainSyncEngine {
    provider: Arc<dyn OffchainProviderTrait>,
    repository: Arc<dyn OffchainSyncRepositoryTrait>,
    config: SyncEngineConfig,
}

impl OffchainSyncEngine {
    pub fn new(
        provider: Arc<dyn OffchainProviderTrait>,
        repository: Arc<dyn OffchainSyncRepositoryTrait>,
        config: SyncEngineConfig,
    ) -> Self {
        Self {
            provider,
            repository,
            config,
        }
    }

    /// Runs the polling loop until the surrounding task is dropped.
    pub async fn run(&self) -> Result<()> {
        self.prepare().await?;

        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_tick().await;
        }
    }

    /// Applies the force-backfill cursor reset before the first tick.
    pub async fn prepare(&self) -> Result<()> {
        if self.config.force_backfill {
            for entity in SyncEntityKind::ALL {
                self.repository.reset_cursor(entity).await?;
                debug!("Reset sync cursor for entity '{}'", entity.as_str());
            }
        }
        Ok(())
    }

    /// One sync pass over both entities. A failure in one entity is logged
    /// with its name and aborts that entity's tick only; the cursor stays
    /// unchanged and the other entity still runs.
    pub async fn run_tick(&self) -> SyncTickReport {
        let mut report = SyncTickReport::default();

        match self.sync_proposals().await {
            Ok(count) => report.proposals_synced = count,
            Err(e) => {
                report.proposals_failed = true;
                error!(
                    "Sync tick failed for entity '{}': {}",
                    SyncEntityKind::Proposals.as_str(),
                    e
                );
            }
        }

        match self.sync_votes().await {
            Ok(count) => report.votes_synced = count,
            Err(e) => {
                report.votes_failed = true;
                error!(
                    "Sync tick failed for entity '{}': {}",
                    SyncEntityKind::Votes.as_str(),
                    e
                );
            }
        }

        report
    }

    async fn sync_proposals(&self) -> Result<usize> {
        let cursor = self.repository.get_last_cursor(SyncEntityKind::Proposals)?;
        let page = self.provider.fetch_proposals(cursor.as_deref()).await?;

        let Some(next_cursor) = next_proposals_cursor(&page.items) else {
            debug!("No new proposals; cursor unchanged");
            return Ok(0);
        };

        let count = page.items.len();
        self.repository.save_proposals(page.items, next_cursor).await?;
        debug!("Synced {} proposals", count);
        Ok(count)
    }

    async fn sync_votes(&self) -> Result<usize> {
        let cursor = self.repository.get_last_cursor(SyncEntityKind::Votes)?;
        let page = self.provider.fetch_votes(cursor.as_deref()).await?;

        let Some(next_cursor) = next_votes_cursor(&page.items, page.next_cursor.clone()) else {
            debug!("No new votes; cursor unchanged");
            return Ok(0);
        };

        let count = page.items.len();
        self.repository.save_votes(page.items, next_cursor).await?;
        debug!("Synced {} votes", count);
        Ok(count)
    }
}
