//! Persistence boundary for the sync loop.

use async_trait::async_trait;

use super::cursor::SyncEntityKind;
use super::model::{OffchainProposal, OffchainVote};
use crate::errors::Result;

/// Store for mirrored rows and sync cursors. Each save persists the items
/// and the cursor in a single transaction: both advance or neither does.
/// Saving an empty batch is a no-op that leaves the cursor untouched.
#[async_trait]
pub trait OffchainSyncRepositoryTrait: Send + Sync {
    fn get_last_cursor(&self, entity: SyncEntityKind) -> Result<Option<String>>;

    async fn reset_cursor(&self, entity: SyncEntityKind) -> Result<()>;

    async fn save_proposals(&self, items: Vec<OffchainProposal>, cursor: String) -> Result<()>;

    async fn save_votes(&self, items: Vec<OffchainVote>, cursor: String) -> Result<()>;
}
