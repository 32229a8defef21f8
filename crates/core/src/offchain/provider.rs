//! Provider boundary for the paginated governance hub.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::model::{OffchainProposal, OffchainVote};
use crate::errors::Result;

/// One page of an incremental fetch. `next_cursor` is opaque to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> FetchPage<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }
}

/// External paginated governance data source. A `None` cursor means "from
/// the beginning". Pages must ascend by `created` within each entity.
#[async_trait]
pub trait OffchainProviderTrait: Send + Sync {
    async fn fetch_proposals(&self, cursor: Option<&str>) -> Result<FetchPage<OffchainProposal>>;

    async fn fetch_votes(&self, cursor: Option<&str>) -> Result<FetchPage<OffchainVote>>;
}
