//! Feed query filter.

use serde::{Deserialize, Serialize};

use super::model::{FeedEventBase, FeedEventType, FeedRelevance};

/// Sort direction for feed pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Feed query filter. Time bounds are inclusive; a `None` dimension is
/// unconstrained. The count of matching rows is independent of pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedFilter {
    pub dao_id: Option<String>,
    pub from_timestamp: Option<i64>,
    pub to_timestamp: Option<i64>,
    pub types: Option<Vec<FeedEventType>>,
    pub relevances: Option<Vec<FeedRelevance>>,
}

impl FeedFilter {
    /// In-memory predicate equivalent to the storage-side query
    /// composition; used by fakes and callers filtering loaded rows.
    pub fn matches(&self, event: &FeedEventBase) -> bool {
        if let Some(dao_id) = &self.dao_id {
            if &event.dao_id != dao_id {
                return false;
            }
        }
        if let Some(from) = self.from_timestamp {
            if event.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to_timestamp {
            if event.timestamp > to {
                return false;
            }
        }
        if let Some(types) = &self.types {
            if !types.contains(&event.event_type) {
                return false;
            }
        }
        if let Some(relevances) = &self.relevances {
            if !relevances.contains(&event.relevance) {
                return false;
            }
        }
        true
    }
}
