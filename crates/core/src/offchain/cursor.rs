//! Sync cursor model and the per-entity advancement policies.

use serde::{Deserialize, Serialize};

use super::model::{OffchainProposal, OffchainVote};

/// Cursor value used when nothing at the head of the stream is final yet.
pub const CURSOR_SENTINEL_START: &str = "0";

/// Entities tracked by the incremental sync loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEntityKind {
    Proposals,
    Votes,
}

impl SyncEntityKind {
    pub const ALL: [SyncEntityKind; 2] = [SyncEntityKind::Proposals, SyncEntityKind::Votes];

    /// Stable string form used as the cursor row key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncEntityKind::Proposals => "proposals",
            SyncEntityKind::Votes => "votes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "proposals" => Some(SyncEntityKind::Proposals),
            "votes" => Some(SyncEntityKind::Votes),
            _ => None,
        }
    }
}

/// Persisted sync position for one entity. `cursor_value` is opaque to the
/// engine and monotonically non-decreasing across successful syncs, except
/// on an explicit reset for a forced backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCursor {
    pub entity: SyncEntityKind,
    pub cursor_value: Option<String>,
    pub last_synced_at: i64,
}

/// Next proposals cursor for a fetched page, or `None` for an empty page
/// (cursor left untouched).
///
/// Items must ascend by `created` — that is a provider contract, not
/// something this policy can repair. The cursor never passes an item whose
/// state is still mutable: with every item terminal it advances to the last
/// item's `created`; with a non-terminal item anywhere it stalls at the
/// `created` of the item just before the first non-terminal one, falling
/// back to the start sentinel when the very first item is still open. The
/// stalled-on item and everything after it are re-fetched each tick until
/// they settle.
pub fn next_proposals_cursor(items: &[OffchainProposal]) -> Option<String> {
    let last = items.last()?;
    debug_assert!(
        items.windows(2).all(|pair| pair[0].created <= pair[1].created),
        "provider returned proposals out of created order"
    );

    match items.iter().position(|item| !item.state.is_terminal()) {
        None => Some(last.created.to_string()),
        Some(0) => Some(CURSOR_SENTINEL_START.to_string()),
        Some(first_open) => Some(items[first_open - 1].created.to_string()),
    }
}

/// Next votes cursor, or `None` for an empty page. Votes are final the
/// moment they are written (identity voter+proposal, latest wins), so the
/// provider cursor is taken as-is; when the provider gives none, the last
/// item's `created` value is used.
pub fn next_votes_cursor(items: &[OffchainVote], provider_cursor: Option<String>) -> Option<String> {
    let last = items.last()?;
    provider_cursor.or_else(|| Some(last.created.to_string()))
}
