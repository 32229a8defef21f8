//! Relevance classification for feed events.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::{FeedEventType, FeedRelevance};

/// Per-type relevance thresholds. Total over the event-type enum: a type
/// without an explicit threshold reads as zero, never as "missing".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelevanceThresholds(HashMap<FeedEventType, Decimal>);

impl RelevanceThresholds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, event_type: FeedEventType, threshold: Decimal) -> Self {
        self.0.insert(event_type, threshold);
        self
    }

    /// Total lookup; unset types default to zero.
    pub fn threshold(&self, event_type: FeedEventType) -> Decimal {
        self.0.get(&event_type).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Buckets an event's value (vote weight, transfer amount, ...) against its
/// type threshold. With no threshold configured every event is plainly
/// relevant; below-threshold events are classified out of the feed rather
/// than dropped from the table.
pub fn classify_relevance(
    event_type: FeedEventType,
    value: Decimal,
    thresholds: &RelevanceThresholds,
) -> FeedRelevance {
    let threshold = thresholds.threshold(event_type);
    if threshold.is_zero() {
        return FeedRelevance::Medium;
    }
    if value < threshold {
        return FeedRelevance::None;
    }
    if value < threshold * Decimal::TWO {
        return FeedRelevance::Low;
    }
    if value < threshold * Decimal::TEN {
        return FeedRelevance::Medium;
    }
    FeedRelevance::High
}
