//! Feed page assembly: base page fetch, concurrent per-type detail
//! fan-out, original-order reassembly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::warn;

use super::filter::{FeedFilter, SortOrder};
use super::model::{
    EventKey, FeedEventBase, FeedEventDetail, FeedEventType, FeedItem, ProposalCreatedDetail,
    VoteCastDetail,
};
use crate::errors::Result;
use crate::power::{DelegationEvent, TransferEvent};

/// Read boundary for feed rows. Detail lookups are batched — one query per
/// event table for the whole key set, never one per row.
#[async_trait]
pub trait FeedRepositoryTrait: Send + Sync {
    fn count_events(&self, filter: &FeedFilter) -> Result<i64>;

    fn load_event_page(
        &self,
        filter: &FeedFilter,
        limit: i64,
        offset: i64,
        order: SortOrder,
    ) -> Result<Vec<FeedEventBase>>;

    async fn load_vote_details(&self, keys: &[EventKey]) -> Result<Vec<VoteCastDetail>>;

    async fn load_proposal_details(&self, keys: &[EventKey]) -> Result<Vec<ProposalCreatedDetail>>;

    async fn load_transfer_details(&self, keys: &[EventKey]) -> Result<Vec<TransferEvent>>;

    async fn load_delegation_details(&self, keys: &[EventKey]) -> Result<Vec<DelegationEvent>>;
}

/// One page of the activity feed plus the pagination-independent total.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub total_count: i64,
}

/// Assembles uniform feed pages over the four event kinds.
pub struct FeedService {
    repository: Arc<dyn FeedRepositoryTrait>,
}

impl FeedService {
    pub fn new(repository: Arc<dyn FeedRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Count of base rows matching the filter, independent of pagination.
    pub fn count(&self, filter: &FeedFilter) -> Result<i64> {
        self.repository.count_events(filter)
    }

    /// Loads one feed page. The base fetch runs first — it determines which
    /// detail fetches are needed — then the per-type detail fetches run
    /// concurrently against disjoint tables. Base rows whose detail record
    /// is missing are dropped: an eventual-consistency gap, not an error.
    pub async fn page(
        &self,
        filter: &FeedFilter,
        limit: i64,
        offset: i64,
        order: SortOrder,
    ) -> Result<FeedPage> {
        let total_count = self.repository.count_events(filter)?;
        let base_rows = self.repository.load_event_page(filter, limit, offset, order)?;

        let mut keys_by_type: HashMap<FeedEventType, Vec<EventKey>> = HashMap::new();
        for row in &base_rows {
            keys_by_type.entry(row.event_type).or_default().push(row.key());
        }

        let (votes, proposals, transfers, delegations) = futures::join!(
            self.load_votes(keys_by_type.get(&FeedEventType::Vote)),
            self.load_proposals(keys_by_type.get(&FeedEventType::Proposal)),
            self.load_transfers(keys_by_type.get(&FeedEventType::Transfer)),
            self.load_delegations(keys_by_type.get(&FeedEventType::Delegation)),
        );

        let mut details: HashMap<EventKey, FeedEventDetail> = HashMap::new();
        for detail in votes? {
            details.insert(
                EventKey {
                    transaction_hash: detail.transaction_hash.clone(),
                    log_index: detail.log_index,
                },
                FeedEventDetail::Vote(detail),
            );
        }
        for detail in proposals? {
            details.insert(
                EventKey {
                    transaction_hash: detail.transaction_hash.clone(),
                    log_index: detail.log_index,
                },
                FeedEventDetail::Proposal(detail),
            );
        }
        for detail in transfers? {
            details.insert(
                EventKey {
                    transaction_hash: detail.transaction_hash.clone(),
                    log_index: detail.log_index,
                },
                FeedEventDetail::Transfer(detail),
            );
        }
        for detail in delegations? {
            details.insert(
                EventKey {
                    transaction_hash: detail.transaction_hash.clone(),
                    log_index: detail.log_index,
                },
                FeedEventDetail::Delegation(detail),
            );
        }

        let mut items = Vec::with_capacity(base_rows.len());
        for base in base_rows {
            match details.remove(&base.key()) {
                Some(detail) => items.push(FeedItem { base, detail }),
                None => {
                    warn!(
                        "Dropping feed event ({}, {}): no {} detail row",
                        base.transaction_hash,
                        base.log_index,
                        base.event_type.as_str()
                    );
                }
            }
        }

        Ok(FeedPage { items, total_count })
    }

    async fn load_votes(&self, keys: Option<&Vec<EventKey>>) -> Result<Vec<VoteCastDetail>> {
        match keys {
            Some(keys) if !keys.is_empty() => self.repository.load_vote_details(keys).await,
            _ => Ok(Vec::new()),
        }
    }

    async fn load_proposals(
        &self,
        keys: Option<&Vec<EventKey>>,
    ) -> Result<Vec<ProposalCreatedDetail>> {
        match keys {
            Some(keys) if !keys.is_empty() => self.repository.load_proposal_details(keys).await,
            _ => Ok(Vec::new()),
        }
    }

    async fn load_transfers(&self, keys: Option<&Vec<EventKey>>) -> Result<Vec<TransferEvent>> {
        match keys {
            Some(keys) if !keys.is_empty() => self.repository.load_transfer_details(keys).await,
            _ => Ok(Vec::new()),
        }
    }

    async fn load_delegations(
        &self,
        keys: Option<&Vec<EventKey>>,
    ) -> Result<Vec<DelegationEvent>> {
        match keys {
            Some(keys) if !keys.is_empty() => self.repository.load_delegation_details(keys).await,
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::feed::model::FeedRelevance;

    fn base(tx: &str, log_index: i64, event_type: FeedEventType, timestamp: i64) -> FeedEventBase {
        FeedEventBase {
            transaction_hash: tx.to_string(),
            log_index,
            dao_id: "ens".to_string(),
            event_type,
            relevance: FeedRelevance::Medium,
            timestamp,
        }
    }

    fn vote_detail(tx: &str, log_index: i64) -> VoteCastDetail {
        VoteCastDetail {
            transaction_hash: tx.to_string(),
            log_index,
            voter: "0xvoter".to_string(),
            proposal_id: "p1".to_string(),
            support: 1,
            weight: dec!(120),
            reason: String::new(),
        }
    }

    fn transfer_detail(tx: &str, log_index: i64) -> TransferEvent {
        TransferEvent {
            transaction_hash: tx.to_string(),
            log_index,
            timestamp: 0,
            sender: "0xfrom".to_string(),
            recipient: "0xto".to_string(),
            amount: dec!(42),
        }
    }

    #[derive(Default)]
    struct FakeRepository {
        events: Vec<FeedEventBase>,
        votes: Vec<VoteCastDetail>,
        proposals: Vec<ProposalCreatedDetail>,
        transfers: Vec<TransferEvent>,
        delegations: Vec<DelegationEvent>,
        detail_tables_queried: Mutex<HashSet<FeedEventType>>,
    }

    impl FakeRepository {
        fn matching(&self, filter: &FeedFilter) -> Vec<FeedEventBase> {
            self.events
                .iter()
                .filter(|e| filter.matches(e))
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl FeedRepositoryTrait for FakeRepository {
        fn count_events(&self, filter: &FeedFilter) -> Result<i64> {
            Ok(self.matching(filter).len() as i64)
        }

        fn load_event_page(
            &self,
            filter: &FeedFilter,
            limit: i64,
            offset: i64,
            order: SortOrder,
        ) -> Result<Vec<FeedEventBase>> {
            let mut rows = self.matching(filter);
            match order {
                SortOrder::Asc => rows.sort_by_key(|e| (e.timestamp, e.log_index)),
                SortOrder::Desc => {
                    rows.sort_by_key(|e| (std::cmp::Reverse(e.timestamp), e.log_index))
                }
            }
            Ok(rows
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        }

        async fn load_vote_details(&self, keys: &[EventKey]) -> Result<Vec<VoteCastDetail>> {
            self.detail_tables_queried
                .lock()
                .unwrap()
                .insert(FeedEventType::Vote);
            Ok(self
                .votes
                .iter()
                .filter(|d| {
                    keys.iter().any(|k| {
                        k.transaction_hash == d.transaction_hash && k.log_index == d.log_index
                    })
                })
                .cloned()
                .collect())
        }

        async fn load_proposal_details(
            &self,
            keys: &[EventKey],
        ) -> Result<Vec<ProposalCreatedDetail>> {
            self.detail_tables_queried
                .lock()
                .unwrap()
                .insert(FeedEventType::Proposal);
            Ok(self
                .proposals
                .iter()
                .filter(|d| {
                    keys.iter().any(|k| {
                        k.transaction_hash == d.transaction_hash && k.log_index == d.log_index
                    })
                })
                .cloned()
                .collect())
        }

        async fn load_transfer_details(&self, keys: &[EventKey]) -> Result<Vec<TransferEvent>> {
            self.detail_tables_queried
                .lock()
                .unwrap()
                .insert(FeedEventType::Transfer);
            Ok(self
                .transfers
                .iter()
                .filter(|d| {
                    keys.iter().any(|k| {
                        k.transaction_hash == d.transaction_hash && k.log_index == d.log_index
                    })
                })
                .cloned()
                .collect())
        }

        async fn load_delegation_details(
            &self,
            keys: &[EventKey],
        ) -> Result<Vec<DelegationEvent>> {
            self.detail_tables_queried
                .lock()
                .unwrap()
                .insert(FeedEventType::Delegation);
            Ok(self
                .delegations
                .iter()
                .filter(|d| {
                    keys.iter().any(|k| {
                        k.transaction_hash == d.transaction_hash && k.log_index == d.log_index
                    })
                })
                .cloned()
                .collect())
        }
    }

    #[tokio::test]
    async fn page_preserves_base_row_order() {
        let repository = Arc::new(FakeRepository {
            events: vec![
                base("0xaa", 1, FeedEventType::Vote, 100),
                base("0xbb", 2, FeedEventType::Transfer, 200),
                base("0xcc", 3, FeedEventType::Vote, 300),
            ],
            votes: vec![vote_detail("0xaa", 1), vote_detail("0xcc", 3)],
            transfers: vec![transfer_detail("0xbb", 2)],
            ..FakeRepository::default()
        });

        let service = FeedService::new(repository);
        let page = service
            .page(&FeedFilter::default(), 10, 0, SortOrder::Desc)
            .await
            .expect("page");

        let hashes: Vec<&str> = page
            .items
            .iter()
            .map(|i| i.base.transaction_hash.as_str())
            .collect();
        assert_eq!(hashes, vec!["0xcc", "0xbb", "0xaa"]);
        assert!(matches!(page.items[1].detail, FeedEventDetail::Transfer(_)));
    }

    #[tokio::test]
    async fn missing_detail_rows_are_dropped_silently() {
        let repository = Arc::new(FakeRepository {
            events: vec![
                base("0xaa", 1, FeedEventType::Vote, 100),
                base("0xbb", 2, FeedEventType::Vote, 200),
            ],
            votes: vec![vote_detail("0xaa", 1)],
            ..FakeRepository::default()
        });

        let service = FeedService::new(repository);
        let page = service
            .page(&FeedFilter::default(), 10, 0, SortOrder::Asc)
            .await
            .expect("page");

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].base.transaction_hash, "0xaa");
        // The total still counts the base row with the gap.
        assert_eq!(page.total_count, 2);
    }

    #[tokio::test]
    async fn only_needed_detail_tables_are_queried() {
        let repository = Arc::new(FakeRepository {
            events: vec![base("0xaa", 1, FeedEventType::Delegation, 100)],
            delegations: vec![DelegationEvent {
                transaction_hash: "0xaa".to_string(),
                log_index: 1,
                timestamp: 100,
                delegator: "0xd".to_string(),
                from_delegate: "0xold".to_string(),
                to_delegate: "0xnew".to_string(),
            }],
            ..FakeRepository::default()
        });

        let service = FeedService::new(repository.clone());
        service
            .page(&FeedFilter::default(), 10, 0, SortOrder::Asc)
            .await
            .expect("page");

        let queried = repository.detail_tables_queried.lock().unwrap().clone();
        assert_eq!(queried.len(), 1);
        assert!(queried.contains(&FeedEventType::Delegation));
    }

    #[tokio::test]
    async fn count_ignores_pagination() {
        let repository = Arc::new(FakeRepository {
            events: (0..7)
                .map(|i| base(&format!("0x{i:02x}"), i, FeedEventType::Vote, 100 + i))
                .collect(),
            ..FakeRepository::default()
        });

        let service = FeedService::new(repository);
        let filter = FeedFilter::default();
        let total = service.count(&filter).expect("count");
        let page = service
            .page(&filter, 2, 4, SortOrder::Asc)
            .await
            .expect("page");

        assert_eq!(total, 7);
        assert_eq!(page.total_count, 7);
    }

    #[tokio::test]
    async fn filtered_page_respects_type_and_window() {
        let repository = Arc::new(FakeRepository {
            events: vec![
                base("0xaa", 1, FeedEventType::Vote, 100),
                base("0xbb", 2, FeedEventType::Transfer, 150),
                base("0xcc", 3, FeedEventType::Transfer, 400),
            ],
            transfers: vec![transfer_detail("0xbb", 2), transfer_detail("0xcc", 3)],
            ..FakeRepository::default()
        });

        let service = FeedService::new(repository);
        let filter = FeedFilter {
            types: Some(vec![FeedEventType::Transfer]),
            from_timestamp: Some(100),
            to_timestamp: Some(200),
            ..FeedFilter::default()
        };
        let page = service
            .page(&filter, 10, 0, SortOrder::Asc)
            .await
            .expect("page");

        assert_eq!(page.total_count, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].base.transaction_hash, "0xbb");
    }
}
