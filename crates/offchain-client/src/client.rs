//! HTTP client for the governance hub REST API.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use serde::Deserialize;

use govlens_core::errors::Result as CoreResult;
use govlens_core::offchain::{
    FetchPage, OffchainProposal, OffchainProviderTrait, OffchainVote, ProposalState,
    OFFCHAIN_SYNC_PAGE_SIZE,
};

use crate::error::Result;
use crate::OffchainApiError;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Client for the governance hub API. The hub serves proposals and votes
/// for a configured set of spaces as cursor-paginated JSON, ascending by
/// `created`.
#[derive(Debug, Clone)]
pub struct GovernanceHubClient {
    client: reqwest::Client,
    base_url: String,
    spaces: Vec<String>,
    page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageDto<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProposalDto {
    id: String,
    space_id: String,
    author: String,
    title: String,
    #[serde(default)]
    body: String,
    #[serde(rename = "type", default)]
    proposal_type: String,
    start: i64,
    end: i64,
    state: String,
    created: i64,
    #[serde(default)]
    updated: i64,
    #[serde(default)]
    flagged: bool,
}

impl ProposalDto {
    fn into_domain(self) -> OffchainProposal {
        OffchainProposal {
            id: self.id,
            space_id: self.space_id,
            author: self.author,
            title: self.title,
            body: self.body,
            proposal_type: self.proposal_type,
            start: self.start,
            end: self.end,
            state: ProposalState::from_provider(&self.state),
            created: self.created,
            updated: self.updated,
            flagged: self.flagged,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteDto {
    space_id: String,
    voter: String,
    proposal_id: String,
    #[serde(default)]
    choice: serde_json::Value,
    voting_power: Decimal,
    #[serde(default)]
    reason: String,
    created: i64,
}

impl VoteDto {
    fn into_domain(self) -> OffchainVote {
        OffchainVote {
            space_id: self.space_id,
            voter: self.voter,
            proposal_id: self.proposal_id,
            choice: self.choice,
            voting_power: self.voting_power,
            reason: self.reason,
            created: self.created,
        }
    }
}

impl GovernanceHubClient {
    /// Create a new hub client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the hub API (e.g., "https://hub.govlens.app")
    /// * `spaces` - Space ids whose proposals/votes the sync engine tracks
    pub fn new(base_url: &str, spaces: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            spaces,
            page_size: OFFCHAIN_SYNC_PAGE_SIZE,
        }
    }

    /// Reads the hub base URL from `GOVLENS_HUB_URL`; `None` when unset.
    pub fn from_env(spaces: Vec<String>) -> Option<Self> {
        std::env::var("GOVLENS_HUB_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|url| Self::new(&url, spaces))
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("Hub response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("Hub response error ({}): {}", status, preview);
    }

    async fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        cursor: Option<&str>,
    ) -> Result<PageDto<T>> {
        let mut request = self
            .client
            .get(format!("{}/api/{}", self.base_url, path))
            .query(&[
                ("spaces", self.spaces.join(",")),
                ("limit", self.page_size.to_string()),
            ]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(OffchainApiError::api(status.as_u16(), body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl OffchainProviderTrait for GovernanceHubClient {
    async fn fetch_proposals(&self, cursor: Option<&str>) -> CoreResult<FetchPage<OffchainProposal>> {
        let page: PageDto<ProposalDto> = self
            .get_page("proposals", cursor)
            .await
            .map_err(govlens_core::Error::from)?;
        Ok(FetchPage {
            items: page.data.into_iter().map(ProposalDto::into_domain).collect(),
            next_cursor: page.next_cursor,
        })
    }

    async fn fetch_votes(&self, cursor: Option<&str>) -> CoreResult<FetchPage<OffchainVote>> {
        let page: PageDto<VoteDto> = self
            .get_page("votes", cursor)
            .await
            .map_err(govlens_core::Error::from)?;
        Ok(FetchPage {
            items: page.data.into_iter().map(VoteDto::into_domain).collect(),
            next_cursor: page.next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = GovernanceHubClient::new("https://hub.test/", vec!["ens.eth".to_string()]);
        assert_eq!(client.base_url, "https://hub.test");
    }

    #[test]
    fn proposal_page_deserializes_and_maps_state() {
        let body = r#"{
            "data": [{
                "id": "prop-1",
                "spaceId": "ens.eth",
                "author": "0xabc",
                "title": "Enable fee switch",
                "type": "single-choice",
                "start": 1700000000,
                "end": 1700600000,
                "state": "active",
                "created": 1699990000
            }],
            "nextCursor": "1699990000"
        }"#;

        let page: PageDto<ProposalDto> = serde_json::from_str(body).expect("deserialize");
        assert_eq!(page.next_cursor.as_deref(), Some("1699990000"));

        let proposal = page.data[0].clone().into_domain();
        assert_eq!(proposal.state, ProposalState::Active);
        assert_eq!(proposal.body, "");
        assert!(!proposal.flagged);
    }

    #[test]
    fn unknown_proposal_state_stays_mutable() {
        let dto = ProposalDto {
            id: "prop-1".to_string(),
            space_id: "ens.eth".to_string(),
            author: "0xabc".to_string(),
            title: "t".to_string(),
            body: String::new(),
            proposal_type: String::new(),
            start: 0,
            end: 0,
            state: "quarantined".to_string(),
            created: 0,
            updated: 0,
            flagged: false,
        };
        assert!(!dto.into_domain().state.is_terminal());
    }

    #[test]
    fn vote_page_deserializes_weighted_choice() {
        let body = r#"{
            "data": [{
                "spaceId": "ens.eth",
                "voter": "0xvoter",
                "proposalId": "prop-1",
                "choice": {"1": 60, "2": 40},
                "votingPower": 1234.56,
                "reason": "split",
                "created": 1700000100
            }]
        }"#;

        let page: PageDto<VoteDto> = serde_json::from_str(body).expect("deserialize");
        assert_eq!(page.next_cursor, None);

        let vote = page.data[0].clone().into_domain();
        assert_eq!(vote.voting_power, dec!(1234.56));
        assert_eq!(vote.choice["1"], 60);
    }
}
