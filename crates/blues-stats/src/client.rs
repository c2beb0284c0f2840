// NHL stats client and the proxy that turns a landing document into a
// current-season goal count.
//
// One lookup is exactly one upstream GET. There is no retry and no timeout
// beyond whatever the transport enforces.

use async_trait::async_trait;
use tracing::debug;

use blues_core::config::UpstreamConfig;
use blues_core::{PlayerGoals, PlayerId};

use crate::error::{Result, StatsError};
use crate::landing::{current_season_goals, LandingDocument, GOALS_FIELD};
use crate::GoalSource;

// ---------------------------------------------------------------------------
// NhlClient
// ---------------------------------------------------------------------------

/// Low-level client for the upstream player landing endpoint.
#[derive(Debug, Clone)]
pub struct NhlClient {
    http: reqwest::Client,
    base_url: String,
}

impl NhlClient {
    /// Create a client for the API rooted at `base_url` (no trailing slash
    /// required) that identifies itself as `user_agent`.
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(StatsError::ClientBuild)?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client using the provided [`reqwest::Client`].
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn landing_url(&self, player_id: PlayerId) -> String {
        format!("{}/player/{player_id}/landing", self.base_url)
    }

    /// Fetch and parse the landing document for one player.
    pub async fn fetch_landing(&self, player_id: PlayerId) -> Result<LandingDocument> {
        let url = self.landing_url(player_id);
        debug!(%url, "fetching player landing document");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| StatsError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::UnexpectedStatus { url, status });
        }

        let body = response
            .text()
            .await
            .map_err(|source| StatsError::ResponseBody {
                url: url.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| StatsError::Parse { url, source })
    }
}

// ---------------------------------------------------------------------------
// StatsProxy
// ---------------------------------------------------------------------------

/// Resolves current-season goals for a player, scoped to one season.
#[derive(Debug, Clone)]
pub struct StatsProxy {
    client: NhlClient,
    current_season: u32,
}

impl StatsProxy {
    pub fn new(client: NhlClient, current_season: u32) -> Self {
        Self {
            client,
            current_season,
        }
    }

    /// Build a proxy from the `[upstream]` section of server.toml.
    pub fn from_config(upstream: &UpstreamConfig) -> Result<Self> {
        let client = NhlClient::new(upstream.base_url.clone(), &upstream.user_agent)?;
        Ok(Self::new(client, upstream.current_season))
    }

    /// Look up one player's goals. Off-season or stale data yields 0 goals;
    /// anything that prevents a trustworthy answer is an error.
    pub async fn player_goals(&self, player_id: PlayerId) -> Result<PlayerGoals> {
        let doc = self.client.fetch_landing(player_id).await?;
        let goals = current_season_goals(&doc, self.current_season).ok_or(
            StatsError::MissingField {
                player_id,
                field: GOALS_FIELD,
            },
        )?;
        debug!(player_id, goals, "resolved current-season goals");
        Ok(PlayerGoals::new(goals))
    }
}

#[async_trait]
impl GoalSource for StatsProxy {
    async fn player_goals(&self, player_id: PlayerId) -> Result<PlayerGoals> {
        StatsProxy::player_goals(self, player_id).await
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
