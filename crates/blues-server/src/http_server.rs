// HTTP server: the same-origin stats proxy endpoint and the dashboard view
// model consumed by the rendering layer.

use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use blues_app::{Dashboard, DashboardLayout};
use blues_core::{PlayerGoals, PlayerId, ViewModel};
use blues_stats::GoalSource;

pub const PLAYER_ID_PARAM: &str = "playerId";
pub const MISSING_PLAYER_ID: &str = "Player ID is required";
pub const FETCH_FAILED: &str = "Failed to fetch player goals";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<dyn GoalSource>,
    pub layout: Arc<DashboardLayout>,
}

impl AppState {
    pub fn new(stats: Arc<dyn GoalSource>, layout: Arc<DashboardLayout>) -> Self {
        Self { stats, layout }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// JSON body of every non-200 proxy response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failure modes of the proxy endpoint, as the client sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyError {
    /// No `playerId` in the query string, or an empty one.
    MissingPlayerId,
    /// Anything that went wrong resolving the player upstream.
    FetchFailed,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ProxyError::MissingPlayerId => (StatusCode::BAD_REQUEST, MISSING_PLAYER_ID),
            ProxyError::FetchFailed => (StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED),
        };
        let body = ErrorBody {
            error: message.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/player-goals?playerId=N
///
/// The query is taken as raw pairs so that anything other than a single
/// usable id still answers with the JSON error body.
async fn player_goals(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<PlayerGoals>, ProxyError> {
    let Query(pairs) = query.map_err(|e| {
        warn!("Rejecting undecodable query string: {e}");
        ProxyError::FetchFailed
    })?;
    let raw = player_id_param(&pairs)?;

    let Some(player_id) = parse_player_id(raw) else {
        warn!(player_id = raw, "Rejecting malformed player id");
        return Err(ProxyError::FetchFailed);
    };

    match state.stats.player_goals(player_id).await {
        Ok(goals) => Ok(Json(goals)),
        Err(e) => {
            error!(player_id, "Error fetching goals for player {player_id}: {e}");
            Err(ProxyError::FetchFailed)
        }
    }
}

/// The one `playerId` value in `pairs`. Absent or empty is a missing id; a
/// repeated parameter names no single player.
fn player_id_param(pairs: &[(String, String)]) -> Result<&str, ProxyError> {
    let mut values = pairs
        .iter()
        .filter(|(key, _)| key == PLAYER_ID_PARAM)
        .map(|(_, value)| value.as_str());

    match (values.next(), values.next()) {
        (None, _) | (Some(""), None) => Err(ProxyError::MissingPlayerId),
        (Some(value), None) => Ok(value),
        (Some(_), Some(_)) => {
            warn!("Rejecting repeated {PLAYER_ID_PARAM} parameter");
            Err(ProxyError::FetchFailed)
        }
    }
}

/// GET /api/dashboard
///
/// Each request is one page load: a fresh aggregation with no reuse of
/// earlier lookups.
async fn dashboard(State(state): State<AppState>) -> Json<ViewModel> {
    let dashboard = Dashboard::new(Arc::clone(&state.layout));
    dashboard.load(Arc::clone(&state.stats)).await;
    Json(dashboard.snapshot())
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn parse_player_id(raw: &str) -> Option<PlayerId> {
    raw.parse::<PlayerId>().ok().filter(|id| *id > 0)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/player-goals", get(player_goals))
        .route("/api/dashboard", get(dashboard))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!("HTTP server listening on {local_addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
