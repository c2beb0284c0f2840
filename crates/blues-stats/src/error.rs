/// Everything that can go wrong resolving one player's goals upstream.
#[derive(thiserror::Error, Debug)]
pub enum StatsError {
    /// The HTTP client could not be constructed (TLS backend, bad user agent).
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// HTTP request failed (network, DNS, TLS, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Upstream returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// Response body was not the expected JSON document.
    #[error("failed to parse landing document from {url}: {source}")]
    Parse {
        url: String,
        source: serde_json::Error,
    },

    /// The featured season matched but the goal count was absent.
    #[error("landing document for player {player_id} has no {field}")]
    MissingField {
        player_id: u32,
        field: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, StatsError>;
