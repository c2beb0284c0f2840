// Configuration loading and parsing (server.toml, roster.toml).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::model::{Adjustments, ChangelogEntry, Roster, RosterGroup};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why the dashboard configuration could not be assembled.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("{path} is not valid TOML for this file: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid `{field}`: {message}")]
    Invalid { field: String, message: String },

    #[error("could not seed {path} from defaults: {source}")]
    Seed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not determine the working directory: {0}")]
    WorkingDir(std::io::Error),
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub roster: Roster,
    pub adjustments: Adjustments,
    pub changelog: Vec<ChangelogEntry>,
}

// ---------------------------------------------------------------------------
// server.toml structs
// ---------------------------------------------------------------------------

pub const SERVER_FILE: &str = "server.toml";
pub const ROSTER_FILE: &str = "roster.toml";

/// Raw deserialization target for the entire server.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ServerFile {
    server: ServerConfig,
    upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base of the stats API, without trailing slash, e.g.
    /// `https://api-web.nhle.com/v1`.
    pub base_url: String,
    /// Season the dashboard reports, in the upstream's `YYYYyyyy` form.
    pub current_season: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("blues-goals/{}", env!("CARGO_PKG_VERSION"))
}

// ---------------------------------------------------------------------------
// roster.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct RosterFile {
    groups: Vec<RosterGroup>,
    #[serde(default)]
    adjustments: Adjustments,
    #[serde(default)]
    changelog: Vec<ChangelogEntry>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse and validate `config/server.toml` and `config/roster.toml` under
/// `base_dir`. Nothing is seeded; a missing file is an error.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");
    let server_file: ServerFile = parse_file(&config_dir.join(SERVER_FILE))?;
    let roster_file: RosterFile = parse_file(&config_dir.join(ROSTER_FILE))?;

    let config = Config {
        server: server_file.server,
        upstream: server_file.upstream,
        roster: Roster {
            groups: roster_file.groups,
        },
        adjustments: roster_file.adjustments,
        changelog: roster_file.changelog,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy `server.toml` and `roster.toml` from `defaults/` into `config/`
/// when `config/` lacks them. Edited files in `config/` are left alone, and a
/// file with no shipped default is skipped so loading reports it as missing.
///
/// Returns the paths that were written.
pub fn seed_config_dir(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    let defaults_dir = base_dir.join("defaults");
    let mut seeded = Vec::new();

    for file in [SERVER_FILE, ROSTER_FILE] {
        let target = config_dir.join(file);
        let shipped = defaults_dir.join(file);
        if target.exists() || !shipped.is_file() {
            continue;
        }

        fs::create_dir_all(&config_dir).map_err(|source| ConfigError::Seed {
            path: config_dir.clone(),
            source,
        })?;
        fs::copy(&shipped, &target).map_err(|source| ConfigError::Seed {
            path: target.clone(),
            source,
        })?;
        info!(path = %target.display(), "seeded config from defaults");
        seeded.push(target);
    }

    Ok(seeded)
}

/// Seed and load the configuration rooted at the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
    seed_config_dir(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        message: message.into(),
    }
}

/// Split a `YYYYyyyy` season id into its start and end years.
pub fn season_years(season: u32) -> (u32, u32) {
    (season / 10_000, season % 10_000)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port", "must be greater than 0"));
    }

    let base_url = &config.upstream.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(invalid(
            "upstream.base_url",
            format!("must be an http(s) URL, got {base_url:?}"),
        ));
    }

    let season = config.upstream.current_season;
    let (start, end) = season_years(season);
    if !(1900..=2100).contains(&start) || end != start + 1 {
        return Err(invalid(
            "upstream.current_season",
            format!("must be two consecutive years like 20242025, got {season}"),
        ));
    }

    validate_roster(&config.roster)?;

    for name in config.adjustments.group_names() {
        if !config.roster.groups.iter().any(|g| g.name == name) {
            return Err(invalid(
                format!("adjustments.{name}"),
                "does not name a roster group",
            ));
        }
    }

    Ok(())
}

fn validate_roster(roster: &Roster) -> Result<(), ConfigError> {
    if roster.groups.is_empty() {
        return Err(invalid("groups", "at least one group is required"));
    }

    let mut names = HashSet::new();
    let mut ids = HashSet::new();

    for group in &roster.groups {
        if group.name.trim().is_empty() {
            return Err(invalid("groups.name", "must not be empty"));
        }
        if !names.insert(group.name.as_str()) {
            return Err(invalid(
                "groups.name",
                format!("duplicate group {:?}", group.name),
            ));
        }

        for player in &group.players {
            if player.id == 0 {
                return Err(invalid(
                    format!("groups.{}.players.id", group.name),
                    format!("must be > 0 for {:?}", player.full_name),
                ));
            }
            if player.full_name.trim().is_empty() {
                return Err(invalid(
                    format!("groups.{}.players.full_name", group.name),
                    format!("must not be empty for player {}", player.id),
                ));
            }
            if !ids.insert(player.id) {
                return Err(invalid(
                    format!("groups.{}.players.id", group.name),
                    format!("player {} appears more than once in the roster", player.id),
                ));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
