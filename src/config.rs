//! Startup configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Everything is read once in `main` into a typed [`AppConfig`]. Parsing goes
//! through a key lookup function so tests can feed a map instead of mutating
//! the process environment.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CURRENT_USER_ID: i64 = 1;
pub const DEFAULT_ACCESS_REQUEST_RECIPIENT: &str = "admin@ppchub.local";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is required for the {backend} backend")]
    Missing { var: &'static str, backend: &'static str },
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Remote,
    Postgres,
}

impl BackendKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Remote => "remote",
            Self::Postgres => "postgres",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Remote(RemoteConfig),
    Postgres { database_url: String, max_connections: u32 },
}

impl Backend {
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Memory => BackendKind::Memory,
            Self::Remote(_) => BackendKind::Remote,
            Self::Postgres { .. } => BackendKind::Postgres,
        }
    }
}

/// Inclusive range of simulated per-call latency, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub backend: Backend,
    pub latency: Option<LatencyRange>,
    pub fixture_dir: Option<PathBuf>,
    pub current_user_id: i64,
    pub access_request_recipient: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend: Backend::Memory,
            latency: None,
            fixture_dir: None,
            current_user_id: DEFAULT_CURRENT_USER_ID,
            access_request_recipient: DEFAULT_ACCESS_REQUEST_RECIPIENT.to_owned(),
        }
    }
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `PPC_BACKEND`: `memory` (default), `remote` or `postgres`
    /// - `DATABASE_URL`: required for `postgres`
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `PPC_REMOTE_BASE_URL`, `PPC_REMOTE_PROJECT_ID`, `PPC_REMOTE_API_KEY`:
    ///   required for `remote`
    /// - `PPC_REMOTE_TIMEOUT_SECS`: default 30
    /// - `PPC_LATENCY_MS`: `off` (default) or `min-max`, e.g. `200-500`
    /// - `PPC_FIXTURE_DIR`: directory of replacement fixture files
    /// - `PPC_CURRENT_USER_ID`: default 1
    /// - `PPC_ACCESS_REQUEST_RECIPIENT`: default `admin@ppchub.local`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unknown backends, missing backend settings,
    /// or unparsable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let port = env_parse(var("PORT"), "PORT", DEFAULT_PORT)?;
        let backend = match var("PPC_BACKEND").as_deref().unwrap_or("memory") {
            "memory" => Backend::Memory,
            "postgres" => Backend::Postgres {
                database_url: var("DATABASE_URL")
                    .ok_or(ConfigError::Missing { var: "DATABASE_URL", backend: "postgres" })?,
                max_connections: env_parse(var("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            },
            "remote" => {
                let required = |name: &'static str| var(name).ok_or(ConfigError::Missing { var: name, backend: "remote" });
                Backend::Remote(RemoteConfig {
                    base_url: required("PPC_REMOTE_BASE_URL")?
                        .trim_end_matches('/')
                        .to_owned(),
                    project_id: required("PPC_REMOTE_PROJECT_ID")?,
                    api_key: required("PPC_REMOTE_API_KEY")?,
                    timeout_secs: env_parse(
                        var("PPC_REMOTE_TIMEOUT_SECS"),
                        "PPC_REMOTE_TIMEOUT_SECS",
                        DEFAULT_REMOTE_TIMEOUT_SECS,
                    )?,
                })
            }
            other => {
                return Err(ConfigError::Invalid {
                    var: "PPC_BACKEND",
                    message: format!("unknown backend '{other}' (expected memory, remote or postgres)"),
                });
            }
        };

        Ok(Self {
            port,
            backend,
            latency: parse_latency(var("PPC_LATENCY_MS").as_deref())?,
            fixture_dir: var("PPC_FIXTURE_DIR").map(PathBuf::from),
            current_user_id: env_parse(var("PPC_CURRENT_USER_ID"), "PPC_CURRENT_USER_ID", DEFAULT_CURRENT_USER_ID)?,
            access_request_recipient: var("PPC_ACCESS_REQUEST_RECIPIENT")
                .unwrap_or_else(|| DEFAULT_ACCESS_REQUEST_RECIPIENT.to_owned()),
        })
    }
}

fn env_parse<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid { var, message: format!("'{raw}': {e}") }),
    }
}

/// Parse `off`, a single value `N`, or a range `min-max`.
fn parse_latency(raw: Option<&str>) -> Result<Option<LatencyRange>, ConfigError> {
    let invalid = |message: String| ConfigError::Invalid { var: "PPC_LATENCY_MS", message };
    let raw = match raw {
        None | Some("off" | "0") => return Ok(None),
        Some(raw) => raw,
    };

    let (min, max) = raw.split_once('-').unwrap_or((raw, raw));
    let parse = |part: &str| {
        part.trim()
            .parse::<u64>()
            .map_err(|e| invalid(format!("'{raw}': {e}")))
    };
    let (min_ms, max_ms) = (parse(min)?, parse(max)?);
    if min_ms > max_ms {
        return Err(invalid(format!("'{raw}': min exceeds max")));
    }
    Ok(Some(LatencyRange { min_ms, max_ms }))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
