//! Connection configuration for the policy manager.
//!
//! A TOML file layered under `PSM_*` environment variables, session id
//! resolution (named env var + `PSM_SID` + plaintext), and translation to a
//! ready [`psm_api::PsmClient`] or [`psm_core::Reconciler`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use psm_api::{PsmClient, TlsMode, TransportConfig};
use psm_core::Reconciler;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable consulted for the session id when no named one is
/// configured or set.
pub const SESSION_ENV: &str = "PSM_SID";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no session id configured (set sid, sid_env, or PSM_SID)")]
    NoSession,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot build client: {0}")]
    Api(#[from] psm_api::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Policy manager base URL (e.g., "https://psm.example.com").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Tenant used when a record does not name one.
    #[serde(default = "default_tenant")]
    pub tenant: String,

    /// Session id (plaintext; prefer `sid_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    /// Name of an environment variable holding the session id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid_env: Option<String>,

    /// Skip certificate verification.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a PEM CA certificate for a privately signed server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: None,
            tenant: default_tenant(),
            sid: None,
            sid_env: None,
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
        }
    }
}

fn default_tenant() -> String {
    "default".into()
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "psm", "psm-reconcile").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("psm-reconcile");
    p
}

// ── Loading and saving ──────────────────────────────────────────────

/// Load config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` (which may not exist) + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PSM_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize config to TOML at `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Resolve the session id.
    ///
    /// 1. The variable named by `sid_env`, if set.
    /// 2. `PSM_SID`.
    /// 3. Plaintext `sid`.
    pub fn resolve_session(&self) -> Result<SecretString, ConfigError> {
        if let Some(val) = self.sid_env.as_deref().and_then(|name| std::env::var(name).ok()) {
            return Ok(SecretString::from(val));
        }
        if let Ok(val) = std::env::var(SESSION_ENV) {
            return Ok(SecretString::from(val));
        }
        self.sid
            .clone()
            .map(SecretString::from)
            .ok_or(ConfigError::NoSession)
    }

    /// The validated server URL.
    pub fn server_url(&self) -> Result<url::Url, ConfigError> {
        let raw = self.server.as_deref().ok_or_else(|| ConfigError::Validation {
            field: "server".into(),
            reason: "not set".into(),
        })?;
        raw.parse().map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {raw}"),
        })
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout),
        }
    }

    /// Build an authenticated client for the configured server.
    pub fn build_client(&self) -> Result<PsmClient, ConfigError> {
        let url = self.server_url()?;
        let session = self.resolve_session()?;
        Ok(PsmClient::new(url.as_str(), &session, &self.transport())?)
    }

    pub fn build_reconciler(&self) -> Result<Reconciler, ConfigError> {
        self.build_client().map(Reconciler::new)
    }
}
