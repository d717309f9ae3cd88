// ── Core error types ──
//
// Errors surfaced by resource operations. Local failures (validation,
// malformed desired state) are kept apart from upstream ones so a caller can
// tell "fix your config" from "the server said no". The
// `From<psm_api::Error>` impl folds transport-layer errors into these kinds.

use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local errors ─────────────────────────────────────────────────
    /// Desired state violates a structural rule. Raised before any request.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Desired-state record does not match its schema.
    #[error("Invalid desired state: {message}")]
    Contract { message: String },

    // ── Upstream errors ──────────────────────────────────────────────
    #[error("Cannot reach policy manager: {reason}")]
    Transport { reason: String },

    /// Non-success status. `body` is the raw response text.
    #[error("Request rejected (HTTP {status} {status_text}): {body}")]
    Rejected {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Unexpected response: {message}")]
    Decode { message: String, body: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether the server reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { status: 404, .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<psm_api::Error> for CoreError {
    fn from(err: psm_api::Error) -> Self {
        match err {
            psm_api::Error::Transport(e) => {
                let reason = if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    e.to_string()
                };
                CoreError::Transport { reason }
            }
            psm_api::Error::Tls(msg) => CoreError::Transport {
                reason: format!("TLS error: {msg}"),
            },
            psm_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            psm_api::Error::InvalidSession(msg) => CoreError::Config {
                message: format!("Invalid session id: {msg}"),
            },
            psm_api::Error::Remote {
                status,
                status_text,
                body,
            } => CoreError::Rejected {
                status,
                status_text,
                body,
            },
            psm_api::Error::Deserialization { message, body } => {
                CoreError::Decode { message, body }
            }
        }
    }
}
