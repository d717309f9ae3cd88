use thiserror::Error;

/// Top-level error type for the `psm-api` crate.
///
/// Covers every failure mode of a single HTTP round trip against the
/// policy manager: building the client, reaching the server, a rejected
/// request, and a response body that does not decode. `psm-core` maps
/// these into reconciliation errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake, certificate, or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The session id cannot be carried in a `Cookie` header.
    #[error("Invalid session id: {0}")]
    InvalidSession(String),

    // ── Remote ──────────────────────────────────────────────────────
    /// The server answered with a non-success status. The body is kept
    /// verbatim so the caller sees exactly what the server complained about.
    #[error("HTTP {status} {status_text}: {body}")]
    Remote {
        status: u16,
        status_text: String,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the server reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Remote { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// The HTTP status code attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
