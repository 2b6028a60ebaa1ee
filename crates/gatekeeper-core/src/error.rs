//! Shared error type across gatekeeper crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Missing/duplicate consumer metadata or permission denied.
    Unauthenticated,
    /// Invalid call arguments.
    InvalidArgument,
    /// No handler is registered for the method.
    Unimplemented,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Unauthenticated => "UNAUTHENTICATED",
            ClientCode::InvalidArgument => "INVALID_ARGUMENT",
            ClientCode::Unimplemented => "UNIMPLEMENTED",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GatekeeperError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum GatekeeperError {
    /// Malformed configuration or ACL. Fatal at startup.
    #[error("config: {0}")]
    Config(String),
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    /// Bind/serve failure. Fatal at startup.
    #[error("transport: {0}")]
    Transport(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl GatekeeperError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            GatekeeperError::Unauthenticated(_) => ClientCode::Unauthenticated,
            GatekeeperError::BadRequest(_) => ClientCode::InvalidArgument,
            GatekeeperError::UnknownMethod(_) => ClientCode::Unimplemented,
            GatekeeperError::Config(_)
            | GatekeeperError::Transport(_)
            | GatekeeperError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Shorthand for the error every failed permission lookup produces.
    pub fn permission_denied() -> Self {
        GatekeeperError::Unauthenticated("permission denied".into())
    }
}
