//! Federation adapter error types.

use quill_core::CoreError;
use thiserror::Error;

/// Errors returned by the federation adapter.
#[derive(Debug, Error)]
pub enum FederationError {
    /// Input rejected before any request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// The acting account's key could not be used to sign a request.
    #[error("signing error: {0}")]
    Signing(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The hub answered with a non-success status and a readable error envelope.
    #[error("hub error ({status}): {message}")]
    Protocol {
        /// HTTP status code, or the code listed in the envelope.
        status: u16,
        message: String,
    },

    /// A success response whose body could not be decoded.
    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    /// A failure response whose error envelope could not be parsed.
    #[error("unreadable error response ({status}) from {url}")]
    UnreadableErrorResponse { status: u16, url: String },

    /// A lookup that must return exactly one entity returned none.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },
}

/// Coarse classification of a [`FederationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local failure; no request reached the hub.
    Validation,
    /// Network, timeout, or unreadable failure.
    Transport,
    /// The hub rejected the request or answered with a body we cannot use.
    Protocol,
    NotFound,
}

impl FederationError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Signing(_) => ErrorKind::Validation,
            Self::Http(err) if err.is_builder() => ErrorKind::Validation,
            Self::Http(_) | Self::UnreadableErrorResponse { .. } => ErrorKind::Transport,
            Self::Protocol { .. } | Self::Malformed { .. } => ErrorKind::Protocol,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// HTTP status associated with the failure, when there is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Protocol { status, .. } | Self::UnreadableErrorResponse { status, .. } => {
                Some(*status)
            }
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn not_found(entity_type: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.into(),
        }
    }
}

impl From<CoreError> for FederationError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            CoreError::Validation(message) => Self::Validation(message),
        }
    }
}
