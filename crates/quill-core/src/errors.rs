//! Cross-cutting error types for Quill.
//!
//! Adapter-specific failures (transport, protocol) live in
//! `quill-federation`; this enum only covers what can be decided without
//! talking to the hub.

use thiserror::Error;

/// Errors that can be raised by any Quill crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (missing identity, malformed key, ...).
    #[error("Validation error: {0}")]
    Validation(String),
}
