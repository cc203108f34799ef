//! Content and identity keys.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque key identifying an account or an item.
///
/// Hashes are the last path segment of the entity's IRI on the hub, so they
/// survive a round trip through the wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash(String);

impl Hash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derive a hash from an IRI: the last non-empty path segment,
    /// percent-decoded, with any query or fragment removed.
    #[must_use]
    pub fn from_iri(iri: &str) -> Self {
        let without_fragment = iri.split('#').next().unwrap_or_default();
        let without_query = without_fragment.split('?').next().unwrap_or_default();
        let segment = without_query
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        let decoded = urlencoding::decode(segment)
            .map_or_else(|_| segment.to_string(), std::borrow::Cow::into_owned);
        Self(decoded)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Remove duplicates and empty hashes, keeping first-seen order.
    #[must_use]
    pub fn unique(hashes: &[Self]) -> Vec<Self> {
        let mut seen = HashSet::with_capacity(hashes.len());
        hashes
            .iter()
            .filter(|h| !h.is_empty() && seen.insert(h.as_str()))
            .cloned()
            .collect()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Hash {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Hash {
    fn from(value: String) -> Self {
        Self(value)
    }
}
