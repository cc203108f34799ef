//! Accounts and their federation metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::Hash;

/// Handle of the sentinel account used when nobody is logged in.
pub const ANONYMOUS_HANDLE: &str = "anonymous";

/// Hash of the sentinel account used when nobody is logged in.
pub const ANONYMOUS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// A person as the calling layer knows it.
///
/// Local accounts only carry a hash and a handle; the adapter synthesizes
/// their collection IRIs. Federated accounts carry their remote IRIs in
/// [`AccountMetadata`] and those are used verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub hash: Hash,
    pub handle: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub metadata: Option<AccountMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetadata {
    /// Remote actor IRI, set once the account is known to the hub.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Public profile URL.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub inbox_iri: String,
    #[serde(default)]
    pub outbox_iri: String,
    #[serde(default)]
    pub liked_iri: String,
    #[serde(default)]
    pub followers_iri: String,
    #[serde(default)]
    pub following_iri: String,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub key: Option<KeyPair>,
    #[serde(default)]
    pub oauth: Option<OAuthToken>,
}

/// Avatar reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub uri: String,
    pub mime_type: String,
}

/// Algorithm of a stored key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyKind {
    #[serde(rename = "id-ed25519")]
    Ed25519,
    #[serde(rename = "id-rsa")]
    Rsa,
    #[serde(rename = "id-ecdsa")]
    Ecdsa,
}

impl KeyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ed25519 => "id-ed25519",
            Self::Rsa => "id-rsa",
            Self::Ecdsa => "id-ecdsa",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw asymmetric key material.
///
/// For [`KeyKind::Ed25519`] the private half is the 32-byte seed and the
/// public half the 32-byte verifying key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub kind: KeyKind,
    pub public: Vec<u8>,
    #[serde(default)]
    pub private: Vec<u8>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("kind", &self.kind)
            .field("public_len", &self.public.len())
            .field("private", &"<redacted>")
            .finish()
    }
}

/// OAuth bearer credentials issued by the hub.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl Account {
    /// The sentinel account attributed to requests with no logged-in user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            hash: Hash::from(ANONYMOUS_HASH),
            handle: ANONYMOUS_HANDLE.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.handle == ANONYMOUS_HANDLE
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.hash.is_empty() && !self.handle.is_empty()
    }

    #[must_use]
    pub fn is_logged(&self) -> bool {
        self.is_valid() && !self.is_anonymous()
    }

    /// Whether the account lives on another server and carries its own IRIs.
    #[must_use]
    pub fn is_federated(&self) -> bool {
        self.remote_id().is_some()
    }

    /// Remote actor IRI, if the account has one.
    #[must_use]
    pub fn remote_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .map(|m| m.id.as_str())
            .filter(|id| !id.is_empty())
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.oauth.as_ref())
            .map(|o| o.access_token.as_str())
            .filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn key(&self) -> Option<&KeyPair> {
        self.metadata.as_ref().and_then(|m| m.key.as_ref())
    }

    /// Whether `other` denotes the same person, by hash or by handle.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        (!self.hash.is_empty() && self.hash == other.hash)
            || (!self.handle.is_empty() && self.handle == other.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_valid_but_not_logged() {
        let anon = Account::anonymous();
        assert!(anon.is_anonymous());
        assert!(anon.is_valid());
        assert!(!anon.is_logged());
        assert!(!anon.is_federated());
    }

    #[test]
    fn remote_id_ignores_empty_metadata() {
        let mut acc = Account {
            hash: Hash::from("d3adb33f"),
            handle: "alice".into(),
            metadata: Some(AccountMetadata::default()),
            ..Account::default()
        };
        assert!(acc.remote_id().is_none());

        acc.metadata.as_mut().unwrap().id = "https://remote.example/users/alice".into();
        assert_eq!(acc.remote_id(), Some("https://remote.example/users/alice"));
        assert!(acc.is_federated());
    }

    #[test]
    fn bearer_token_requires_non_empty_value() {
        let mut acc = Account {
            hash: Hash::from("d3adb33f"),
            handle: "alice".into(),
            metadata: Some(AccountMetadata {
                oauth: Some(OAuthToken::default()),
                ..AccountMetadata::default()
            }),
            ..Account::default()
        };
        assert!(acc.bearer_token().is_none());

        acc.metadata.as_mut().unwrap().oauth = Some(OAuthToken {
            access_token: "tok".into(),
            refresh_token: String::new(),
        });
        assert_eq!(acc.bearer_token(), Some("tok"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let key = KeyPair {
            kind: KeyKind::Ed25519,
            public: vec![1; 32],
            private: vec![42; 32],
        };
        let rendered = format!("{key:?}");
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("42"));
    }

    #[test]
    fn key_kind_serializes_with_id_prefix() {
        let json = serde_json::to_string(&KeyKind::Rsa).unwrap();
        assert_eq!(json, "\"id-rsa\"");
    }

    #[test]
    fn matches_by_hash_or_handle() {
        let a = Account {
            hash: Hash::from("aaaa"),
            handle: "alice".into(),
            ..Account::default()
        };
        let by_handle = Account {
            handle: "alice".into(),
            ..Account::default()
        };
        let other = Account {
            hash: Hash::from("bbbb"),
            handle: "bob".into(),
            ..Account::default()
        };
        assert!(a.matches(&by_handle));
        assert!(!a.matches(&other));
    }
}
