//! Submitted content: posts, links, and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::Account;
use crate::hash::Hash;

/// How an item's `data` should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    #[default]
    #[serde(rename = "text/plain")]
    Plain,
    #[serde(rename = "text/markdown")]
    Markdown,
    #[serde(rename = "text/html")]
    Html,
    #[serde(rename = "application/url")]
    Url,
}

impl MimeType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "text/plain",
            Self::Markdown => "text/markdown",
            Self::Html => "text/html",
            Self::Url => "application/url",
        }
    }

    /// Parse a media type string, ignoring parameters such as `charset`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.split(';').next().unwrap_or_default().trim() {
            "text/plain" => Some(Self::Plain),
            "text/markdown" => Some(Self::Markdown),
            "text/html" => Some(Self::Html),
            "application/url" => Some(Self::Url),
            _ => None,
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mention or hashtag attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Remote object IRI, assigned once the item has been federated.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub mentions: Vec<Tag>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// A post, link or comment.
///
/// A deleted item is a tombstone: it keeps its reply chain but its content
/// is gone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub hash: Hash,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub mime_type: MimeType,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submitted_by: Option<Account>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<Account>,
    #[serde(default)]
    pub deleted: bool,
    /// Immediate reply target.
    #[serde(default)]
    pub parent: Option<Box<Item>>,
    /// Root of the thread.
    #[serde(default)]
    pub op: Option<Box<Item>>,
    #[serde(default)]
    pub metadata: Option<ItemMetadata>,
}

impl Item {
    /// Remote object IRI, if the item has been federated.
    #[must_use]
    pub fn remote_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .map(|m| m.id.as_str())
            .filter(|id| !id.is_empty())
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub const fn is_link(&self) -> bool {
        matches!(self.mime_type, MimeType::Url)
    }

    /// An id-only reference: the hub listed it without its content.
    #[must_use]
    pub fn is_stub(&self) -> bool {
        !self.deleted && self.submitted_at.is_none()
    }
}
