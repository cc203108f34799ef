//! Query filters supplied by the calling layer.
//!
//! Filters are plain data. The federation adapter decides which collection to
//! query from them and marshals the rest into a query string.

use serde::{Deserialize, Serialize};

use crate::hash::Hash;
use crate::item::MimeType;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadItemsFilter {
    /// Item hashes.
    #[serde(default)]
    pub key: Vec<Hash>,
    #[serde(default)]
    pub media_type: Vec<MimeType>,
    /// Submitter hashes.
    #[serde(default)]
    pub attributed_to: Vec<Hash>,
    /// Parent item hashes (or IRIs).
    #[serde(default)]
    pub in_reply_to: Vec<String>,
    /// Thread root hashes (or IRIs).
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub deleted: Vec<bool>,
    /// `false` restricts results to objects originating on the hub itself.
    #[serde(default)]
    pub federated: Vec<bool>,
    /// Actor hashes whose inbox should be listed instead of the global feed.
    #[serde(default)]
    pub followed_by: Vec<String>,
    /// Origin host restriction.
    #[serde(default)]
    pub iri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadAccountsFilter {
    #[serde(default)]
    pub key: Vec<Hash>,
    #[serde(default)]
    pub handle: Vec<String>,
    #[serde(default)]
    pub deleted: Vec<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadVotesFilter {
    /// Voter hashes.
    #[serde(default)]
    pub attributed_to: Vec<Hash>,
    /// Voted item hashes.
    #[serde(default)]
    pub item_key: Vec<Hash>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub items: LoadItemsFilter,
    #[serde(default)]
    pub accounts: LoadAccountsFilter,
    #[serde(default)]
    pub votes: LoadVotesFilter,
    /// Object or activity type names (`Note`, `Like`, ...).
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub max_items: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
}

impl Filters {
    /// Filter selecting items by hash.
    #[must_use]
    pub fn items_by_key(keys: impl IntoIterator<Item = Hash>) -> Self {
        Self {
            items: LoadItemsFilter {
                key: keys.into_iter().collect(),
                ..LoadItemsFilter::default()
            },
            ..Self::default()
        }
    }

    /// Filter selecting accounts by handle.
    #[must_use]
    pub fn accounts_by_handle(handle: impl Into<String>) -> Self {
        Self {
            accounts: LoadAccountsFilter {
                handle: vec![handle.into()],
                ..LoadAccountsFilter::default()
            },
            ..Self::default()
        }
    }

    /// Filter selecting accounts by hash.
    #[must_use]
    pub fn accounts_by_key(keys: impl IntoIterator<Item = Hash>) -> Self {
        Self {
            accounts: LoadAccountsFilter {
                key: keys.into_iter().collect(),
                ..LoadAccountsFilter::default()
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_items(mut self, max_items: u32) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_by_key_only_sets_item_keys() {
        let f = Filters::items_by_key([Hash::from("a"), Hash::from("b")]);
        assert_eq!(f.items.key.len(), 2);
        assert!(f.accounts.key.is_empty());
        assert!(f.max_items.is_none());
    }

    #[test]
    fn with_max_items_sets_limit() {
        let f = Filters::accounts_by_handle("alice").with_max_items(1);
        assert_eq!(f.accounts.handle, vec!["alice".to_string()]);
        assert_eq!(f.max_items, Some(1));
    }
}
