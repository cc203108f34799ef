//! Canonical identifiers for actors, objects, and collections.
//!
//! Every IRI the adapter sends is derived here from an [`Endpoints`] value,
//! never from process-wide state. Nothing in this module performs I/O.

use quill_config::QuillConfig;
use quill_core::{Account, Item};
use std::fmt;

use crate::wire::PUBLIC_NS;

/// Base URLs of the hub and of this deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api: String,
    actors: String,
    objects: String,
    instance: String,
}

/// A collection owned by an actor (or by the hub, for the anonymous actor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Inbox,
    Outbox,
    Liked,
    Likes,
    Followers,
    Following,
    Replies,
}

impl CollectionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Outbox => "outbox",
            Self::Liked => "liked",
            Self::Likes => "likes",
            Self::Followers => "followers",
            Self::Following => "following",
            Self::Replies => "replies",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Endpoints {
    /// Build endpoints from the hub API URL and the deployment's public URL.
    /// Trailing slashes are ignored.
    pub fn new(api_url: &str, instance_url: &str) -> Self {
        let api = api_url.trim_end_matches('/').to_string();
        Self {
            actors: format!("{api}/actors"),
            objects: format!("{api}/objects"),
            instance: instance_url.trim_end_matches('/').to_string(),
            api,
        }
    }

    #[must_use]
    pub fn from_config(config: &QuillConfig) -> Self {
        Self::new(config.hub.api_url(), config.instance.base_url())
    }

    /// The hub's own base actor IRI.
    #[must_use]
    pub fn api(&self) -> &str {
        &self.api
    }

    #[must_use]
    pub fn actors(&self) -> &str {
        &self.actors
    }

    #[must_use]
    pub fn objects(&self) -> &str {
        &self.objects
    }

    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Hub-wide activity feed.
    #[must_use]
    pub fn inbox(&self) -> String {
        format!("{}/{}", self.api, CollectionKind::Inbox)
    }

    #[must_use]
    pub fn shared_inbox(&self) -> String {
        format!("{}/self/inbox", self.api)
    }

    /// OAuth server root: the API host with its first `api` replaced by `oauth`.
    #[must_use]
    pub fn oauth(&self) -> String {
        self.api.replacen("api", "oauth", 1)
    }

    /// Actor IRI of `account`.
    ///
    /// The anonymous account always maps to the public collection.
    #[must_use]
    pub fn actor_id(&self, account: &Account) -> String {
        if account.is_anonymous() {
            return PUBLIC_NS.to_string();
        }
        format!("{}/{}", self.actors, escape(account.hash.as_str()))
    }

    /// Actor IRI as published on the wire: the stored remote id for federated
    /// accounts, the derived one otherwise.
    #[must_use]
    pub fn wire_actor_id(&self, account: &Account) -> String {
        account
            .remote_id()
            .map_or_else(|| self.actor_id(account), str::to_string)
    }

    /// Object IRI of `item`, or `None` when the item has no hash yet.
    ///
    /// An item that already carries a remote id keeps it.
    #[must_use]
    pub fn object_id(&self, item: &Item) -> Option<String> {
        if item.hash.is_empty() {
            return None;
        }
        Some(item.remote_id().map_or_else(
            || format!("{}/{}", self.objects, escape(item.hash.as_str())),
            str::to_string,
        ))
    }

    /// Collection IRI for `account`.
    ///
    /// Accounts without a handle, and the anonymous account, use the hub's
    /// own collections.
    #[must_use]
    pub fn collection_id(&self, account: &Account, kind: CollectionKind) -> String {
        if account.handle.is_empty() || account.is_anonymous() {
            return format!("{}/{kind}", self.api);
        }
        self.actor_collection(account.hash.as_str(), kind)
    }

    /// Single-vote lookup for the item whose hash is `hash`.
    #[must_use]
    pub fn liked(&self, hash: &str) -> String {
        format!("{}/{}/{}", self.api, CollectionKind::Liked, escape(hash))
    }

    /// Object IRI for a bare hash.
    #[must_use]
    pub fn object(&self, hash: &str) -> String {
        format!("{}/{}", self.objects, escape(hash))
    }

    /// Collection of the actor whose hash is `hash`.
    #[must_use]
    pub fn actor_collection(&self, hash: &str, kind: CollectionKind) -> String {
        format!("{}/{}/{kind}", self.actors, escape(hash))
    }

    /// Outbox of `account`: the stored IRI for federated accounts, the
    /// derived one otherwise.
    #[must_use]
    pub fn outbox(&self, account: &Account) -> String {
        account
            .metadata
            .as_ref()
            .map(|m| m.outbox_iri.as_str())
            .filter(|iri| !iri.is_empty())
            .map_or_else(
                || self.collection_id(account, CollectionKind::Outbox),
                str::to_string,
            )
    }

    /// Public profile URL on this deployment.
    #[must_use]
    pub fn account_url(&self, account: &Account) -> String {
        format!("{}/~{}", self.instance, escape(&account.handle))
    }

    /// Permalink of `item` on this deployment.
    #[must_use]
    pub fn item_url(&self, item: &Item) -> String {
        let hash = escape(item.hash.as_str());
        match item.submitted_by.as_ref().filter(|a| !a.handle.is_empty()) {
            Some(author) => format!("{}/{hash}", self.account_url(author)),
            None => format!("{}/item/{hash}", self.instance),
        }
    }
}

fn escape(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_core::{AccountMetadata, Hash, ItemMetadata};

    fn endpoints() -> Endpoints {
        Endpoints::new("https://hub.example/", "https://quill.example")
    }

    fn alice() -> Account {
        Account {
            hash: Hash::from("a11ce000"),
            handle: "alice".into(),
            ..Account::default()
        }
    }

    #[test]
    fn bases_are_derived_from_api_url() {
        let e = endpoints();
        assert_eq!(e.api(), "https://hub.example");
        assert_eq!(e.actors(), "https://hub.example/actors");
        assert_eq!(e.objects(), "https://hub.example/objects");
        assert_eq!(e.inbox(), "https://hub.example/inbox");
        assert_eq!(e.shared_inbox(), "https://hub.example/self/inbox");
    }

    #[test]
    fn oauth_replaces_first_api_only() {
        let e = Endpoints::new("https://api.hub.example/api", "https://quill.example");
        assert_eq!(e.oauth(), "https://oauth.hub.example/api");
    }

    #[test]
    fn actor_id_is_deterministic() {
        let e = endpoints();
        let first = e.actor_id(&alice());
        let second = e.actor_id(&alice());
        assert_eq!(first, "https://hub.example/actors/a11ce000");
        assert_eq!(first, second);
    }

    #[test]
    fn anonymous_actor_is_public_namespace() {
        assert_eq!(endpoints().actor_id(&Account::anonymous()), PUBLIC_NS);
    }

    #[test]
    fn object_id_needs_a_hash() {
        assert_eq!(endpoints().object_id(&Item::default()), None);
    }

    #[test]
    fn object_id_escapes_hash() {
        let item = Item {
            hash: Hash::from("a b"),
            ..Item::default()
        };
        assert_eq!(
            endpoints().object_id(&item).as_deref(),
            Some("https://hub.example/objects/a%20b")
        );
    }

    #[test]
    fn object_id_keeps_remote_id() {
        let item = Item {
            hash: Hash::from("h1"),
            metadata: Some(ItemMetadata {
                id: "https://remote.example/notes/1".into(),
                ..ItemMetadata::default()
            }),
            ..Item::default()
        };
        assert_eq!(
            endpoints().object_id(&item).as_deref(),
            Some("https://remote.example/notes/1")
        );
    }

    #[test]
    fn collection_id_for_handles_and_anonymous() {
        let e = endpoints();
        assert_eq!(
            e.collection_id(&alice(), CollectionKind::Outbox),
            "https://hub.example/actors/a11ce000/outbox"
        );
        assert_eq!(
            e.collection_id(&Account::anonymous(), CollectionKind::Inbox),
            "https://hub.example/inbox"
        );
        assert_eq!(
            e.collection_id(&Account::default(), CollectionKind::Liked),
            "https://hub.example/liked"
        );
    }

    #[test]
    fn outbox_prefers_stored_iri() {
        let mut remote = alice();
        remote.metadata = Some(AccountMetadata {
            id: "https://remote.example/users/alice".into(),
            outbox_iri: "https://remote.example/users/alice/outbox".into(),
            ..AccountMetadata::default()
        });
        assert_eq!(
            endpoints().outbox(&remote),
            "https://remote.example/users/alice/outbox"
        );
        assert_eq!(
            endpoints().wire_actor_id(&remote),
            "https://remote.example/users/alice"
        );
    }

    #[test]
    fn permalinks_use_instance_url() {
        let e = endpoints();
        let item = Item {
            hash: Hash::from("h1"),
            submitted_by: Some(alice()),
            ..Item::default()
        };
        assert_eq!(e.account_url(&alice()), "https://quill.example/~alice");
        assert_eq!(e.item_url(&item), "https://quill.example/~alice/h1");
    }
}
