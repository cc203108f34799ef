//! Conversion between domain values and wire objects.
//!
//! Outgoing conversions ([`to_wire_object`], [`to_wire_actor`]) are total.
//! Incoming ones return [`FederationError::Malformed`] when a wire value has a
//! shape that cannot represent the requested domain type.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use quill_core::{
    Account, AccountMetadata, Hash, Icon, Item, ItemMetadata, KeyKind, KeyPair, MimeType,
    SCORE_MULTIPLIER, Tag, Vote, VoteMetadata,
};

use crate::error::FederationError;
use crate::iri::{CollectionKind, Endpoints};
use crate::vocab::ObjectType;
use crate::wire::{
    Actor, ActorEndpoints, DEFAULT_LANG, Image, NaturalLanguage, Object, PUBLIC_NS, PublicKey,
    Source, WireItem,
};

/// Bodies longer than this many whitespace-separated tokens become Articles.
pub const ARTICLE_MIN_WORDS: usize = 300;

const PEM_HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_FOOTER: &str = "-----END PUBLIC KEY-----";
const ED25519_KEY_LEN: usize = 32;

// ── Items ──────────────────────────────────────────────────────────

/// Default recipients: the public collection and the hub itself.
pub fn default_recipients(endpoints: &Endpoints) -> Vec<String> {
    vec![PUBLIC_NS.to_string(), endpoints.api().to_string()]
}

/// Render markdown to HTML.
pub fn render_markdown(text: &str) -> String {
    let parser = pulldown_cmark::Parser::new(text);
    let mut html = String::with_capacity(text.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Choose between Note and Article from the rendered body.
pub fn classify_body(rendered: &str) -> ObjectType {
    if rendered.split_whitespace().count() > ARTICLE_MIN_WORDS {
        ObjectType::Article
    } else {
        ObjectType::Note
    }
}

/// Map an item to the object the hub stores.
pub fn to_wire_object(endpoints: &Endpoints, item: &Item) -> Object {
    let mut object = Object {
        id: endpoints.object_id(item).unwrap_or_default(),
        to: default_recipients(endpoints),
        published: item.submitted_at,
        updated: item.updated_at,
        ..Object::default()
    };

    if item.is_link() {
        object.kind = ObjectType::Page;
        object.url = Some(item.data.clone());
    } else {
        let rendered = match item.mime_type {
            MimeType::Markdown => render_markdown(&item.data),
            _ => item.data.clone(),
        };
        object.kind = classify_body(&rendered);
        if !item.hash.is_empty() {
            object.url = Some(endpoints.item_url(item));
        }
        match item.mime_type {
            MimeType::Markdown => {
                object.media_type = Some(MimeType::Html.as_str().to_string());
                object.source = Some(Source {
                    content: (!item.data.is_empty())
                        .then(|| NaturalLanguage::tagged(DEFAULT_LANG, item.data.clone())),
                    media_type: Some(MimeType::Markdown.as_str().to_string()),
                });
            }
            mime => object.media_type = Some(mime.as_str().to_string()),
        }
        if !rendered.is_empty() {
            object.content = Some(NaturalLanguage::tagged(DEFAULT_LANG, rendered));
        }
    }

    let parent = item.parent.as_deref().and_then(|p| endpoints.object_id(p));
    let root = item.op.as_deref().and_then(|op| endpoints.object_id(op));
    object.in_reply_to = reply_chain(parent, root.as_deref());
    object.context = root;

    if item.is_deleted() {
        return Object {
            id: object.id,
            kind: ObjectType::Tombstone,
            former_type: Some(object.kind),
            deleted: item.updated_at,
            in_reply_to: object.in_reply_to,
            context: object.context,
            ..Object::default()
        };
    }

    object.score = Some(item.score / SCORE_MULTIPLIER);
    if !item.title.is_empty() {
        object.name = Some(NaturalLanguage::tagged(DEFAULT_LANG, item.title.clone()));
    }
    object.attributed_to = item
        .submitted_by
        .as_ref()
        .map(|author| endpoints.wire_actor_id(author));
    if let Some(metadata) = &item.metadata {
        object.tag = wire_tags(metadata);
    }
    object
}

/// Parent first, then the thread root when it is a different object.
fn reply_chain(parent: Option<String>, root: Option<&str>) -> Vec<String> {
    let mut chain: Vec<String> = parent.into_iter().collect();
    if let Some(root) = root {
        if !chain.iter().any(|p| p == root) {
            chain.push(root.to_string());
        }
    }
    chain
}

fn wire_tags(metadata: &ItemMetadata) -> Vec<Object> {
    let tag = |kind: ObjectType, t: &Tag| Object {
        id: t.url.clone(),
        href: Some(t.url.clone()).filter(|url| !url.is_empty()),
        kind,
        name: Some(NaturalLanguage::Plain(t.name.clone())),
        ..Object::default()
    };
    metadata
        .mentions
        .iter()
        .map(|m| tag(ObjectType::Mention, m))
        .chain(metadata.tags.iter().map(|t| tag(ObjectType::Hashtag, t)))
        .collect()
}

/// Map a wire value to an item.
///
/// Bare links and objects without a publication date become stubs (see
/// [`Item::is_stub`]). `Create` and `Update` activities are unwrapped.
///
/// # Errors
///
/// Returns [`FederationError::Malformed`] for actors, collections, and
/// activities that do not wrap an object.
pub fn item_from_wire(wire: &WireItem) -> Result<Item, FederationError> {
    match wire {
        WireItem::Link(iri) => Ok(item_ref(iri)),
        WireItem::Object(object) => Ok(item_from_object(object)),
        WireItem::Activity(activity)
            if matches!(activity.kind, ObjectType::Create | ObjectType::Update) =>
        {
            let inner = activity
                .object
                .as_ref()
                .ok_or_else(|| malformed(&activity.id, "activity without an object"))?;
            item_from_wire(inner)
        }
        other => Err(malformed(
            other.id(),
            format!("{} is not an item", kind_name(other)),
        )),
    }
}

fn item_from_object(object: &Object) -> Item {
    let mut item = item_ref(&object.id);
    copy_tags(&mut item, object);
    item.submitted_at = object.published;
    item.updated_at = object.updated;
    item.submitted_by = object.attributed_to.as_deref().map(account_ref);
    item.parent = object.in_reply_to.first().map(|p| Box::new(item_ref(p)));
    item.op = object.context.as_deref().map(|c| Box::new(item_ref(c)));

    if object.kind == ObjectType::Tombstone {
        item.deleted = true;
        item.updated_at = object.deleted.or(object.updated);
        return item;
    }

    item.title = object
        .name
        .as_ref()
        .map(|n| n.first().to_string())
        .unwrap_or_default();
    item.score = object.score.unwrap_or_default() * SCORE_MULTIPLIER;

    let markdown_source = object
        .source
        .as_ref()
        .filter(|s| s.media_type.as_deref().and_then(MimeType::parse) == Some(MimeType::Markdown));
    if object.kind == ObjectType::Page && object.content.is_none() {
        item.mime_type = MimeType::Url;
        item.data = object.url.clone().unwrap_or_default();
    } else if let Some(source) = markdown_source {
        item.mime_type = MimeType::Markdown;
        item.data = source
            .content
            .as_ref()
            .map(|c| c.first().to_string())
            .unwrap_or_default();
    } else {
        item.mime_type = object
            .media_type
            .as_deref()
            .and_then(MimeType::parse)
            .unwrap_or(MimeType::Html);
        item.data = object
            .content
            .as_ref()
            .map(|c| c.first().to_string())
            .unwrap_or_default();
    }
    item
}

/// Copy mentions and hashtags into the item's metadata.
fn copy_tags(item: &mut Item, object: &Object) {
    let metadata = item.metadata.get_or_insert_with(ItemMetadata::default);
    for tag in &object.tag {
        let value = Tag {
            name: tag
                .name
                .as_ref()
                .map(|n| n.first().to_string())
                .unwrap_or_default(),
            url: tag.href.clone().unwrap_or_else(|| tag.id.clone()),
        };
        if tag.kind == ObjectType::Mention {
            metadata.mentions.push(value);
        } else {
            metadata.tags.push(value);
        }
    }
}

/// An id-only item known by its IRI.
fn item_ref(iri: &str) -> Item {
    Item {
        hash: Hash::from_iri(iri),
        metadata: Some(ItemMetadata {
            id: iri.to_string(),
            ..ItemMetadata::default()
        }),
        ..Item::default()
    }
}

// ── Accounts ───────────────────────────────────────────────────────

/// Map an account to its actor.
///
/// Federated accounts publish their stored IRIs; local accounts get
/// collection IRIs derived from `endpoints`.
pub fn to_wire_actor(endpoints: &Endpoints, account: &Account) -> Actor {
    let mut actor = Actor {
        kind: ObjectType::Person,
        preferred_username: Some(NaturalLanguage::Plain(account.handle.clone())),
        ..Actor::default()
    };

    if let Some(metadata) = &account.metadata {
        if !metadata.blurb.is_empty() {
            actor.summary = Some(NaturalLanguage::Plain(metadata.blurb.clone()));
        }
        if let Some(icon) = metadata.icon.as_ref().filter(|i| !i.uri.is_empty()) {
            actor.icon = Some(Image {
                kind: ObjectType::Image,
                media_type: Some(icon.mime_type.clone()).filter(|m| !m.is_empty()),
                url: Some(icon.uri.clone()),
            });
        }
    }

    if !account.hash.is_empty() {
        match account.metadata.as_ref().filter(|_| account.is_federated()) {
            Some(metadata) => {
                actor.id.clone_from(&metadata.id);
                actor.name = Some(NaturalLanguage::tagged(DEFAULT_LANG, metadata.name.clone()));
                actor.inbox = non_empty(&metadata.inbox_iri);
                actor.outbox = non_empty(&metadata.outbox_iri);
                actor.liked = non_empty(&metadata.liked_iri);
                actor.followers = non_empty(&metadata.followers_iri);
                actor.following = non_empty(&metadata.following_iri);
                actor.url = non_empty(&metadata.url);
            }
            None => {
                actor.id = endpoints.actor_id(account);
                actor.name = Some(NaturalLanguage::tagged(DEFAULT_LANG, account.handle.clone()));
                actor.outbox = Some(endpoints.collection_id(account, CollectionKind::Outbox));
                actor.inbox = Some(endpoints.collection_id(account, CollectionKind::Inbox));
                actor.liked = Some(endpoints.collection_id(account, CollectionKind::Liked));
                actor.url = Some(endpoints.account_url(account));
                actor.published = account.created_at;
                actor.updated = account.updated_at;
            }
        }
        let oauth = endpoints.oauth();
        actor.endpoints = Some(ActorEndpoints {
            shared_inbox: Some(endpoints.shared_inbox()),
            oauth_authorization_endpoint: Some(format!("{oauth}/authorize")),
            oauth_token_endpoint: Some(format!("{oauth}/token")),
        });
    }

    if let Some(key) = account
        .key()
        .filter(|k| account.is_valid() && !k.public.is_empty())
    {
        actor.public_key = Some(PublicKey {
            id: key_id(&actor.id),
            owner: actor.id.clone(),
            public_key_pem: pem_encode(&key.public),
        });
    }
    actor
}

/// The sentinel actor attributed to requests with no authenticated account.
pub fn anonymous_actor(endpoints: &Endpoints) -> Actor {
    let name = NaturalLanguage::Plain(quill_core::ANONYMOUS_HANDLE.to_string());
    Actor {
        id: PUBLIC_NS.to_string(),
        kind: ObjectType::Person,
        name: Some(name.clone()),
        preferred_username: Some(name),
        inbox: Some(endpoints.inbox()),
        ..Actor::default()
    }
}

/// Public key id published for `actor_id`.
pub fn key_id(actor_id: &str) -> String {
    format!("{actor_id}#main-key")
}

/// Map a wire value to an account.
///
/// # Errors
///
/// Returns [`FederationError::Malformed`] when the value is not an actor, a
/// link, or a tombstone.
pub fn account_from_wire(wire: &WireItem) -> Result<Account, FederationError> {
    match wire {
        WireItem::Link(iri) => Ok(account_ref(iri)),
        WireItem::Actor(actor) => Ok(account_from_actor(actor)),
        WireItem::Object(object) if object.kind == ObjectType::Tombstone => {
            let mut account = account_ref(&object.id);
            account.deleted = true;
            account.updated_at = object.deleted;
            Ok(account)
        }
        WireItem::Activity(activity)
            if matches!(activity.kind, ObjectType::Create | ObjectType::Update) =>
        {
            let inner = activity
                .object
                .as_ref()
                .ok_or_else(|| malformed(&activity.id, "activity without an object"))?;
            account_from_wire(inner)
        }
        other => Err(malformed(
            other.id(),
            format!("{} is not an actor", kind_name(other)),
        )),
    }
}

fn account_from_actor(actor: &Actor) -> Account {
    if actor.id == PUBLIC_NS {
        return Account::anonymous();
    }
    let text = |value: &Option<NaturalLanguage>| {
        value
            .as_ref()
            .map(|v| v.first().to_string())
            .unwrap_or_default()
    };
    let name = text(&actor.name);
    let handle = Some(text(&actor.preferred_username))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| name.clone());
    let owned = |value: &Option<String>| value.clone().unwrap_or_default();

    Account {
        hash: Hash::from_iri(&actor.id),
        handle,
        created_at: actor.published,
        updated_at: actor.updated,
        metadata: Some(AccountMetadata {
            id: actor.id.clone(),
            name,
            url: owned(&actor.url),
            inbox_iri: owned(&actor.inbox),
            outbox_iri: owned(&actor.outbox),
            liked_iri: owned(&actor.liked),
            followers_iri: owned(&actor.followers),
            following_iri: owned(&actor.following),
            blurb: text(&actor.summary),
            icon: actor.icon.as_ref().and_then(|image| {
                image.url.as_ref().map(|uri| Icon {
                    uri: uri.clone(),
                    mime_type: image.media_type.clone().unwrap_or_default(),
                })
            }),
            key: actor
                .public_key
                .as_ref()
                .and_then(|k| pem_decode(&k.public_key_pem))
                .map(|public| KeyPair {
                    kind: if public.len() == ED25519_KEY_LEN {
                        KeyKind::Ed25519
                    } else {
                        KeyKind::Rsa
                    },
                    public,
                    private: Vec::new(),
                }),
            oauth: None,
        }),
        ..Account::default()
    }
}

/// An account known only by its actor IRI.
fn account_ref(iri: &str) -> Account {
    if iri == PUBLIC_NS {
        return Account::anonymous();
    }
    Account {
        hash: Hash::from_iri(iri),
        metadata: Some(AccountMetadata {
            id: iri.to_string(),
            ..AccountMetadata::default()
        }),
        ..Account::default()
    }
}

fn pem_encode(der: &[u8]) -> String {
    format!("{PEM_HEADER}\n{}\n{PEM_FOOTER}", BASE64.encode(der))
}

fn pem_decode(pem: &str) -> Option<Vec<u8>> {
    let body: String = pem
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("-----"))
        .collect();
    BASE64.decode(body).ok().filter(|bytes| !bytes.is_empty())
}

// ── Votes ──────────────────────────────────────────────────────────

/// Map a Like, Dislike, or Undo activity to a vote record.
///
/// Likes weigh `+SCORE_MULTIPLIER`, Dislikes `-SCORE_MULTIPLIER`, and Undos
/// zero with [`VoteMetadata::original_iri`] pointing at the retracted
/// activity.
///
/// # Errors
///
/// Returns [`FederationError::Malformed`] for any other value.
pub fn vote_from_wire(wire: &WireItem) -> Result<Vote, FederationError> {
    let WireItem::Activity(activity) = wire else {
        return Err(malformed(
            wire.id(),
            format!("{} is not a vote", kind_name(wire)),
        ));
    };
    let weight = match activity.kind {
        ObjectType::Like => SCORE_MULTIPLIER,
        ObjectType::Dislike => -SCORE_MULTIPLIER,
        ObjectType::Undo => 0,
        ref other => {
            return Err(malformed(&activity.id, format!("{other} is not a vote")));
        }
    };
    let object = activity
        .object
        .as_ref()
        .ok_or_else(|| malformed(&activity.id, "vote without an object"))?;

    let (item, original_iri) = match object {
        WireItem::Activity(undone) if activity.kind == ObjectType::Undo => (
            undone.object.as_ref().map(voted_item),
            undone.id.clone(),
        ),
        other if activity.kind == ObjectType::Undo => (None, other.id().to_string()),
        other => (Some(voted_item(other)), String::new()),
    };

    Ok(Vote {
        submitted_by: activity.actor.as_deref().map(account_ref),
        item,
        weight,
        submitted_at: activity.published,
        updated_at: activity.updated.or(activity.published),
        metadata: Some(VoteMetadata {
            iri: activity.id.clone(),
            original_iri,
        }),
    })
}

fn voted_item(object: &WireItem) -> Item {
    match object {
        WireItem::Object(object) => item_from_object(object),
        other => item_ref(other.id()),
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn non_empty(value: &str) -> Option<String> {
    Some(value.to_string()).filter(|v| !v.is_empty())
}

fn kind_name(wire: &WireItem) -> String {
    wire.kind()
        .map_or_else(|| "link".to_string(), ToString::to_string)
}

fn malformed(id: &str, reason: impl Into<String>) -> FederationError {
    FederationError::Malformed {
        url: id.to_string(),
        reason: reason.into(),
    }
}
