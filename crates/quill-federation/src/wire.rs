//! Wire objects exchanged with the hub.
//!
//! Only the subset of the vocabulary the adapter reads or writes is modelled.
//! Decoding dispatches on the `type` property into [`WireItem`], one case per
//! shape (link, activity, actor, collection, plain object).

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::vocab::ObjectType;

pub const ACTIVITY_STREAMS_CONTEXT: &str = "https://www.w3.org/ns/activitystreams";

/// The public collection: addressing an activity here makes it world-readable.
pub const PUBLIC_NS: &str = "https://www.w3.org/ns/activitystreams#Public";

pub const CONTENT_TYPE_ACTIVITY_JSON: &str = "application/activity+json";

/// Language used when tagging text we produce.
pub const DEFAULT_LANG: &str = "en";

// ── Values ─────────────────────────────────────────────────────────

/// Text that is either untagged or keyed by language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NaturalLanguage {
    Plain(String),
    Tagged(BTreeMap<String, String>),
}

impl NaturalLanguage {
    pub fn tagged(lang: &str, value: impl Into<String>) -> Self {
        Self::Tagged(BTreeMap::from([(lang.to_string(), value.into())]))
    }

    /// The default-language value, else any value.
    #[must_use]
    pub fn first(&self) -> &str {
        match self {
            Self::Plain(value) => value,
            Self::Tagged(values) => values
                .get(DEFAULT_LANG)
                .or_else(|| values.values().next())
                .map_or("", String::as_str),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<NaturalLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

// ── Object ─────────────────────────────────────────────────────────

/// A content object, tag, or tombstone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub ld_context: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ObjectType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NaturalLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<NaturalLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Target of a link-style tag (Mention, Hashtag).
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, deserialize_with = "link_ids", skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub attributed_to: Option<String>,
    #[serde(default, deserialize_with = "link_ids", skip_serializing_if = "Vec::is_empty")]
    pub in_reply_to: Vec<String>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<Object>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub former_type: Option<ObjectType>,
    /// Aggregate score in protocol units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

// ── Actor ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(rename = "type", default)]
    pub kind: ObjectType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorEndpoints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_inbox: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_authorization_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    pub id: String,
    pub owner: String,
    pub public_key_pem: String,
}

/// Protocol-visible representation of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub ld_context: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ObjectType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NaturalLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<NaturalLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<NaturalLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Image>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub inbox: Option<String>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub outbox: Option<String>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub liked: Option<String>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub followers: Option<String>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub following: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<ActorEndpoints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
    #[serde(default, deserialize_with = "link_ids", skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

// ── Activity ───────────────────────────────────────────────────────

/// A verb applied by an actor to an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub ld_context: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ObjectType,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<WireItem>,
    #[serde(default, deserialize_with = "link_ids", skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub attributed_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Activity {
    /// A new outgoing activity, carrying the `@context` header.
    pub fn new(kind: ObjectType, actor: impl Into<String>, object: WireItem) -> Self {
        Self {
            ld_context: Some(Value::String(ACTIVITY_STREAMS_CONTEXT.to_string())),
            kind,
            actor: Some(actor.into()),
            object: Some(object),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn addressed_to(mut self, to: Vec<String>) -> Self {
        self.to = to;
        self
    }
}

// ── Collection ─────────────────────────────────────────────────────

/// An ordered collection or one of its pages.
///
/// Entries stay as raw JSON so that one entry the adapter cannot read does not
/// make the whole page unreadable. [`WireItem::from_value`] decodes them one at
/// a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedCollection {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub ld_context: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ObjectType,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default, alias = "items", skip_serializing_if = "Vec::is_empty")]
    pub ordered_items: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<Value>,
    #[serde(default, deserialize_with = "link_id", skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl OrderedCollection {
    /// Undecoded entries of this page, reading through an embedded `first`
    /// page when the collection itself carries none. A `first` given only as a
    /// link yields nothing.
    #[must_use]
    pub fn into_entries(self) -> Vec<Value> {
        if !self.ordered_items.is_empty() {
            return self.ordered_items;
        }
        match self.first {
            Some(first @ Value::Object(_)) => serde_json::from_value::<Self>(first)
                .map(|page| page.ordered_items)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

// ── Dispatch ───────────────────────────────────────────────────────

/// Any value found where the protocol allows "an object or a link".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireItem {
    Link(String),
    Activity(Box<Activity>),
    Actor(Box<Actor>),
    Collection(Box<OrderedCollection>),
    Object(Box<Object>),
}

impl WireItem {
    /// Decode a JSON value, choosing the variant from its `type`.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error if the value is neither a string nor an
    /// object, or if the object does not fit the chosen variant.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let kind = match &value {
            Value::String(iri) => return Ok(Self::Link(iri.clone())),
            Value::Object(map) => map
                .get("type")
                .and_then(Value::as_str)
                .map(ObjectType::from)
                .unwrap_or_default(),
            other => {
                return Err(de::Error::custom(format!(
                    "expected an IRI or an object, got {other}"
                )));
            }
        };

        if kind.is_activity() {
            serde_json::from_value(value).map(|a| Self::Activity(Box::new(a)))
        } else if kind.is_actor() {
            serde_json::from_value(value).map(|a| Self::Actor(Box::new(a)))
        } else if kind.is_collection() {
            serde_json::from_value(value).map(|c| Self::Collection(Box::new(c)))
        } else {
            serde_json::from_value(value).map(|o| Self::Object(Box::new(o)))
        }
    }

    /// Decode a response body.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error if the body is not valid JSON or does not
    /// decode into any variant.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    /// The IRI of this item, whether it is a bare link or a full object.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Link(iri) => iri,
            Self::Activity(a) => &a.id,
            Self::Actor(a) => &a.id,
            Self::Collection(c) => &c.id,
            Self::Object(o) => &o.id,
        }
    }

    /// The `type`, or `None` for a bare link.
    #[must_use]
    pub fn kind(&self) -> Option<&ObjectType> {
        match self {
            Self::Link(_) => None,
            Self::Activity(a) => Some(&a.kind),
            Self::Actor(a) => Some(&a.kind),
            Self::Collection(c) => Some(&c.kind),
            Self::Object(o) => Some(&o.kind),
        }
    }
}

impl<'de> Deserialize<'de> for WireItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}

// ── Link helpers ───────────────────────────────────────────────────

fn collect_ids(value: &Value, into: &mut Vec<String>) {
    match value {
        Value::String(iri) => into.push(iri.clone()),
        Value::Object(map) => {
            if let Some(iri) = map.get("id").or_else(|| map.get("href")).and_then(Value::as_str) {
                into.push(iri.to_string());
            }
        }
        Value::Array(values) => values.iter().for_each(|v| collect_ids(v, into)),
        _ => {}
    }
}

/// Accept a link, an embedded object, or an array of either; keep the IRIs.
fn link_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let mut ids = Vec::new();
    if let Some(value) = value {
        collect_ids(&value, &mut ids);
    }
    Ok(ids)
}

/// Like [`link_ids`], keeping only the first IRI.
fn link_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(link_ids(deserializer)?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn natural_language_prefers_default_lang() {
        let value: NaturalLanguage =
            serde_json::from_value(json!({"fr": "bonjour", "en": "hello"})).unwrap();
        assert_eq!(value.first(), "hello");

        let plain: NaturalLanguage = serde_json::from_value(json!("hi")).unwrap();
        assert_eq!(plain.first(), "hi");
    }

    #[test]
    fn dispatches_on_type() {
        let like = WireItem::from_value(json!({
            "id": "https://hub.example/activities/1",
            "type": "Like",
            "actor": "https://hub.example/actors/aaaa",
            "object": "https://hub.example/objects/h1"
        }))
        .unwrap();
        assert!(matches!(like, WireItem::Activity(ref a) if a.kind == ObjectType::Like));

        let person = WireItem::from_value(json!({"id": "x", "type": "Person"})).unwrap();
        assert!(matches!(person, WireItem::Actor(_)));

        let note = WireItem::from_value(json!({"id": "y", "type": "Note"})).unwrap();
        assert!(matches!(note, WireItem::Object(_)));

        let link = WireItem::from_value(json!("https://hub.example/objects/h1")).unwrap();
        assert_eq!(link.id(), "https://hub.example/objects/h1");
        assert!(link.kind().is_none());
    }

    #[test]
    fn rejects_scalars() {
        assert!(WireItem::from_value(json!(42)).is_err());
    }

    #[test]
    fn links_accept_embedded_objects_and_arrays() {
        let object: Object = serde_json::from_value(json!({
            "type": "Note",
            "attributedTo": {"id": "https://hub.example/actors/aaaa", "type": "Person"},
            "inReplyTo": "https://hub.example/objects/parent",
            "to": ["https://www.w3.org/ns/activitystreams#Public", {"id": "https://hub.example"}]
        }))
        .unwrap();
        assert_eq!(
            object.attributed_to.as_deref(),
            Some("https://hub.example/actors/aaaa")
        );
        assert_eq!(object.in_reply_to, vec!["https://hub.example/objects/parent"]);
        assert_eq!(object.to.len(), 2);
    }

    #[test]
    fn collection_reads_embedded_first_page() {
        let item = WireItem::from_value(json!({
            "type": "OrderedCollection",
            "totalItems": 2,
            "first": {
                "type": "OrderedCollectionPage",
                "orderedItems": ["https://hub.example/objects/a", "https://hub.example/objects/b"]
            }
        }))
        .unwrap();
        let WireItem::Collection(collection) = item else {
            panic!("expected a collection");
        };
        assert_eq!(collection.total_items, 2);
        assert_eq!(collection.into_entries().len(), 2);
    }

    #[test]
    fn collection_keeps_entries_that_do_not_decode() {
        let item = WireItem::from_value(json!({
            "type": "OrderedCollection",
            "orderedItems": [
                {"id": "https://hub.example/objects/a", "type": "Note"},
                {"id": "https://hub.example/objects/b", "type": "Note", "published": "yesterday"}
            ]
        }))
        .unwrap();
        let WireItem::Collection(collection) = item else {
            panic!("expected a collection");
        };
        let decoded: Vec<bool> = collection
            .into_entries()
            .into_iter()
            .map(|entry| WireItem::from_value(entry).is_ok())
            .collect();
        assert_eq!(decoded, vec![true, false]);
    }

    #[test]
    fn undo_embeds_undone_activity() {
        let undo = WireItem::from_value(json!({
            "id": "https://hub.example/activities/2",
            "type": "Undo",
            "actor": "https://hub.example/actors/aaaa",
            "object": {
                "id": "https://hub.example/activities/1",
                "type": "Like",
                "object": "https://hub.example/objects/h1"
            }
        }))
        .unwrap();
        let WireItem::Activity(undo) = undo else {
            panic!("expected an activity");
        };
        let undone = undo.object.as_ref().unwrap();
        assert_eq!(undone.id(), "https://hub.example/activities/1");
        assert_eq!(undone.kind(), Some(&ObjectType::Like));
    }

    #[test]
    fn outgoing_activity_serializes_context_and_link() {
        let activity = Activity::new(
            ObjectType::Like,
            "https://hub.example/actors/aaaa",
            WireItem::Link("https://hub.example/objects/h1".into()),
        )
        .addressed_to(vec![PUBLIC_NS.into()]);
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(
            value,
            json!({
                "@context": ACTIVITY_STREAMS_CONTEXT,
                "type": "Like",
                "actor": "https://hub.example/actors/aaaa",
                "object": "https://hub.example/objects/h1",
                "to": [PUBLIC_NS]
            })
        );
    }
}
