//! Activity vocabulary: the `type` values the adapter understands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a wire object's `type` property.
///
/// Unknown types are preserved in [`ObjectType::Other`] so they survive a
/// decode/encode cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectType {
    #[default]
    Object,
    // Content
    Article,
    Audio,
    Document,
    Image,
    Note,
    Page,
    Video,
    Event,
    Tombstone,
    // Tags
    Mention,
    Hashtag,
    // Actors
    Person,
    Application,
    Group,
    Organization,
    Service,
    // Activities
    Create,
    Update,
    Delete,
    Like,
    Dislike,
    Undo,
    Follow,
    Announce,
    // Collections
    Collection,
    CollectionPage,
    OrderedCollection,
    OrderedCollectionPage,
    Other(String),
}

impl ObjectType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Object => "Object",
            Self::Article => "Article",
            Self::Audio => "Audio",
            Self::Document => "Document",
            Self::Image => "Image",
            Self::Note => "Note",
            Self::Page => "Page",
            Self::Video => "Video",
            Self::Event => "Event",
            Self::Tombstone => "Tombstone",
            Self::Mention => "Mention",
            Self::Hashtag => "Hashtag",
            Self::Person => "Person",
            Self::Application => "Application",
            Self::Group => "Group",
            Self::Organization => "Organization",
            Self::Service => "Service",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Like => "Like",
            Self::Dislike => "Dislike",
            Self::Undo => "Undo",
            Self::Follow => "Follow",
            Self::Announce => "Announce",
            Self::Collection => "Collection",
            Self::CollectionPage => "CollectionPage",
            Self::OrderedCollection => "OrderedCollection",
            Self::OrderedCollectionPage => "OrderedCollectionPage",
            Self::Other(other) => other,
        }
    }

    #[must_use]
    pub const fn is_actor(&self) -> bool {
        matches!(
            self,
            Self::Person | Self::Application | Self::Group | Self::Organization | Self::Service
        )
    }

    #[must_use]
    pub const fn is_activity(&self) -> bool {
        matches!(
            self,
            Self::Create
                | Self::Update
                | Self::Delete
                | Self::Like
                | Self::Dislike
                | Self::Undo
                | Self::Follow
                | Self::Announce
        )
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::Collection
                | Self::CollectionPage
                | Self::OrderedCollection
                | Self::OrderedCollectionPage
        )
    }

    /// Like, Dislike and Undo: the activities that make up vote history.
    #[must_use]
    pub const fn is_vote(&self) -> bool {
        matches!(self, Self::Like | Self::Dislike | Self::Undo)
    }

    /// Object types that carry user content.
    #[must_use]
    pub fn content_types() -> [Self; 7] {
        [
            Self::Article,
            Self::Audio,
            Self::Document,
            Self::Image,
            Self::Note,
            Self::Page,
            Self::Video,
        ]
    }

    /// Activity types that record votes.
    #[must_use]
    pub fn vote_types() -> [Self; 3] {
        [Self::Like, Self::Dislike, Self::Undo]
    }
}

impl From<String> for ObjectType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Object" => Self::Object,
            "Article" => Self::Article,
            "Audio" => Self::Audio,
            "Document" => Self::Document,
            "Image" => Self::Image,
            "Note" => Self::Note,
            "Page" => Self::Page,
            "Video" => Self::Video,
            "Event" => Self::Event,
            "Tombstone" => Self::Tombstone,
            "Mention" => Self::Mention,
            "Hashtag" => Self::Hashtag,
            "Person" => Self::Person,
            "Application" => Self::Application,
            "Group" => Self::Group,
            "Organization" => Self::Organization,
            "Service" => Self::Service,
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            "Like" => Self::Like,
            "Dislike" => Self::Dislike,
            "Undo" => Self::Undo,
            "Follow" => Self::Follow,
            "Announce" => Self::Announce,
            "Collection" => Self::Collection,
            "CollectionPage" => Self::CollectionPage,
            "OrderedCollection" => Self::OrderedCollection,
            "OrderedCollectionPage" => Self::OrderedCollectionPage,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ObjectType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ObjectType> for String {
    fn from(value: ObjectType) -> Self {
        match value {
            ObjectType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
