//! Votes and the per-(actor, item) vote state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::Account;
use crate::item::Item;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteMetadata {
    /// IRI of the activity that recorded this vote.
    #[serde(default)]
    pub iri: String,
    /// For retractions: IRI of the activity being undone.
    #[serde(default)]
    pub original_iri: String,
}

/// One actor's vote on one item.
///
/// Positive weight is an upvote, negative a downvote, zero a retraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(default)]
    pub submitted_by: Option<Account>,
    #[serde(default)]
    pub item: Option<Item>,
    pub weight: i64,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<VoteMetadata>,
}

impl Vote {
    #[must_use]
    pub fn state(&self) -> VoteState {
        VoteState::from_weight(self.weight)
    }

    /// IRI of the activity that recorded this vote, if known.
    #[must_use]
    pub fn activity_iri(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .map(|m| m.iri.as_str())
            .filter(|iri| !iri.is_empty())
    }

    /// For an Undo record: IRI of the activity it retracts.
    #[must_use]
    pub fn undone_iri(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .map(|m| m.original_iri.as_str())
            .filter(|iri| !iri.is_empty())
    }

    /// Whether both votes were cast by the same account.
    #[must_use]
    pub fn same_voter(&self, other: &Self) -> bool {
        match (&self.submitted_by, &other.submitted_by) {
            (Some(a), Some(b)) => !a.hash.is_empty() && a.hash == b.hash,
            _ => false,
        }
    }
}

/// Effective vote of one actor on one item.
///
/// ```text
/// unvoted → upvoted ⇄ downvoted → unvoted
///   (Like)   (Dislike / Like)   (Undo)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    #[default]
    Unvoted,
    Upvoted,
    Downvoted,
}

impl VoteState {
    #[must_use]
    pub const fn from_weight(weight: i64) -> Self {
        if weight > 0 {
            Self::Upvoted
        } else if weight < 0 {
            Self::Downvoted
        } else {
            Self::Unvoted
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unvoted => "unvoted",
            Self::Upvoted => "upvoted",
            Self::Downvoted => "downvoted",
        }
    }
}

impl fmt::Display for VoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
