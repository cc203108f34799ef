//! Vote reconciliation.
//!
//! The hub keeps an append-only trail of Like, Dislike, and Undo activities.
//! An Undo names the activity it retracts, never an (actor, item) pair, so
//! the effective vote of an actor is recomputed from the whole trail:
//!
//! ```text
//!            Like             Dislike
//! unvoted ──────────▶ upvoted ◀──────▶ downvoted
//!    ▲                  │      Like        │
//!    └──── Undo ────────┴──────────────────┘
//! ```
//!
//! Changing an existing vote posts an Undo of the recorded activity before
//! the new Like or Dislike. A vote whose state equals the actor's summed
//! effective state is not posted again.

use quill_core::{Filters, Vote, VoteMetadata, VoteState};
use reqwest::StatusCode;

use crate::caller::Caller;
use crate::error::FederationError;
use crate::iri::CollectionKind;
use crate::vocab::ObjectType;
use crate::wire::{Activity, WireItem};
use crate::{Page, Posted, Repository, http, mapper, query};

// ── Pure reconciliation ────────────────────────────────────────────

/// Activities needed to move from an existing effective vote to a new weight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VotePlan {
    /// Activity to retract first.
    pub undo: Option<String>,
    /// Like or Dislike to post afterwards.
    pub emit: Option<ObjectType>,
}

impl VotePlan {
    /// Nothing to post: the requested vote is already in effect.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.undo.is_none() && self.emit.is_none()
    }
}

/// Decide which activities move `existing` to `new_weight`.
///
/// Only the vote state matters: an actor whose summed weight is already
/// positive is not liked again.
#[must_use]
pub fn plan(existing: Option<&Vote>, new_weight: i64) -> VotePlan {
    let current = existing.map_or(VoteState::Unvoted, Vote::state);
    let wanted = VoteState::from_weight(new_weight);
    if current == wanted {
        return VotePlan::default();
    }
    VotePlan {
        undo: existing
            .filter(|v| v.state() != VoteState::Unvoted)
            .and_then(Vote::activity_iri)
            .map(str::to_string),
        emit: match wanted {
            VoteState::Upvoted => Some(ObjectType::Like),
            VoteState::Downvoted => Some(ObjectType::Dislike),
            VoteState::Unvoted => None,
        },
    }
}

/// Drop Undo records along with the one record each of them retracts.
///
/// Undo records that do not name a retracted activity are discarded.
#[must_use]
pub fn reconcile_undos(records: Vec<Vote>) -> Vec<Vote> {
    let (undos, mut votes): (Vec<Vote>, Vec<Vote>) =
        records.into_iter().partition(|v| v.weight == 0);
    for undo in &undos {
        let Some(undone) = undo.undone_iri() else {
            tracing::warn!(
                iri = undo.activity_iri().unwrap_or_default(),
                "zero-weight vote without an undone activity"
            );
            continue;
        };
        if let Some(pos) = votes.iter().position(|v| v.activity_iri() == Some(undone)) {
            votes.remove(pos);
        }
    }
    votes
}

/// Collapse records per voter into one net vote whose weight is their sum.
///
/// The net vote keeps the activity metadata of the voter's latest record whose
/// sign matches the net weight, so a later sign change undoes the activity
/// that actually carries the vote. Records without a voter are kept as they
/// are.
#[must_use]
pub fn fold_by_actor(records: Vec<Vote>) -> Vec<Vote> {
    let mut voters: Vec<Vec<Vote>> = Vec::new();
    for record in records {
        match voters
            .iter_mut()
            .find(|group| group.first().is_some_and(|v| v.same_voter(&record)))
        {
            Some(group) => group.push(record),
            None => voters.push(vec![record]),
        }
    }
    voters.into_iter().filter_map(net_vote).collect()
}

fn net_vote(mut records: Vec<Vote>) -> Option<Vote> {
    let latest = records.len().checked_sub(1)?;
    let weight: i64 = records.iter().map(|v| v.weight).sum();
    let updated_at = records.iter().rev().find_map(|v| v.updated_at);
    let carrier = records
        .iter()
        .rposition(|v| v.metadata.is_some() && v.weight.signum() == weight.signum())
        .or_else(|| records.iter().rposition(|v| v.metadata.is_some()))
        .unwrap_or(latest);
    let mut net = records.swap_remove(carrier);
    net.weight = weight;
    net.updated_at = updated_at;
    Some(net)
}

// ── Remote operations ──────────────────────────────────────────────

impl Repository {
    /// Cast, change, or retract a vote.
    ///
    /// The item's `likes` collection is read first to find the voter's
    /// effective vote. A changed vote posts an Undo of the recorded activity,
    /// then the new Like or Dislike. A failed Undo is logged and the new vote
    /// is still posted. An unchanged vote posts nothing and returns the
    /// existing one.
    ///
    /// Votes are posted to the voter's outbox when `caller` acts as the
    /// voter, otherwise as the anonymous actor to the hub inbox.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Validation`] before any request when the
    /// voter or the item cannot be identified, and the translated hub error
    /// when the final activity is not accepted with 200 or 201.
    pub async fn save_vote(&self, caller: &Caller, vote: &Vote) -> Result<Vote, FederationError> {
        let voter = vote
            .submitted_by
            .as_ref()
            .filter(|a| a.is_valid() && !a.is_anonymous())
            .ok_or_else(|| FederationError::Validation("invalid vote submitter".into()))?;
        let item_id = vote
            .item
            .as_ref()
            .and_then(|item| self.endpoints.object_id(item))
            .ok_or_else(|| FederationError::Validation("invalid vote item".into()))?;

        let likes = format!("{item_id}/{}", CollectionKind::Likes);
        let existing = match self.load_votes_collection(caller, &likes).await {
            Ok(votes) => votes.into_iter().find(|v| {
                v.submitted_by
                    .as_ref()
                    .is_some_and(|a| a.hash == voter.hash)
            }),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND.as_u16()) => None,
            Err(e) => return Err(e),
        };

        let plan = plan(existing.as_ref(), vote.weight);
        if plan.is_noop() {
            tracing::debug!(item = %item_id, weight = vote.weight, "vote unchanged");
            return Ok(existing.map_or_else(
                || vote.clone(),
                |e| Vote {
                    submitted_by: vote.submitted_by.clone(),
                    item: vote.item.clone(),
                    ..e
                },
            ));
        }

        let (actor_id, target) = if caller.acts_as(voter) {
            (
                self.endpoints.wire_actor_id(voter),
                self.endpoints.outbox(voter),
            )
        } else {
            self.submission_target(&Caller::anonymous())
        };
        let recipients = mapper::default_recipients(&self.endpoints);
        let undo = plan.undo.map(|iri| {
            Activity::new(ObjectType::Undo, actor_id.clone(), WireItem::Link(iri))
                .addressed_to(recipients.clone())
        });

        let Some(kind) = plan.emit else {
            // Retraction: the Undo is the vote.
            let Some(undo) = undo else {
                return Ok(vote.clone());
            };
            let posted = self.post_activity(caller, &target, &undo).await?;
            return accepted_vote(vote, &target, posted);
        };

        if let Some(undo) = undo {
            match self.post_activity(caller, &target, &undo).await {
                Ok(posted) if posted.status.is_success() => {}
                Ok(posted) => tracing::warn!(
                    url = %target,
                    status = posted.status.as_u16(),
                    "unable to undo previous vote"
                ),
                Err(e) => tracing::warn!(url = %target, error = %e, "unable to undo previous vote"),
            }
        }

        let activity = Activity::new(kind, actor_id, WireItem::Link(item_id)).addressed_to(recipients);
        let posted = self.post_activity(caller, &target, &activity).await?;
        accepted_vote(vote, &target, posted)
    }

    /// Load the open votes matching `filters`.
    ///
    /// Reads one voter's outbox when exactly one voter is given, otherwise
    /// the hub inbox. Undo records and the records they retract are removed;
    /// `total` is the collection's raw size.
    ///
    /// # Errors
    ///
    /// Returns the transport or translated hub error of the listing request.
    pub async fn load_votes(
        &self,
        caller: &Caller,
        filters: &Filters,
    ) -> Result<Page<Vote>, FederationError> {
        let mut filters = filters.clone();
        filters.types = ObjectType::vote_types()
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();

        let base = if let [voter] = filters.votes.attributed_to.as_slice() {
            let outbox = self
                .endpoints
                .actor_collection(voter.as_str(), CollectionKind::Outbox);
            filters.votes.attributed_to.clear();
            outbox
        } else {
            self.endpoints.inbox()
        };
        let url = query::with_query(&base, &filters)?;

        let page = self.fetch_collection(caller, &url).await?;
        let records = decode_votes(&url, &page.items);
        Ok(Page {
            items: reconcile_undos(records),
            total: page.total,
        })
    }

    /// Load a vote collection (such as an item's `likes`) and fold it into
    /// one net vote per voter.
    ///
    /// Undo records are reconciled before folding, so a voter whose votes
    /// were all undone has no entry at all rather than a zero-weight one.
    ///
    /// # Errors
    ///
    /// Returns the transport or translated hub error of the request.
    pub async fn load_votes_collection(
        &self,
        caller: &Caller,
        iri: &str,
    ) -> Result<Vec<Vote>, FederationError> {
        let page = self.fetch_collection(caller, iri).await?;
        let records = decode_votes(iri, &page.items);
        Ok(fold_by_actor(reconcile_undos(records)))
    }

    /// Look up a single vote by item hash.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Validation`] when no item key is given, and
    /// the transport, hub, or decoding error otherwise.
    pub async fn load_vote(&self, caller: &Caller, filters: &Filters) -> Result<Vote, FederationError> {
        let key = filters
            .votes
            .item_key
            .first()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| FederationError::Validation("invalid item hash".into()))?;
        let url = self.endpoints.liked(key.as_str());
        let wire = self.fetch(caller, &url).await?;
        mapper::vote_from_wire(&wire)
    }
}

/// Map collection entries to vote records, skipping anything else.
fn decode_votes(url: &str, entries: &[WireItem]) -> Vec<Vote> {
    entries
        .iter()
        .filter_map(|entry| match mapper::vote_from_wire(entry) {
            Ok(vote) => Some(vote),
            Err(e) => {
                tracing::warn!(%url, error = %e, "skipping collection entry");
                None
            }
        })
        .collect()
}

/// The vote as recorded by the hub, with voter and item filled from the
/// request where the response only names them.
fn accepted_vote(vote: &Vote, url: &str, posted: Posted) -> Result<Vote, FederationError> {
    if posted.status != StatusCode::OK && posted.status != StatusCode::CREATED {
        return Err(http::translate_error(url, posted.status, &posted.body));
    }
    let mut saved = match posted.into_wire(url)? {
        WireItem::Link(iri) => Vote {
            metadata: Some(VoteMetadata {
                iri,
                original_iri: String::new(),
            }),
            ..vote.clone()
        },
        wire => mapper::vote_from_wire(&wire)?,
    };
    if saved.submitted_by.as_ref().is_none_or(|a| {
        vote.submitted_by
            .as_ref()
            .is_some_and(|v| v.hash == a.hash)
    }) {
        saved.submitted_by.clone_from(&vote.submitted_by);
    }
    if saved
        .item
        .as_ref()
        .is_none_or(|i| vote.item.as_ref().is_some_and(|v| v.hash == i.hash))
    {
        saved.item.clone_from(&vote.item);
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_core::{Account, Hash, Item, SCORE_MULTIPLIER};

    fn voter(hash: &str) -> Account {
        Account {
            hash: Hash::from(hash),
            handle: hash.into(),
            ..Account::default()
        }
    }

    fn record(voter_hash: &str, weight: i64, iri: &str, undone: &str) -> Vote {
        Vote {
            submitted_by: Some(voter(voter_hash)),
            item: Some(Item {
                hash: Hash::from("h1"),
                ..Item::default()
            }),
            weight,
            metadata: Some(VoteMetadata {
                iri: iri.into(),
                original_iri: undone.into(),
            }),
            ..Vote::default()
        }
    }

    #[test]
    fn first_upvote_only_likes() {
        let plan = plan(None, SCORE_MULTIPLIER);
        assert_eq!(plan.undo, None);
        assert_eq!(plan.emit, Some(ObjectType::Like));
    }

    #[test]
    fn sign_change_undoes_first() {
        let existing = record("a", SCORE_MULTIPLIER, "act/1", "");
        let plan = plan(Some(&existing), -SCORE_MULTIPLIER);
        assert_eq!(plan.undo.as_deref(), Some("act/1"));
        assert_eq!(plan.emit, Some(ObjectType::Dislike));
    }

    #[test]
    fn unchanged_state_is_a_noop() {
        let existing = record("a", 2 * SCORE_MULTIPLIER, "act/2", "");
        assert!(plan(Some(&existing), 1).is_noop());
        assert!(plan(None, 0).is_noop());
    }

    #[test]
    fn retraction_only_undoes() {
        let existing = record("a", -SCORE_MULTIPLIER, "act/3", "");
        let plan = plan(Some(&existing), 0);
        assert_eq!(plan.undo.as_deref(), Some("act/3"));
        assert_eq!(plan.emit, None);
    }

    #[test]
    fn undo_removes_exactly_one_record() {
        let records = vec![
            record("a", SCORE_MULTIPLIER, "act/1", ""),
            record("b", SCORE_MULTIPLIER, "act/2", ""),
            record("a", 0, "act/3", "act/1"),
        ];
        let open = reconcile_undos(records);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].activity_iri(), Some("act/2"));
    }

    #[test]
    fn undo_without_target_is_dropped() {
        let records = vec![
            record("a", SCORE_MULTIPLIER, "act/1", ""),
            record("a", 0, "act/2", ""),
        ];
        assert_eq!(reconcile_undos(records).len(), 1);
    }

    #[test]
    fn fold_sums_per_actor() {
        let records = vec![
            record("a", SCORE_MULTIPLIER, "act/1", ""),
            record("b", -SCORE_MULTIPLIER, "act/2", ""),
            record("a", SCORE_MULTIPLIER, "act/3", ""),
            record("a", -SCORE_MULTIPLIER, "act/4", ""),
        ];
        let folded = fold_by_actor(records);
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].weight, SCORE_MULTIPLIER);
        assert_eq!(folded[0].activity_iri(), Some("act/3"));
        assert_eq!(folded[1].weight, -SCORE_MULTIPLIER);
    }

    #[test]
    fn fold_without_a_matching_sign_keeps_latest() {
        let records = vec![
            record("a", SCORE_MULTIPLIER, "act/1", ""),
            record("a", -SCORE_MULTIPLIER, "act/2", ""),
        ];
        let folded = fold_by_actor(records);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].weight, 0);
        assert_eq!(folded[0].activity_iri(), Some("act/2"));
    }

    #[test]
    fn undone_vote_leaves_no_net_record() {
        let records = vec![
            record("a", SCORE_MULTIPLIER, "act/1", ""),
            record("a", 0, "act/2", "act/1"),
        ];
        assert!(fold_by_actor(reconcile_undos(records)).is_empty());
    }
}
