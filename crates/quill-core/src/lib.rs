//! # quill-core
//!
//! Domain value objects shared by every Quill crate.
//!
//! This crate provides:
//! - [`Account`], [`Item`] and [`Vote`] as the calling layer sees them
//! - [`Hash`] content/identity keys
//! - [`Filters`] used to query the hub
//! - Cross-cutting error types
//!
//! Nothing here performs I/O. The federation adapter converts these values to
//! and from wire objects; the web layer owns them between calls.

pub mod account;
pub mod errors;
pub mod filters;
pub mod hash;
pub mod item;
pub mod vote;

pub use account::{
    ANONYMOUS_HANDLE, ANONYMOUS_HASH, Account, AccountMetadata, Icon, KeyKind, KeyPair, OAuthToken,
};
pub use errors::CoreError;
pub use filters::{Filters, LoadAccountsFilter, LoadItemsFilter, LoadVotesFilter};
pub use hash::Hash;
pub use item::{Item, ItemMetadata, MimeType, Tag};
pub use vote::{Vote, VoteMetadata, VoteState};

/// Ratio between local score units and the protocol's score units.
///
/// A single Like is worth `SCORE_MULTIPLIER` local points; wire objects carry
/// `score / SCORE_MULTIPLIER`.
pub const SCORE_MULTIPLIER: i64 = 10;
