//! Account loading and submission.

use chrono::Utc;
use quill_core::{Account, AccountMetadata, Filters, Hash, LoadVotesFilter};

use crate::caller::Caller;
use crate::error::FederationError;
use crate::vocab::ObjectType;
use crate::wire::{Activity, PUBLIC_NS, WireItem};
use crate::{Page, Repository, http, mapper, query};

impl Repository {
    /// Load one page of accounts, with scores summed from their votes.
    ///
    /// # Errors
    ///
    /// Returns the transport, hub, or decoding error of either request.
    pub async fn load_accounts(
        &self,
        caller: &Caller,
        filters: &Filters,
    ) -> Result<Page<Account>, FederationError> {
        let page = self.fetch_accounts(caller, filters).await?;
        let items = self.load_accounts_votes(caller, page.items).await?;
        Ok(Page {
            items,
            total: page.total,
        })
    }

    /// Load the first account matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::NotFound`] when nothing matches.
    pub async fn load_account(
        &self,
        caller: &Caller,
        filters: &Filters,
    ) -> Result<Account, FederationError> {
        let page = self.load_accounts(caller, filters).await?;
        page.items.into_iter().next().ok_or_else(|| {
            let accounts = &filters.accounts;
            let id = accounts
                .handle
                .first()
                .cloned()
                .or_else(|| accounts.key.first().map(|k| k.as_str().to_string()))
                .unwrap_or_default();
            FederationError::not_found("account", id)
        })
    }

    /// Create, update, or delete an account's actor.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::NotFound`] before any request when deleting
    /// an account without an identifier, and the translated hub error for any
    /// 4xx or 5xx response.
    pub async fn save_account(
        &self,
        caller: &Caller,
        account: &Account,
    ) -> Result<Account, FederationError> {
        let mut actor = mapper::to_wire_actor(&self.endpoints, account);
        let (author, target) = self.submission_target(caller);
        let now = Utc::now();

        let mut activity = if account.deleted {
            if actor.id.is_empty() {
                tracing::error!(account = %account.hash, "account hash is empty, can not delete");
                return Err(FederationError::not_found("account", account.hash.as_str()));
            }
            Activity::new(ObjectType::Delete, author.clone(), WireItem::Link(actor.id))
        } else if actor.id.is_empty() {
            actor.to = vec![PUBLIC_NS.to_string()];
            let mut create =
                Activity::new(ObjectType::Create, author.clone(), WireItem::Actor(Box::new(actor)));
            create.published = Some(now);
            create
        } else {
            Activity::new(ObjectType::Update, author.clone(), WireItem::Actor(Box::new(actor)))
        };
        activity.to = vec![PUBLIC_NS.to_string()];
        activity.attributed_to = Some(author);
        activity.updated = Some(now);

        let posted = self.post_activity(caller, &target, &activity).await?;
        if posted.status.as_u16() >= 400 {
            return Err(http::translate_error(&target, posted.status, &posted.body));
        }
        match posted.into_wire(&target)? {
            WireItem::Link(iri) => Ok(with_remote_id(account, &iri)),
            wire => {
                let saved = mapper::account_from_wire(&wire)?;
                Ok(if saved.handle.is_empty() {
                    with_remote_id(account, saved.remote_id().unwrap_or_default())
                } else {
                    saved
                })
            }
        }
    }

    /// List accounts without score denormalization.
    pub(crate) async fn fetch_accounts(
        &self,
        caller: &Caller,
        filters: &Filters,
    ) -> Result<Page<Account>, FederationError> {
        let url = query::with_query(self.endpoints.actors(), filters)?;
        let page = self.fetch_collection(caller, &url).await?;
        let items = page
            .items
            .iter()
            .filter_map(|entry| match mapper::account_from_wire(entry) {
                Ok(account) => Some(account),
                Err(e) => {
                    tracing::warn!(%url, error = %e, "skipping collection entry");
                    None
                }
            })
            .collect();
        Ok(Page {
            items,
            total: page.total,
        })
    }

    /// Add the weights of each account's votes to its score, with a single
    /// votes request.
    async fn load_accounts_votes(
        &self,
        caller: &Caller,
        accounts: Vec<Account>,
    ) -> Result<Vec<Account>, FederationError> {
        let keys: Vec<Hash> = accounts
            .iter()
            .filter(|a| !a.is_anonymous())
            .map(|a| a.hash.clone())
            .collect();
        let keys = Hash::unique(&keys);
        if keys.is_empty() {
            return Ok(accounts);
        }
        let filters = Filters {
            votes: LoadVotesFilter {
                attributed_to: keys,
                ..LoadVotesFilter::default()
            },
            ..Filters::default()
        };
        let votes = self.load_votes(caller, &filters).await?.items;
        Ok(accounts
            .into_iter()
            .map(|mut account| {
                account.score += votes
                    .iter()
                    .filter(|v| {
                        v.submitted_by
                            .as_ref()
                            .is_some_and(|a| a.hash == account.hash)
                    })
                    .map(|v| v.weight)
                    .sum::<i64>();
                account
            })
            .collect())
    }
}

/// `account` as submitted, now known to the hub under `iri`. Accounts that
/// already have an identifier keep it.
fn with_remote_id(account: &Account, iri: &str) -> Account {
    let mut saved = account.clone();
    if !iri.is_empty() && account.hash.is_empty() {
        saved.hash = Hash::from_iri(iri);
        saved
            .metadata
            .get_or_insert_with(AccountMetadata::default)
            .id = iri.to_string();
    }
    saved
}
