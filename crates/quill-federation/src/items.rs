//! Item loading, denormalization, and submission.

use quill_core::{Account, Filters, Hash, Item, ItemMetadata, LoadAccountsFilter, LoadVotesFilter};
use std::collections::HashMap;

use crate::caller::Caller;
use crate::error::FederationError;
use crate::iri::CollectionKind;
use crate::vocab::ObjectType;
use crate::wire::{Activity, WireItem};
use crate::{Page, Repository, http, mapper, query};

impl Repository {
    /// Load one page of items.
    ///
    /// Lists the global objects collection, or the inbox of the first
    /// `followed_by` actor restricted to Create activities (reply and context
    /// filters are dropped in that case). `federated = false` restricts
    /// results to objects originating on the hub.
    ///
    /// Stub entries are re-fetched with one keyed request; authors and vote
    /// scores are then resolved with one request each.
    ///
    /// # Errors
    ///
    /// Returns the transport, hub, or decoding error of any request made.
    pub async fn load_items(
        &self,
        caller: &Caller,
        filters: &Filters,
    ) -> Result<Page<Item>, FederationError> {
        let mut filters = filters.clone();
        let mut base = self.endpoints.objects().to_string();

        if let Some(follower) = filters.items.followed_by.first() {
            base = self
                .endpoints
                .actor_collection(follower, CollectionKind::Inbox);
            filters.types = vec![ObjectType::Create.to_string()];
            filters.items.followed_by.clear();
            filters.items.in_reply_to.clear();
            filters.items.context.clear();
        } else if !filters.items.deleted.is_empty() {
            filters.types = ObjectType::content_types()
                .iter()
                .map(ToString::to_string)
                .collect();
        }
        if filters.items.federated.contains(&false) {
            filters.items.iri = Some(self.endpoints.api().to_string());
        }
        filters.items.federated.clear();

        let url = query::with_query(&base, &filters)?;
        let page = self.fetch_collection(caller, &url).await?;
        let items = decode_items(&url, &page.items);
        let items = self.resolve_stubs(caller, items).await?;
        let items = self.load_items_authors(caller, items).await?;
        let items = self.load_items_votes(caller, items).await?;
        Ok(Page {
            items,
            total: page.total,
        })
    }

    /// Load a single item by the first key in `filters.items.key`.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Validation`] when no key is given, and the
    /// transport, hub, or decoding error otherwise.
    pub async fn load_item(&self, caller: &Caller, filters: &Filters) -> Result<Item, FederationError> {
        let key = filters
            .items
            .key
            .first()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| FederationError::Validation("invalid item hash".into()))?;
        let url = self.endpoints.object(key.as_str());
        let item = mapper::item_from_wire(&self.fetch(caller, &url).await?)?;
        let items = self.load_items_authors(caller, vec![item]).await?;
        let mut items = self.load_items_votes(caller, items).await?;
        items
            .pop()
            .ok_or_else(|| FederationError::not_found("item", key.as_str()))
    }

    /// Create, update, or delete an item.
    ///
    /// Items without an identifier are created, items with one are updated,
    /// and deleted items are deleted. The activity is posted to the caller's
    /// outbox, or to the hub inbox for anonymous callers.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::NotFound`] before any request when deleting
    /// an item without an identifier, and the translated hub error for any
    /// 4xx or 5xx response.
    pub async fn save_item(&self, caller: &Caller, item: &Item) -> Result<Item, FederationError> {
        let object = mapper::to_wire_object(&self.endpoints, item);
        let (actor_id, target) = self.submission_target(caller);

        let activity = if item.is_deleted() {
            if object.id.is_empty() {
                tracing::error!(item = %item.hash, "item hash is empty, can not delete");
                return Err(FederationError::not_found("item", item.hash.as_str()));
            }
            Activity::new(ObjectType::Delete, actor_id, WireItem::Link(object.id))
        } else if object.id.is_empty() {
            Activity::new(ObjectType::Create, actor_id, WireItem::Object(Box::new(object)))
        } else {
            Activity::new(ObjectType::Update, actor_id, WireItem::Object(Box::new(object)))
        };
        let activity = activity.addressed_to(mapper::default_recipients(&self.endpoints));

        let posted = self.post_activity(caller, &target, &activity).await?;
        if posted.status.as_u16() >= 400 {
            return Err(http::translate_error(&target, posted.status, &posted.body));
        }
        let saved = match posted.into_wire(&target)? {
            WireItem::Link(iri) => with_remote_id(item, &iri),
            wire => {
                let saved = mapper::item_from_wire(&wire)?;
                if saved.is_stub() {
                    with_remote_id(item, saved.remote_id().unwrap_or_default())
                } else {
                    saved
                }
            }
        };
        let mut items = self.load_items_authors(caller, vec![saved]).await?;
        items
            .pop()
            .ok_or_else(|| FederationError::not_found("item", item.hash.as_str()))
    }

    /// Replace id-only entries with their full objects, fetched in one
    /// request keyed by hash.
    async fn resolve_stubs(
        &self,
        caller: &Caller,
        items: Vec<Item>,
    ) -> Result<Vec<Item>, FederationError> {
        let stubs: Vec<Hash> = items
            .iter()
            .filter(|i| i.is_stub())
            .map(|i| i.hash.clone())
            .collect();
        let keys = Hash::unique(&stubs);
        if keys.is_empty() {
            return Ok(items);
        }

        let url = query::with_query(self.endpoints.objects(), &Filters::items_by_key(keys))?;
        let page = self.fetch_collection(caller, &url).await?;
        let full: HashMap<Hash, Item> = decode_items(&url, &page.items)
            .into_iter()
            .filter(|i| !i.is_stub())
            .map(|i| (i.hash.clone(), i))
            .collect();

        Ok(items
            .into_iter()
            .map(|item| {
                if !item.is_stub() {
                    return item;
                }
                full.get(&item.hash).cloned().unwrap_or_else(|| {
                    tracing::debug!(item = %item.hash, "stub could not be resolved");
                    item
                })
            })
            .collect())
    }

    /// Resolve submitters and updaters with a single accounts request.
    async fn load_items_authors(
        &self,
        caller: &Caller,
        items: Vec<Item>,
    ) -> Result<Vec<Item>, FederationError> {
        let mut filter = LoadAccountsFilter::default();
        let authors = items
            .iter()
            .flat_map(|i| [i.submitted_by.as_ref(), i.updated_by.as_ref()])
            .flatten()
            .filter(|a| !a.is_anonymous());
        for author in authors {
            if !author.hash.is_empty() {
                filter.key.push(author.hash.clone());
            } else if !author.handle.is_empty() && !filter.handle.contains(&author.handle) {
                filter.handle.push(author.handle.clone());
            }
        }
        filter.key = Hash::unique(&filter.key);
        if filter.key.is_empty() && filter.handle.is_empty() {
            return Ok(items);
        }

        let filters = Filters {
            accounts: filter,
            ..Filters::default()
        };
        let accounts = self.fetch_accounts(caller, &filters).await?.items;
        let resolve = |author: &mut Option<Account>| {
            if let Some(current) = author.as_ref() {
                if let Some(found) = accounts.iter().find(|a| a.matches(current)) {
                    *author = Some(found.clone());
                }
            }
        };
        Ok(items
            .into_iter()
            .map(|mut item| {
                resolve(&mut item.submitted_by);
                resolve(&mut item.updated_by);
                item
            })
            .collect())
    }

    /// Add summed vote weights to item scores with a single votes request.
    async fn load_items_votes(
        &self,
        caller: &Caller,
        items: Vec<Item>,
    ) -> Result<Vec<Item>, FederationError> {
        let keys: Vec<Hash> = items.iter().map(|i| i.hash.clone()).collect();
        let keys = Hash::unique(&keys);
        if keys.is_empty() {
            return Ok(items);
        }
        let filters = Filters {
            votes: LoadVotesFilter {
                item_key: keys,
                ..LoadVotesFilter::default()
            },
            ..Filters::default()
        };
        let votes = self.load_votes(caller, &filters).await?.items;
        Ok(items
            .into_iter()
            .map(|mut item| {
                item.score += votes
                    .iter()
                    .filter(|v| v.item.as_ref().is_some_and(|i| i.hash == item.hash))
                    .map(|v| v.weight)
                    .sum::<i64>();
                item
            })
            .collect())
    }
}

/// Map collection entries to items, skipping anything else.
fn decode_items(url: &str, entries: &[WireItem]) -> Vec<Item> {
    entries
        .iter()
        .filter_map(|entry| match mapper::item_from_wire(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(%url, error = %e, "skipping collection entry");
                None
            }
        })
        .collect()
}

/// `item` as submitted, now known to the hub under `iri`. Items that already
/// have an identifier keep it.
fn with_remote_id(item: &Item, iri: &str) -> Item {
    let mut saved = item.clone();
    if !iri.is_empty() && item.hash.is_empty() {
        saved.hash = Hash::from_iri(iri);
        saved.metadata.get_or_insert_with(ItemMetadata::default).id = iri.to_string();
    }
    saved
}
