//! # quill-federation
//!
//! Federation adapter between Quill's domain values and an activity hub.
//!
//! - [`iri`]: deterministic actor, object, and collection identifiers
//! - [`mapper`]: [`Account`](quill_core::Account) / [`Item`](quill_core::Item) /
//!   [`Vote`](quill_core::Vote) to and from wire objects
//! - [`client`]: signed GET/POST against the hub
//! - [`Repository`]: collection loading with batched denormalization, item and
//!   account submission, and vote reconciliation
//!
//! The adapter keeps no state between calls besides its configuration and
//! HTTP transport. Every remote failure is logged with `tracing` and returned;
//! nothing is retried.

pub mod caller;
pub mod client;
pub mod error;
pub mod iri;
pub mod mapper;
pub mod query;
pub mod signing;
pub mod vocab;
pub mod votes;
pub mod wire;

mod accounts;
mod http;
mod items;

pub use caller::Caller;
pub use client::FederatedClient;
pub use error::{ErrorKind, FederationError};
pub use iri::{CollectionKind, Endpoints};
pub use signing::{MessageSigner, SigningStrategy};

use quill_config::QuillConfig;
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde::Serialize;

use crate::vocab::ObjectType;
use crate::wire::{Activity, WireItem};

// ── Types ──────────────────────────────────────────────────────────

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the whole collection as reported by the hub.
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Raw outcome of posting an activity.
struct Posted {
    status: StatusCode,
    location: Option<String>,
    body: Vec<u8>,
}

impl Posted {
    /// The returned object, or a link to the `Location` header when the hub
    /// answered with an empty body.
    fn into_wire(self, url: &str) -> Result<WireItem, FederationError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return self.location.map(WireItem::Link).ok_or_else(|| {
                FederationError::Malformed {
                    url: url.to_string(),
                    reason: "empty response without a Location header".into(),
                }
            });
        }
        http::decode(url, &self.body)
    }
}

// ── Repository ─────────────────────────────────────────────────────

/// Entry point of the adapter.
#[derive(Debug, Clone)]
pub struct Repository {
    client: FederatedClient,
    endpoints: Endpoints,
}

impl Repository {
    #[must_use]
    pub const fn new(client: FederatedClient, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Build a repository from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Validation`] if the hub section is invalid
    /// and [`FederationError::Http`] if the HTTP client fails to build.
    pub fn from_config(config: &QuillConfig) -> Result<Self, FederationError> {
        config
            .hub
            .validate()
            .map_err(|e| FederationError::Validation(e.to_string()))?;
        Ok(Self::new(
            FederatedClient::from_config(&config.hub)?,
            Endpoints::from_config(config),
        ))
    }

    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// GET `url` and decode the body.
    async fn fetch(&self, caller: &Caller, url: &str) -> Result<WireItem, FederationError> {
        let resp = self.client.get(url, caller.signing()).await?;
        let body = http::check_response(url, resp).await?;
        http::decode(url, &body)
    }

    /// GET an ordered collection. Pages embedded under `first` are read too.
    async fn fetch_collection(
        &self,
        caller: &Caller,
        url: &str,
    ) -> Result<Page<WireItem>, FederationError> {
        match self.fetch(caller, url).await? {
            WireItem::Collection(collection) => {
                let reported = collection.total_items;
                let items: Vec<WireItem> = collection
                    .into_entries()
                    .into_iter()
                    .filter_map(|entry| match WireItem::from_value(entry) {
                        Ok(item) => Some(item),
                        Err(error) => {
                            tracing::warn!(%url, %error, "skipping unreadable collection entry");
                            None
                        }
                    })
                    .collect();
                let total = if reported == 0 {
                    items.len() as u64
                } else {
                    reported
                };
                Ok(Page { items, total })
            }
            other => Err(FederationError::Malformed {
                url: url.to_string(),
                reason: format!(
                    "expected a collection, got {}",
                    other.kind().map_or("a link", ObjectType::as_str)
                ),
            }),
        }
    }

    /// POST `activity` to `url`, returning the raw outcome.
    async fn post_activity(
        &self,
        caller: &Caller,
        url: &str,
        activity: &Activity,
    ) -> Result<Posted, FederationError> {
        let body = serde_json::to_vec(activity).map_err(|e| {
            FederationError::Validation(format!("unable to encode {} activity: {e}", activity.kind))
        })?;
        let resp = self.client.post(url, body, caller.signing()).await?;
        let status = resp.status();
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?.to_vec();
        if status.is_client_error() || status.is_server_error() {
            tracing::error!(%url, status = status.as_u16(), kind = %activity.kind, "activity rejected");
        }
        Ok(Posted {
            status,
            location,
            body,
        })
    }

    /// Actor id and submission target for `caller`: a logged-in account posts
    /// to its outbox, anyone else to the hub inbox as the anonymous actor.
    fn submission_target(&self, caller: &Caller) -> (String, String) {
        match caller.account() {
            Some(account) => (
                self.endpoints.wire_actor_id(account),
                self.endpoints.outbox(account),
            ),
            None => {
                let anonymous = mapper::anonymous_actor(&self.endpoints);
                let inbox = anonymous.inbox.unwrap_or_else(|| self.endpoints.inbox());
                (anonymous.id, inbox)
            }
        }
    }
}
