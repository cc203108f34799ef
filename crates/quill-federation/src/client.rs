//! Signed GET/POST against the hub.

use quill_config::HubConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use std::time::Duration;

use crate::error::FederationError;
use crate::signing::SigningStrategy;
use crate::wire::CONTENT_TYPE_ACTIVITY_JSON;

/// HTTP client for the hub.
///
/// Holds only the reusable transport; the signing strategy is passed with
/// every call. Status codes are left to the caller.
#[derive(Debug, Clone)]
pub struct FederatedClient {
    http: reqwest::Client,
}

impl FederatedClient {
    /// Create a client. `timeout` of `None` leaves deadlines to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Http`] if the underlying `reqwest::Client`
    /// fails to build.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, FederationError> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Create a client from hub settings. A `timeout_secs` of 0 disables the
    /// client-side timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Http`] if the underlying `reqwest::Client`
    /// fails to build.
    pub fn from_config(config: &HubConfig) -> Result<Self, FederationError> {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        Self::new(&config.user_agent, timeout)
    }

    /// GET `iri`.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Http`] on transport failure and
    /// [`FederationError::Signing`] if the request cannot be signed.
    pub async fn get(
        &self,
        iri: &str,
        signing: &SigningStrategy,
    ) -> Result<reqwest::Response, FederationError> {
        let request = self
            .http
            .get(iri)
            .header(ACCEPT, HeaderValue::from_static(CONTENT_TYPE_ACTIVITY_JSON))
            .build()?;
        self.execute(request, signing).await
    }

    /// POST `body` to `iri`.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Http`] on transport failure and
    /// [`FederationError::Signing`] if the request cannot be signed.
    pub async fn post(
        &self,
        iri: &str,
        body: Vec<u8>,
        signing: &SigningStrategy,
    ) -> Result<reqwest::Response, FederationError> {
        let request = self
            .http
            .post(iri)
            .header(ACCEPT, HeaderValue::from_static(CONTENT_TYPE_ACTIVITY_JSON))
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static(CONTENT_TYPE_ACTIVITY_JSON),
            )
            .body(body)
            .build()?;
        self.execute(request, signing).await
    }

    async fn execute(
        &self,
        mut request: reqwest::Request,
        signing: &SigningStrategy,
    ) -> Result<reqwest::Response, FederationError> {
        signing.apply(&mut request)?;
        let method = request.method().clone();
        let url = request.url().to_string();
        match self.http.execute(request).await {
            Ok(resp) => {
                tracing::debug!(%method, %url, status = resp.status().as_u16(), "hub request");
                Ok(resp)
            }
            Err(e) => {
                tracing::error!(%method, %url, error = %e, "hub request failed");
                Err(e.into())
            }
        }
    }
}
