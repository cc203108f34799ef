//! Per-request signing strategies.
//!
//! A [`SigningStrategy`] is chosen by the caller context for every request;
//! nothing is installed on the shared HTTP client.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use ed25519_dalek::{Signer, SigningKey};
use quill_core::{KeyKind, KeyPair};
use reqwest::header::{AUTHORIZATION, DATE, HeaderValue};
use std::fmt;

use crate::error::FederationError;

/// Headers covered by a message signature, in signing order.
pub const SIGNED_HEADERS: &str = "(request-target) host date";

const SIGNATURE_HEADER: &str = "signature";
const SIGNATURE_ALGORITHM: &str = "ed25519";
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// How a request is authenticated to the hub.
#[derive(Clone, Default)]
pub enum SigningStrategy {
    /// Sent as the anonymous actor.
    #[default]
    Unsigned,
    /// OAuth access token for local, logged-in activity.
    Bearer(String),
    /// HTTP message signature for actor-to-actor delivery.
    MessageSignature(MessageSigner),
}

impl fmt::Debug for SigningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned => f.write_str("Unsigned"),
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Self::MessageSignature(signer) => f
                .debug_tuple("MessageSignature")
                .field(&signer.key_id)
                .finish(),
        }
    }
}

impl SigningStrategy {
    /// Authenticate `request` in place.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Signing`] if a header value cannot be built.
    pub fn apply(&self, request: &mut reqwest::Request) -> Result<(), FederationError> {
        match self {
            Self::Unsigned => Ok(()),
            Self::Bearer(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| FederationError::Signing(format!("invalid bearer token: {e}")))?;
                request.headers_mut().insert(AUTHORIZATION, value);
                Ok(())
            }
            Self::MessageSignature(signer) => signer.sign(request),
        }
    }
}

/// Signs requests with an actor's Ed25519 key.
#[derive(Clone)]
pub struct MessageSigner {
    key_id: String,
    key: SigningKey,
}

impl fmt::Debug for MessageSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl MessageSigner {
    /// Build a signer from stored key material.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Signing`] for non-Ed25519 keys and for
    /// private halves that are not a 32-byte seed.
    pub fn from_key_pair(key_id: impl Into<String>, pair: &KeyPair) -> Result<Self, FederationError> {
        if pair.kind != KeyKind::Ed25519 {
            return Err(FederationError::Signing(format!(
                "unsupported private key type {}",
                pair.kind
            )));
        }
        let seed: [u8; 32] = pair.private.as_slice().try_into().map_err(|_| {
            FederationError::Signing(format!(
                "expected a 32-byte ed25519 seed, got {} bytes",
                pair.private.len()
            ))
        })?;
        Ok(Self {
            key_id: key_id.into(),
            key: SigningKey::from_bytes(&seed),
        })
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Add a `Date` header if missing, then a `Signature` header covering
    /// [`SIGNED_HEADERS`].
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Signing`] when the request URL has no host
    /// or a header value cannot be built.
    pub fn sign(&self, request: &mut reqwest::Request) -> Result<(), FederationError> {
        if !request.headers().contains_key(DATE) {
            let now = Utc::now().format(HTTP_DATE_FORMAT).to_string();
            let value = HeaderValue::from_str(&now)
                .map_err(|e| FederationError::Signing(format!("invalid date header: {e}")))?;
            request.headers_mut().insert(DATE, value);
        }
        let date = request
            .headers()
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let url = request.url();
        let host = url
            .host_str()
            .ok_or_else(|| FederationError::Signing(format!("no host in {url}")))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let target = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        let method = request.method().as_str().to_lowercase();

        let signed = signing_string(&method, &target, &host, &date);
        let signature = BASE64.encode(self.key.sign(signed.as_bytes()).to_bytes());
        let header = format!(
            "keyId=\"{}\",algorithm=\"{SIGNATURE_ALGORITHM}\",headers=\"{SIGNED_HEADERS}\",signature=\"{signature}\"",
            self.key_id
        );
        let value = HeaderValue::from_str(&header)
            .map_err(|e| FederationError::Signing(format!("invalid signature header: {e}")))?;
        request.headers_mut().insert(SIGNATURE_HEADER, value);
        Ok(())
    }
}

/// The text covered by the signature, one `name: value` line per header.
fn signing_string(method: &str, target: &str, host: &str, date: &str) -> String {
    format!("(request-target): {method} {target}\nhost: {host}\ndate: {date}")
}
