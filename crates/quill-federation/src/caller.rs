//! Who a request is made on behalf of, and how it is signed.

use quill_core::Account;

use crate::error::FederationError;
use crate::iri::Endpoints;
use crate::mapper;
use crate::signing::{MessageSigner, SigningStrategy};

/// The acting account together with the signing strategy for its requests.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    account: Option<Account>,
    signing: SigningStrategy,
}

impl Caller {
    /// Unsigned requests attributed to the anonymous actor.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Local interaction with the hub on behalf of a logged-in account.
    ///
    /// Accounts that are not logged in act anonymously. A logged-in account
    /// without an access token still acts as itself but sends unsigned
    /// requests.
    #[must_use]
    pub fn local(account: &Account) -> Self {
        if !account.is_logged() {
            return Self::anonymous();
        }
        let signing = account
            .bearer_token()
            .map_or(SigningStrategy::Unsigned, |token| {
                SigningStrategy::Bearer(token.to_string())
            });
        Self {
            account: Some(account.clone()),
            signing,
        }
    }

    /// Actor-to-actor delivery, signed with the account's private key.
    ///
    /// Accounts without key material fall back to [`Caller::local`].
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Signing`] when the stored key cannot sign.
    pub fn delivery(endpoints: &Endpoints, account: &Account) -> Result<Self, FederationError> {
        let key = account
            .key()
            .filter(|k| !k.private.is_empty() && account.is_logged());
        let Some(key) = key else {
            return Ok(Self::local(account));
        };
        let key_id = mapper::key_id(&endpoints.wire_actor_id(account));
        Ok(Self {
            account: Some(account.clone()),
            signing: SigningStrategy::MessageSignature(MessageSigner::from_key_pair(key_id, key)?),
        })
    }

    /// The acting account, or `None` when acting anonymously.
    #[must_use]
    pub const fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    #[must_use]
    pub const fn signing(&self) -> &SigningStrategy {
        &self.signing
    }

    /// Whether this caller acts as the same person as `account`.
    #[must_use]
    pub fn acts_as(&self, account: &Account) -> bool {
        self.account
            .as_ref()
            .is_some_and(|own| !own.hash.is_empty() && own.hash == account.hash)
    }
}
