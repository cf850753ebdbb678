//! The identity handshake: verifies the signed assertion a client presents
//! when its channel opens, resolves the durable user, and issues the
//! capability token that lets later connections skip the signature check.

mod assertion;
mod token;

use std::sync::Arc;
use std::time::Duration;

use ring::hmac;

use siphon_shared::{GameError, User, UserId};

use crate::engine::internal;
use crate::store::UserStore;

pub use token::IdentityToken;

use token::TokenManager;

// Defaults
const TOKEN_TTL_SECS: u64 = 60 * 60;

/// Contains Config properties which will be used by the identity gate
#[derive(Clone)]
pub struct IdentityConfig {
    /// Server-held secret shared with the client-side signer.
    pub secret: Vec<u8>,
    /// Time-to-live of issued capability tokens; expiry forces a fresh
    /// signature handshake.
    pub token_ttl: Duration,
}

impl IdentityConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: Duration::from_secs(TOKEN_TTL_SECS),
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}

/// A successful handshake: the resolved user and the freshly issued token.
#[derive(Clone, Debug)]
pub struct VerifiedIdentity {
    pub user: User,
    pub token: IdentityToken,
}

/// Verifies inbound identity assertions and manages capability tokens.
pub struct IdentityGate<U> {
    users: Arc<U>,
    key: hmac::Key,
    tokens: TokenManager,
}

impl<U> IdentityGate<U>
where
    U: UserStore,
{
    pub fn new(users: Arc<U>, config: IdentityConfig) -> Self {
        let key = hmac::Key::new(hmac::HMAC_SHA256, &config.secret);
        Self {
            users,
            key,
            tokens: TokenManager::new(config.token_ttl),
        }
    }

    /// Verifies a signed assertion, upserting the durable user on success.
    ///
    /// A signature mismatch terminates the handshake without creating any
    /// user row. New users default their display name to the asserted
    /// username, or a generated placeholder when none was asserted.
    pub async fn verify_assertion(
        &self,
        assertion: &[u8],
    ) -> Result<VerifiedIdentity, GameError> {
        let claims = assertion::verify_assertion(&self.key, assertion)?;
        let display_name = claims
            .username
            .unwrap_or_else(|| format!("player_{}", claims.external_id));
        let user = self
            .users
            .upsert_by_external_id(&claims.external_id, &display_name)
            .await
            .map_err(internal)?;
        let token = self.tokens.issue(user.id);
        Ok(VerifiedIdentity { user, token })
    }

    /// Fast path for reconnects: resolves a previously issued token without
    /// re-running the signature check.
    pub fn verify_token(&self, token: &str) -> Result<UserId, GameError> {
        self.tokens.validate(token)
    }
}
