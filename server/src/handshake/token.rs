use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use siphon_shared::{GameError, UserId};

/// Opaque capability token handed to the client after a verified handshake,
/// presented on later connections to skip the signature check.
pub type IdentityToken = String;

const TOKEN_ENTROPY_BYTES: usize = 24;

/// Issues and validates short-lived capability tokens bound to a user id.
pub(crate) struct TokenManager {
    ttl: Duration,
    tokens: Mutex<HashMap<IdentityToken, TokenEntry>>,
}

struct TokenEntry {
    user_id: UserId,
    expires_at: Instant,
}

impl TokenManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn issue(&self, user_id: UserId) -> IdentityToken {
        let token = generate_identity_token();
        let now = Instant::now();
        let mut tokens = self.lock();
        // issue time doubles as the sweep point for stale entries
        tokens.retain(|_, entry| entry.expires_at > now);
        tokens.insert(
            token.clone(),
            TokenEntry {
                user_id,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// Resolves a token to its bound user. Unknown and expired tokens look
    /// the same to the caller: re-verification is required either way.
    pub fn validate(&self, token: &str) -> Result<UserId, GameError> {
        let mut tokens = self.lock();
        let Some(entry) = tokens.get(token) else {
            return Err(GameError::TokenExpired);
        };
        if entry.expires_at <= Instant::now() {
            tokens.remove(token);
            return Err(GameError::TokenExpired);
        }
        Ok(entry.user_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<IdentityToken, TokenEntry>> {
        match self.tokens.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Random url-safe token: 24 bytes of entropy, base64-encoded.
fn generate_identity_token() -> IdentityToken {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    for byte in bytes.iter_mut() {
        *byte = fastrand::u8(..);
    }
    base64::encode_config(&bytes, base64::URL_SAFE_NO_PAD)
}
