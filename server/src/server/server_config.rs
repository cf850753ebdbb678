use std::default::Default;
use std::time::Duration;

use crate::assistant::AssistantConfig;
use crate::connection::RateLimitConfig;
use crate::engine::EngineConfig;
use crate::handshake::IdentityConfig;

// Defaults
const DAILY_GIFT_AMOUNT: u64 = 500;
const DAILY_GIFT_COOLDOWN_SECS: u64 = 24 * 60 * 60;

/// Contains Config properties for the daily coin gift
#[derive(Clone)]
pub struct DailyGiftConfig {
    /// Coins granted per claim.
    pub amount: u64,
    /// Cooldown between claims.
    pub cooldown: Duration,
}

impl Default for DailyGiftConfig {
    fn default() -> Self {
        Self {
            amount: DAILY_GIFT_AMOUNT,
            cooldown: Duration::from_secs(DAILY_GIFT_COOLDOWN_SECS),
        }
    }
}

/// Contains Config properties which will be used by the Server
#[derive(Clone)]
pub struct ServerConfig {
    /// Secret and token lifetime for the identity handshake.
    pub identity: IdentityConfig,
    /// Tunables for the session engine.
    pub engine: EngineConfig,
    /// Prices and timeout for the solver assistant.
    pub assistant: AssistantConfig,
    /// Per-channel event budget.
    pub rate_limit: RateLimitConfig,
    /// The daily coin gift.
    pub daily_gift: DailyGiftConfig,
}

impl ServerConfig {
    /// A config with every tunable at its default, bound to the given
    /// handshake secret (there is no sensible default secret).
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            identity: IdentityConfig::new(secret),
            engine: EngineConfig::default(),
            assistant: AssistantConfig::default(),
            rate_limit: RateLimitConfig::default(),
            daily_gift: DailyGiftConfig::default(),
        }
    }
}
