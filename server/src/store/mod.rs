//! Durable-store contracts and the in-memory backend.
//!
//! The engine assumes at-least read-after-write consistency for a single row
//! and a conditional-update primitive (`compare_and_swap`); any backend
//! honoring those can stand in for the in-memory one.

mod error;
mod memory;

use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use siphon_shared::{Container, LevelId, LevelLayout, RewardTier, Session, User, UserId};

pub use error::StoreError;
pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Mutation applied inside the store's conditional write.
pub type SessionMutator = Box<dyn FnOnce(&mut Session) + Send>;

/// Result of a conditional session write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CasOutcome {
    /// The expectation held and the mutation was applied atomically.
    Applied(Session),
    /// A competing write advanced the session first; re-read and retry.
    Conflict,
}

/// Result of an atomic coin adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoinAdjust {
    Applied { balance: u64 },
    /// A debit larger than the stored balance; nothing was changed.
    InsufficientFunds { balance: u64 },
}

/// Result of a daily-gift claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DailyGiftOutcome {
    Granted {
        balance: u64,
        next_claim_at: SystemTime,
    },
    OnCooldown {
        next_claim_at: SystemTime,
    },
}

/// Read-only lookup of authored levels. The engine treats a missing layout
/// as a hard stop and never synthesizes one.
#[async_trait]
pub trait LevelCatalog: Send + Sync {
    async fn get_layout(&self, level_id: LevelId) -> StoreResult<Option<LevelLayout>>;

    /// Total number of authored levels, for client display.
    async fn level_count(&self) -> StoreResult<u64>;
}

/// Durable per-`(user, level)` session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: UserId, level_id: LevelId) -> StoreResult<Option<Session>>;

    /// Creates the row if absent, else resets it in place to the initial
    /// tubes with `move_count = 0` and `InProgress` status. Idempotent, and
    /// deliberately last-writer-wins: an explicit restart discards any
    /// in-flight move.
    async fn upsert_start(
        &self,
        user_id: UserId,
        level_id: LevelId,
        initial_tubes: Vec<Container>,
    ) -> StoreResult<Session>;

    /// The sole write path for moves: applies `mutator` only if the row's
    /// `move_count` still equals `expected_move_count` at apply time.
    async fn compare_and_swap(
        &self,
        user_id: UserId,
        level_id: LevelId,
        expected_move_count: u32,
        mutator: SessionMutator,
    ) -> StoreResult<CasOutcome>;

    /// The most recently updated `InProgress` session, used to resume after
    /// a reconnect.
    async fn find_active_for_user(&self, user_id: UserId) -> StoreResult<Option<Session>>;
}

/// Durable user rows. Coin mutations go through `adjust_coins` so the
/// balance is a conditional increment against the stored value, never a
/// read-modify-write on a cached copy.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, user_id: UserId) -> StoreResult<Option<User>>;

    /// Resolves the durable user for a verified external identity, creating
    /// the row (zero coins, zeroed tallies) on first sight.
    async fn upsert_by_external_id(
        &self,
        external_id: &str,
        display_name: &str,
    ) -> StoreResult<User>;

    /// Atomic conditional increment/decrement of the coin balance.
    async fn adjust_coins(&self, user_id: UserId, delta: i64) -> StoreResult<CoinAdjust>;

    /// Atomic increment of one tier tally.
    async fn record_tier(&self, user_id: UserId, tier: RewardTier) -> StoreResult<()>;

    /// Grants the daily gift unless the cooldown window is still open.
    async fn claim_daily_gift(
        &self,
        user_id: UserId,
        now: SystemTime,
        cooldown: Duration,
        amount: u64,
    ) -> StoreResult<DailyGiftOutcome>;
}
