use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use siphon_shared::{Container, LevelId, LevelLayout, RewardTier, Session, User, UserId};

use super::{
    CasOutcome, CoinAdjust, DailyGiftOutcome, LevelCatalog, SessionMutator, SessionStore,
    StoreResult, UserStore,
};

/// In-memory backend implementing all three store contracts behind one lock,
/// so the conditional session write and the coin adjustments are genuinely
/// atomic. Used by the test suite and as the default backend.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    levels: HashMap<LevelId, LevelLayout>,
    sessions: HashMap<(UserId, LevelId), StoredSession>,
    users: HashMap<UserId, User>,
    users_by_external_id: HashMap<String, UserId>,
    next_user_id: u64,
    write_counter: u64,
}

struct StoredSession {
    session: Session,
    /// Monotonic stamp bumped on every write; stands in for the relational
    /// backend's updated-at ordering in `find_active_for_user`.
    write_stamp: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                levels: HashMap::new(),
                sessions: HashMap::new(),
                users: HashMap::new(),
                users_by_external_id: HashMap::new(),
                next_user_id: 1,
                write_counter: 0,
            }),
        }
    }

    /// Seeds one authored layout. Content authoring happens before the
    /// server comes up; layouts are never mutated at runtime.
    pub fn insert_layout(&self, layout: LevelLayout) {
        let mut inner = self.lock();
        inner.levels.insert(layout.id, layout);
    }

    /// Number of user rows; test probe for "a failed handshake creates no
    /// user".
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LevelCatalog for MemoryStore {
    async fn get_layout(&self, level_id: LevelId) -> StoreResult<Option<LevelLayout>> {
        Ok(self.lock().levels.get(&level_id).cloned())
    }

    async fn level_count(&self) -> StoreResult<u64> {
        Ok(self.lock().levels.len() as u64)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, user_id: UserId, level_id: LevelId) -> StoreResult<Option<Session>> {
        let inner = self.lock();
        Ok(inner
            .sessions
            .get(&(user_id, level_id))
            .map(|stored| stored.session.clone()))
    }

    async fn upsert_start(
        &self,
        user_id: UserId,
        level_id: LevelId,
        initial_tubes: Vec<Container>,
    ) -> StoreResult<Session> {
        let mut inner = self.lock();
        inner.write_counter += 1;
        let write_stamp = inner.write_counter;
        let session = Session::fresh(user_id, level_id, initial_tubes);
        inner.sessions.insert(
            (user_id, level_id),
            StoredSession {
                session: session.clone(),
                write_stamp,
            },
        );
        Ok(session)
    }

    async fn compare_and_swap(
        &self,
        user_id: UserId,
        level_id: LevelId,
        expected_move_count: u32,
        mutator: SessionMutator,
    ) -> StoreResult<CasOutcome> {
        let mut inner = self.lock();
        inner.write_counter += 1;
        let write_stamp = inner.write_counter;
        // Rows are never deleted; a missing row here means the caller's read
        // predates any write, which a fresh read will repair.
        let Some(stored) = inner.sessions.get_mut(&(user_id, level_id)) else {
            return Ok(CasOutcome::Conflict);
        };
        if stored.session.move_count != expected_move_count {
            return Ok(CasOutcome::Conflict);
        }
        mutator(&mut stored.session);
        stored.write_stamp = write_stamp;
        Ok(CasOutcome::Applied(stored.session.clone()))
    }

    async fn find_active_for_user(&self, user_id: UserId) -> StoreResult<Option<Session>> {
        let inner = self.lock();
        Ok(inner
            .sessions
            .values()
            .filter(|stored| {
                stored.session.user_id == user_id && !stored.session.is_completed()
            })
            .max_by_key(|stored| stored.write_stamp)
            .map(|stored| stored.session.clone()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, user_id: UserId) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&user_id).cloned())
    }

    async fn upsert_by_external_id(
        &self,
        external_id: &str,
        display_name: &str,
    ) -> StoreResult<User> {
        let mut inner = self.lock();
        if let Some(existing_id) = inner.users_by_external_id.get(external_id).copied() {
            if let Some(user) = inner.users.get(&existing_id) {
                return Ok(user.clone());
            }
        }
        let user_id = UserId::new(inner.next_user_id);
        inner.next_user_id += 1;
        let user = User::new(user_id, external_id, display_name);
        inner
            .users_by_external_id
            .insert(external_id.to_string(), user_id);
        inner.users.insert(user_id, user.clone());
        Ok(user)
    }

    async fn adjust_coins(&self, user_id: UserId, delta: i64) -> StoreResult<CoinAdjust> {
        let mut inner = self.lock();
        let Some(user) = inner.users.get_mut(&user_id) else {
            return Ok(CoinAdjust::InsufficientFunds { balance: 0 });
        };
        if delta < 0 {
            let debit = delta.unsigned_abs();
            if user.coin_balance < debit {
                return Ok(CoinAdjust::InsufficientFunds {
                    balance: user.coin_balance,
                });
            }
            user.coin_balance -= debit;
        } else {
            user.coin_balance += delta as u64;
        }
        Ok(CoinAdjust::Applied {
            balance: user.coin_balance,
        })
    }

    async fn record_tier(&self, user_id: UserId, tier: RewardTier) -> StoreResult<()> {
        let mut inner = self.lock();
        if let Some(user) = inner.users.get_mut(&user_id) {
            *user.score_by_tier.entry(tier).or_insert(0) += 1;
        }
        Ok(())
    }

    async fn claim_daily_gift(
        &self,
        user_id: UserId,
        now: SystemTime,
        cooldown: Duration,
        amount: u64,
    ) -> StoreResult<DailyGiftOutcome> {
        let mut inner = self.lock();
        let Some(user) = inner.users.get_mut(&user_id) else {
            return Ok(DailyGiftOutcome::OnCooldown {
                next_claim_at: now + cooldown,
            });
        };
        if let Some(last) = user.last_daily_reward_at {
            let next_claim_at = last + cooldown;
            if now < next_claim_at {
                return Ok(DailyGiftOutcome::OnCooldown { next_claim_at });
            }
        }
        user.coin_balance += amount;
        user.last_daily_reward_at = Some(now);
        Ok(DailyGiftOutcome::Granted {
            balance: user.coin_balance,
            next_claim_at: now + cooldown,
        })
    }
}
