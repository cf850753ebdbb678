use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use siphon_server::{
    CasOutcome, MemoryStore, SessionMutator, SessionStore, StoreResult,
};
use siphon_shared::{
    is_solved, pour, Container, LevelId, Session, SessionStatus, UserId,
};

/// Session-store wrapper that answers `Conflict` to the first N conditional
/// writes without touching the row, then delegates. Makes the engine's
/// bounded retry loop deterministic to test.
pub struct ConflictingSessions {
    inner: Arc<MemoryStore>,
    remaining: Mutex<u32>,
    cas_calls: AtomicU32,
}

impl ConflictingSessions {
    pub fn new(inner: Arc<MemoryStore>, forced_conflicts: u32) -> Self {
        Self {
            inner,
            remaining: Mutex::new(forced_conflicts),
            cas_calls: AtomicU32::new(0),
        }
    }

    pub fn cas_calls(&self) -> u32 {
        self.cas_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for ConflictingSessions {
    async fn get(&self, user_id: UserId, level_id: LevelId) -> StoreResult<Option<Session>> {
        self.inner.get(user_id, level_id).await
    }

    async fn upsert_start(
        &self,
        user_id: UserId,
        level_id: LevelId,
        initial_tubes: Vec<Container>,
    ) -> StoreResult<Session> {
        self.inner.upsert_start(user_id, level_id, initial_tubes).await
    }

    async fn compare_and_swap(
        &self,
        user_id: UserId,
        level_id: LevelId,
        expected_move_count: u32,
        mutator: SessionMutator,
    ) -> StoreResult<CasOutcome> {
        self.cas_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut remaining = self.remaining.lock().expect("conflict counter lock");
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(CasOutcome::Conflict);
            }
        }
        self.inner
            .compare_and_swap(user_id, level_id, expected_move_count, mutator)
            .await
    }

    async fn find_active_for_user(&self, user_id: UserId) -> StoreResult<Option<Session>> {
        self.inner.find_active_for_user(user_id).await
    }
}

/// Session-store wrapper that simulates a duplicate tap from a second
/// channel: just before the first conditional write lands, a rival request
/// that read the same session applies the same pour with the same expected
/// move count. The wrapped writer then loses its race.
pub struct DuplicateTapSessions {
    inner: Arc<MemoryStore>,
    from: usize,
    to: usize,
    armed: Mutex<bool>,
}

impl DuplicateTapSessions {
    pub fn new(inner: Arc<MemoryStore>, from: usize, to: usize) -> Self {
        Self {
            inner,
            from,
            to,
            armed: Mutex::new(true),
        }
    }

    async fn fire_rival(
        &self,
        user_id: UserId,
        level_id: LevelId,
        expected_move_count: u32,
    ) -> StoreResult<()> {
        let Some(session) = self.inner.get(user_id, level_id).await? else {
            return Ok(());
        };
        let outcome = pour(&session.tubes[self.from], &session.tubes[self.to]);
        if !outcome.moved {
            return Ok(());
        }
        let mut tubes = session.tubes.clone();
        tubes[self.from] = outcome.source;
        tubes[self.to] = outcome.target;
        let solved = is_solved(&tubes);
        self.inner
            .compare_and_swap(
                user_id,
                level_id,
                expected_move_count,
                Box::new(move |current| {
                    current.tubes = tubes;
                    current.move_count += 1;
                    if solved {
                        current.status = SessionStatus::Completed;
                    }
                }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for DuplicateTapSessions {
    async fn get(&self, user_id: UserId, level_id: LevelId) -> StoreResult<Option<Session>> {
        self.inner.get(user_id, level_id).await
    }

    async fn upsert_start(
        &self,
        user_id: UserId,
        level_id: LevelId,
        initial_tubes: Vec<Container>,
    ) -> StoreResult<Session> {
        self.inner.upsert_start(user_id, level_id, initial_tubes).await
    }

    async fn compare_and_swap(
        &self,
        user_id: UserId,
        level_id: LevelId,
        expected_move_count: u32,
        mutator: SessionMutator,
    ) -> StoreResult<CasOutcome> {
        let fire = {
            let mut armed = self.armed.lock().expect("rival trigger lock");
            std::mem::take(&mut *armed)
        };
        if fire {
            self.fire_rival(user_id, level_id, expected_move_count).await?;
        }
        self.inner
            .compare_and_swap(user_id, level_id, expected_move_count, mutator)
            .await
    }

    async fn find_active_for_user(&self, user_id: UserId) -> StoreResult<Option<Session>> {
        self.inner.find_active_for_user(user_id).await
    }
}
