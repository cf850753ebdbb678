use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use siphon_shared::{
    can_pour, is_solved, pour, GameError, LevelId, RewardTier, Session, SessionStatus, UserId,
};

use crate::store::{CasOutcome, CoinAdjust, LevelCatalog, SessionStore, StoreError, UserStore};

// Defaults
const CAS_ATTEMPT_LIMIT: u32 = 3;

/// Maps a persistence fault to the generic user-facing outcome, logging the
/// underlying cause server-side.
pub(crate) fn internal(error: StoreError) -> GameError {
    warn!("storage fault: {error}");
    GameError::Internal
}

/// Best-effort provisioning of the level after `completed`: looks up the
/// next layout and opens a fresh session for it. Absence of a next level
/// (end of content) and provisioning failures are logged, never surfaced;
/// they must not fail the triggering completion.
pub(crate) async fn provision_next_level<C, S>(
    catalog: &C,
    sessions: &S,
    user_id: UserId,
    completed: LevelId,
) where
    C: LevelCatalog + ?Sized,
    S: SessionStore + ?Sized,
{
    let next = completed.next();
    match catalog.get_layout(next).await {
        Ok(Some(layout)) => {
            if let Err(error) = sessions.upsert_start(user_id, next, layout.initial).await {
                warn!(
                    "failed to provision level {} for user {}: {error}",
                    next.value(),
                    user_id.value()
                );
            }
        }
        Ok(None) => {
            debug!("no level {} to provision, end of content", next.value());
        }
        Err(error) => {
            warn!("catalog lookup for level {} failed: {error}", next.value());
        }
    }
}

/// Contains Config properties which will be used by the session engine
#[derive(Clone)]
pub struct EngineConfig {
    /// Attempts at the conditional move write before surfacing `Busy`.
    pub cas_attempt_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cas_attempt_limit: CAS_ATTEMPT_LIMIT,
        }
    }
}

/// The result of an accepted move.
#[derive(Clone, Debug)]
pub struct MoveOutcome {
    pub session: Session,
    /// Present only when this move completed the level.
    pub reward: Option<CompletionReward>,
}

/// Reward settled on the transition to `Completed`.
///
/// The credit is best-effort: a confirmed win is never rolled back because
/// the accounting write failed, so balance and tallies may be absent.
#[derive(Clone, Debug)]
pub struct CompletionReward {
    pub tier: RewardTier,
    pub coins_granted: u64,
    pub coin_balance: Option<u64>,
    pub score_by_tier: Option<HashMap<RewardTier, u32>>,
}

/// Orchestrates the pour simulation, the session store, and the level
/// catalog: validates moves, advances state, detects completion, provisions
/// the next level, and settles rewards.
pub struct SessionEngine<C, S, U> {
    catalog: Arc<C>,
    sessions: Arc<S>,
    users: Arc<U>,
    config: EngineConfig,
}

impl<C, S, U> SessionEngine<C, S, U>
where
    C: LevelCatalog,
    S: SessionStore,
    U: UserStore,
{
    pub fn new(catalog: Arc<C>, sessions: Arc<S>, users: Arc<U>, config: EngineConfig) -> Self {
        Self {
            catalog,
            sessions,
            users,
            config,
        }
    }

    /// Starts (or explicitly restarts) a level from its authored initial
    /// configuration. Always resets progress: this is "give up and restart",
    /// not resumption, and is deliberately last-writer-wins.
    pub async fn start_level(
        &self,
        user_id: UserId,
        level_id: LevelId,
    ) -> Result<Session, GameError> {
        let layout = self
            .catalog
            .get_layout(level_id)
            .await
            .map_err(internal)?
            .ok_or(GameError::LevelNotFound)?;
        self.sessions
            .upsert_start(user_id, level_id, layout.initial)
            .await
            .map_err(internal)
    }

    /// The user's current in-progress session, for resuming after a
    /// reconnect.
    pub async fn active_progress(&self, user_id: UserId) -> Result<Session, GameError> {
        self.sessions
            .find_active_for_user(user_id)
            .await
            .map_err(internal)?
            .ok_or(GameError::NoActiveProgress)
    }

    /// Validates and applies one pour move.
    ///
    /// The write is conditional on the move count read beforehand; a lost
    /// race re-reads and retries up to the configured bound, then surfaces
    /// `Busy`. Completion is detected inside the same atomic write.
    pub async fn apply_move(
        &self,
        user_id: UserId,
        level_id: LevelId,
        from: usize,
        to: usize,
    ) -> Result<MoveOutcome, GameError> {
        // A container can never pour into itself, and the pour simulation
        // cannot tell an aliased pair apart, so equal indices are rejected
        // here as their own illegal-move class.
        if from == to {
            return Err(GameError::InvalidIndices);
        }

        for attempt in 1..=self.config.cas_attempt_limit {
            let session = self
                .sessions
                .get(user_id, level_id)
                .await
                .map_err(internal)?
                .ok_or(GameError::NoProgress)?;
            if session.is_completed() {
                return Err(GameError::AlreadyCompleted);
            }
            if from >= session.tubes.len() || to >= session.tubes.len() {
                return Err(GameError::InvalidIndices);
            }
            if !can_pour(&session.tubes[from], &session.tubes[to]) {
                return Err(GameError::IllegalMove);
            }
            let outcome = pour(&session.tubes[from], &session.tubes[to]);
            if !outcome.moved {
                return Err(GameError::IllegalMove);
            }

            let mut new_tubes = session.tubes.clone();
            new_tubes[from] = outcome.source;
            new_tubes[to] = outcome.target;
            let solved = is_solved(&new_tubes);

            let cas_outcome = self
                .sessions
                .compare_and_swap(
                    user_id,
                    level_id,
                    session.move_count,
                    Box::new(move |current| {
                        current.tubes = new_tubes;
                        current.move_count += 1;
                        if solved {
                            current.status = SessionStatus::Completed;
                        }
                    }),
                )
                .await
                .map_err(internal)?;

            match cas_outcome {
                CasOutcome::Applied(updated) => {
                    let reward = if solved {
                        Some(
                            self.settle_completion(user_id, level_id, updated.move_count)
                                .await,
                        )
                    } else {
                        None
                    };
                    return Ok(MoveOutcome {
                        session: updated,
                        reward,
                    });
                }
                CasOutcome::Conflict => {
                    debug!(
                        "move conflict for user {} level {} (attempt {attempt})",
                        user_id.value(),
                        level_id.value()
                    );
                }
            }
        }
        Err(GameError::Busy)
    }

    /// Effects of a human completion: next-level provisioning and the
    /// tiered coin reward, both best-effort relative to the already
    /// committed move.
    async fn settle_completion(
        &self,
        user_id: UserId,
        level_id: LevelId,
        move_count: u32,
    ) -> CompletionReward {
        provision_next_level(&*self.catalog, &*self.sessions, user_id, level_id).await;

        let optimal_steps = match self.catalog.get_layout(level_id).await {
            Ok(Some(layout)) => layout.optimal_steps.unwrap_or(0),
            Ok(None) => 0,
            Err(error) => {
                warn!(
                    "optimal-steps lookup for level {} failed: {error}",
                    level_id.value()
                );
                0
            }
        };
        let tier = RewardTier::for_completion(move_count, optimal_steps);
        let coins_granted = tier.coin_reward();

        let coin_balance = match self.users.adjust_coins(user_id, coins_granted as i64).await {
            Ok(CoinAdjust::Applied { balance }) => Some(balance),
            Ok(CoinAdjust::InsufficientFunds { .. }) => None,
            Err(error) => {
                warn!(
                    "reward credit failed for user {}: {error}",
                    user_id.value()
                );
                None
            }
        };
        if let Err(error) = self.users.record_tier(user_id, tier).await {
            warn!(
                "tier tally update failed for user {}: {error}",
                user_id.value()
            );
        }
        let score_by_tier = match self.users.get(user_id).await {
            Ok(Some(user)) => Some(user.score_by_tier),
            Ok(None) => None,
            Err(error) => {
                warn!("profile read-back failed for user {}: {error}", user_id.value());
                None
            }
        };

        CompletionReward {
            tier,
            coins_granted,
            coin_balance,
            score_by_tier,
        }
    }
}
