use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::timeout;

use siphon_shared::{Container, GameError, LevelId, MoveStep, Session, SessionStatus, UserId};

use crate::assistant::solver::{Solver, SolverVerdict};
use crate::engine::{internal, provision_next_level};
use crate::store::{CasOutcome, CoinAdjust, LevelCatalog, SessionStore, UserStore};

// Defaults
const HINT_PRICE: u64 = 10;
const SOLVE_PRICE: u64 = 100;
const SOLVER_TIMEOUT_SECS: u64 = 10;
const CAS_ATTEMPT_LIMIT: u32 = 3;

/// Contains Config properties which will be used by the assistant gateway
#[derive(Clone)]
pub struct AssistantConfig {
    /// Coins debited for a hint (first solution step only).
    pub hint_price: u64,
    /// Coins debited for a full auto-solve.
    pub solve_price: u64,
    /// Bound on the remote solver call; expiry surfaces as a retryable
    /// failure with nothing charged.
    pub solver_timeout: Duration,
    /// Attempts at marking an auto-solved session before surfacing `Busy`.
    pub cas_attempt_limit: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            hint_price: HINT_PRICE,
            solve_price: SOLVE_PRICE,
            solver_timeout: Duration::from_secs(SOLVER_TIMEOUT_SECS),
            cas_attempt_limit: CAS_ATTEMPT_LIMIT,
        }
    }
}

/// A purchased hint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintOutcome {
    /// First step of the solver's path; never the rest of it.
    pub step: Option<MoveStep>,
    pub coin_balance: u64,
}

/// A purchased auto-solve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveOutcome {
    pub steps: u32,
    /// Full path, for client-side animation.
    pub solution: Vec<MoveStep>,
    pub coin_balance: u64,
}

/// Mediates paid hint/auto-solve requests: checks the price against the
/// stored balance before the remote call, never debits on failure or an
/// unsolvable verdict, and marks auto-solved sessions as completed without
/// any tier reward.
///
/// The client-asserted tubes are forwarded to the solver as-is; the stored
/// session is consulted only to reject solves against unknown or finished
/// levels before anything is charged.
pub struct AssistantGateway<C, S, U, R> {
    catalog: Arc<C>,
    sessions: Arc<S>,
    users: Arc<U>,
    solver: Arc<R>,
    config: AssistantConfig,
}

impl<C, S, U, R> AssistantGateway<C, S, U, R>
where
    C: LevelCatalog,
    S: SessionStore,
    U: UserStore,
    R: Solver,
{
    pub fn new(
        catalog: Arc<C>,
        sessions: Arc<S>,
        users: Arc<U>,
        solver: Arc<R>,
        config: AssistantConfig,
    ) -> Self {
        Self {
            catalog,
            sessions,
            users,
            solver,
            config,
        }
    }

    /// Buys the first step of a solution for the asserted configuration.
    /// The session's status is untouched.
    pub async fn request_hint(
        &self,
        user_id: UserId,
        level_id: LevelId,
        tubes: Vec<Container>,
        moves_so_far: u32,
    ) -> Result<HintOutcome, GameError> {
        self.eligible_session(user_id, level_id).await?;
        let verdict = self
            .priced_verdict(user_id, level_id, &tubes, moves_so_far, self.config.hint_price)
            .await?;
        let coin_balance = self.debit(user_id, self.config.hint_price).await?;
        Ok(HintOutcome {
            step: verdict.solution.first().copied(),
            coin_balance,
        })
    }

    /// Buys a full solve: debits, marks the session completed with
    /// `assistant_solved` set, provisions the next level, and returns the
    /// whole path. Assistant completions earn no tier reward.
    pub async fn request_auto_solve(
        &self,
        user_id: UserId,
        level_id: LevelId,
        tubes: Vec<Container>,
        moves_so_far: u32,
    ) -> Result<SolveOutcome, GameError> {
        let session = self.eligible_session(user_id, level_id).await?;
        let verdict = self
            .priced_verdict(user_id, level_id, &tubes, moves_so_far, self.config.solve_price)
            .await?;
        let coin_balance = self.debit(user_id, self.config.solve_price).await?;

        self.mark_assistant_solved(user_id, level_id, session.move_count)
            .await?;

        Ok(SolveOutcome {
            steps: verdict.steps,
            solution: verdict.solution,
            coin_balance,
        })
    }

    /// The session a purchase runs against: it must exist and still be in
    /// progress.
    async fn eligible_session(
        &self,
        user_id: UserId,
        level_id: LevelId,
    ) -> Result<Session, GameError> {
        let session = self
            .sessions
            .get(user_id, level_id)
            .await
            .map_err(internal)?
            .ok_or(GameError::NoProgress)?;
        if session.is_completed() {
            return Err(GameError::AlreadyCompleted);
        }
        Ok(session)
    }

    /// Runs the bounded remote call after confirming the stored balance
    /// covers `price`. Nothing is debited here: a timeout, remote error, or
    /// unsolvable verdict leaves the balance untouched.
    async fn priced_verdict(
        &self,
        user_id: UserId,
        level_id: LevelId,
        tubes: &[Container],
        moves_so_far: u32,
        price: u64,
    ) -> Result<SolverVerdict, GameError> {
        let user = self
            .users
            .get(user_id)
            .await
            .map_err(internal)?
            .ok_or(GameError::Internal)?;
        if user.coin_balance < price {
            return Err(GameError::InsufficientCoins);
        }

        let verdict = match timeout(
            self.config.solver_timeout,
            self.solver.solve(level_id, tubes, moves_so_far),
        )
        .await
        {
            Err(_elapsed) => {
                warn!("solver timed out for level {}", level_id.value());
                return Err(GameError::RemoteUnavailable);
            }
            Ok(Err(error)) => {
                warn!("solver call failed for level {}: {error}", level_id.value());
                return Err(GameError::RemoteUnavailable);
            }
            Ok(Ok(verdict)) => verdict,
        };

        if !verdict.solvable {
            return Err(GameError::Unsolvable);
        }
        Ok(verdict)
    }

    async fn debit(&self, user_id: UserId, price: u64) -> Result<u64, GameError> {
        match self
            .users
            .adjust_coins(user_id, -(price as i64))
            .await
            .map_err(internal)?
        {
            CoinAdjust::Applied { balance } => Ok(balance),
            // A concurrent purchase on another channel drained the balance
            // between the precheck and the debit.
            CoinAdjust::InsufficientFunds { .. } => Err(GameError::InsufficientCoins),
        }
    }

    /// Marks the session completed by the assistant, conditional on the
    /// move count read before the purchase and retried against competing
    /// moves from other channels.
    async fn mark_assistant_solved(
        &self,
        user_id: UserId,
        level_id: LevelId,
        mut expected_move_count: u32,
    ) -> Result<(), GameError> {
        for _attempt in 1..=self.config.cas_attempt_limit {
            let cas_outcome = self
                .sessions
                .compare_and_swap(
                    user_id,
                    level_id,
                    expected_move_count,
                    Box::new(|session| {
                        session.status = SessionStatus::Completed;
                        session.assistant_solved = true;
                    }),
                )
                .await
                .map_err(internal)?;
            match cas_outcome {
                CasOutcome::Applied(_) => {
                    provision_next_level(&*self.catalog, &*self.sessions, user_id, level_id)
                        .await;
                    return Ok(());
                }
                CasOutcome::Conflict => {
                    let fresh = self
                        .sessions
                        .get(user_id, level_id)
                        .await
                        .map_err(internal)?
                        .ok_or(GameError::NoProgress)?;
                    if fresh.is_completed() {
                        // A competing human move finished the level first;
                        // the paid solution is still returned.
                        debug!(
                            "auto-solve raced a human completion for user {} level {}",
                            user_id.value(),
                            level_id.value()
                        );
                        return Ok(());
                    }
                    expected_move_count = fresh.move_count;
                }
            }
        }
        warn!(
            "auto-solve could not mark user {} level {} after debit",
            user_id.value(),
            level_id.value()
        );
        Err(GameError::Busy)
    }
}
