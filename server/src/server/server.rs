use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Instant, SystemTime};

use log::{debug, info};

use siphon_shared::{
    DailyGiftView, GameError, HintView, LevelView, Request, Response, RewardView, SessionView,
    SolutionView, UserId, UserView,
};

use crate::assistant::{AssistantGateway, Solver};
use crate::connection::{Channel, ChannelKey, RateLimitConfig, RateLimiter};
use crate::engine::{internal, SessionEngine};
use crate::handshake::{IdentityGate, VerifiedIdentity};
use crate::server::server_config::{DailyGiftConfig, ServerConfig};
use crate::store::{DailyGiftOutcome, LevelCatalog, SessionStore, UserStore};

/// The engine's front door for the transport collaborator: one handshake
/// entry point per credential kind, then request dispatch over registered
/// channels. The transport owns the wire; requests on a single channel
/// arrive in order, while many channels are serviced concurrently.
pub struct Server<C, S, U, R> {
    engine: SessionEngine<C, S, U>,
    assistant: AssistantGateway<C, S, U, R>,
    identity: IdentityGate<U>,
    catalog: Arc<C>,
    users: Arc<U>,
    daily_gift: DailyGiftConfig,
    rate_limit: RateLimitConfig,
    channels: Mutex<HashMap<ChannelKey, Channel>>,
    next_channel_key: AtomicU64,
}

impl<C, S, U, R> Server<C, S, U, R>
where
    C: LevelCatalog,
    S: SessionStore,
    U: UserStore,
    R: Solver,
{
    pub fn new(
        config: ServerConfig,
        catalog: Arc<C>,
        sessions: Arc<S>,
        users: Arc<U>,
        solver: Arc<R>,
    ) -> Self {
        let engine = SessionEngine::new(
            catalog.clone(),
            sessions.clone(),
            users.clone(),
            config.engine,
        );
        let assistant = AssistantGateway::new(
            catalog.clone(),
            sessions,
            users.clone(),
            solver,
            config.assistant,
        );
        let identity = IdentityGate::new(users.clone(), config.identity);
        Self {
            engine,
            assistant,
            identity,
            catalog,
            users,
            daily_gift: config.daily_gift,
            rate_limit: config.rate_limit,
            channels: Mutex::new(HashMap::new()),
            next_channel_key: AtomicU64::new(0),
        }
    }

    // Handshake

    /// Verifies a signed identity assertion and binds the resolved user to
    /// a fresh channel. Fails without registering anything when the
    /// signature does not verify.
    pub async fn open_channel(
        &self,
        assertion: &[u8],
    ) -> Result<(ChannelKey, VerifiedIdentity), GameError> {
        let verified = self.identity.verify_assertion(assertion).await?;
        let channel = self.register_channel(verified.user.id);
        info!(
            "channel {} opened for user {}",
            channel.to_u64(),
            verified.user.id.value()
        );
        Ok((channel, verified))
    }

    /// Reconnect fast path: binds a channel from a previously issued
    /// capability token, skipping the signature check.
    pub fn open_channel_with_token(
        &self,
        token: &str,
    ) -> Result<(ChannelKey, UserId), GameError> {
        let user_id = self.identity.verify_token(token)?;
        let channel = self.register_channel(user_id);
        debug!(
            "channel {} resumed for user {} via token",
            channel.to_u64(),
            user_id.value()
        );
        Ok((channel, user_id))
    }

    pub fn close_channel(&self, channel: ChannelKey) {
        if self.lock_channels().remove(&channel).is_some() {
            debug!("channel {} closed", channel.to_u64());
        }
    }

    // Dispatch

    /// Answers one request on an authenticated channel. Every request spends
    /// one rate-limit slot before anything else; an over-budget channel gets
    /// `RateLimited` with no state touched.
    pub async fn handle(&self, channel: ChannelKey, request: Request) -> Response {
        let user_id = {
            let mut channels = self.lock_channels();
            let Some(state) = channels.get_mut(&channel) else {
                return Response::Error(GameError::TokenExpired);
            };
            if !state.limiter.try_consume(Instant::now()) {
                return Response::Error(GameError::RateLimited);
            }
            state.user_id
        };
        match self.dispatch(user_id, request).await {
            Ok(response) => response,
            Err(error) => Response::Error(error),
        }
    }

    async fn dispatch(&self, user_id: UserId, request: Request) -> Result<Response, GameError> {
        match request {
            Request::SessionStart { level_id } => {
                let session = self.engine.start_level(user_id, level_id).await?;
                Ok(Response::Session(SessionView::from(&session)))
            }
            Request::SessionMove { level_id, from, to } => {
                let outcome = self.engine.apply_move(user_id, level_id, from, to).await?;
                let reward = outcome.reward.map(|reward| RewardView {
                    tier: reward.tier,
                    coins_granted: reward.coins_granted,
                    message: reward.tier.message(),
                    coin_balance: reward.coin_balance,
                    score_by_tier: reward.score_by_tier,
                });
                Ok(Response::Move {
                    session: SessionView::from(&outcome.session),
                    reward,
                })
            }
            Request::SessionGetActive => {
                let session = self.engine.active_progress(user_id).await?;
                Ok(Response::Session(SessionView::from(&session)))
            }
            Request::AssistantHint {
                level_id,
                tubes,
                moves_so_far,
            } => {
                let outcome = self
                    .assistant
                    .request_hint(user_id, level_id, tubes, moves_so_far)
                    .await?;
                Ok(Response::Hint(HintView {
                    step: outcome.step,
                    coin_balance: outcome.coin_balance,
                }))
            }
            Request::AssistantSolve {
                level_id,
                tubes,
                moves_so_far,
            } => {
                let outcome = self
                    .assistant
                    .request_auto_solve(user_id, level_id, tubes, moves_so_far)
                    .await?;
                Ok(Response::Solution(SolutionView {
                    steps: outcome.steps,
                    solution: outcome.solution,
                    coin_balance: outcome.coin_balance,
                }))
            }
            Request::UserGet => {
                let user = self
                    .users
                    .get(user_id)
                    .await
                    .map_err(internal)?
                    .ok_or(GameError::Internal)?;
                Ok(Response::User(UserView::from(&user)))
            }
            Request::UserDaily => {
                let outcome = self
                    .users
                    .claim_daily_gift(
                        user_id,
                        SystemTime::now(),
                        self.daily_gift.cooldown,
                        self.daily_gift.amount,
                    )
                    .await
                    .map_err(internal)?;
                match outcome {
                    DailyGiftOutcome::Granted {
                        balance,
                        next_claim_at,
                    } => Ok(Response::DailyGift(DailyGiftView {
                        coin_balance: balance,
                        next_claim_at,
                    })),
                    DailyGiftOutcome::OnCooldown { .. } => Err(GameError::OnCooldown),
                }
            }
            Request::LevelGet { level_id } => {
                let layout = self
                    .catalog
                    .get_layout(level_id)
                    .await
                    .map_err(internal)?
                    .ok_or(GameError::LevelNotFound)?;
                Ok(Response::Level(LevelView::from(&layout)))
            }
        }
    }

    // Channels

    fn register_channel(&self, user_id: UserId) -> ChannelKey {
        let key = ChannelKey::from_u64(self.next_channel_key.fetch_add(1, Ordering::Relaxed));
        let channel = Channel {
            user_id,
            limiter: RateLimiter::new(self.rate_limit.clone()),
        };
        self.lock_channels().insert(key, channel);
        key
    }

    fn lock_channels(&self) -> std::sync::MutexGuard<'_, HashMap<ChannelKey, Channel>> {
        match self.channels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
