//! The request/response surface exposed to the transport collaborator.
//!
//! The transport is any bidirectional message channel with request/response
//! correlation; these types are the payloads it carries after the identity
//! handshake has bound a user to the channel.

use std::collections::HashMap;
use std::time::SystemTime;

use crate::container::Container;
use crate::error::GameError;
use crate::level::{LevelId, LevelLayout};
use crate::session::{Session, SessionStatus};
use crate::user::{RewardTier, User, UserId};

/// One pour instruction: container indices into the session's tubes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveStep {
    pub from: usize,
    pub to: usize,
}

/// A client request on an authenticated channel.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    /// Start (or explicitly restart) a level from its initial configuration.
    SessionStart { level_id: LevelId },
    /// Apply one pour move to an in-progress session.
    SessionMove {
        level_id: LevelId,
        from: usize,
        to: usize,
    },
    /// Resume: fetch the most recently updated in-progress session.
    SessionGetActive,
    /// Buy a hint: the first step of a solution from the asserted state.
    AssistantHint {
        level_id: LevelId,
        tubes: Vec<Container>,
        moves_so_far: u32,
    },
    /// Buy a full auto-solve of the asserted state.
    AssistantSolve {
        level_id: LevelId,
        tubes: Vec<Container>,
        moves_so_far: u32,
    },
    /// Fetch the requesting user's profile.
    UserGet,
    /// Claim the daily coin gift.
    UserDaily,
    /// Fetch a level's authored configuration.
    LevelGet { level_id: LevelId },
}

/// The server's answer to one [`Request`].
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Session(SessionView),
    Move {
        session: SessionView,
        /// Present only on the move that completed the level.
        reward: Option<RewardView>,
    },
    Hint(HintView),
    Solution(SolutionView),
    User(UserView),
    DailyGift(DailyGiftView),
    Level(LevelView),
    Error(GameError),
}

/// Snapshot of a session as sent to the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionView {
    pub level_id: LevelId,
    pub tubes: Vec<Container>,
    pub status: SessionStatus,
    pub move_count: u32,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            level_id: session.level_id,
            tubes: session.tubes.clone(),
            status: session.status,
            move_count: session.move_count,
        }
    }
}

/// Reward details attached to a completing move.
///
/// Balance and tallies are read back after the best-effort credit; they are
/// absent when that write failed (the win itself stands regardless).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardView {
    pub tier: RewardTier,
    pub coins_granted: u64,
    pub message: &'static str,
    pub coin_balance: Option<u64>,
    pub score_by_tier: Option<HashMap<RewardTier, u32>>,
}

/// A purchased hint: the first step of the solver's path, never the rest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintView {
    pub step: Option<MoveStep>,
    pub coin_balance: u64,
}

/// A purchased auto-solve: the full path, for client-side animation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolutionView {
    pub steps: u32,
    pub solution: Vec<MoveStep>,
    pub coin_balance: u64,
}

/// Profile snapshot for the requesting user.
#[derive(Clone, Debug, PartialEq)]
pub struct UserView {
    pub id: UserId,
    pub display_name: String,
    pub coin_balance: u64,
    pub score_by_tier: HashMap<RewardTier, u32>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name.clone(),
            coin_balance: user.coin_balance,
            score_by_tier: user.score_by_tier.clone(),
        }
    }
}

/// Outcome of a granted daily gift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyGiftView {
    pub coin_balance: u64,
    pub next_claim_at: SystemTime,
}

/// A level's authored configuration as sent to the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelView {
    pub id: LevelId,
    pub tubes: Vec<Container>,
    pub optimal_steps: Option<u32>,
    pub difficulty: Option<String>,
}

impl From<&LevelLayout> for LevelView {
    fn from(layout: &LevelLayout) -> Self {
        Self {
            id: layout.id,
            tubes: layout.initial.clone(),
            optimal_steps: layout.optimal_steps,
            difficulty: layout.difficulty.clone(),
        }
    }
}
