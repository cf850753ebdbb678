//! # Siphon Server
//! The server-authoritative engine for the siphon liquid-sorting puzzle: a
//! client opens a bidirectional channel, the identity gate verifies the
//! signed handshake once, and every subsequent request is dispatched to the
//! session engine or the assistant gateway over the same channel.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use siphon_shared::{
        can_pour, is_solved, pour, top_index, Cell, Container, GameError, LevelId, LevelLayout,
        MoveStep, Request, Response, RewardTier, Session, SessionStatus, User, UserId,
    };
}

mod assistant;
mod connection;
mod engine;
mod handshake;
mod server;
mod store;

pub use assistant::{
    AssistantConfig, AssistantGateway, HintOutcome, SolveOutcome, Solver, SolverError,
    SolverVerdict,
};
pub use connection::{ChannelKey, RateLimitConfig, RateLimiter};
pub use engine::{CompletionReward, EngineConfig, MoveOutcome, SessionEngine};
pub use handshake::{IdentityConfig, IdentityGate, IdentityToken, VerifiedIdentity};
pub use server::{DailyGiftConfig, Server, ServerConfig};
pub use store::{
    CasOutcome, CoinAdjust, DailyGiftOutcome, LevelCatalog, MemoryStore, SessionMutator,
    SessionStore, StoreError, StoreResult, UserStore,
};
