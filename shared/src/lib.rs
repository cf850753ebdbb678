//! # Siphon Shared
//! Pure game model & wire protocol shared between the siphon server and its
//! clients: containers, the pour simulation, levels, sessions, users, and the
//! request/response surface exposed over the transport.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

mod container;
mod error;
mod level;
mod pour;
mod protocol;
mod session;
mod user;

pub use container::{Cell, Container, LayoutError};
pub use error::GameError;
pub use level::{LevelId, LevelLayout};
pub use pour::{can_pour, is_solved, pour, top_index, PourOutcome};
pub use protocol::{
    DailyGiftView, HintView, LevelView, MoveStep, Request, Response, RewardView, SessionView,
    SolutionView, UserView,
};
pub use session::{Session, SessionStatus};
pub use user::{RewardTier, User, UserId};
