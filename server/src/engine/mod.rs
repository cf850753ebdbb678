mod session_engine;

pub use session_engine::{CompletionReward, EngineConfig, MoveOutcome, SessionEngine};
pub(crate) use session_engine::{internal, provision_next_level};
