use crate::container::Container;
use crate::level::LevelId;
use crate::user::UserId;

/// Lifecycle of a session. `InProgress` is initial; `Completed` is terminal
/// for the row until an explicit restart resets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// A user's progress on one level. At most one session exists per
/// `(user, level)` pair; it is never deleted, only reset or completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub level_id: LevelId,
    /// Current container state, starting from the layout's initial
    /// configuration.
    pub tubes: Vec<Container>,
    pub move_count: u32,
    pub status: SessionStatus,
    /// True once the paid auto-solve completed this session. Assistant
    /// completions earn no tier reward.
    pub assistant_solved: bool,
}

impl Session {
    /// A fresh (or freshly reset) session holding the level's initial tubes.
    pub fn fresh(user_id: UserId, level_id: LevelId, tubes: Vec<Container>) -> Self {
        Self {
            user_id,
            level_id,
            tubes,
            move_count: 0,
            status: SessionStatus::InProgress,
            assistant_solved: false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}
