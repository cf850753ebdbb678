use thiserror::Error;

/// Every expected, user-facing outcome of a request. All variants are
/// returned as structured responses on the requesting channel; none crash a
/// handler or tear down the connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The handshake assertion's message authentication code did not verify
    #[error("identity assertion signature did not verify")]
    BadSignature,

    /// Capability token unknown or past its time-to-live
    #[error("identity token expired or unknown, a fresh handshake is required")]
    TokenExpired,

    /// The catalog holds no layout for the requested level
    #[error("level not found in catalog")]
    LevelNotFound,

    /// No session exists for this user and level
    #[error("no progress exists for this level, start it first")]
    NoProgress,

    /// The user has no in-progress session to resume
    #[error("no active progress to resume")]
    NoActiveProgress,

    /// The session is already completed; restart to play again
    #[error("level already completed")]
    AlreadyCompleted,

    /// Equal or out-of-range container indices
    #[error("move indices are invalid")]
    InvalidIndices,

    /// The pour is not legal in the session's current state
    #[error("move is not legal in the current state")]
    IllegalMove,

    /// Optimistic-concurrency retries exhausted by competing writes
    #[error("session is busy with competing moves, try again")]
    Busy,

    /// Balance does not cover the assistant's price
    #[error("coin balance does not cover this purchase")]
    InsufficientCoins,

    /// The solver reported that no solution exists from this configuration
    #[error("no solution exists from this configuration")]
    Unsolvable,

    /// The solver errored or timed out; retryable, nothing was charged
    #[error("assistant is unavailable, try again later")]
    RemoteUnavailable,

    /// The channel exceeded its event budget for the current window
    #[error("too many requests on this channel, slow down")]
    RateLimited,

    /// The daily gift was already claimed inside the cooldown window
    #[error("daily gift already claimed, come back later")]
    OnCooldown,

    /// Infrastructure fault; logged server-side, safe to retry
    #[error("internal server error")]
    Internal,
}
