use siphon_shared::UserId;

use crate::connection::rate_limiter::RateLimiter;

// ChannelKey

/// Handle to one authenticated client channel. Allocated when the handshake
/// succeeds and dead once the channel closes; the same user may hold several
/// (multiple devices on one identity).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct ChannelKey(u64);

impl ChannelKey {
    pub fn from_u64(value: u64) -> Self {
        ChannelKey(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

// Channel

/// Server-side state bound to one channel: the verified identity and the
/// channel's event budget.
pub(crate) struct Channel {
    pub user_id: UserId,
    pub limiter: RateLimiter,
}
