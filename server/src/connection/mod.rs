mod channel;
mod rate_limiter;

pub use channel::ChannelKey;
pub use rate_limiter::{RateLimitConfig, RateLimiter};

pub(crate) use channel::Channel;
