use std::collections::HashMap;
use std::time::SystemTime;

/// Durable user identity, allocated by the user store on first verified
/// handshake.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct UserId(u64);

impl UserId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Reward tier earned by completing a level, judged against the level's
/// precomputed optimal solution length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RewardTier {
    /// Beat the optimal solution.
    Gold,
    /// Matched the optimal solution.
    Silver,
    /// Took more moves than the optimal solution.
    Bronze,
}

impl RewardTier {
    /// Judges a completion: `move_count` against the level's optimal step
    /// count (0 when the layout carries none, so such levels always grade
    /// bronze).
    pub fn for_completion(move_count: u32, optimal_steps: u32) -> Self {
        if move_count < optimal_steps {
            RewardTier::Gold
        } else if move_count == optimal_steps {
            RewardTier::Silver
        } else {
            RewardTier::Bronze
        }
    }

    pub fn coin_reward(&self) -> u64 {
        match self {
            RewardTier::Gold => 3,
            RewardTier::Silver => 2,
            RewardTier::Bronze => 1,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            RewardTier::Gold => "gold",
            RewardTier::Silver => "silver",
            RewardTier::Bronze => "bronze",
        }
    }

    /// Completion banner shown to the player.
    pub fn message(&self) -> &'static str {
        match self {
            RewardTier::Gold => "Wow, you beat the AI!",
            RewardTier::Silver | RewardTier::Bronze => "Level completed!",
        }
    }

    pub fn all() -> [RewardTier; 3] {
        [RewardTier::Gold, RewardTier::Silver, RewardTier::Bronze]
    }
}

/// A player. Coins and tier tallies are mutated only by the session engine
/// (on completion), the assistant gateway (debits), and the daily-gift flow.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    /// The identity id asserted in the verified handshake payload.
    pub external_id: String,
    pub display_name: String,
    pub coin_balance: u64,
    pub last_daily_reward_at: Option<SystemTime>,
    pub score_by_tier: HashMap<RewardTier, u32>,
}

impl User {
    /// A newly registered user: zero coins, zeroed tier tallies.
    pub fn new(id: UserId, external_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let score_by_tier = RewardTier::all().iter().map(|tier| (*tier, 0)).collect();
        Self {
            id,
            external_id: external_id.into(),
            display_name: display_name.into(),
            coin_balance: 0,
            last_daily_reward_at: None,
            score_by_tier,
        }
    }
}
