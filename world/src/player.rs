//! Economy and progress counters owned by the player.

/// Money, lives, score and level of the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    money: u32,
    lives: u32,
    max_lives: u32,
    level: u32,
    score: u64,
}

impl Player {
    /// Creates a player with the provided bank balance and full lives.
    #[must_use]
    pub const fn new(money: u32, lives: u32) -> Self {
        Self {
            money,
            lives,
            max_lives: lives,
            level: 0,
            score: 0,
        }
    }

    /// Money available for building.
    #[must_use]
    pub const fn money(&self) -> u32 {
        self.money
    }

    /// Remaining lives.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Lives the player started with.
    #[must_use]
    pub const fn max_lives(&self) -> u32 {
        self.max_lives
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Whether every life has been lost.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.lives == 0
    }

    /// Credits money to the bank.
    pub fn add_money(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Deducts `amount` if the bank can cover it, returning whether it did.
    pub fn try_spend(&mut self, amount: u32) -> bool {
        match self.money.checked_sub(amount) {
            Some(remaining) => {
                self.money = remaining;
                true
            }
            None => false,
        }
    }

    /// Credits score.
    pub fn add_score(&mut self, amount: u64) {
        self.score = self.score.saturating_add(amount);
    }

    /// Removes a single life, never dropping below zero.
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(500, 20)
    }
}
