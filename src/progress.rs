use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::helper::HelperTrigger;

pub const MAX_LEVEL: u32 = 5;
pub const COIN_REWARD_PER_LEVEL: u32 = 100;

/// Receives round results. Currency, unlocks and storage live behind this.
pub trait Progression {
    fn on_level_won(&mut self, level_id: u32, attempts_used: u32);
    fn on_level_lost(&mut self, level_id: u32);
    fn on_helper(&mut self, _trigger: HelperTrigger) {}
}

/// For callers that don't track progression at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgression;

impl Progression for NoProgression {
    fn on_level_won(&mut self, _level_id: u32, _attempts_used: u32) {}
    fn on_level_lost(&mut self, _level_id: u32) {}
}

// ── In-memory progress ────────────────────────────────────────────────────────

/// Coins and unlocked levels. Serializable so the caller can persist it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progress {
    pub coins: u32,
    pub unlocked_levels: BTreeSet<u32>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(skip)]
    pub last_helper: Option<HelperTrigger>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            coins: 0,
            unlocked_levels: BTreeSet::from([1]),
            wins: 0,
            losses: 0,
            last_helper: None,
        }
    }
}

impl Progress {
    pub fn is_level_unlocked(&self, level_id: u32) -> bool {
        self.unlocked_levels.contains(&level_id)
    }

    pub fn unlock_level(&mut self, level_id: u32) {
        if (1..=MAX_LEVEL).contains(&level_id) {
            self.unlocked_levels.insert(level_id);
        }
    }

    pub fn max_unlocked_level(&self) -> u32 {
        self.unlocked_levels.last().copied().unwrap_or(1)
    }

    /// Level 1 starts unlocked, so it doesn't count.
    pub fn levels_completed(&self) -> usize {
        self.unlocked_levels.len().saturating_sub(1)
    }

    pub fn has_completed_all_levels(&self) -> bool {
        self.is_level_unlocked(MAX_LEVEL)
    }
}

impl Progression for Progress {
    fn on_level_won(&mut self, level_id: u32, attempts_used: u32) {
        self.coins = self.coins.saturating_add(COIN_REWARD_PER_LEVEL);
        self.wins = self.wins.saturating_add(1);
        if let Some(next) = level_id.checked_add(1) {
            self.unlock_level(next);
        }
        info!(
            "level {level_id} won in {attempts_used} attempt(s), coins now {}",
            self.coins
        );
    }

    fn on_level_lost(&mut self, level_id: u32) {
        self.losses = self.losses.saturating_add(1);
        info!("level {level_id} lost");
    }

    fn on_helper(&mut self, trigger: HelperTrigger) {
        self.last_helper = Some(trigger);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_rewards_coins_and_unlocks_next_level() {
        let mut progress = Progress::default();
        progress.on_level_won(1, 3);
        assert_eq!(progress.coins, COIN_REWARD_PER_LEVEL);
        assert!(progress.is_level_unlocked(2));
        assert_eq!(progress.max_unlocked_level(), 2);
        assert_eq!(progress.levels_completed(), 1);
    }

    #[test]
    fn last_level_does_not_unlock_past_the_catalog() {
        let mut progress = Progress::default();
        progress.on_level_won(MAX_LEVEL, 1);
        assert!(!progress.is_level_unlocked(MAX_LEVEL + 1));
        progress.unlock_level(MAX_LEVEL);
        assert!(progress.has_completed_all_levels());
    }

    #[test]
    fn win_on_highest_possible_id_unlocks_nothing() {
        let mut progress = Progress::default();
        progress.on_level_won(u32::MAX, 1);
        assert_eq!(progress.coins, COIN_REWARD_PER_LEVEL);
        assert_eq!(progress.wins, 1);
        assert_eq!(progress.max_unlocked_level(), 1);
    }

    #[test]
    fn loss_only_counts() {
        let mut progress = Progress::default();
        progress.on_level_lost(1);
        assert_eq!(progress.losses, 1);
        assert_eq!(progress.coins, 0);
    }

    #[test]
    fn snapshot_loads_without_counters() {
        let progress: Progress =
            serde_json::from_str(r#"{"coins": 200, "unlocked_levels": [1, 2, 3]}"#).unwrap();
        assert_eq!(progress.coins, 200);
        assert_eq!(progress.wins, 0);
        assert_eq!(progress.max_unlocked_level(), 3);
    }
}
