use anyhow::{Context, Result};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::core::error::RoundError;
use crate::core::grid::{GRID_COLS, GRID_ROWS};

// ── Level config ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelConfig {
    pub id: u32,
    pub word_length: usize,
    /// Words drawn per round: one password plus `pool_size - 1` distractors.
    pub pool_size: usize,
    pub word_pool: Vec<String>,
    #[serde(default)]
    pub display_name: String,
}

/// The words a single round is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundWords {
    pub password: String,
    pub distractors: Vec<String>,
}

impl RoundWords {
    /// Password first, then distractors: the order words are placed in.
    pub fn placement_order(&self) -> Vec<&str> {
        std::iter::once(self.password.as_str())
            .chain(self.distractors.iter().map(String::as_str))
            .collect()
    }
}

impl LevelConfig {
    pub fn new(id: u32, word_length: usize, pool_size: usize, word_pool: &[&str]) -> Self {
        Self {
            id,
            word_length,
            pool_size,
            word_pool: word_pool.iter().map(|w| w.to_string()).collect(),
            display_name: String::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn display_name(&self) -> String {
        if self.display_name.is_empty() {
            format!("Level {}", self.id)
        } else {
            self.display_name.clone()
        }
    }

    pub fn distractor_count(&self) -> usize {
        self.pool_size.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), RoundError> {
        if self.id == 0 || self.word_length == 0 {
            return Err(RoundError::InvalidLevel { id: self.id });
        }
        if self.word_pool.is_empty() {
            return Err(RoundError::EmptyPool { level_id: self.id });
        }
        let longest_side = GRID_ROWS.max(GRID_COLS);
        let mut seen = HashSet::new();
        for word in &self.word_pool {
            if word.chars().count() != self.word_length {
                return Err(RoundError::WordLengthMismatch {
                    word: word.clone(),
                    expected: self.word_length,
                });
            }
            if !word.chars().all(char::is_alphabetic) {
                return Err(RoundError::NonAlphabeticWord { word: word.clone() });
            }
            if self.word_length > longest_side {
                return Err(RoundError::WordTooLong {
                    word: word.clone(),
                    max: longest_side,
                });
            }
            if !seen.insert(word.as_str()) {
                return Err(RoundError::DuplicateWord { word: word.clone() });
            }
        }
        if self.pool_size == 0 || self.word_pool.len() < self.pool_size {
            return Err(RoundError::PoolTooSmall {
                available: self.word_pool.len(),
                required: self.pool_size.max(1),
            });
        }
        Ok(())
    }

    /// Shuffles the pool and draws this round's password and distractors.
    pub fn draw_words(&self, rng: &mut impl Rng) -> Result<RoundWords, RoundError> {
        self.validate()?;
        let mut pool = self.word_pool.clone();
        pool.shuffle(rng);
        pool.truncate(self.pool_size);
        let (password, distractors) = pool
            .split_first()
            .ok_or(RoundError::EmptyPool { level_id: self.id })?;
        Ok(RoundWords {
            password: password.clone(),
            distractors: distractors.to_vec(),
        })
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

/// Where the engine's callers look up levels.
pub trait LevelSource {
    fn level(&self, id: u32) -> Option<&LevelConfig>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCatalog {
    levels: Vec<LevelConfig>,
}

const LEVEL_WORDS: &[(usize, &[&str])] = &[
    (2, &["AB", "CD", "EF", "GH", "IJ", "KL", "MN", "OP"]),
    (
        3,
        &["CAT", "DOG", "SUN", "BAT", "HAT", "RUN", "FUN", "CUP", "TOP", "BIG"],
    ),
    (
        4,
        &[
            "WORD", "GAME", "PLAY", "FIND", "LOOK", "TEAM", "FAST", "GOOD", "BEST", "COOL", "NICE",
            "WORK",
        ],
    ),
    (
        5,
        &[
            "HAPPY", "WORLD", "QUICK", "SMART", "LIGHT", "BEACH", "MUSIC", "DANCE", "POWER",
            "MAGIC", "SPACE", "DREAM", "PEACE", "HEART",
        ],
    ),
    (
        6,
        &[
            "WISDOM", "FRIEND", "NATURE", "WONDER", "BEAUTY", "GALAXY", "FUTURE", "PLANET",
            "ENERGY", "DRAGON", "KNIGHT", "CASTLE", "MASTER", "LEGEND", "SPIRIT", "BRIDGE",
            "CHANCE", "SHADOW",
        ],
    ),
];

impl Default for LevelCatalog {
    fn default() -> Self {
        let levels = LEVEL_WORDS
            .iter()
            .zip(1u32..)
            .map(|((len, words), id)| {
                LevelConfig::new(id, *len, words.len(), words)
                    .with_display_name(format!("Level {id}"))
            })
            .collect();
        Self { levels }
    }
}

impl LevelCatalog {
    /// Builds a catalog, rejecting it if any level fails validation or two
    /// levels share an id.
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, RoundError> {
        let mut ids = HashSet::new();
        for level in &levels {
            level.validate()?;
            if !ids.insert(level.id) {
                return Err(RoundError::DuplicateLevel { id: level.id });
            }
        }
        Ok(Self { levels })
    }

    /// Reads a JSON array of levels.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let levels: Vec<LevelConfig> = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        debug!("loaded {} levels from {}", levels.len(), path.display());
        Ok(Self::new(levels)?)
    }

    /// Like [`LevelCatalog::load`], but falls back to the built-in levels.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("using built-in levels: {e:#}");
                Self::default()
            }
        }
    }

    pub fn levels(&self) -> &[LevelConfig] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl LevelSource for LevelCatalog {
    fn level(&self, id: u32) -> Option<&LevelConfig> {
        self.levels.iter().find(|l| l.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn built_in_levels_are_valid() {
        let catalog = LevelCatalog::default();
        assert_eq!(catalog.len(), 5);
        for level in catalog.levels() {
            level.validate().unwrap();
        }
        assert_eq!(catalog.level(2).map(|l| l.word_length), Some(3));
        assert_eq!(catalog.level(5).map(|l| l.pool_size), Some(18));
        assert!(catalog.level(6).is_none());
    }

    #[test]
    fn word_of_wrong_length_is_rejected() {
        let level = LevelConfig::new(5, 6, 2, &["WISDOM", "JOURNEY"]);
        assert_eq!(
            level.validate(),
            Err(RoundError::WordLengthMismatch {
                word: "JOURNEY".into(),
                expected: 6
            })
        );
    }

    #[test]
    fn pool_smaller_than_round_is_rejected() {
        let level = LevelConfig::new(2, 3, 5, &["CAT", "DOG"]);
        assert_eq!(
            level.validate(),
            Err(RoundError::PoolTooSmall {
                available: 2,
                required: 5
            })
        );
    }

    #[test]
    fn symbols_and_duplicates_are_rejected() {
        let level = LevelConfig::new(1, 3, 1, &["C#T"]);
        assert!(matches!(
            level.validate(),
            Err(RoundError::NonAlphabeticWord { .. })
        ));
        let level = LevelConfig::new(1, 3, 2, &["CAT", "CAT"]);
        assert!(matches!(
            level.validate(),
            Err(RoundError::DuplicateWord { .. })
        ));
        let level = LevelConfig::new(0, 3, 1, &["CAT"]);
        assert_eq!(level.validate(), Err(RoundError::InvalidLevel { id: 0 }));
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let level = LevelConfig::new(1, 3, 0, &["CAT", "DOG"]);
        assert!(matches!(
            level.validate(),
            Err(RoundError::PoolTooSmall { .. })
        ));
    }

    #[test]
    fn empty_pool_is_rejected() {
        let level = LevelConfig::new(4, 3, 1, &[]);
        assert_eq!(level.validate(), Err(RoundError::EmptyPool { level_id: 4 }));
    }

    #[test]
    fn word_longer_than_either_grid_side_is_rejected() {
        let word = "A".repeat(GRID_COLS + 1);
        let level = LevelConfig::new(1, word.len(), 1, &[word.as_str()]);
        assert_eq!(
            level.validate(),
            Err(RoundError::WordTooLong {
                word,
                max: GRID_COLS
            })
        );
        // fits horizontally even though it is taller than the grid
        let word = "B".repeat(GRID_ROWS + 1);
        let level = LevelConfig::new(1, word.len(), 1, &[word.as_str()]);
        assert!(level.validate().is_ok());
    }

    #[test]
    fn catalog_rejects_repeated_level_ids() {
        let levels = vec![
            LevelConfig::new(1, 3, 1, &["CAT"]),
            LevelConfig::new(1, 4, 1, &["WORD"]),
        ];
        assert_eq!(
            LevelCatalog::new(levels),
            Err(RoundError::DuplicateLevel { id: 1 })
        );
    }

    #[test]
    fn draw_takes_pool_size_words_password_first() {
        let level = LevelConfig::new(2, 3, 4, &["CAT", "DOG", "SUN", "BAT", "HAT", "RUN"]);
        let mut rng = StdRng::seed_from_u64(11);
        let words = level.draw_words(&mut rng).unwrap();
        assert_eq!(words.distractors.len(), level.distractor_count());
        assert_eq!(level.distractor_count(), 3);
        assert!(!words.distractors.contains(&words.password));
        let order = words.placement_order();
        assert_eq!(order[0], words.password);
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn display_name_defaults_to_level_number() {
        let level = LevelConfig::new(3, 3, 1, &["CAT"]);
        assert_eq!(level.display_name(), "Level 3");
        assert_eq!(level.with_display_name("Warmup").display_name(), "Warmup");
    }

    #[test]
    fn catalog_json_round_trips_through_serde() {
        let json = r#"[{"id": 1, "word_length": 3, "pool_size": 2, "word_pool": ["CAT", "DOG"]}]"#;
        let levels: Vec<LevelConfig> = serde_json::from_str(json).unwrap();
        let catalog = LevelCatalog::new(levels).unwrap();
        assert_eq!(catalog.level(1).unwrap().display_name(), "Level 1");
    }

    #[test]
    fn missing_catalog_file_falls_back_to_built_in() {
        let catalog = LevelCatalog::load_or_default(Path::new("/nonexistent/levels.json"));
        assert_eq!(catalog, LevelCatalog::default());
    }
}
