use log::{debug, warn};
use rand::Rng;
use std::collections::HashSet;

use crate::core::grid::{GridPosition, Placements, GRID_COLS, GRID_ROWS};

pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

/// Drops words onto the grid at random, horizontally or vertically, without
/// letting any two words share a cell.
///
/// Each word gets a bounded number of attempts. A word that runs out is left
/// off the grid; deciding whether that matters is up to the caller.
#[derive(Debug, Clone, Copy)]
pub struct WordPlacer {
    rows: usize,
    cols: usize,
    max_attempts: usize,
}

impl Default for WordPlacer {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            max_attempts: MAX_PLACEMENT_ATTEMPTS,
        }
    }
}

impl WordPlacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Places `words` in the given order, so the password goes first.
    pub fn place<S: AsRef<str>>(&self, words: &[S], rng: &mut impl Rng) -> Placements {
        let mut placements = Placements::new();
        let mut occupied: HashSet<GridPosition> = HashSet::new();

        for word in words {
            let word = word.as_ref();
            let len = word.chars().count();
            match self.find_placement(len, &occupied, rng) {
                Some(positions) => {
                    debug!("placed '{word}' at {:?}", positions.first());
                    occupied.extend(positions.iter().copied());
                    placements.insert(word, positions);
                }
                None => {
                    warn!(
                        "no room for '{word}' after {} attempts, skipping",
                        self.max_attempts
                    );
                }
            }
        }

        placements
    }

    fn find_placement(
        &self,
        len: usize,
        occupied: &HashSet<GridPosition>,
        rng: &mut impl Rng,
    ) -> Option<Vec<GridPosition>> {
        for _ in 0..self.max_attempts {
            if let Some(positions) = self.try_horizontal(len, occupied, rng) {
                return Some(positions);
            }
            if let Some(positions) = self.try_vertical(len, occupied, rng) {
                return Some(positions);
            }
        }
        None
    }

    fn try_horizontal(
        &self,
        len: usize,
        occupied: &HashSet<GridPosition>,
        rng: &mut impl Rng,
    ) -> Option<Vec<GridPosition>> {
        let max_start = self.cols.checked_sub(len)?;
        let row = rng.gen_range(0..self.rows);
        let start = rng.gen_range(0..=max_start);
        let positions: Vec<GridPosition> = (start..start + len)
            .map(|col| GridPosition::new(row, col))
            .collect();
        is_free(&positions, occupied).then_some(positions)
    }

    fn try_vertical(
        &self,
        len: usize,
        occupied: &HashSet<GridPosition>,
        rng: &mut impl Rng,
    ) -> Option<Vec<GridPosition>> {
        let max_start = self.rows.checked_sub(len)?;
        let col = rng.gen_range(0..self.cols);
        let start = rng.gen_range(0..=max_start);
        let positions: Vec<GridPosition> = (start..start + len)
            .map(|row| GridPosition::new(row, col))
            .collect();
        is_free(&positions, occupied).then_some(positions)
    }
}

fn is_free(positions: &[GridPosition], occupied: &HashSet<GridPosition>) -> bool {
    !positions.iter().any(|p| occupied.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const POOL: &[&str] = &[
        "WISDOM", "FRIEND", "NATURE", "WONDER", "BEAUTY", "GALAXY", "FUTURE", "PLANET", "ENERGY",
        "DRAGON", "KNIGHT", "CASTLE", "MASTER", "LEGEND", "SPIRIT", "BRIDGE", "CHANCE", "SHADOW",
    ];

    fn is_straight_line(positions: &[GridPosition]) -> bool {
        let horizontal = positions
            .windows(2)
            .all(|w| w[1].row == w[0].row && w[1].col == w[0].col + 1);
        let vertical = positions
            .windows(2)
            .all(|w| w[1].col == w[0].col && w[1].row == w[0].row + 1);
        horizontal || vertical
    }

    #[test]
    fn placed_words_never_share_a_cell() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let placements = WordPlacer::new().place(POOL, &mut rng);
            let total: usize = placements.iter().map(|wp| wp.positions.len()).sum();
            assert_eq!(placements.occupied().len(), total, "seed {seed}");
        }
    }

    #[test]
    fn every_word_is_a_straight_run_inside_the_grid() {
        let mut rng = StdRng::seed_from_u64(42);
        let placements = WordPlacer::new().place(POOL, &mut rng);
        assert_eq!(placements.len(), POOL.len());
        for wp in placements.iter() {
            assert_eq!(wp.positions.len(), wp.word.chars().count());
            assert!(wp.positions.iter().all(GridPosition::is_valid));
            assert!(is_straight_line(&wp.positions), "{}", wp.word);
        }
    }

    #[test]
    fn password_is_placed_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let placements = WordPlacer::new().place(&["CAT", "DOG", "SUN"], &mut rng);
        assert_eq!(placements.iter().next().map(|wp| wp.word.as_str()), Some("CAT"));
    }

    #[test]
    fn long_words_fall_back_to_horizontal_only() {
        let word = "A".repeat(GRID_ROWS + 5);
        let mut rng = StdRng::seed_from_u64(9);
        let placements = WordPlacer::new().place(&[word.as_str()], &mut rng);
        let positions = placements.get(&word).unwrap();
        assert!(positions.iter().all(|p| p.row == positions[0].row));
    }

    #[test]
    fn word_wider_than_grid_is_skipped() {
        let word = "A".repeat(GRID_COLS + 1);
        let mut rng = StdRng::seed_from_u64(9);
        let placements = WordPlacer::new().place(&[word.as_str(), "CAT"], &mut rng);
        assert!(!placements.contains(&word));
        assert!(placements.contains("CAT"));
    }

    #[test]
    fn exhausted_word_is_skipped_without_disturbing_others() {
        // One row of grid: a 40-letter word fills it, nothing else fits horizontally.
        let placer = WordPlacer {
            rows: 1,
            cols: GRID_COLS,
            max_attempts: 10,
        };
        let full = "B".repeat(GRID_COLS);
        let mut rng = StdRng::seed_from_u64(5);
        let placements = placer.place(&[full.as_str(), "CAT"], &mut rng);
        assert_eq!(placements.len(), 1);
        assert_eq!(placements.get(&full).map(|p| p.len()), Some(GRID_COLS));
    }
}
