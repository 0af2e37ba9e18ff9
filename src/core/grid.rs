use log::debug;
use rand::Rng;
use std::collections::HashSet;

use crate::core::error::RoundError;

pub const GRID_ROWS: usize = 20;
pub const GRID_COLS: usize = 40;
pub const GRID_CELLS: usize = GRID_ROWS * GRID_COLS;

/// Filler glyphs. Never alphabetic, so filler can't complete a word by accident.
pub const NOISE: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '_', '+', '[', ']', '{', '}', '|', ';', '\'',
    '"', ',', '.', '/', '<', '>', '?',
];

const BLANK: char = ' ';

// ── Positions ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

impl GridPosition {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Inverse of [`GridPosition::linear_index`].
    pub const fn from_index(index: usize) -> Self {
        Self {
            row: index / GRID_COLS,
            col: index % GRID_COLS,
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.row < GRID_ROWS && self.col < GRID_COLS
    }

    pub const fn linear_index(&self) -> usize {
        self.row * GRID_COLS + self.col
    }
}

// ── Cells ─────────────────────────────────────────────────────────────────────

/// Feedback left on a cell by an incorrect submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Correctness {
    #[default]
    Unevaluated,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    position: GridPosition,
    ch: char,
    in_word: bool,
    pub(crate) selected: bool,
    pub(crate) disabled: bool,
    pub(crate) correctness: Correctness,
}

impl GridCell {
    fn new(position: GridPosition, ch: char, in_word: bool) -> Self {
        Self {
            position,
            ch,
            in_word,
            selected: false,
            disabled: false,
            correctness: Correctness::Unevaluated,
        }
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn character(&self) -> char {
        self.ch
    }

    pub fn is_part_of_placed_word(&self) -> bool {
        self.in_word
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn correctness(&self) -> Correctness {
        self.correctness
    }

    /// Once a submission has marked a cell it keeps that mark for the round.
    pub fn is_locked(&self) -> bool {
        self.correctness != Correctness::Unevaluated
    }

    pub fn id(&self) -> String {
        format!("{}-{}", self.position.row, self.position.col)
    }

    pub fn accessibility_label(&self) -> String {
        format!(
            "Row {} Column {}: {}",
            self.position.row + 1,
            self.position.col + 1,
            self.ch
        )
    }
}

// ── Placements ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPlacement {
    pub word: String,
    /// One position per character, in character order.
    pub positions: Vec<GridPosition>,
}

/// Placed words in placement order. The password, when placed, comes first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placements {
    entries: Vec<WordPlacement>,
}

impl Placements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: impl Into<String>, positions: Vec<GridPosition>) {
        let word = word.into();
        self.entries.retain(|wp| wp.word != word);
        self.entries.push(WordPlacement { word, positions });
    }

    pub fn get(&self, word: &str) -> Option<&[GridPosition]> {
        self.entries
            .iter()
            .find(|wp| wp.word == word)
            .map(|wp| wp.positions.as_slice())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordPlacement> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn occupied(&self) -> HashSet<GridPosition> {
        self.entries
            .iter()
            .flat_map(|wp| wp.positions.iter().copied())
            .collect()
    }
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// A complete 20×40 board: placed words, noise fill and the answer key.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<GridCell>,
    password: String,
    placements: Placements,
}

impl Grid {
    /// The board shown before generation finishes: no words, no answer key.
    pub fn blank() -> Self {
        let cells = (0..GRID_CELLS)
            .map(|idx| GridCell::new(GridPosition::from_index(idx), BLANK, false))
            .collect();
        Self {
            cells,
            password: String::new(),
            placements: Placements::new(),
        }
    }

    /// Writes every placement onto the board and fills the rest with noise.
    ///
    /// Fails if the password has no placement, or if a placement does not
    /// line up with its word inside the grid.
    pub fn from_placements(
        password: &str,
        placements: Placements,
        rng: &mut impl Rng,
    ) -> Result<Self, RoundError> {
        if !placements.contains(password) {
            return Err(RoundError::PasswordNotPlaced {
                password: password.to_string(),
            });
        }

        let mut chars: Vec<Option<char>> = vec![None; GRID_CELLS];
        for wp in placements.iter() {
            let fits = wp.positions.len() == wp.word.chars().count()
                && wp.positions.iter().all(GridPosition::is_valid);
            if !fits {
                return Err(RoundError::InvalidPlacement {
                    word: wp.word.clone(),
                });
            }
            for (pos, ch) in wp.positions.iter().zip(wp.word.chars()) {
                chars[pos.linear_index()] = Some(ch);
            }
        }

        let cells: Vec<GridCell> = chars
            .into_iter()
            .enumerate()
            .map(|(idx, ch)| {
                let pos = GridPosition::from_index(idx);
                match ch {
                    Some(ch) => GridCell::new(pos, ch, true),
                    None => GridCell::new(pos, noise_char(&mut *rng), false),
                }
            })
            .collect();

        debug!(
            "grid filled: {} words over {} cells",
            placements.len(),
            cells.iter().filter(|c| c.in_word).count()
        );

        Ok(Self {
            cells,
            password: password.to_string(),
            placements,
        })
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, pos: GridPosition) -> Option<&GridCell> {
        if !pos.is_valid() {
            return None;
        }
        self.cells.get(pos.linear_index())
    }

    pub(crate) fn cell_mut(&mut self, pos: GridPosition) -> Option<&mut GridCell> {
        if !pos.is_valid() {
            return None;
        }
        self.cells.get_mut(pos.linear_index())
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut GridCell> {
        self.cells.iter_mut()
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn password_len(&self) -> usize {
        self.password.chars().count()
    }

    pub fn placements(&self) -> &Placements {
        &self.placements
    }

    /// The answer key: where the password's characters sit, in order.
    pub fn password_positions(&self) -> &[GridPosition] {
        self.placements.get(&self.password).unwrap_or(&[])
    }

    pub fn row_text(&self, row: usize) -> String {
        self.cells
            .iter()
            .skip(row * GRID_COLS)
            .take(GRID_COLS)
            .map(|c| c.ch)
            .collect()
    }
}

fn noise_char(rng: &mut impl Rng) -> char {
    NOISE[rng.gen_range(0..NOISE.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn horizontal(row: usize, col: usize, len: usize) -> Vec<GridPosition> {
        (0..len).map(|i| GridPosition::new(row, col + i)).collect()
    }

    #[test]
    fn linear_index_round_trips_over_whole_grid() {
        for idx in 0..GRID_CELLS {
            let pos = GridPosition::from_index(idx);
            assert!(pos.is_valid());
            assert_eq!(pos.linear_index(), idx);
        }
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                let pos = GridPosition::new(row, col);
                assert_eq!(GridPosition::from_index(pos.linear_index()), pos);
            }
        }
    }

    #[test]
    fn positions_outside_grid_are_invalid() {
        assert!(!GridPosition::new(GRID_ROWS, 0).is_valid());
        assert!(!GridPosition::new(0, GRID_COLS).is_valid());
        assert!(GridPosition::new(GRID_ROWS - 1, GRID_COLS - 1).is_valid());
    }

    #[test]
    fn fill_leaves_words_intact_and_uses_noise_elsewhere() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut placements = Placements::new();
        placements.insert("CAT", horizontal(0, 0, 3));
        placements.insert(
            "DOG",
            vec![
                GridPosition::new(5, 10),
                GridPosition::new(6, 10),
                GridPosition::new(7, 10),
            ],
        );
        let grid = Grid::from_placements("CAT", placements, &mut rng).unwrap();

        assert_eq!(grid.cells().len(), GRID_CELLS);
        assert_eq!(&grid.row_text(0)[..3], "CAT");
        assert_eq!(grid.cell(GridPosition::new(6, 10)).unwrap().character(), 'O');
        for cell in grid.cells() {
            if cell.is_part_of_placed_word() {
                assert!(cell.character().is_alphabetic());
            } else {
                assert!(NOISE.contains(&cell.character()));
            }
        }
        assert_eq!(grid.password_positions(), horizontal(0, 0, 3).as_slice());
    }

    #[test]
    fn missing_password_placement_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut placements = Placements::new();
        placements.insert("DOG", horizontal(3, 3, 3));
        let err = Grid::from_placements("CAT", placements, &mut rng).unwrap_err();
        assert_eq!(err, RoundError::PasswordNotPlaced { password: "CAT".into() });
    }

    #[test]
    fn placement_off_the_grid_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut placements = Placements::new();
        placements.insert("CAT", horizontal(0, GRID_COLS - 2, 3));
        assert!(matches!(
            Grid::from_placements("CAT", placements, &mut rng),
            Err(RoundError::InvalidPlacement { .. })
        ));
    }

    #[test]
    fn cell_labels_are_one_based() {
        let grid = Grid::blank();
        let cell = grid.cell(GridPosition::new(2, 7)).unwrap();
        assert_eq!(cell.id(), "2-7");
        assert_eq!(cell.accessibility_label(), "Row 3 Column 8:  ");
        assert!(!cell.is_locked());
    }
}
