use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::thread::{self, JoinHandle};

use crate::core::error::RoundError;
use crate::core::grid::{Correctness, Grid, GridPosition};
use crate::core::placer::WordPlacer;
use crate::helper::HelperTrigger;
use crate::levels::{LevelConfig, LevelSource};
use crate::progress::Progression;

pub const MAX_ATTEMPTS: u32 = 10;

// ── Game state ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    #[default]
    Idle,
    Playing,
    Paused,
    Evaluating,
    Won,
    Lost,
}

impl GameState {
    pub fn is_game_active(self) -> bool {
        matches!(self, GameState::Playing | GameState::Paused)
    }

    pub fn can_interact_with_grid(self) -> bool {
        self == GameState::Playing
    }

    pub fn shows_overlay(self) -> bool {
        matches!(self, GameState::Paused | GameState::Won | GameState::Lost)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::Won | GameState::Lost)
    }
}

// ── Submission results ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub is_correct: bool,
    /// Selected cells that belong to the password, in selection order.
    pub correct_positions: Vec<GridPosition>,
    pub incorrect_positions: Vec<GridPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Wrong state or selection length; nothing changed.
    NoEffect,
    Success {
        attempts_used: u32,
    },
    Rejected {
        evaluation: Evaluation,
        attempts_left: u32,
    },
    LockedOut {
        evaluation: Evaluation,
    },
}

// ── Grid generation ───────────────────────────────────────────────────────────

/// Draws the round's words, places them and fills the noise.
///
/// The password failing to place is fatal; distractors that don't fit are dropped.
pub fn generate_grid(
    level: &LevelConfig,
    placer: &WordPlacer,
    rng: &mut impl Rng,
) -> Result<Grid, RoundError> {
    let words = level.draw_words(rng)?;
    let order = words.placement_order();
    let placements = placer.place(order.as_slice(), rng);
    if placements.len() < order.len() {
        debug!(
            "level {}: placed {} of {} words",
            level.id,
            placements.len(),
            order.len()
        );
    }
    Grid::from_placements(&words.password, placements, rng).map_err(|e| {
        warn!("level {}: round setup failed: {e}", level.id);
        e
    })
}

/// Grid generation running off the caller's thread.
#[derive(Debug)]
pub struct PendingRound {
    handle: JoinHandle<Result<Grid, RoundError>>,
}

impl PendingRound {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// One level's round: the grid, the player's selection and the attempt budget.
///
/// Selection and submission are only honoured while `Playing`. Calls made in
/// any other state, on cells outside the grid, or on disabled cells are
/// ignored.
#[derive(Debug)]
pub struct PuzzleEngine<P: Progression> {
    level: LevelConfig,
    progression: P,
    placer: WordPlacer,
    grid: Grid,
    selected: Vec<GridPosition>,
    attempts_remaining: u32,
    state: GameState,
    submit_enabled: bool,
}

impl<P: Progression> PuzzleEngine<P> {
    /// Rejects a bad level up front so no round ever starts from it.
    pub fn new(level: LevelConfig, progression: P) -> Result<Self, RoundError> {
        level.validate()?;
        Ok(Self {
            level,
            progression,
            placer: WordPlacer::new(),
            grid: Grid::blank(),
            selected: Vec::new(),
            attempts_remaining: MAX_ATTEMPTS,
            state: GameState::Idle,
            submit_enabled: false,
        })
    }

    pub fn from_source(
        source: &impl LevelSource,
        level_id: u32,
        progression: P,
    ) -> Result<Self, RoundError> {
        let level = source
            .level(level_id)
            .ok_or(RoundError::InvalidLevel { id: level_id })?
            .clone();
        Self::new(level, progression)
    }

    pub fn with_placer(mut self, placer: WordPlacer) -> Self {
        self.placer = placer;
        self
    }

    // ── Round lifecycle ───────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<(), RoundError> {
        self.start_with_rng(&mut rand::thread_rng())
    }

    pub fn start_with_rng(&mut self, rng: &mut impl Rng) -> Result<(), RoundError> {
        if self.state != GameState::Idle {
            debug!("start ignored in state {:?}", self.state);
            return Ok(());
        }
        let grid = generate_grid(&self.level, &self.placer, rng)?;
        self.install(grid);
        Ok(())
    }

    /// Starts generating on a worker thread. The engine stays `Idle` until
    /// [`PuzzleEngine::finish`] hands it the completed grid.
    pub fn start_in_background(&self) -> PendingRound {
        let level = self.level.clone();
        let placer = self.placer;
        let handle = thread::spawn(move || {
            let mut rng = StdRng::from_entropy();
            generate_grid(&level, &placer, &mut rng)
        });
        PendingRound { handle }
    }

    /// Waits for background generation and begins play with its grid.
    pub fn finish(&mut self, pending: PendingRound) -> Result<(), RoundError> {
        let grid = match pending.handle.join() {
            Ok(result) => result?,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        if self.state != GameState::Idle {
            debug!("finished grid discarded in state {:?}", self.state);
            return Ok(());
        }
        self.install(grid);
        Ok(())
    }

    /// Begins play on a grid built elsewhere, e.g. a fixed layout.
    pub fn start_with_grid(&mut self, grid: Grid) -> Result<(), RoundError> {
        if grid.password_positions().is_empty() {
            return Err(RoundError::PasswordNotPlaced {
                password: grid.password().to_string(),
            });
        }
        if self.state != GameState::Idle {
            debug!("start ignored in state {:?}", self.state);
            return Ok(());
        }
        self.install(grid);
        Ok(())
    }

    /// Throws the round away and starts a fresh one with a new grid.
    pub fn reset(&mut self) -> Result<(), RoundError> {
        self.reset_with_rng(&mut rand::thread_rng())
    }

    pub fn reset_with_rng(&mut self, rng: &mut impl Rng) -> Result<(), RoundError> {
        self.clear_round();
        self.start_with_rng(rng)
    }

    fn clear_round(&mut self) {
        self.grid = Grid::blank();
        self.selected.clear();
        self.attempts_remaining = MAX_ATTEMPTS;
        self.state = GameState::Idle;
        self.submit_enabled = false;
    }

    fn install(&mut self, grid: Grid) {
        self.grid = grid;
        self.selected.clear();
        self.attempts_remaining = MAX_ATTEMPTS;
        self.state = GameState::Playing;
        self.update_submit_enabled();
        info!(
            "level {} started: {} words on the grid",
            self.level.id,
            self.grid.placements().len()
        );
        self.progression.on_helper(HelperTrigger::LevelStart);
    }

    pub fn pause(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        self.state = GameState::Paused;
        self.update_submit_enabled();
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        self.state = GameState::Playing;
        self.update_submit_enabled();
        true
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    /// Toggles a cell in or out of the selection. Returns whether anything changed.
    pub fn select_cell(&mut self, pos: GridPosition) -> bool {
        if !self.state.can_interact_with_grid() {
            return false;
        }
        let Some(cell) = self.grid.cell_mut(pos) else {
            return false;
        };
        if cell.disabled {
            return false;
        }
        if cell.selected {
            cell.selected = false;
            self.selected.retain(|p| *p != pos);
        } else {
            cell.selected = true;
            self.selected.push(pos);
        }
        self.update_submit_enabled();
        true
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        if self.state != GameState::Playing || self.selected.len() != self.grid.password_len() {
            return SubmitOutcome::NoEffect;
        }
        self.state = GameState::Evaluating;
        let evaluation = self.evaluate_selection(&self.selected);

        let outcome = if evaluation.is_correct {
            let attempts_used = self.attempts_used() + 1;
            self.state = GameState::Won;
            info!(
                "level {} solved with {attempts_used} attempt(s)",
                self.level.id
            );
            self.progression.on_level_won(self.level.id, attempts_used);
            self.progression.on_helper(HelperTrigger::Victory);
            SubmitOutcome::Success { attempts_used }
        } else {
            self.mark_correct(&evaluation.correct_positions);
            self.lock_incorrect(&evaluation.incorrect_positions);
            self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
            debug!(
                "rejected: {}/{} in place, {} attempt(s) left",
                evaluation.correct_positions.len(),
                self.grid.password_len(),
                self.attempts_remaining
            );
            if self.attempts_remaining == 0 {
                self.state = GameState::Lost;
                info!("level {} lost", self.level.id);
                self.progression.on_level_lost(self.level.id);
                self.progression.on_helper(HelperTrigger::Defeat);
                SubmitOutcome::LockedOut { evaluation }
            } else {
                self.state = GameState::Playing;
                self.progression.on_helper(HelperTrigger::SubmitFail);
                SubmitOutcome::Rejected {
                    evaluation,
                    attempts_left: self.attempts_remaining,
                }
            }
        };

        self.clear_selection();
        outcome
    }

    /// Compares `selected` with the password and splits it by membership in
    /// the password's placement. Does not touch the round.
    pub fn evaluate_selection(&self, selected: &[GridPosition]) -> Evaluation {
        let guess: String = selected
            .iter()
            .filter_map(|pos| self.grid.cell(*pos))
            .map(|cell| cell.character())
            .collect();
        let password = self.grid.password();
        let is_correct = !password.is_empty() && guess == password;

        let key: HashSet<GridPosition> = self.grid.password_positions().iter().copied().collect();
        let (correct_positions, incorrect_positions) =
            selected.iter().copied().partition(|pos| key.contains(pos));

        Evaluation {
            is_correct,
            correct_positions,
            incorrect_positions,
        }
    }

    fn mark_correct(&mut self, positions: &[GridPosition]) {
        for pos in positions {
            if let Some(cell) = self.grid.cell_mut(*pos) {
                cell.correctness = Correctness::Correct;
                cell.selected = false;
            }
        }
    }

    fn lock_incorrect(&mut self, positions: &[GridPosition]) {
        for pos in positions {
            if let Some(cell) = self.grid.cell_mut(*pos) {
                cell.correctness = Correctness::Incorrect;
                cell.disabled = true;
                cell.selected = false;
            }
        }
    }

    fn clear_selection(&mut self) {
        self.selected.clear();
        for cell in self.grid.cells_mut() {
            if cell.selected && !cell.is_locked() {
                cell.selected = false;
            }
        }
        self.update_submit_enabled();
    }

    fn update_submit_enabled(&mut self) {
        self.submit_enabled =
            self.state == GameState::Playing && self.selected.len() == self.grid.password_len();
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn attempts_used(&self) -> u32 {
        MAX_ATTEMPTS - self.attempts_remaining
    }

    pub fn selected_sequence(&self) -> &[GridPosition] {
        &self.selected
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn progression(&self) -> &P {
        &self.progression
    }

    pub fn progression_mut(&mut self) -> &mut P {
        &mut self.progression
    }

    pub fn into_progression(self) -> P {
        self.progression
    }
}
