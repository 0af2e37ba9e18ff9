//! hiddenword: the engine behind a hidden-word grid puzzle.
//!
//! A password and a handful of distractor words are dropped onto a 20×40
//! grid of symbol noise. The player picks cells one by one and submits; the
//! engine checks the spelled word against the password, marks which picks
//! were on the password, and counts down ten attempts.
//!
//! ```
//! use hiddenword::core::engine::{GameState, PuzzleEngine, SubmitOutcome};
//! use hiddenword::levels::LevelCatalog;
//! use hiddenword::progress::Progress;
//!
//! let catalog = LevelCatalog::default();
//! let mut engine = PuzzleEngine::from_source(&catalog, 1, Progress::default()).unwrap();
//! engine.start().unwrap();
//! assert_eq!(engine.state(), GameState::Playing);
//!
//! let answer = engine.grid().password_positions().to_vec();
//! for pos in answer {
//!     engine.select_cell(pos);
//! }
//! assert!(matches!(engine.submit(), SubmitOutcome::Success { attempts_used: 1 }));
//! assert_eq!(engine.progression().coins, 100);
//! ```

pub mod core;
pub mod helper;
pub mod levels;
pub mod progress;
