use anyhow::{bail, Context, Result};
use log::debug;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use hiddenword::core::engine::{GameState, PuzzleEngine, SubmitOutcome, MAX_ATTEMPTS};
use hiddenword::core::grid::{Correctness, GridPosition, GRID_COLS, GRID_ROWS};
use hiddenword::helper::HelperTrigger;
use hiddenword::levels::LevelCatalog;
use hiddenword::progress::Progress;

// ── Args ──────────────────────────────────────────────────────────────────────

struct Args {
    level: u32,
    levels_file: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        level: 1,
        levels_file: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--level" => {
                let value = it.next().context("--level needs a number")?;
                args.level = value
                    .parse()
                    .with_context(|| format!("bad level '{value}'"))?;
            }
            "--levels" => {
                let value = it.next().context("--levels needs a path")?;
                args.levels_file = Some(PathBuf::from(value));
            }
            other => bail!("unknown argument '{other}'"),
        }
    }
    Ok(args)
}

// ── Drawing ───────────────────────────────────────────────────────────────────

fn draw(engine: &PuzzleEngine<Progress>, out: &mut impl Write) -> io::Result<()> {
    let grid = engine.grid();
    write!(out, "    ")?;
    for col in 0..GRID_COLS {
        write!(out, "{}", col % 10)?;
    }
    writeln!(out)?;
    for row in 0..GRID_ROWS {
        write!(out, "{row:>3} ")?;
        for col in 0..GRID_COLS {
            let Some(cell) = grid.cell(GridPosition::new(row, col)) else {
                continue;
            };
            let shown = if cell.is_selected() {
                '#'
            } else if cell.is_disabled() {
                ' '
            } else if cell.correctness() == Correctness::Correct {
                cell.character().to_ascii_lowercase()
            } else {
                cell.character()
            };
            write!(out, "{shown}")?;
        }
        writeln!(out)?;
    }
    let boxes = "■ ".repeat(engine.attempts_remaining() as usize)
        + &"□ ".repeat((MAX_ATTEMPTS - engine.attempts_remaining()) as usize);
    writeln!(
        out,
        "{} ATTEMPT(S) LEFT: {}  SELECTED {}/{}{}",
        engine.attempts_remaining(),
        boxes.trim(),
        engine.selected_sequence().len(),
        engine.grid().password_len(),
        if engine.is_submit_enabled() { "  [submit ready]" } else { "" }
    )
}

fn say(trigger: HelperTrigger) {
    println!(">{}", trigger.random_message(&mut rand::thread_rng()));
}

/// Prints whatever the engine last asked the helper to say.
fn announce(engine: &mut PuzzleEngine<Progress>) {
    if let Some(trigger) = engine.progression_mut().last_helper.take() {
        say(trigger);
    }
}

// ── Round loop ────────────────────────────────────────────────────────────────

fn run(engine: &mut PuzzleEngine<Progress>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    announce(engine);
    draw(engine, &mut stdout)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        debug!("command {words:?}");
        match words.as_slice() {
            ["s", row, col] => {
                let (Ok(row), Ok(col)) = (row.parse::<usize>(), col.parse::<usize>()) else {
                    println!(">Usage: s ROW COL");
                    continue;
                };
                engine.select_cell(GridPosition::new(row, col));
            }
            ["submit"] => match engine.submit() {
                SubmitOutcome::NoEffect => {
                    println!(">Select exactly {} cells.", engine.grid().password_len())
                }
                SubmitOutcome::Success { attempts_used } => {
                    println!(">Exact match! ({attempts_used} attempt(s))");
                }
                SubmitOutcome::Rejected { evaluation, .. } => {
                    println!(
                        ">Entry denied. {}/{} on the password.",
                        evaluation.correct_positions.len(),
                        engine.grid().password_len()
                    );
                }
                SubmitOutcome::LockedOut { .. } => {
                    println!(">LOCKED OUT. The word was {}.", engine.grid().password());
                }
            },
            ["pause"] => {
                engine.pause();
            }
            ["resume"] => {
                engine.resume();
            }
            ["reset"] => engine.reset()?,
            ["q"] | ["quit"] => break,
            _ => println!(">Commands: s ROW COL | submit | pause | resume | reset | q"),
        }
        announce(engine);

        if engine.state() == GameState::Paused {
            println!(">PAUSED. Type 'resume' to continue.");
            continue;
        }
        draw(engine, &mut stdout)?;
        if engine.state().is_terminal() {
            println!(">Type 'reset' to play again or 'q' to quit.");
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let catalog = match &args.levels_file {
        Some(path) => LevelCatalog::load_or_default(path),
        None => LevelCatalog::default(),
    };

    let mut engine = PuzzleEngine::from_source(&catalog, args.level, Progress::default())
        .with_context(|| format!("setting up level {}", args.level))?;
    let pending = engine.start_in_background();
    if !pending.is_finished() {
        println!(">Building grid...");
    }
    engine.finish(pending).context("generating grid")?;
    if engine.progression().levels_completed() == 0 {
        say(HelperTrigger::FirstStart);
    }
    println!(">{}", engine.level().display_name());

    run(&mut engine)?;

    let progress = engine.into_progression();
    println!(
        ">Coins: {}  Wins: {}  Losses: {}  Unlocked up to level {}",
        progress.coins,
        progress.wins,
        progress.losses,
        progress.max_unlocked_level()
    );
    Ok(())
}
