use std::fmt;

/// Failures that prevent a round from starting.
///
/// Wrong guesses and exhausted attempts are not errors; they are reported
/// through [`crate::core::engine::SubmitOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    /// Level ids start at 1 and words need at least one letter.
    InvalidLevel { id: u32 },
    /// Two catalog entries share an id, so lookups would be ambiguous.
    DuplicateLevel { id: u32 },
    EmptyPool { level_id: u32 },
    WordLengthMismatch { word: String, expected: usize },
    /// Words may only contain letters so they never blend into the noise fill.
    NonAlphabeticWord { word: String },
    DuplicateWord { word: String },
    PoolTooSmall { available: usize, required: usize },
    /// A word longer than both grid dimensions can never be placed.
    WordTooLong { word: String, max: usize },
    /// A hand-built placement that does not match its word or leaves the grid.
    InvalidPlacement { word: String },
    /// The password used up its placement retries; the grid would be unplayable.
    PasswordNotPlaced { password: String },
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundError::InvalidLevel { id } => write!(f, "invalid level id {id}"),
            RoundError::DuplicateLevel { id } => {
                write!(f, "level id {id} appears more than once in the catalog")
            }
            RoundError::EmptyPool { level_id } => {
                write!(f, "level {level_id} has an empty word pool")
            }
            RoundError::WordLengthMismatch { word, expected } => write!(
                f,
                "word '{word}' has {} characters, level expects {expected}",
                word.chars().count()
            ),
            RoundError::NonAlphabeticWord { word } => {
                write!(f, "word '{word}' contains non-alphabetic characters")
            }
            RoundError::DuplicateWord { word } => {
                write!(f, "word '{word}' appears more than once in the pool")
            }
            RoundError::PoolTooSmall {
                available,
                required,
            } => write!(
                f,
                "word pool has {available} words, round needs {required}"
            ),
            RoundError::WordTooLong { word, max } => {
                write!(f, "word '{word}' is longer than the grid ({max} cells)")
            }
            RoundError::InvalidPlacement { word } => {
                write!(f, "placement for '{word}' does not fit the grid")
            }
            RoundError::PasswordNotPlaced { password } => {
                write!(f, "password '{password}' could not be placed on the grid")
            }
        }
    }
}

impl std::error::Error for RoundError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mismatch_reports_actual_length() {
        let err = RoundError::WordLengthMismatch {
            word: "JOURNEY".into(),
            expected: 6,
        };
        assert_eq!(
            err.to_string(),
            "word 'JOURNEY' has 7 characters, level expects 6"
        );
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = RoundError::PasswordNotPlaced {
            password: "CAT".into(),
        }
        .into();
        assert!(err.to_string().contains("CAT"));
    }
}
