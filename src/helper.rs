//! Helper character messages shown at key moments of a round.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HelperTrigger {
    FirstStart,
    LevelStart,
    SubmitFail,
    Victory,
    Defeat,
}

const FIRST_START: &[&str] = &[
    "Welcome to Find the Hidden Word! Tap cells to select letters and find the secret word.",
    "Your goal is to find the hidden word on this grid. Good luck!",
    "Look carefully - there's a secret word waiting to be discovered!",
];

const LEVEL_START: &[&str] = &[
    "A new challenge awaits! Find the hidden word in this grid.",
    "Ready for the next level? The word is hiding somewhere here.",
    "Time to put your word-finding skills to the test!",
];

const SUBMIT_FAIL: &[&str] = &[
    "Not quite right, but don't give up!",
    "Keep trying! The correct word is still out there.",
    "Almost there! Try a different combination.",
    "Don't worry, you'll find it soon!",
    "Every attempt gets you closer to the answer.",
];

const VICTORY: &[&str] = &[
    "Excellent work! You found the hidden word!",
    "Congratulations! Your word-finding skills are impressive!",
    "Amazing! You cracked the code!",
    "Well done! Ready for the next challenge?",
];

const DEFEAT: &[&str] = &[
    "Don't worry, you can try again!",
    "Every puzzle is a learning experience. Give it another shot!",
    "Sometimes the best strategy is to take a fresh approach.",
    "Ready to tackle this challenge again?",
];

impl HelperTrigger {
    pub fn category(self) -> &'static str {
        match self {
            HelperTrigger::FirstStart | HelperTrigger::LevelStart => "onboarding",
            HelperTrigger::SubmitFail => "encouragement",
            HelperTrigger::Victory => "victory",
            HelperTrigger::Defeat => "defeat",
        }
    }

    /// Higher wins when two messages compete for the helper.
    pub fn priority(self) -> u8 {
        match self {
            HelperTrigger::FirstStart => 5,
            HelperTrigger::Victory | HelperTrigger::Defeat => 4,
            HelperTrigger::LevelStart => 3,
            HelperTrigger::SubmitFail => 1,
        }
    }

    /// Submit-fail messages may be delayed or dropped if they come too often.
    pub fn shows_immediately(self) -> bool {
        !matches!(self, HelperTrigger::SubmitFail)
    }

    pub fn messages(self) -> &'static [&'static str] {
        match self {
            HelperTrigger::FirstStart => FIRST_START,
            HelperTrigger::LevelStart => LEVEL_START,
            HelperTrigger::SubmitFail => SUBMIT_FAIL,
            HelperTrigger::Victory => VICTORY,
            HelperTrigger::Defeat => DEFEAT,
        }
    }

    pub fn random_message(self, rng: &mut impl Rng) -> &'static str {
        let messages = self.messages();
        messages[rng.gen_range(0..messages.len())]
    }
}
