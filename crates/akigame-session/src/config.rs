//! Tunables for a guessing session.
//!
//! The three waits (question answer, guess confirmation, setup prompts) have
//! independent budgets and are never merged into one value.

use std::time::Duration;

/// Per-question answer wait in the default (long) mode.
pub const DEFAULT_ANSWER_TIMEOUT: Duration = Duration::from_secs(300);

/// Per-question answer wait in quick mode.
pub const QUICK_ANSWER_TIMEOUT: Duration = Duration::from_secs(60);

/// Wait for the yes/no reply after the guess is shown.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Wait for the language and readiness prompts.
pub const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Progression at which the oracle is asked for its guess.
pub const DEFAULT_PROGRESSION_THRESHOLD: f64 = 80.0;

/// Maximum number of forward answers before guessing regardless.
pub const DEFAULT_MAX_QUESTIONS: u32 = 79;

/// Consecutive malformed oracle replies tolerated before giving up.
pub const DEFAULT_MAX_MALFORMED_RETRIES: u32 = 3;

/// Language used when the player declines to pick one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// How long to wait for an answer to each question.
    pub answer_timeout: Duration,
    /// How long to wait for the player to confirm the guess.
    pub confirm_timeout: Duration,
    /// How long to wait for the language and readiness prompts.
    pub prompt_timeout: Duration,
    /// Stop asking once progression reaches this value.
    pub progression_threshold: f64,
    /// Stop asking after this many net forward answers.
    pub max_questions: u32,
    /// Malformed replies in a row that are retried before the game aborts.
    pub max_malformed_retries: u32,
    /// Language picked when the player answers "no" to the language prompt.
    pub default_language: String,
    /// Ask "are you ready?" before starting.
    pub ask_ready: bool,
}

impl SessionConfig {
    /// Configuration with the short per-question wait.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            answer_timeout: QUICK_ANSWER_TIMEOUT,
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            answer_timeout: DEFAULT_ANSWER_TIMEOUT,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            prompt_timeout: DEFAULT_PROMPT_TIMEOUT,
            progression_threshold: DEFAULT_PROGRESSION_THRESHOLD,
            max_questions: DEFAULT_MAX_QUESTIONS,
            max_malformed_retries: DEFAULT_MAX_MALFORMED_RETRIES,
            default_language: DEFAULT_LANGUAGE.to_owned(),
            ask_ready: false,
        }
    }
}
