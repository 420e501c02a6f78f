//! Guessing oracle port.
//!
//! The oracle is a remote, stateful, strictly sequential service:
//! `start`, then any number of `answer`/`back` calls, then `commit_guess`.
//! One client instance drives exactly one game.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::answer::Answer;
use crate::error::OracleError;

/// A question asked by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Question text shown to the player.
    pub text: String,
    /// Zero-based step index reported by the oracle.
    pub step: u32,
    /// Confidence score in `[0, 100]` after the previous answer.
    pub progression: f64,
}

/// The oracle's best guess at the end of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    /// Name of the guessed character.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Picture URL.
    pub image_ref: String,
}

/// A client bound to a single remote guessing session.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Opens a new game and returns the first question.
    ///
    /// # Errors
    ///
    /// `InvalidLanguage` for an unknown language code, `ServiceUnavailable`
    /// on transport failure.
    async fn start(&mut self, language: &str, child_mode: bool) -> Result<Question, OracleError>;

    /// Answers the current question and returns the next one.
    ///
    /// # Errors
    ///
    /// `NoQuestionsLeft` once the oracle's question budget is spent,
    /// `MalformedResponse` when the reply cannot be parsed (the game state is
    /// unchanged and the same question may be answered again).
    async fn answer(&mut self, answer: Answer) -> Result<Question, OracleError>;

    /// Reverts the previous answer and returns the previous question.
    ///
    /// # Errors
    ///
    /// `CannotGoBackFurther` on the first question.
    async fn back(&mut self) -> Result<Question, OracleError>;

    /// Finalizes the game and returns the best guess. Call at most once.
    ///
    /// # Errors
    ///
    /// Any service failure.
    async fn commit_guess(&mut self) -> Result<Guess, OracleError>;

    /// Latest reported confidence score.
    fn progression(&self) -> f64;

    /// The guess retrieved by `commit_guess`, if any.
    fn first_guess(&self) -> Option<&Guess>;
}

/// Creates fresh oracle clients and validates languages up front.
pub trait OracleFactory: Send + Sync {
    /// Returns a new, unstarted client.
    fn create(&self) -> Box<dyn Oracle>;

    /// Whether `code` names a supported language/theme pair.
    fn validate_language(&self, code: &str) -> bool;
}
