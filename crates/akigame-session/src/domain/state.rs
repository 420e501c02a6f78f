//! Session lifecycle states and the live status snapshot.

use serde::Serialize;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleState {
    /// The oracle game has not been opened yet.
    NotStarted,
    /// A question is on screen and an answer is expected.
    AwaitingAnswer,
    /// The oracle is committing to a guess and awaiting confirmation.
    Guessing,
    /// The game is over.
    Concluded,
}

/// Which kind of reply a session is currently waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitKind {
    /// Language or readiness prompt.
    Prompt,
    /// Answer to a question.
    Answer,
    /// Yes/no on the final guess.
    Confirmation,
}

/// Point-in-time view of a running session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    /// Lifecycle state.
    pub state: OracleState,
    /// Number of the question currently displayed, starting at 1.
    pub question_count: u32,
    /// Latest progression reported by the oracle.
    pub progression: f64,
    /// The outstanding wait, if any.
    pub waiting: Option<WaitKind>,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            state: OracleState::NotStarted,
            question_count: 1,
            progression: 0.0,
            waiting: None,
        }
    }
}
