//! Session transcript events.
//!
//! Every game records what happened, in order, so the final report (and the
//! logs) can show how the oracle got to its guess.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answer::Answer;
use crate::oracle::Guess;

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    /// The player confirmed the guess.
    Won,
    /// The player rejected the guess.
    Lost,
    /// The guess was shown but the player never confirmed or rejected it.
    Undetermined,
    /// The player stopped answering questions.
    NoAnswer,
    /// The player cancelled the game.
    Cancelled,
    /// The player declined to start.
    Declined,
}

/// Metadata attached to every transcript event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name, e.g. `game.question_answered`.
    pub event_type: String,
    /// Session this event belongs to.
    pub session_id: Uuid,
    /// Position within the session transcript, starting at 1.
    pub sequence_number: i64,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
}

/// Event type identifier for [`GameEventKind::GameStarted`].
pub const GAME_STARTED_EVENT_TYPE: &str = "game.started";
/// Event type identifier for [`GameEventKind::QuestionAnswered`].
pub const QUESTION_ANSWERED_EVENT_TYPE: &str = "game.question_answered";
/// Event type identifier for [`GameEventKind::WentBack`].
pub const WENT_BACK_EVENT_TYPE: &str = "game.went_back";
/// Event type identifier for [`GameEventKind::BackRejected`].
pub const BACK_REJECTED_EVENT_TYPE: &str = "game.back_rejected";
/// Event type identifier for [`GameEventKind::MalformedRetried`].
pub const MALFORMED_RETRIED_EVENT_TYPE: &str = "game.malformed_retried";
/// Event type identifier for [`GameEventKind::GuessCommitted`].
pub const GUESS_COMMITTED_EVENT_TYPE: &str = "game.guess_committed";
/// Event type identifier for [`GameEventKind::GameConcluded`].
pub const GAME_CONCLUDED_EVENT_TYPE: &str = "game.concluded";

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEventKind {
    /// The oracle accepted a new game.
    GameStarted {
        /// Language code the game runs in.
        language: String,
        /// Whether child mode was requested.
        child_mode: bool,
    },
    /// A forward answer was accepted.
    QuestionAnswered {
        /// Number of the question that was answered.
        question_number: u32,
        /// The answer given.
        answer: Answer,
        /// Progression reported afterwards.
        progression: f64,
    },
    /// The oracle reverted one step.
    WentBack {
        /// Number of the question now displayed.
        question_number: u32,
    },
    /// A `back` on the first question was refused.
    BackRejected {
        /// Number of the question still displayed.
        question_number: u32,
    },
    /// The oracle returned unparseable data; the question is asked again.
    MalformedRetried {
        /// Number of the question being retried.
        question_number: u32,
        /// Consecutive malformed replies so far.
        attempt: u32,
    },
    /// The oracle committed to a guess.
    GuessCommitted {
        /// The guess.
        guess: Guess,
    },
    /// The game is over.
    GameConcluded {
        /// How it ended.
        outcome: GameOutcome,
    },
}

impl GameEventKind {
    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::GameStarted { .. } => GAME_STARTED_EVENT_TYPE,
            Self::QuestionAnswered { .. } => QUESTION_ANSWERED_EVENT_TYPE,
            Self::WentBack { .. } => WENT_BACK_EVENT_TYPE,
            Self::BackRejected { .. } => BACK_REJECTED_EVENT_TYPE,
            Self::MalformedRetried { .. } => MALFORMED_RETRIED_EVENT_TYPE,
            Self::GuessCommitted { .. } => GUESS_COMMITTED_EVENT_TYPE,
            Self::GameConcluded { .. } => GAME_CONCLUDED_EVENT_TYPE,
        }
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: GameEventKind,
}

impl GameEvent {
    /// Serializes the event payload to JSON.
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }
}
