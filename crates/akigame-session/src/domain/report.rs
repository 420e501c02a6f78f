//! Summary of a finished game.

use akigame_core::event::{GameEvent, GameOutcome};
use akigame_core::oracle::Guess;
use akigame_core::transport::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::registry::SessionHandle;

/// What a game produced, returned once it concludes.
#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    /// Session identifier.
    pub session_id: Uuid,
    /// Player.
    pub user_id: UserId,
    /// How the game ended.
    pub outcome: GameOutcome,
    /// Net forward answers given.
    pub questions_asked: u32,
    /// The oracle's guess, if it got that far.
    pub guess: Option<Guess>,
    /// Ordered transcript of the game.
    pub transcript: Vec<GameEvent>,
    /// When the game was started.
    pub started_at: DateTime<Utc>,
    /// When it concluded.
    pub finished_at: DateTime<Utc>,
}

impl GameReport {
    /// Report for a session that ended before the oracle was consulted.
    #[must_use]
    pub fn unplayed(
        handle: &SessionHandle,
        outcome: GameOutcome,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: handle.session_id,
            user_id: handle.user_id,
            outcome,
            questions_asked: 0,
            guess: None,
            transcript: Vec::new(),
            started_at: handle.started_at,
            finished_at,
        }
    }

    /// Number of transcript entries of the given type.
    #[must_use]
    pub fn count_events(&self, event_type: &str) -> usize {
        self.transcript
            .iter()
            .filter(|e| e.metadata.event_type == event_type)
            .count()
    }
}
