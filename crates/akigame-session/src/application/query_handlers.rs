//! Query handlers for running games.

use akigame_core::error::GameError;
use akigame_core::transport::{ChannelId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::state::{OracleState, WaitKind};
use crate::registry::SessionRegistry;

/// Read-only view of a running game.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// The player.
    pub user_id: UserId,
    /// Where the game runs.
    pub channel_id: ChannelId,
    /// When the game was started.
    pub started_at: DateTime<Utc>,
    /// Lifecycle state.
    pub state: OracleState,
    /// Number of the question currently displayed.
    pub question_count: u32,
    /// Latest progression reported by the oracle.
    pub progression: f64,
    /// The outstanding wait, if any.
    pub waiting: Option<WaitKind>,
    /// Whether a cancellation was requested.
    pub cancelled: bool,
}

/// Retrieves the running game of `user_id`.
///
/// # Errors
///
/// Returns `GameError::NotPlaying` if the user has no game running.
pub fn get_session_status(
    user_id: UserId,
    registry: &SessionRegistry,
) -> Result<SessionView, GameError> {
    let handle = registry.get(user_id).ok_or(GameError::NotPlaying(user_id))?;
    let status = handle.status();
    Ok(SessionView {
        session_id: handle.session_id,
        user_id: handle.user_id,
        channel_id: handle.channel_id,
        started_at: handle.started_at,
        state: status.state,
        question_count: status.question_count,
        progression: status.progression,
        waiting: status.waiting,
        cancelled: handle.is_cancelled(),
    })
}
