//! akigame bot error types and user-facing error replies.

use akigame_core::error::{GameError, OracleError, TransportError};
use thiserror::Error;

/// Startup and runtime errors for the bot process.
#[derive(Debug, Error)]
pub enum AppError {
    /// A configuration variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The oracle HTTP client could not be built.
    #[error("oracle client error: {0}")]
    OracleClient(#[from] reqwest::Error),

    /// The chat transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Console I/O error.
    #[error("console error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reply to `cancel` when the user has no game.
pub const NOT_RUNNING_ANY_GAME: &str = "You're not running any game!";

/// Reply to `start` when the user already has a game.
pub const ALREADY_RUNNING: &str = "You're already running a game! Cancel it first if you want \
to start over.";

/// Reply when the language prompt went unanswered.
pub const NO_RESPONSE: &str = "You didn't answer in time... \u{1F614}";

/// Reply for an unknown language.
pub const INVALID_LANGUAGE: &str = "Invalid language! Be sure it's written correctly.";

/// Reply when the oracle cannot be reached.
pub const SERVICE_UNAVAILABLE: &str = "Akinator is unreachable right now. Please try again later.";

/// Reply for any other failure that ended the game.
pub const GAME_ABORTED: &str = "An unexpected error happened. This is the end of the game.";

/// Maps a game error to the message shown to the player.
#[must_use]
pub fn reply_for(err: &GameError) -> &'static str {
    match err {
        GameError::InvalidLanguage(_) => INVALID_LANGUAGE,
        GameError::AlreadyPlaying(_) => ALREADY_RUNNING,
        GameError::NotPlaying(_) => NOT_RUNNING_ANY_GAME,
        GameError::NoResponse(_) => NO_RESPONSE,
        GameError::Oracle(OracleError::ServiceUnavailable(_)) => SERVICE_UNAVAILABLE,
        GameError::Oracle(OracleError::InvalidLanguage(_)) => INVALID_LANGUAGE,
        GameError::Oracle(_) | GameError::Transport(_) => GAME_ABORTED,
    }
}
