//! The user command surface: `start [language]`, `cancel`, `status`, `help`.

use akigame_core::command::Command;
use akigame_core::error::{GameError, TransportError};
use akigame_core::transport::{Channel, User};
use akigame_session::application::command_handlers;
use akigame_session::application::query_handlers::{self, SessionView};
use akigame_session::domain::commands::{CancelGame, StartGame};
use akigame_session::domain::state::{OracleState, WaitKind};
use akigame_session::presenter;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::reply_for;
use crate::state::AppState;

/// Reply when a command is issued in a blocked channel.
pub const BLOCKED_CHANNEL: &str = "Akinator can't be played in this channel.";

/// Reply to a successful `cancel`.
pub const CANCEL_ACKNOWLEDGED: &str = "\u{2705}";

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Start a game, optionally in the given language.
    Start {
        /// Language code or name.
        language: Option<String>,
    },
    /// Cancel the caller's game.
    Cancel,
    /// Show the caller's game.
    Status,
    /// Show how to play.
    Help,
}

/// Parses `content` as a command introduced by `prefix`.
///
/// Returns `None` for messages that do not start with the prefix; those are
/// ordinary chat (and possibly answers to a running game). Unknown
/// subcommands fall back to `help`.
#[must_use]
pub fn parse_command(prefix: &str, content: &str) -> Option<BotCommand> {
    let mut words = content.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let command = match words.next().map(str::to_lowercase).as_deref() {
        Some("start" | "play") => BotCommand::Start {
            language: words.next().map(str::to_owned),
        },
        Some("cancel" | "stop") => BotCommand::Cancel,
        Some("status") => BotCommand::Status,
        _ => BotCommand::Help,
    };
    Some(command)
}

/// Usage text for the `help` command.
#[must_use]
pub fn usage(prefix: &str) -> String {
    format!(
        "Commands:\n\
- `{prefix} start [language]` to play against Akinator.\n\
- `{prefix} cancel` to cancel your game.\n\
- `{prefix} status` to see how your game is going.\n\n{notice}",
        notice = presenter::ANSWER_NOTICE,
    )
}

/// Renders a status reply.
#[must_use]
pub fn status_text(view: &SessionView) -> String {
    let state = match view.state {
        OracleState::NotStarted => "setting up",
        OracleState::AwaitingAnswer => "asking questions",
        OracleState::Guessing => "guessing",
        OracleState::Concluded => "finished",
    };
    let waiting = match view.waiting {
        Some(WaitKind::Prompt) => "waiting for your reply",
        Some(WaitKind::Answer) => "waiting for your answer",
        Some(WaitKind::Confirmation) => "waiting for you to confirm",
        None => "thinking",
    };
    format!(
        "Your game is {state}: question #{question}, progression {progression:.1}%, {waiting}.",
        question = view.question_count,
        progression = view.progression,
    )
}

/// Runs `command` for `author` in `channel`.
///
/// `start` spawns the game and returns its task; every other command is
/// answered before this returns.
///
/// # Errors
///
/// Returns the transport error if a reply cannot be sent.
#[instrument(skip(state, author), fields(user_id = %author.id, channel_id = %channel.id))]
pub async fn dispatch(
    state: &AppState,
    author: User,
    channel: Channel,
    command: BotCommand,
) -> Result<Option<JoinHandle<()>>, TransportError> {
    let transport = &state.services.transport;

    if state.is_blocked(channel.id) {
        info!("command refused in blocked channel");
        transport
            .send_message(channel.id, BLOCKED_CHANNEL.into())
            .await?;
        return Ok(None);
    }

    match command {
        BotCommand::Start { language } => {
            let command = StartGame {
                correlation_id: Uuid::new_v4(),
                user: author,
                channel,
                language,
            };
            info!(
                correlation_id = %command.correlation_id,
                command_type = command.command_type(),
                "handling command"
            );
            let state = state.clone();
            Ok(Some(tokio::spawn(async move { run_game(&state, &command).await })))
        }
        BotCommand::Cancel => {
            let command = CancelGame {
                correlation_id: Uuid::new_v4(),
                user_id: author.id,
            };
            info!(
                correlation_id = %command.correlation_id,
                command_type = command.command_type(),
                "handling command"
            );
            let reply = match command_handlers::handle_cancel_game(&command, &state.services.registry)
            {
                Ok(_) => CANCEL_ACKNOWLEDGED,
                Err(err) => reply_for(&err),
            };
            transport.send_message(channel.id, reply.into()).await?;
            Ok(None)
        }
        BotCommand::Status => {
            let reply = match query_handlers::get_session_status(author.id, &state.services.registry)
            {
                Ok(view) => status_text(&view),
                Err(err) => reply_for(&err).to_owned(),
            };
            transport.send_message(channel.id, reply.into()).await?;
            Ok(None)
        }
        BotCommand::Help => {
            transport
                .send_message(channel.id, usage(&state.config.command_prefix).into())
                .await?;
            Ok(None)
        }
    }
}

async fn run_game(state: &AppState, command: &StartGame) {
    match command_handlers::handle_start_game(command, &state.services).await {
        Ok(report) => {
            info!(
                session_id = %report.session_id,
                outcome = ?report.outcome,
                questions = report.questions_asked,
                "game finished"
            );
        }
        Err(err) => {
            match &err {
                GameError::Oracle(_) | GameError::Transport(_) => {
                    warn!(error = %err, "game aborted");
                }
                _ => info!(error = %err, "game not played"),
            }
            if let Err(send_err) = state
                .services
                .transport
                .send_message(command.channel.id, reply_for(&err).into())
                .await
            {
                warn!(error = %send_err, "failed to report game error");
            }
        }
    }
}
