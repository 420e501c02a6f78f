//! Command handlers for the game.
//!
//! `handle_start_game` owns a player's game from registration to the final
//! message: it claims the registry slot, runs the setup prompts, and hands
//! over to the [`Session`] state machine. The registry slot is released when
//! the handler returns, whatever the outcome.

use std::sync::Arc;

use akigame_core::answer::parse_yes_no;
use akigame_core::error::GameError;
use akigame_core::event::GameOutcome;
use akigame_core::transport::ChannelId;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::commands::{CancelGame, StartGame};
use crate::domain::report::GameReport;
use crate::domain::session::Session;
use crate::domain::state::WaitKind;
use crate::gate::{WaitError, WaitGate};
use crate::presenter;
use crate::registry::{SessionHandle, SessionRegistry};
use crate::services::GameServices;

/// Result of a setup prompt.
enum Prompted<T> {
    Reply(T),
    TimedOut,
    Cancelled,
}

/// Handles the `StartGame` command and plays the game to its end.
///
/// # Errors
///
/// Returns `GameError::AlreadyPlaying` if the user has a game running,
/// `GameError::NoResponse` if the language prompt goes unanswered,
/// `GameError::InvalidLanguage` for an unknown language, and oracle or
/// transport failures that abort the game.
#[instrument(
    skip_all,
    fields(
        correlation_id = %command.correlation_id,
        user_id = %command.user.id,
        channel_id = %command.channel.id,
    )
)]
pub async fn handle_start_game(
    command: &StartGame,
    services: &GameServices,
) -> Result<GameReport, GameError> {
    let user_id = command.user.id;
    let channel_id = command.channel.id;
    let guard = services
        .registry
        .begin(user_id, channel_id, services.clock.now())?;
    let handle = guard.handle().clone();
    info!(session_id = %handle.session_id, "game requested");

    let mut gate = WaitGate::new(
        Arc::clone(&services.transport),
        handle.cancellation_token(),
        user_id,
        channel_id,
    );

    services
        .transport
        .send_message(channel_id, presenter::ANSWER_NOTICE.into())
        .await?;

    if services.config.ask_ready {
        let ready = prompt(
            &mut gate,
            &handle,
            services,
            channel_id,
            presenter::READY_PROMPT,
            parse_yes_no,
        )
        .await?;
        match ready {
            Prompted::Reply(true) => {}
            Prompted::Reply(false) | Prompted::TimedOut => {
                info!("player is not ready");
                services
                    .transport
                    .send_message(channel_id, presenter::FAREWELL.into())
                    .await?;
                return Ok(unplayed(&handle, services, GameOutcome::Declined));
            }
            Prompted::Cancelled => {
                return Ok(unplayed(&handle, services, GameOutcome::Cancelled));
            }
        }
    }

    let language = match &command.language {
        Some(language) => language.trim().to_lowercase(),
        None => {
            let chosen = prompt(
                &mut gate,
                &handle,
                services,
                channel_id,
                presenter::LANGUAGE_PROMPT,
                |content| Some(content.trim().to_lowercase()).filter(|s| !s.is_empty()),
            )
            .await?;
            match chosen {
                Prompted::Reply(reply) if reply == "no" || reply == "n" => {
                    services.config.default_language.clone()
                }
                Prompted::Reply(reply) => reply,
                Prompted::TimedOut => return Err(GameError::NoResponse(user_id)),
                Prompted::Cancelled => {
                    return Ok(unplayed(&handle, services, GameOutcome::Cancelled));
                }
            }
        }
    };

    if !services.oracles.validate_language(&language) {
        info!(%language, "unknown language requested");
        return Err(GameError::InvalidLanguage(language));
    }

    let session = Session::new(
        handle,
        command.user.clone(),
        command.channel,
        services.oracles.create(),
        gate,
        services,
    );
    let report = session.run(&language).await;
    drop(guard);
    report
}

/// Handles the `CancelGame` command.
///
/// The running game notices at its next wait (or immediately, if it is
/// waiting) and concludes as cancelled.
///
/// # Errors
///
/// Returns `GameError::NotPlaying` if the user has no game running.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, user_id = %command.user_id))]
pub fn handle_cancel_game(
    command: &CancelGame,
    registry: &SessionRegistry,
) -> Result<Uuid, GameError> {
    let handle = registry.cancel(command.user_id)?;
    info!(session_id = %handle.session_id, "game cancellation requested");
    Ok(handle.session_id)
}

async fn prompt<T, P>(
    gate: &mut WaitGate,
    handle: &SessionHandle,
    services: &GameServices,
    channel_id: ChannelId,
    text: &str,
    parse: P,
) -> Result<Prompted<T>, GameError>
where
    P: Fn(&str) -> Option<T>,
{
    let armed = gate.arm();
    let message = services
        .transport
        .send_message(channel_id, text.into())
        .await?;

    handle.update_status(|status| status.waiting = Some(WaitKind::Prompt));
    let reply = armed.next_reply(services.config.prompt_timeout, parse).await;
    handle.update_status(|status| status.waiting = None);

    match reply {
        Ok(value) => Ok(Prompted::Reply(value)),
        Err(WaitError::Timeout) => Ok(Prompted::TimedOut),
        Err(WaitError::Cancelled) => {
            services
                .transport
                .edit_message(&message, presenter::CANCELLED)
                .await?;
            Ok(Prompted::Cancelled)
        }
        Err(WaitError::Transport(err)) => Err(err.into()),
    }
}

fn unplayed(handle: &SessionHandle, services: &GameServices, outcome: GameOutcome) -> GameReport {
    info!(?outcome, "game ended before it began");
    GameReport::unplayed(handle, outcome, services.clock.now())
}

#[cfg(test)]
mod tests {
    use akigame_core::transport::{Channel, ChannelId, User, UserId};
    use akigame_test_support::OracleScript;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::config::SessionConfig;
    use crate::fixtures::{self, Fixture, PLAYER, TABLE};

    fn start_command(language: Option<&str>) -> StartGame {
        StartGame {
            correlation_id: Uuid::new_v4(),
            user: fixtures::player(),
            channel: fixtures::table(),
            language: language.map(str::to_owned),
        }
    }

    fn spawn_start(
        fx: &Fixture,
        command: StartGame,
    ) -> JoinHandle<Result<GameReport, GameError>> {
        let services = fx.services.clone();
        tokio::spawn(async move { handle_start_game(&command, &services).await })
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_handle_start_game_future_can_move_between_threads() {
        let fx = fixtures::fixture(OracleScript::flat(10.0), SessionConfig::default());
        let command = start_command(Some("en"));

        let game = handle_start_game(&command, &fx.services);

        assert_send(&game);
    }

    #[tokio::test]
    async fn test_handle_start_game_plays_a_full_game() {
        // Arrange
        let mut fx = fixtures::fixture(
            OracleScript::with_progressions(vec![30.0, 60.0, 90.0]),
            SessionConfig::default(),
        );
        let task = spawn_start(&fx, start_command(Some("EN")));

        // Act
        let notice = fx.probe.next().await;
        fixtures::answer(&mut fx.probe, &["yes", "no", "probably"]).await;
        let embed = fx.probe.next_embed().await;
        fx.probe.reply(PLAYER, TABLE, "no");
        let report = task.await.unwrap().unwrap();

        // Assert
        assert_eq!(notice.text(), Some(presenter::ANSWER_NOTICE));
        assert!(embed.description.contains("Ada Lovelace"));
        assert_eq!(report.outcome, GameOutcome::Lost);
        assert_eq!(report.user_id, PLAYER);
        assert_eq!(fx.calls.started_with(), vec![("en".to_owned(), true)]);
        assert_eq!(fx.transport.texts().last().unwrap(), presenter::LOST);
        assert!(fx.services.registry.is_empty());
    }

    #[tokio::test]
    async fn test_handle_start_game_rejects_second_game_for_same_user() {
        // Arrange
        let mut fx = fixtures::fixture(OracleScript::flat(10.0), SessionConfig::default());
        let running = spawn_start(&fx, start_command(Some("en")));
        fx.probe.next_starting_with("Question #1").await;
        let session_id = fx.services.registry.get(PLAYER).unwrap().session_id;

        // Act
        let result = handle_start_game(&start_command(Some("en")), &fx.services).await;

        // Assert
        assert!(matches!(result, Err(GameError::AlreadyPlaying(PLAYER))));
        let existing = fx.services.registry.get(PLAYER).unwrap();
        assert_eq!(existing.session_id, session_id);
        assert!(!existing.is_cancelled());
        assert_eq!(fx.calls.starts(), 1);

        fx.services.registry.cancel(PLAYER).unwrap();
        running.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_language_prompt_no_selects_default_language() {
        // Arrange
        let config = SessionConfig {
            default_language: "de".to_owned(),
            ..SessionConfig::default()
        };
        let mut fx = fixtures::fixture(OracleScript::flat(95.0), config);
        let task = spawn_start(&fx, start_command(None));

        // Act
        let asked = fx.probe.next_starting_with("Do you wish").await;
        fx.probe.reply(PLAYER, TABLE, "No");
        fixtures::answer(&mut fx.probe, &["yes"]).await;
        fx.probe.next_embed().await;
        fx.probe.reply(PLAYER, TABLE, "yes");
        let report = task.await.unwrap().unwrap();

        // Assert
        assert_eq!(asked.text(), Some(presenter::LANGUAGE_PROMPT));
        assert_eq!(fx.calls.started_with(), vec![("de".to_owned(), true)]);
        assert_eq!(report.outcome, GameOutcome::Won);
    }

    #[tokio::test]
    async fn test_language_prompt_accepts_a_language_code() {
        // Arrange
        let mut fx = fixtures::fixture(OracleScript::flat(95.0), SessionConfig::default());
        let task = spawn_start(&fx, start_command(None));

        // Act
        fx.probe.next_starting_with("Do you wish").await;
        fx.probe.reply(PLAYER, TABLE, "  FR ");
        fixtures::answer(&mut fx.probe, &["y"]).await;
        fx.probe.next_embed().await;
        fx.probe.reply(PLAYER, TABLE, "y");
        task.await.unwrap().unwrap();

        // Assert
        assert_eq!(fx.calls.started_with(), vec![("fr".to_owned(), true)]);
    }

    #[tokio::test]
    async fn test_invalid_language_never_reaches_the_oracle() {
        // Arrange
        let fx = fixtures::fixture(OracleScript::default(), SessionConfig::default());

        // Act
        let result = handle_start_game(&start_command(Some("klingon")), &fx.services).await;

        // Assert
        match result {
            Err(GameError::InvalidLanguage(code)) => assert_eq!(code, "klingon"),
            other => panic!("expected InvalidLanguage, got {other:?}"),
        }
        assert_eq!(fx.calls.starts(), 0);
        assert!(fx.services.registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_language_prompt_is_no_response() {
        // Arrange
        let mut fx = fixtures::fixture(OracleScript::default(), SessionConfig::default());
        let task = spawn_start(&fx, start_command(None));

        // Act
        fx.probe.next_starting_with("Do you wish").await;
        let result = task.await.unwrap();

        // Assert
        assert!(matches!(result, Err(GameError::NoResponse(PLAYER))));
        assert_eq!(fx.calls.starts(), 0);
        assert!(fx.services.registry.is_empty());
    }

    #[tokio::test]
    async fn test_declining_the_ready_prompt_ends_politely() {
        // Arrange
        let config = SessionConfig {
            ask_ready: true,
            ..SessionConfig::default()
        };
        let mut fx = fixtures::fixture(OracleScript::default(), config);
        let task = spawn_start(&fx, start_command(Some("en")));

        // Act
        fx.probe.next_starting_with("Are you ready").await;
        fx.probe.reply(PLAYER, TABLE, "n");
        let report = task.await.unwrap().unwrap();

        // Assert
        assert_eq!(report.outcome, GameOutcome::Declined);
        assert_eq!(report.questions_asked, 0);
        assert_eq!(fx.transport.texts().last().unwrap(), presenter::FAREWELL);
        assert_eq!(fx.calls.starts(), 0);
        assert!(fx.services.registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_ready_prompt_counts_as_declined() {
        // Arrange
        let config = SessionConfig {
            ask_ready: true,
            ..SessionConfig::default()
        };
        let mut fx = fixtures::fixture(OracleScript::default(), config);
        let task = spawn_start(&fx, start_command(Some("en")));

        // Act
        fx.probe.next_starting_with("Are you ready").await;
        let report = task.await.unwrap().unwrap();

        // Assert
        assert_eq!(report.outcome, GameOutcome::Declined);
        assert_eq!(fx.transport.texts().last().unwrap(), presenter::FAREWELL);
        assert!(fx.services.registry.is_empty());
    }

    #[tokio::test]
    async fn test_ready_player_goes_on_to_the_questions() {
        // Arrange
        let config = SessionConfig {
            ask_ready: true,
            ..SessionConfig::default()
        };
        let mut fx = fixtures::fixture(OracleScript::flat(90.0), config);
        let task = spawn_start(&fx, start_command(Some("en")));

        // Act
        fx.probe.next_starting_with("Are you ready").await;
        fx.probe.reply(PLAYER, TABLE, "yes");
        fixtures::answer(&mut fx.probe, &["no"]).await;
        fx.probe.next_embed().await;
        fx.probe.reply(PLAYER, TABLE, "yes");
        let report = task.await.unwrap().unwrap();

        // Assert
        assert_eq!(report.outcome, GameOutcome::Won);
        assert_eq!(fx.calls.starts(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_language_prompt_edits_the_prompt() {
        // Arrange
        let mut fx = fixtures::fixture(OracleScript::default(), SessionConfig::default());
        let task = spawn_start(&fx, start_command(None));
        fx.probe.next_starting_with("Do you wish").await;

        // Act
        let cancel = CancelGame {
            correlation_id: Uuid::new_v4(),
            user_id: PLAYER,
        };
        handle_cancel_game(&cancel, &fx.services.registry).unwrap();
        let report = task.await.unwrap().unwrap();

        // Assert
        assert_eq!(report.outcome, GameOutcome::Cancelled);
        let edit = fx.probe.next().await;
        assert!(edit.is_edit());
        assert_eq!(edit.text(), Some(presenter::CANCELLED));
        assert_eq!(fx.calls.starts(), 0);
    }

    #[tokio::test]
    async fn test_handle_cancel_game_stops_a_running_game() {
        // Arrange
        let mut fx = fixtures::fixture(OracleScript::flat(10.0), SessionConfig::default());
        let task = spawn_start(&fx, start_command(Some("en")));
        fixtures::answer(&mut fx.probe, &["yes", "no"]).await;
        fx.probe.next_starting_with("Question #3").await;
        let cancel = CancelGame {
            correlation_id: Uuid::new_v4(),
            user_id: PLAYER,
        };

        // Act
        let session_id = handle_cancel_game(&cancel, &fx.services.registry).unwrap();
        let report = task.await.unwrap().unwrap();

        // Assert
        assert_eq!(report.session_id, session_id);
        assert_eq!(report.outcome, GameOutcome::Cancelled);
        assert_eq!(report.questions_asked, 2);
        assert_eq!(fx.calls.commits(), 0);
        assert!(fx.services.registry.is_empty());
    }

    #[test]
    fn test_handle_cancel_game_without_game_is_not_playing() {
        let fx = fixtures::fixture(OracleScript::default(), SessionConfig::default());
        let cancel = CancelGame {
            correlation_id: Uuid::new_v4(),
            user_id: UserId(7),
        };

        let result = handle_cancel_game(&cancel, &fx.services.registry);

        assert!(matches!(result, Err(GameError::NotPlaying(UserId(7)))));
    }

    #[tokio::test]
    async fn test_two_players_do_not_see_each_others_replies() {
        // Arrange
        let mut fx = fixtures::fixture(OracleScript::flat(95.0), SessionConfig::default());
        let other = StartGame {
            correlation_id: Uuid::new_v4(),
            user: User {
                id: UserId(7),
                name: "alex".to_owned(),
                avatar_url: None,
            },
            channel: Channel {
                id: ChannelId(77),
                nsfw: false,
            },
            language: Some("en".to_owned()),
        };
        let first = spawn_start(&fx, start_command(Some("en")));
        fx.probe.next_starting_with("Question #1").await;
        let second = spawn_start(&fx, other);
        fx.probe.next_starting_with("Question #1").await;

        // Act
        fx.probe.reply(UserId(7), ChannelId(77), "yes");
        fx.probe.next_embed().await;
        fx.probe.reply(UserId(7), ChannelId(77), "yes");
        let second_report = second.await.unwrap().unwrap();

        // Assert
        assert_eq!(second_report.outcome, GameOutcome::Won);
        assert!(fx.services.registry.contains(PLAYER));
        assert_eq!(fx.services.registry.get(PLAYER).unwrap().status().question_count, 1);

        fx.services.registry.cancel(PLAYER).unwrap();
        let first_report = first.await.unwrap().unwrap();
        assert_eq!(first_report.outcome, GameOutcome::Cancelled);
    }
}
