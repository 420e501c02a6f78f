//! The question/answer state machine for one player.
//!
//! A [`Session`] owns its oracle client and its wait gate, so every turn runs
//! strictly in sequence: at most one oracle call or one wait is in flight.

use std::sync::{Arc, Mutex};

use akigame_core::answer::{Normalizer, Token, parse_yes_no};
use akigame_core::clock::Clock;
use akigame_core::error::{GameError, OracleError};
use akigame_core::event::{EventMetadata, GameEvent, GameEventKind, GameOutcome};
use akigame_core::oracle::{Oracle, Question};
use akigame_core::rng::DeterministicRng;
use akigame_core::transport::{Channel, ChatTransport, User};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::domain::report::GameReport;
use crate::domain::state::{OracleState, WaitKind};
use crate::gate::{WaitError, WaitGate};
use crate::presenter;
use crate::registry::SessionHandle;
use crate::services::GameServices;

/// Result of one wait for the player.
enum Reply<T> {
    Received(T),
    TimedOut,
    Cancelled,
}

/// How the question loop ended.
enum LoopExit {
    Guess,
    Concluded(GameOutcome),
}

/// One player's game.
pub struct Session {
    handle: SessionHandle,
    user: User,
    channel: Channel,
    oracle: Box<dyn Oracle>,
    transport: Arc<dyn ChatTransport>,
    gate: WaitGate,
    normalizer: Normalizer,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    rng: Arc<Mutex<dyn DeterministicRng>>,
    state: OracleState,
    question_count: u32,
    transcript: Vec<GameEvent>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.handle.session_id)
            .field("user", &self.user.id)
            .field("channel", &self.channel.id)
            .field("state", &self.state)
            .field("question_count", &self.question_count)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session for a registered player. `gate` must watch the same
    /// user and channel and derive from `handle`'s cancellation token.
    #[must_use]
    pub fn new(
        handle: SessionHandle,
        user: User,
        channel: Channel,
        oracle: Box<dyn Oracle>,
        gate: WaitGate,
        services: &GameServices,
    ) -> Self {
        Self {
            handle,
            user,
            channel,
            oracle,
            transport: Arc::clone(&services.transport),
            gate,
            normalizer: services.normalizer.clone(),
            config: services.config.clone(),
            clock: Arc::clone(&services.clock),
            rng: Arc::clone(&services.rng),
            state: OracleState::NotStarted,
            question_count: 1,
            transcript: Vec::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> OracleState {
        self.state
    }

    /// Number of the question currently displayed, starting at 1.
    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    /// Net forward answers given so far.
    #[must_use]
    pub fn questions_asked(&self) -> u32 {
        self.question_count.saturating_sub(1)
    }

    /// Plays the game to its end.
    ///
    /// Timeouts and cancellation are normal outcomes. The caller owns the
    /// registry entry and removes it however this returns.
    ///
    /// # Errors
    ///
    /// `InvalidLanguage` if the oracle rejects `language`; `Oracle` for fatal
    /// service failures (including too many malformed replies in a row);
    /// `Transport` if the chat platform fails.
    #[instrument(
        skip_all,
        fields(session_id = %self.handle.session_id, user_id = %self.user.id, %language)
    )]
    pub async fn run(mut self, language: &str) -> Result<GameReport, GameError> {
        let result = self.play(language).await;
        self.set_state(OracleState::Concluded);

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, question = self.question_count, "game aborted");
                return Err(err);
            }
        };

        self.record(GameEventKind::GameConcluded { outcome });
        info!(?outcome, questions = self.questions_asked(), "game concluded");
        for event in &self.transcript {
            debug!(
                event_type = %event.metadata.event_type,
                sequence_number = event.metadata.sequence_number,
                payload = %event.to_payload(),
                "transcript"
            );
        }

        Ok(GameReport {
            session_id: self.handle.session_id,
            user_id: self.user.id,
            outcome,
            questions_asked: self.questions_asked(),
            guess: self.oracle.first_guess().cloned(),
            finished_at: self.clock.now(),
            started_at: self.handle.started_at,
            transcript: self.transcript,
        })
    }

    async fn play(&mut self, language: &str) -> Result<GameOutcome, GameError> {
        if self.handle.is_cancelled() {
            return Ok(GameOutcome::Cancelled);
        }

        let child_mode = self.channel.child_mode();
        self.typing().await;
        let first = self
            .oracle
            .start(language, child_mode)
            .await
            .map_err(|err| match err {
                OracleError::InvalidLanguage(code) => GameError::InvalidLanguage(code),
                other => GameError::Oracle(other),
            })?;
        self.record(GameEventKind::GameStarted {
            language: language.to_owned(),
            child_mode,
        });
        self.set_state(OracleState::AwaitingAnswer);
        info!(child_mode, "oracle game started");

        if let LoopExit::Concluded(outcome) = self.question_loop(first).await? {
            return Ok(outcome);
        }

        // A cancel may have landed during the last oracle call.
        if self.handle.is_cancelled() {
            self.say(presenter::CANCELLED).await?;
            return Ok(GameOutcome::Cancelled);
        }

        self.set_state(OracleState::Guessing);
        self.confirm_guess().await
    }

    async fn question_loop(&mut self, first: Question) -> Result<LoopExit, GameError> {
        let mut question = first;
        let mut malformed_streak = 0;

        loop {
            let token = match self.ask_question(&question).await? {
                Reply::Received(token) => token,
                Reply::TimedOut => return Ok(LoopExit::Concluded(GameOutcome::NoAnswer)),
                Reply::Cancelled => return Ok(LoopExit::Concluded(GameOutcome::Cancelled)),
            };

            // The token may have fired while the reply was being handled.
            if self.handle.is_cancelled() {
                self.say(presenter::CANCELLED).await?;
                return Ok(LoopExit::Concluded(GameOutcome::Cancelled));
            }

            self.typing().await;
            match token {
                Token::Back => match self.oracle.back().await {
                    Ok(previous) => {
                        self.question_count = self.question_count.saturating_sub(1).max(1);
                        self.record(GameEventKind::WentBack {
                            question_number: self.question_count,
                        });
                        self.sync_status();
                        question = previous;
                    }
                    Err(OracleError::CannotGoBackFurther) => {
                        debug!("back rejected on the first question");
                        self.record(GameEventKind::BackRejected {
                            question_number: self.question_count,
                        });
                        self.say(presenter::CANNOT_GO_BACK).await?;
                    }
                    Err(err) => return Err(err.into()),
                },
                Token::Answer(answer) => match self.oracle.answer(answer).await {
                    Ok(next) => {
                        malformed_streak = 0;
                        let progression = self.oracle.progression();
                        self.record(GameEventKind::QuestionAnswered {
                            question_number: self.question_count,
                            answer,
                            progression,
                        });
                        self.question_count += 1;
                        self.sync_status();
                        question = next;

                        if progression >= self.config.progression_threshold
                            || self.questions_asked() >= self.config.max_questions
                        {
                            info!(progression, questions = self.questions_asked(), "ready to guess");
                            return Ok(LoopExit::Guess);
                        }
                    }
                    Err(OracleError::NoQuestionsLeft) => {
                        info!(questions = self.questions_asked(), "oracle ran out of questions");
                        self.say(presenter::NO_QUESTIONS_LEFT).await?;
                        return Ok(LoopExit::Guess);
                    }
                    Err(OracleError::MalformedResponse(detail)) => {
                        malformed_streak += 1;
                        if malformed_streak > self.config.max_malformed_retries {
                            return Err(OracleError::MalformedResponse(detail).into());
                        }
                        warn!(%detail, attempt = malformed_streak, "malformed oracle reply, asking again");
                        self.record(GameEventKind::MalformedRetried {
                            question_number: self.question_count,
                            attempt: malformed_streak,
                        });
                        self.say(presenter::UNEXPECTED_ERROR).await?;
                    }
                    Err(err) => return Err(err.into()),
                },
            }
        }
    }

    async fn ask_question(&mut self, question: &Question) -> Result<Reply<Token>, GameError> {
        let number = self.question_count;
        let armed = self.gate.arm();
        let message = self
            .transport
            .send_message(
                self.channel.id,
                presenter::question_text(number, &question.text).into(),
            )
            .await?;

        self.handle
            .update_status(|status| status.waiting = Some(WaitKind::Answer));
        let normalizer = &self.normalizer;
        let reply = armed
            .next_reply(self.config.answer_timeout, |content| {
                normalizer.normalize(content)
            })
            .await;
        self.handle.update_status(|status| status.waiting = None);

        match reply {
            Ok(token) => Ok(Reply::Received(token)),
            Err(WaitError::Timeout) => {
                info!(question = number, "no answer before the deadline");
                self.transport
                    .edit_message(&message, presenter::NO_ANSWER)
                    .await?;
                Ok(Reply::TimedOut)
            }
            Err(WaitError::Cancelled) => {
                info!(question = number, "cancelled while waiting for an answer");
                self.transport
                    .edit_message(&message, presenter::CANCELLED)
                    .await?;
                Ok(Reply::Cancelled)
            }
            Err(WaitError::Transport(err)) => Err(err.into()),
        }
    }

    async fn confirm_guess(&mut self) -> Result<GameOutcome, GameError> {
        self.typing().await;
        let guess = self.oracle.commit_guess().await?;
        info!(guess = %guess.name, "oracle committed to a guess");
        self.record(GameEventKind::GuessCommitted {
            guess: guess.clone(),
        });

        let embed = presenter::guess_embed(
            &guess,
            &self.user,
            self.question_count,
            self.draw_colour(),
        );
        let armed = self.gate.arm();
        self.transport
            .send_message(self.channel.id, embed.into())
            .await?;

        self.handle
            .update_status(|status| status.waiting = Some(WaitKind::Confirmation));
        let reply = armed
            .next_reply(self.config.confirm_timeout, parse_yes_no)
            .await;
        self.handle.update_status(|status| status.waiting = None);

        let outcome = match reply {
            Ok(true) => GameOutcome::Won,
            Ok(false) => GameOutcome::Lost,
            Err(WaitError::Timeout | WaitError::Cancelled) => GameOutcome::Undetermined,
            Err(WaitError::Transport(err)) => return Err(err.into()),
        };
        let text = match outcome {
            GameOutcome::Won => presenter::WON,
            GameOutcome::Lost => presenter::LOST,
            _ => presenter::UNDETERMINED,
        };
        self.say(text).await?;
        Ok(outcome)
    }

    async fn say(&self, text: &str) -> Result<(), GameError> {
        self.transport
            .send_message(self.channel.id, text.into())
            .await?;
        Ok(())
    }

    async fn typing(&self) {
        if let Err(err) = self.transport.trigger_typing(self.channel.id).await {
            debug!(error = %err, "typing indicator failed");
        }
    }

    fn draw_colour(&self) -> u32 {
        self.rng.lock().map_or(presenter::DEFAULT_COLOUR, |mut rng| {
            rng.next_u32_range(0, presenter::MAX_COLOUR)
        })
    }

    fn set_state(&mut self, state: OracleState) {
        self.state = state;
        self.handle.update_status(|status| status.state = state);
    }

    fn sync_status(&self) {
        let question_count = self.question_count;
        let progression = self.oracle.progression();
        self.handle.update_status(|status| {
            status.question_count = question_count;
            status.progression = progression;
        });
    }

    #[allow(clippy::cast_possible_wrap)]
    fn record(&mut self, kind: GameEventKind) {
        let event = GameEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                session_id: self.handle.session_id,
                sequence_number: self.transcript.len() as i64 + 1,
                occurred_at: self.clock.now(),
            },
            kind,
        };
        self.transcript.push(event);
    }
}
