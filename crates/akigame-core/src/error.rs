//! Error types shared by every layer of the game.

use thiserror::Error;

use crate::transport::UserId;

/// Failures reported by an oracle client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The requested language/theme pair is not recognized.
    #[error("invalid language: {0}")]
    InvalidLanguage(String),

    /// The service could not be reached or reported an outage.
    #[error("oracle service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The oracle has exhausted its question budget for this game.
    #[error("the oracle has no questions left")]
    NoQuestionsLeft,

    /// The service answered with data that could not be parsed.
    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),

    /// `back` was requested on the first question.
    #[error("cannot go back any further")]
    CannotGoBackFurther,

    /// An operation was attempted before `start` succeeded.
    #[error("the oracle session has not been started")]
    NotStarted,

    /// Any other failure the service reported.
    #[error("unexpected oracle failure: {0}")]
    Unexpected(String),
}

/// Failures reported by a chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// A message could not be delivered or edited.
    #[error("failed to send message: {0}")]
    Send(String),

    /// The inbound message stream has shut down.
    #[error("inbound message stream closed")]
    Closed,
}

/// Errors that end (or prevent) a game.
#[derive(Debug, Error)]
pub enum GameError {
    /// The user asked for a language the oracle does not support.
    #[error("invalid language: {0}")]
    InvalidLanguage(String),

    /// The user already has a game running.
    #[error("user {0} is already playing")]
    AlreadyPlaying(UserId),

    /// The user has no game running.
    #[error("user {0} is not playing")]
    NotPlaying(UserId),

    /// The user did not answer a setup prompt in time.
    #[error("no response from user {0}")]
    NoResponse(UserId),

    /// A fatal oracle failure.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The chat transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
