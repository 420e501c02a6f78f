//! Input wait gate.
//!
//! The single suspension point of a game: wait for the next message from one
//! user in one channel that parses as the expected reply, until a deadline
//! passes or the session is cancelled.
//!
//! A wait is armed *before* the prompt is sent so a fast reply cannot slip
//! past, and the armed wait mutably borrows the gate, so a session can never
//! have two waits outstanding.

use std::sync::Arc;
use std::time::Duration;

use akigame_core::error::TransportError;
use akigame_core::transport::{ChannelId, ChatTransport, InboundMessage, UserId};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Why a wait ended without a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    /// The deadline passed.
    #[error("timed out waiting for a reply")]
    Timeout,

    /// The session was cancelled.
    #[error("wait cancelled")]
    Cancelled,

    /// The inbound stream failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Collects replies for one session.
pub struct WaitGate {
    transport: Arc<dyn ChatTransport>,
    cancel: CancellationToken,
    author: UserId,
    channel: ChannelId,
}

impl std::fmt::Debug for WaitGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitGate")
            .field("author", &self.author)
            .field("channel", &self.channel)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl WaitGate {
    /// Creates a gate for replies from `author` in `channel`. Cancelling
    /// `cancel` resolves the current (or next) wait with `Cancelled`.
    #[must_use]
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        cancel: CancellationToken,
        author: UserId,
        channel: ChannelId,
    ) -> Self {
        Self {
            transport,
            cancel,
            author,
            channel,
        }
    }

    /// Starts listening. Send the prompt after this, then call
    /// [`ArmedWait::next_reply`].
    pub fn arm(&mut self) -> ArmedWait<'_> {
        ArmedWait {
            inbox: self.transport.subscribe(),
            token: self.cancel.child_token(),
            gate: self,
        }
    }
}

/// A wait that is listening but not yet awaited.
#[derive(Debug)]
pub struct ArmedWait<'g> {
    gate: &'g mut WaitGate,
    inbox: broadcast::Receiver<InboundMessage>,
    token: CancellationToken,
}

impl ArmedWait<'_> {
    /// Waits for the first message from the gate's user and channel for
    /// which `parse` returns `Some`, and returns the parsed value.
    ///
    /// # Errors
    ///
    /// `Timeout` once `timeout` elapses, `Cancelled` if the session is
    /// cancelled (including before the wait began), `Transport` if the
    /// inbound stream closes.
    pub async fn next_reply<T, P>(mut self, timeout: Duration, parse: P) -> Result<T, WaitError>
    where
        P: Fn(&str) -> Option<T>,
    {
        if self.token.is_cancelled() {
            return Err(WaitError::Cancelled);
        }

        let author = self.gate.author;
        let channel = self.gate.channel;
        let inbox = &mut self.inbox;
        let matching = async move {
            loop {
                match inbox.recv().await {
                    Ok(message) if message.author == author && message.channel == channel => {
                        if let Some(reply) = parse(&message.content) {
                            return Ok(reply);
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, user_id = %author, "wait gate fell behind inbound messages");
                    }
                    Err(RecvError::Closed) => {
                        return Err(WaitError::Transport(TransportError::Closed));
                    }
                }
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(WaitError::Cancelled),
            outcome = tokio::time::timeout(timeout, matching) => {
                outcome.unwrap_or(Err(WaitError::Timeout))
            }
        }
    }
}
