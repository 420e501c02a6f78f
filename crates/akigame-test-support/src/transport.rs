//! In-memory chat transport.
//!
//! Everything the game sends is recorded and forwarded to a
//! [`TransportProbe`], which tests use to read prompts and inject replies.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use akigame_core::error::TransportError;
use akigame_core::transport::{
    ChannelId, ChatTransport, Embed, InboundMessage, MessageHandle, OutgoingMessage, UserId,
};
use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

/// Something the game did through the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    /// A new message.
    Sent {
        /// Handle returned to the game.
        handle: MessageHandle,
        /// Message content.
        message: OutgoingMessage,
    },
    /// An edit of an earlier message.
    Edited {
        /// The edited message.
        handle: MessageHandle,
        /// Replacement text.
        content: String,
    },
}

impl SentMessage {
    /// Text of a plain message or edit; `None` for embeds.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Sent {
                message: OutgoingMessage::Text(text),
                ..
            } => Some(text),
            Self::Edited { content, .. } => Some(content),
            Self::Sent { .. } => None,
        }
    }

    /// The embed, if this is one.
    #[must_use]
    pub fn embed(&self) -> Option<&Embed> {
        match self {
            Self::Sent {
                message: OutgoingMessage::Embed(embed),
                ..
            } => Some(embed),
            _ => None,
        }
    }

    /// Whether this is an edit.
    #[must_use]
    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edited { .. })
    }
}

/// A [`ChatTransport`] backed by in-process channels.
#[derive(Debug)]
pub struct ChannelTransport {
    inbound: Mutex<Option<broadcast::Sender<InboundMessage>>>,
    outbound: mpsc::UnboundedSender<SentMessage>,
    log: Mutex<Vec<SentMessage>>,
    next_message_id: AtomicU64,
}

impl ChannelTransport {
    /// Creates a transport and the probe that observes it.
    #[must_use]
    pub fn new() -> (Arc<Self>, TransportProbe) {
        let (inbound, _) = broadcast::channel(64);
        let (outbound, sent) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            inbound: Mutex::new(Some(inbound.clone())),
            outbound,
            log: Mutex::new(Vec::new()),
            next_message_id: AtomicU64::new(1),
        });
        let probe = TransportProbe { sent, inbound };
        (transport, probe)
    }

    /// Delivers an inbound message to every current subscriber.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deliver(&self, author: UserId, channel: ChannelId, content: &str) {
        if let Some(sender) = self.inbound.lock().unwrap().as_ref() {
            let _ = sender.send(InboundMessage {
                author,
                channel,
                content: content.to_owned(),
            });
        }
    }

    /// Shuts the inbound stream down; new subscribers see it closed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn close(&self) {
        self.inbound.lock().unwrap().take();
    }

    /// Returns a snapshot of everything sent or edited so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.log.lock().unwrap().clone()
    }

    /// Texts of every plain message and edit so far, in order.
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .iter()
            .filter_map(|m| m.text().map(str::to_owned))
            .collect()
    }

    fn record(&self, entry: SentMessage) {
        self.log.lock().unwrap().push(entry.clone());
        let _ = self.outbound.send(entry);
    }
}

#[async_trait]
impl ChatTransport for ChannelTransport {
    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageHandle, TransportError> {
        let handle = MessageHandle {
            channel,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
        };
        self.record(SentMessage::Sent { handle, message });
        Ok(handle)
    }

    async fn edit_message(
        &self,
        handle: &MessageHandle,
        content: &str,
    ) -> Result<(), TransportError> {
        self.record(SentMessage::Edited {
            handle: *handle,
            content: content.to_owned(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<InboundMessage> {
        if let Some(sender) = self.inbound.lock().unwrap().as_ref() {
            return sender.subscribe();
        }
        // Closed: hand out a receiver whose sender is already gone.
        let (_, receiver) = broadcast::channel(1);
        receiver
    }
}

/// Test-side view of a [`ChannelTransport`].
#[derive(Debug)]
pub struct TransportProbe {
    sent: mpsc::UnboundedReceiver<SentMessage>,
    inbound: broadcast::Sender<InboundMessage>,
}

impl TransportProbe {
    /// Waits for the next thing the game sends.
    ///
    /// # Panics
    ///
    /// Panics if nothing is sent within five seconds or the transport is gone.
    pub async fn next(&mut self) -> SentMessage {
        tokio::time::timeout(Duration::from_secs(5), self.sent.recv())
            .await
            .expect("timed out waiting for the game to send a message")
            .expect("transport dropped")
    }

    /// Skips messages until one whose text starts with `prefix` arrives.
    ///
    /// # Panics
    ///
    /// Same as [`TransportProbe::next`].
    pub async fn next_starting_with(&mut self, prefix: &str) -> SentMessage {
        loop {
            let sent = self.next().await;
            if sent.text().is_some_and(|t| t.starts_with(prefix)) {
                return sent;
            }
        }
    }

    /// Skips messages until an embed arrives.
    ///
    /// # Panics
    ///
    /// Same as [`TransportProbe::next`].
    pub async fn next_embed(&mut self) -> Embed {
        loop {
            if let Some(embed) = self.next().await.embed() {
                return embed.clone();
            }
        }
    }

    /// Sends a reply as `author` in `channel`.
    pub fn reply(&self, author: UserId, channel: ChannelId, content: &str) {
        let _ = self.inbound.send(InboundMessage {
            author,
            channel,
            content: content.to_owned(),
        });
    }
}
