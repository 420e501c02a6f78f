//! Chat transport port.
//!
//! The game only needs a handful of primitives from the chat platform: send
//! a message, edit it later, observe inbound messages and show a typing hint.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::TransportError;

/// Identifies a chat user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies a chat channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A chat user as seen by the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Avatar image, if the platform provides one.
    pub avatar_url: Option<String>,
}

/// A chat channel as seen by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    /// Channel identifier.
    pub id: ChannelId,
    /// Whether the channel is flagged as adult-only.
    pub nsfw: bool,
}

impl Channel {
    /// Child mode is on everywhere except in adult-only channels.
    #[must_use]
    pub fn child_mode(&self) -> bool {
        !self.nsfw
    }
}

/// A message received from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Who sent it.
    pub author: UserId,
    /// Where it was sent.
    pub channel: ChannelId,
    /// Raw text content.
    pub content: String,
}

/// Footer line of an [`Embed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedFooter {
    /// Footer text.
    pub text: String,
    /// Small icon shown next to the text.
    pub icon_url: Option<String>,
}

/// A rich message card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// Card title.
    pub title: String,
    /// Card body.
    pub description: String,
    /// Large image.
    pub image_url: Option<String>,
    /// Footer line.
    pub footer: Option<EmbedFooter>,
    /// Accent colour as `0xRRGGBB`.
    pub colour: u32,
}

/// Content of an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingMessage {
    /// Plain text.
    Text(String),
    /// A rich card.
    Embed(Embed),
}

impl From<String> for OutgoingMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for OutgoingMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Embed> for OutgoingMessage {
    fn from(embed: Embed) -> Self {
        Self::Embed(embed)
    }
}

/// Reference to a sent message, used to edit it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    /// Channel the message lives in.
    pub channel: ChannelId,
    /// Platform message identifier.
    pub message_id: u64,
}

/// The chat platform, as far as the game is concerned.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a message to `channel`.
    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageHandle, TransportError>;

    /// Replaces the text content of a previously sent message.
    async fn edit_message(&self, handle: &MessageHandle, content: &str)
    -> Result<(), TransportError>;

    /// Subscribes to every inbound message received from now on.
    fn subscribe(&self) -> broadcast::Receiver<InboundMessage>;

    /// Shows a "typing..." hint in `channel`. Transports without one ignore it.
    async fn trigger_typing(&self, _channel: ChannelId) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_mode_is_disabled_only_in_nsfw_channels() {
        let regular = Channel {
            id: ChannelId(1),
            nsfw: false,
        };
        let adult = Channel {
            id: ChannelId(2),
            nsfw: true,
        };

        assert!(regular.child_mode());
        assert!(!adult.child_mode());
    }
}
