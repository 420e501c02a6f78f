//! Terminal chat transport.
//!
//! Lines read from the input are messages from a single local player in a
//! single local channel. Lines starting with the command prefix are
//! dispatched as commands; everything else is delivered to the running game.
//! Everything the game sends is printed, one message per block.

use std::sync::atomic::{AtomicU64, Ordering};

use akigame_core::error::TransportError;
use akigame_core::transport::{
    Channel, ChannelId, ChatTransport, Embed, InboundMessage, MessageHandle, OutgoingMessage, User,
    UserId,
};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::commands::{dispatch, parse_command};
use crate::error::AppError;
use crate::state::AppState;

const INBOUND_CAPACITY: usize = 64;

/// The local player.
#[must_use]
pub fn local_user() -> User {
    User {
        id: UserId(1),
        name: "player".to_owned(),
        avatar_url: None,
    }
}

/// The local channel. Not flagged NSFW, so games run in child mode.
#[must_use]
pub fn local_channel() -> Channel {
    Channel {
        id: ChannelId(1),
        nsfw: false,
    }
}

/// A [`ChatTransport`] printing to a writer.
pub struct ConsoleTransport {
    inbound: broadcast::Sender<InboundMessage>,
    output: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    next_message_id: AtomicU64,
}

impl std::fmt::Debug for ConsoleTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleTransport")
            .field("subscribers", &self.inbound.receiver_count())
            .finish_non_exhaustive()
    }
}

impl ConsoleTransport {
    /// Creates a transport printing to `output`.
    pub fn new(output: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        let (inbound, _) = broadcast::channel(INBOUND_CAPACITY);
        Self {
            inbound,
            output: Mutex::new(Box::new(output)),
            next_message_id: AtomicU64::new(1),
        }
    }

    /// Hands a message to every waiting game.
    pub fn deliver(&self, message: InboundMessage) {
        if self.inbound.send(message).is_err() {
            debug!("no game is listening");
        }
    }

    async fn print(&self, block: &str) -> Result<(), TransportError> {
        let mut output = self.output.lock().await;
        output
            .write_all(format!("{block}\n\n").as_bytes())
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;
        output
            .flush()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

/// Renders an embed as plain text.
#[must_use]
pub fn render_embed(embed: &Embed) -> String {
    let mut lines = vec![format!("== {} ==", embed.title), embed.description.clone()];
    if let Some(image) = &embed.image_url {
        lines.push(format!("[image] {image}"));
    }
    if let Some(footer) = &embed.footer {
        lines.push(format!("-- {}", footer.text));
    }
    lines.join("\n")
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageHandle, TransportError> {
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        let body = match &message {
            OutgoingMessage::Text(text) => text.clone(),
            OutgoingMessage::Embed(embed) => render_embed(embed),
        };
        self.print(&format!("[#{message_id}] {body}")).await?;
        Ok(MessageHandle {
            channel,
            message_id,
        })
    }

    async fn edit_message(
        &self,
        handle: &MessageHandle,
        content: &str,
    ) -> Result<(), TransportError> {
        self.print(&format!("[#{} edited] {content}", handle.message_id))
            .await
    }

    fn subscribe(&self) -> broadcast::Receiver<InboundMessage> {
        self.inbound.subscribe()
    }
}

/// Reads lines from `input` until it ends, dispatching commands and
/// delivering everything else to the running game.
///
/// When the input ends, the player's game is cancelled and awaited.
///
/// # Errors
///
/// Returns `AppError::Io` if reading fails and `AppError::Transport` if a
/// command reply cannot be printed.
pub async fn run_console<R>(
    state: AppState,
    console: &ConsoleTransport,
    input: R,
    author: User,
    channel: Channel,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut games: Vec<JoinHandle<()>> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let content = line.trim();
        if content.is_empty() {
            continue;
        }
        match parse_command(&state.config.command_prefix, content) {
            Some(command) => {
                if let Some(game) = dispatch(&state, author.clone(), channel, command).await? {
                    games.push(game);
                }
            }
            None => console.deliver(InboundMessage {
                author: author.id,
                channel: channel.id,
                content: content.to_owned(),
            }),
        }
        games.retain(|game| !game.is_finished());
    }

    info!("input closed, shutting down");
    if state.services.registry.cancel(author.id).is_ok() {
        debug!(user_id = %author.id, "cancelled the running game");
    }
    for game in games {
        if let Err(err) = game.await {
            warn!(error = %err, "game task failed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use akigame_core::transport::EmbedFooter;

    use super::*;

    #[test]
    fn test_render_embed_includes_every_part() {
        let embed = Embed {
            title: "Hmm... I think I've guessed...".to_owned(),
            description: "Is it Ada Lovelace?".to_owned(),
            image_url: Some("https://example.test/ada.jpg".to_owned()),
            footer: Some(EmbedFooter {
                text: "Game running for player.".to_owned(),
                icon_url: None,
            }),
            colour: 0,
        };

        let text = render_embed(&embed);

        assert_eq!(
            text,
            "== Hmm... I think I've guessed... ==\nIs it Ada Lovelace?\n\
[image] https://example.test/ada.jpg\n-- Game running for player."
        );
    }

    #[test]
    fn test_local_channel_runs_in_child_mode() {
        assert!(local_channel().child_mode());
    }
}
