//! Integration tests for the console transport.

use std::sync::Arc;

use akigame_bot::config::BotConfig;
use akigame_bot::console::{self, ConsoleTransport};
use akigame_bot::error::NOT_RUNNING_ANY_GAME;
use akigame_bot::state::AppState;
use akigame_core::transport::{ChatTransport, InboundMessage};
use akigame_test_support::{OracleScript, ScriptedOracleFactory};
use tokio::io::AsyncReadExt;

#[tokio::test]
async fn test_console_answers_commands_and_prints_replies() {
    // Arrange
    let (writer, mut reader) = tokio::io::duplex(64 * 1024);
    let console = Arc::new(ConsoleTransport::new(writer));
    let transport: Arc<dyn ChatTransport> = console.clone();
    let state = AppState::new(
        BotConfig::default(),
        Arc::new(ScriptedOracleFactory::new(OracleScript::default())),
        transport,
    );
    let input: &[u8] = b"aki cancel\n\n   \nhello there\naki help\n";

    // Act
    console::run_console(
        state,
        &console,
        input,
        console::local_user(),
        console::local_channel(),
    )
    .await
    .unwrap();
    drop(console);
    let mut output = String::new();
    reader.read_to_string(&mut output).await.unwrap();

    // Assert
    assert!(output.starts_with(&format!("[#1] {NOT_RUNNING_ANY_GAME}\n\n")));
    assert!(output.contains("[#2] Commands:"));
    assert!(!output.contains("hello there"));
}

#[tokio::test]
async fn test_send_and_edit_share_message_numbers() {
    // Arrange
    let (writer, mut reader) = tokio::io::duplex(4096);
    let console = ConsoleTransport::new(writer);
    let channel = console::local_channel().id;

    // Act
    let handle = console
        .send_message(channel, "Question #1: Is it real?".into())
        .await
        .unwrap();
    console.edit_message(&handle, "Successfully cancelled.").await.unwrap();
    drop(console);
    let mut output = String::new();
    reader.read_to_string(&mut output).await.unwrap();

    // Assert
    assert_eq!(handle.message_id, 1);
    assert_eq!(
        output,
        "[#1] Question #1: Is it real?\n\n[#1 edited] Successfully cancelled.\n\n"
    );
}

#[tokio::test]
async fn test_delivered_lines_reach_subscribers() {
    let (writer, _reader) = tokio::io::duplex(64);
    let console = ConsoleTransport::new(writer);
    let mut inbox = console.subscribe();
    let message = InboundMessage {
        author: console::local_user().id,
        channel: console::local_channel().id,
        content: "yes".to_owned(),
    };

    console.deliver(message.clone());

    assert_eq!(inbox.recv().await.unwrap(), message);
}
