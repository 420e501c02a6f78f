//! Shared test helpers for bot integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use akigame_bot::config::BotConfig;
use akigame_bot::state::AppState;
use akigame_core::transport::{Channel, ChannelId, ChatTransport, User, UserId};
use akigame_session::config::SessionConfig;
use akigame_test_support::{
    ChannelTransport, FixedClock, MockRng, OracleCalls, OracleScript, ScriptedOracleFactory,
    TransportProbe,
};

pub const PLAYER: UserId = UserId(42);
pub const TABLE: ChannelId = ChannelId(4200);
pub const BLOCKED: ChannelId = ChannelId(666);

pub fn player() -> User {
    User {
        id: PLAYER,
        name: "sam".to_owned(),
        avatar_url: Some("https://example.test/sam.png".to_owned()),
    }
}

pub fn table() -> Channel {
    Channel {
        id: TABLE,
        nsfw: false,
    }
}

/// A fully wired bot over the in-memory transport and a scripted oracle.
pub struct TestBot {
    pub state: AppState,
    pub transport: Arc<ChannelTransport>,
    pub probe: TransportProbe,
    pub calls: Arc<OracleCalls>,
}

/// Build the bot with deterministic clock and RNG, and `BLOCKED` refused.
pub fn build_test_bot(script: OracleScript, session: SessionConfig) -> TestBot {
    let (transport, probe) = ChannelTransport::new();
    let factory = ScriptedOracleFactory::new(script);
    let calls = factory.calls();
    let config = BotConfig {
        session,
        blocked_channels: HashSet::from([BLOCKED]),
        ..BotConfig::default()
    };
    let shared: Arc<dyn ChatTransport> = transport.clone();
    let state = AppState::with_parts(
        config,
        Arc::new(factory),
        shared,
        Arc::new(FixedClock::standard()),
        Arc::new(Mutex::new(MockRng)),
    );
    TestBot {
        state,
        transport,
        probe,
        calls,
    }
}

/// Waits for each question and answers it as `PLAYER` in `TABLE`.
pub async fn answer(probe: &mut TransportProbe, replies: &[&str]) {
    for reply in replies {
        probe.next_starting_with("Question #").await;
        probe.reply(PLAYER, TABLE, reply);
    }
}
