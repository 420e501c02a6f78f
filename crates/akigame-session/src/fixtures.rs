//! Shared wiring for the crate's tests.

use std::sync::{Arc, Mutex};

use akigame_core::answer::Normalizer;
use akigame_core::transport::{Channel, ChannelId, ChatTransport, User, UserId};
use akigame_test_support::{
    ChannelTransport, FixedClock, MockRng, OracleCalls, OracleScript, ScriptedOracleFactory,
    TransportProbe,
};

use crate::config::SessionConfig;
use crate::registry::SessionRegistry;
use crate::services::GameServices;

pub(crate) const PLAYER: UserId = UserId(42);
pub(crate) const TABLE: ChannelId = ChannelId(4200);

pub(crate) fn player() -> User {
    User {
        id: PLAYER,
        name: "sam".to_owned(),
        avatar_url: None,
    }
}

pub(crate) fn table() -> Channel {
    Channel {
        id: TABLE,
        nsfw: false,
    }
}

pub(crate) struct Fixture {
    pub services: GameServices,
    pub transport: Arc<ChannelTransport>,
    pub probe: TransportProbe,
    pub calls: Arc<OracleCalls>,
}

pub(crate) fn fixture(script: OracleScript, config: SessionConfig) -> Fixture {
    let (transport, probe) = ChannelTransport::new();
    let factory = ScriptedOracleFactory::new(script);
    let calls = factory.calls();
    let shared: Arc<dyn ChatTransport> = transport.clone();
    let services = GameServices {
        registry: Arc::new(SessionRegistry::new()),
        oracles: Arc::new(factory),
        transport: shared,
        clock: Arc::new(FixedClock::standard()),
        rng: Arc::new(Mutex::new(MockRng)),
        normalizer: Normalizer::english(),
        config,
    };
    Fixture {
        services,
        transport,
        probe,
        calls,
    }
}

/// Waits for each question and answers it with the next reply.
pub(crate) async fn answer(probe: &mut TransportProbe, replies: &[&str]) {
    for reply in replies {
        probe.next_starting_with("Question #").await;
        probe.reply(PLAYER, TABLE, reply);
    }
}
