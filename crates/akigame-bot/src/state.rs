//! Shared application state.

use std::sync::{Arc, Mutex};

use akigame_core::answer::Normalizer;
use akigame_core::clock::{Clock, SystemClock};
use akigame_core::oracle::OracleFactory;
use akigame_core::rng::DeterministicRng;
use akigame_core::transport::{ChannelId, ChatTransport};
use akigame_session::registry::SessionRegistry;
use akigame_session::services::GameServices;

use crate::config::BotConfig;
use crate::rng::SystemRng;

/// Application state shared by every command.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Collaborators handed to the session engine.
    pub services: GameServices,
    /// Process configuration.
    pub config: Arc<BotConfig>,
}

impl AppState {
    /// Creates application state with the system clock and an OS-seeded RNG.
    #[must_use]
    pub fn new(
        config: BotConfig,
        oracles: Arc<dyn OracleFactory>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self::with_parts(
            config,
            oracles,
            transport,
            Arc::new(SystemClock),
            Arc::new(Mutex::new(SystemRng::from_os())),
        )
    }

    /// Creates application state from explicit parts.
    #[must_use]
    pub fn with_parts(
        config: BotConfig,
        oracles: Arc<dyn OracleFactory>,
        transport: Arc<dyn ChatTransport>,
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn DeterministicRng>>,
    ) -> Self {
        let services = GameServices {
            registry: Arc::new(SessionRegistry::new()),
            oracles,
            transport,
            clock,
            rng,
            normalizer: Normalizer::english(),
            config: config.session.clone(),
        };
        Self {
            services,
            config: Arc::new(config),
        }
    }

    /// Whether games are refused in `channel`.
    #[must_use]
    pub fn is_blocked(&self, channel: ChannelId) -> bool {
        self.config.blocked_channels.contains(&channel)
    }
}
