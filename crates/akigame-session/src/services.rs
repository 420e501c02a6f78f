//! Collaborators shared by every game.

use std::sync::{Arc, Mutex};

use akigame_core::answer::Normalizer;
use akigame_core::clock::Clock;
use akigame_core::oracle::OracleFactory;
use akigame_core::rng::DeterministicRng;
use akigame_core::transport::ChatTransport;

use crate::config::SessionConfig;
use crate::registry::SessionRegistry;

/// Everything a game needs besides its own command.
#[derive(Clone)]
pub struct GameServices {
    /// Running sessions.
    pub registry: Arc<SessionRegistry>,
    /// Creates one oracle client per game.
    pub oracles: Arc<dyn OracleFactory>,
    /// Chat platform.
    pub transport: Arc<dyn ChatTransport>,
    /// Timestamps for transcripts.
    pub clock: Arc<dyn Clock>,
    /// Cosmetic randomness.
    pub rng: Arc<Mutex<dyn DeterministicRng>>,
    /// Answer vocabulary.
    pub normalizer: Normalizer,
    /// Session tunables.
    pub config: SessionConfig,
}

impl std::fmt::Debug for GameServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameServices")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
