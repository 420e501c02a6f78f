//! Shared test doubles and utilities for akigame.

mod clock;
mod oracle;
mod rng;
mod transport;

pub use clock::FixedClock;
pub use oracle::{OracleCalls, OracleScript, ScriptedOracle, ScriptedOracleFactory};
pub use rng::{MockRng, SequenceRng};
pub use transport::{ChannelTransport, SentMessage, TransportProbe};
