//! Client for the remote guessing oracle.
//!
//! Implements the [`akigame_core::oracle::Oracle`] port over the service's
//! JSON-over-GET protocol, plus the table of supported languages.

pub mod client;
pub mod language;
mod wire;

pub use client::{DEFAULT_REQUEST_TIMEOUT, HttpOracle, HttpOracleFactory};
pub use language::{Language, Theme};
