//! akigame: guessing session engine.
//!
//! Runs one question/answer game per user against an oracle, over a chat
//! transport: the session registry, the input wait gate, the question loop
//! and the guess confirmation.

pub mod application;
pub mod config;
pub mod domain;
pub mod gate;
pub mod presenter;
pub mod registry;
pub mod services;

#[cfg(test)]
mod fixtures;
