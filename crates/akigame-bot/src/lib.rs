//! akigame chat front-end.
//!
//! Wires the session engine to a chat transport: configuration, the
//! `start`/`cancel`/`status`/`help` command surface, and a console transport
//! for playing from a terminal.

pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod rng;
pub mod state;
