//! akigame core: shared domain abstractions.
//!
//! Defines the answer vocabulary, the oracle and chat transport ports, the
//! error taxonomy and the transcript events that every other crate builds
//! on. It contains no infrastructure code.

pub mod answer;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod oracle;
pub mod rng;
pub mod transport;
