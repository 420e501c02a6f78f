//! Game domain: commands, the session state machine and its report.

pub mod commands;
pub mod report;
pub mod session;
pub mod state;
