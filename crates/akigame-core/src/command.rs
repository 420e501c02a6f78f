//! User command abstractions.

use uuid::Uuid;

use crate::transport::UserId;

/// A command issued by a chat user.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the logs.
    fn correlation_id(&self) -> Uuid;

    /// The user who issued the command.
    fn issued_by(&self) -> UserId;
}
