//! Commands accepted by the game.

use akigame_core::command::Command;
use akigame_core::transport::{Channel, User, UserId};
use uuid::Uuid;

/// Start a game for `user` in `channel`.
#[derive(Debug, Clone)]
pub struct StartGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user: User,
    /// Where the game runs.
    pub channel: Channel,
    /// Language given with the command. `None` means the player is asked.
    pub language: Option<String>,
}

impl Command for StartGame {
    fn command_type(&self) -> &'static str {
        "game.start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn issued_by(&self) -> UserId {
        self.user.id
    }
}

/// Cancel the running game of `user_id`.
#[derive(Debug, Clone)]
pub struct CancelGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player whose game to cancel.
    pub user_id: UserId,
}

impl Command for CancelGame {
    fn command_type(&self) -> &'static str {
        "game.cancel"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn issued_by(&self) -> UserId {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use akigame_core::transport::{ChannelId, UserId};

    use super::*;

    #[test]
    fn test_commands_report_type_and_issuer() {
        let start = StartGame {
            correlation_id: Uuid::new_v4(),
            user: User {
                id: UserId(3),
                name: "kim".to_owned(),
                avatar_url: None,
            },
            channel: Channel {
                id: ChannelId(9),
                nsfw: false,
            },
            language: None,
        };
        let cancel = CancelGame {
            correlation_id: Uuid::new_v4(),
            user_id: UserId(3),
        };

        assert_eq!(start.command_type(), "game.start");
        assert_eq!(start.issued_by(), UserId(3));
        assert_eq!(cancel.command_type(), "game.cancel");
        assert_eq!(cancel.issued_by(), UserId(3));
    }
}
