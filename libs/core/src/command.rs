use crate::session::InboundMessage;

pub const DEFAULT_PING_COMMAND: &str = "!ping";
pub const DEFAULT_PING_REPLY: &str = "pong : ";

/// Single match-and-reply rule for inbound chat messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingCommand {
    command: String,
    reply_prefix: String,
}

impl PingCommand {
    pub fn new(command: impl Into<String>, reply_prefix: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            reply_prefix: reply_prefix.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Reply text for `message`, or `None` when the body is not exactly the
    /// command token. Messages sent by the session itself never match.
    pub fn reply_for(&self, message: &InboundMessage) -> Option<String> {
        if message.from_me || message.body != self.command {
            return None;
        }
        Some(format!("{}{}", self.reply_prefix, message.from))
    }
}

impl Default for PingCommand {
    fn default() -> Self {
        Self::new(DEFAULT_PING_COMMAND, DEFAULT_PING_REPLY)
    }
}
