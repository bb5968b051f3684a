//! Chat message logging.

use async_trait::async_trait;
use tracing::info;

use tmi_proto::{split_command_body, Message};

use crate::connection::{Connection, Stream};

use super::Handler;

/// Logs every PRIVMSG. Never handles anything, so it can sit anywhere
/// in the chain.
#[derive(Debug, Default)]
pub struct ChatLogger;

impl ChatLogger {
    /// Create the logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<S: Stream> Handler<S> for ChatLogger {
    async fn handle_privmsg(&mut self, _conn: &mut Connection<S>, msg: &Message) -> bool {
        if let Some((target, text)) = split_command_body(msg) {
            info!(
                sender = msg.sender.as_deref().unwrap_or("?"),
                target, text, "chat"
            );
        }
        false
    }
}
