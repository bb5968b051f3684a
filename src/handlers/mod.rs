//! Message handlers.
//!
//! A handler is one link in the dispatch chain: it gets every parsed
//! message and every timer tick, and reports whether it consumed them.
//! The provided [`Handler::handle_message`] routes on the uppercased
//! command to a per-command method, so most handlers only override the
//! one or two commands they care about.

mod chatlog;
mod core;
mod ratelimit;

pub use chatlog::ChatLogger;
pub use core::CoreHandler;
pub use ratelimit::RateLimiter;

use async_trait::async_trait;

use tmi_proto::{Message, RPL_ENDOFNAMES, RPL_NAMREPLY};

use crate::config::Config;
use crate::connection::{Connection, Stream};
use crate::error::ClientError;

/// A pluggable message/tick handler.
///
/// All methods return `true` when the input was handled, which stops
/// the chain. Handler failures are local: a handler that cannot
/// process a message returns `false` and the message moves on.
#[async_trait]
pub trait Handler<S: Stream>: Send {
    /// Handle the periodic timer tick.
    async fn handle_tick(&mut self, _conn: &mut Connection<S>) -> bool {
        false
    }

    /// Handle a parsed message. The default routes to the per-command
    /// methods below; commands are matched case-insensitively and
    /// numeric replies as their literal digit strings.
    async fn handle_message(&mut self, conn: &mut Connection<S>, msg: &Message) -> bool {
        match msg.command.to_ascii_uppercase().as_str() {
            "PING" => self.handle_ping(conn, msg).await,
            "JOIN" => self.handle_join(conn, msg).await,
            "PART" => self.handle_part(conn, msg).await,
            "MODE" => self.handle_mode(conn, msg).await,
            "PRIVMSG" => self.handle_privmsg(conn, msg).await,
            RPL_NAMREPLY => self.handle_namreply(conn, msg).await,
            RPL_ENDOFNAMES => self.handle_endofnames(conn, msg).await,
            _ => self.handle_default(conn, msg).await,
        }
    }

    /// PING.
    async fn handle_ping(&mut self, _conn: &mut Connection<S>, _msg: &Message) -> bool {
        false
    }

    /// JOIN.
    async fn handle_join(&mut self, _conn: &mut Connection<S>, _msg: &Message) -> bool {
        false
    }

    /// PART.
    async fn handle_part(&mut self, _conn: &mut Connection<S>, _msg: &Message) -> bool {
        false
    }

    /// MODE.
    async fn handle_mode(&mut self, _conn: &mut Connection<S>, _msg: &Message) -> bool {
        false
    }

    /// PRIVMSG.
    async fn handle_privmsg(&mut self, _conn: &mut Connection<S>, _msg: &Message) -> bool {
        false
    }

    /// 353 / RPL_NAMREPLY.
    async fn handle_namreply(&mut self, _conn: &mut Connection<S>, _msg: &Message) -> bool {
        false
    }

    /// 366 / RPL_ENDOFNAMES.
    async fn handle_endofnames(&mut self, _conn: &mut Connection<S>, _msg: &Message) -> bool {
        false
    }

    /// Any command without a specific method.
    async fn handle_default(&mut self, _conn: &mut Connection<S>, _msg: &Message) -> bool {
        false
    }
}

/// Construct a plugin handler by name.
///
/// This is the plugin registry: a compile-time map from name to
/// constructor. Plugins read their own section of the config.
pub fn build_handler<S: Stream>(
    name: &str,
    config: &Config,
) -> Result<Box<dyn Handler<S>>, ClientError> {
    match name {
        "ratelimit" => Ok(Box::new(RateLimiter::from_config(config)?)),
        "chatlog" => Ok(Box::new(ChatLogger::new())),
        _ => Err(ClientError::UnknownPlugin(name.to_owned())),
    }
}
