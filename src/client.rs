//! Dispatch chain and the client run loop.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use tmi_proto::Message;

use crate::config::Config;
use crate::connection::{Connection, Stream};
use crate::error::{ClientError, ReadError};
use crate::handlers::{build_handler, CoreHandler, Handler};

/// How often [`Handler::handle_tick`] fires.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// An ordered list of handlers with first-match-wins dispatch.
///
/// The core handler always sits at the front, so protocol housekeeping
/// (PONGs, membership updates) happens before any plugin sees a
/// message.
pub struct DispatchChain<S> {
    handlers: Vec<Box<dyn Handler<S>>>,
}

impl<S: Stream> DispatchChain<S> {
    /// Build a chain of [`CoreHandler`] followed by the given plugins.
    pub fn new(plugins: Vec<Box<dyn Handler<S>>>) -> Self {
        let mut handlers: Vec<Box<dyn Handler<S>>> = vec![Box::new(CoreHandler::new())];
        handlers.extend(plugins);
        Self { handlers }
    }

    /// Build the chain from the `[general] plugins` list.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let plugins = config
            .general
            .plugins
            .iter()
            .map(|name| build_handler(name, config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(plugins))
    }

    /// Offer the message to each handler in order, stopping at the
    /// first that handles it.
    pub async fn handle_message(&mut self, conn: &mut Connection<S>, msg: &Message) -> bool {
        for handler in &mut self.handlers {
            if handler.handle_message(conn, msg).await {
                return true;
            }
        }
        false
    }

    /// Offer the tick to each handler in order.
    pub async fn handle_tick(&mut self, conn: &mut Connection<S>) -> bool {
        for handler in &mut self.handlers {
            if handler.handle_tick(conn).await {
                return true;
            }
        }
        false
    }
}

/// The IRC client: reads lines, parses them, and dispatches messages
/// and timer ticks through the chain.
pub struct Client<S> {
    conn: Connection<S>,
    chain: DispatchChain<S>,
}

impl<S: Stream> Client<S> {
    /// Pair a connection with a dispatch chain.
    pub fn new(conn: Connection<S>, chain: DispatchChain<S>) -> Self {
        Self { conn, chain }
    }

    /// Run until the connection closes.
    ///
    /// Ticks fire on a fixed 1-second cadence; between ticks the loop
    /// blocks in [`Connection::read_next_line`]. Read timeouts retry,
    /// unparsable lines are dropped with a logged error, and a closed
    /// connection ends the loop.
    pub async fn run(&mut self) -> Result<(), ClientError> {
        let mut next_tick = Instant::now() + TICK_INTERVAL;
        loop {
            let now = Instant::now();
            if now >= next_tick {
                self.chain.handle_tick(&mut self.conn).await;
                next_tick += TICK_INTERVAL;
                continue;
            }

            let line = match self.conn.read_next_line(next_tick - now).await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("connection closed, stopping");
                    return Ok(());
                }
                Err(ReadError::Timeout) => continue,
                Err(ReadError::Io(err)) => return Err(ClientError::Io(err)),
            };

            match line.parse::<Message>() {
                Ok(msg) => {
                    self.chain.handle_message(&mut self.conn, &msg).await;
                }
                Err(err) => {
                    warn!(error = %err, "skipping invalid line");
                }
            }
        }
    }
}
