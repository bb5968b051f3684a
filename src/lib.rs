//! tmibot - a Twitch chat bot built on a pluggable handler chain.
//!
//! The `tmi-proto` crate handles the wire format; this crate owns the
//! connection, the membership table, the dispatch chain, and the
//! bundled handlers.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod handlers;
pub mod user;

pub use client::{Client, DispatchChain};
pub use config::{Config, ConnectionConfig};
pub use connection::{Connection, Stream};
pub use error::{ClientError, ReadError};
pub use events::{EventId, EventIndex};
pub use user::{ModeChangeError, User};
