//! # tmi-proto
//!
//! Protocol library for Twitch-flavored IRC (the dialect spoken by
//! `irc.chat.twitch.tv`): message parsing with IRCv3 tags, line
//! framing, and outbound command formatting.
//!
//! ## Parsing
//!
//! ```rust
//! use tmi_proto::Message;
//!
//! let raw = "@mod=1 :alice!alice@x PRIVMSG #chan :Hello!";
//! let msg: Message = raw.parse().expect("valid IRC line");
//! assert_eq!(msg.sender.as_deref(), Some("alice"));
//! assert_eq!(msg.tag("mod"), Some("1"));
//! ```
//!
//! ## Formatting
//!
//! Outbound commands are plain string builders in [`format`]; the
//! [`LineCodec`] adds the CRLF framing.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod line;
pub mod message;

pub use self::error::{MessageParseError, ProtocolError};
pub use self::line::{LineCodec, MAX_LINE_LEN};
pub use self::message::{
    split_command_body, Message, RPL_ENDOFNAMES, RPL_NAMREPLY, TWITCH_SERVER_USER, WHISPER_CHANNEL,
};
