//! Owned IRC message type and parsing.
//!
//! Twitch speaks a tagged subset of IRC: an optional `@`-prefixed tag
//! segment, an optional `:`-prefixed source, a command, and everything
//! after the first following space as the raw argument string. Commands
//! keep their arguments unsplit because most handlers only care about
//! the first token anyway.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};

/// Numeric reply carrying one chunk of a channel member list.
pub const RPL_NAMREPLY: &str = "353";

/// Numeric reply terminating a member list sequence.
pub const RPL_ENDOFNAMES: &str = "366";

/// The synthetic user Twitch sends server-side notices (MODE changes) as.
pub const TWITCH_SERVER_USER: &str = "jtv";

/// Pseudo-channel used to route whispers through PRIVMSG.
pub const WHISPER_CHANNEL: &str = "#jtv";

/// An owned, parsed IRC message.
///
/// # Example
///
/// ```
/// use tmi_proto::Message;
///
/// let msg: Message = ":alice!alice@x PRIVMSG #chan :hello".parse().unwrap();
/// assert_eq!(msg.sender.as_deref(), Some("alice"));
/// assert_eq!(msg.command, "PRIVMSG");
/// assert_eq!(msg.command_args, "#chan :hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// IRCv3 message tags. Empty when the line carried no tag segment.
    pub tags: HashMap<String, String>,
    /// Message prefix without the leading `:`, if present.
    pub prefix: Option<String>,
    /// Nickname part of the prefix (everything before the first `!`),
    /// trimmed. `None` when there is no prefix or the nickname is empty.
    pub sender: Option<String>,
    /// The IRC command, or a numeric reply as its literal digit string.
    pub command: String,
    /// Everything after the command, unsplit.
    pub command_args: String,
}

impl Message {
    /// Look up a tag value by name.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let raw = s.trim_end_matches(['\r', '\n']);
        parse(raw).map_err(|cause| ProtocolError::InvalidMessage {
            line: raw.to_owned(),
            cause,
        })
    }
}

/// Parse one line into a [`Message`], strictly left to right, splitting
/// on the first space at each step.
fn parse(raw: &str) -> Result<Message, MessageParseError> {
    if raw.is_empty() {
        return Err(MessageParseError::EmptyMessage);
    }

    let mut rest = raw;

    let tag_segment = if let Some(stripped) = rest.strip_prefix('@') {
        let (segment, remainder) = stripped
            .split_once(' ')
            .ok_or(MessageParseError::UnterminatedTags)?;
        rest = remainder;
        Some(segment)
    } else {
        None
    };

    let mut prefix = None;
    if let Some(stripped) = rest.strip_prefix(':') {
        let (p, remainder) = stripped
            .split_once(' ')
            .ok_or(MessageParseError::UnterminatedPrefix)?;
        prefix = Some(p);
        rest = remainder;
    }

    let (command, command_args) = match rest.split_once(' ') {
        Some((command, args)) => (command, args),
        // A prefixed line may legitimately end right after the command
        // (Twitch sends e.g. ":bot!bot@x JOIN" style lines on other
        // networks); without a prefix a lone token is malformed.
        None if prefix.is_some() => (rest, ""),
        None => return Err(MessageParseError::MissingArguments),
    };

    let mut tags = HashMap::new();
    if let Some(segment) = tag_segment {
        // Semicolon separated name=value pairs; a pair with no `=`
        // yields an empty value, later duplicates overwrite.
        for pair in segment.split(';').filter(|p| !p.is_empty()) {
            match pair.split_once('=') {
                Some((name, value)) => tags.insert(name.to_owned(), value.to_owned()),
                None => tags.insert(pair.to_owned(), String::new()),
            };
        }
    }

    let sender = prefix
        .map(|p| p.split('!').next().unwrap_or("").trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned);

    Ok(Message {
        tags,
        prefix: prefix.map(str::to_owned),
        sender,
        command: command.to_owned(),
        command_args: command_args.to_owned(),
    })
}

/// Split a PRIVMSG-style argument string into `(target, body)`.
///
/// Strips a single leading `:` from the body. Returns `None` when the
/// arguments do not contain a body; callers are expected to log and
/// skip such messages.
pub fn split_command_body(msg: &Message) -> Option<(&str, &str)> {
    let (target, body) = msg.command_args.split_once(' ')?;
    Some((target, body.strip_prefix(':').unwrap_or(body)))
}
