//! Outbound command formatting.
//!
//! Pure string builders for the command shapes the client sends. None
//! of these validate their arguments; malformed values are the
//! caller's responsibility. The CRLF terminator is added by the line
//! codec, not here.

use crate::message::WHISPER_CHANNEL;

/// `CAP REQ :<capability>`
pub fn cap_req(capability: &str) -> String {
    format!("CAP REQ :{capability}")
}

/// `PASS <password>`
pub fn pass(password: &str) -> String {
    format!("PASS {password}")
}

/// `NICK <nickname>`
pub fn nick(nickname: &str) -> String {
    format!("NICK {nickname}")
}

/// `JOIN <channel>`
pub fn join(channel: &str) -> String {
    format!("JOIN {channel}")
}

/// `PART <channel>`
pub fn part(channel: &str) -> String {
    format!("PART {channel}")
}

/// `MODE <channel>` — the empty mode query. Twitch withholds the
/// member list for a joined channel until it sees this.
pub fn mode_query(channel: &str) -> String {
    format!("MODE {channel}")
}

/// `PRIVMSG <target> :<text>`
pub fn privmsg(target: &str, text: &str) -> String {
    format!("PRIVMSG {target} :{text}")
}

/// `PONG <argument>` — echo the PING argument back verbatim.
pub fn pong(argument: &str) -> String {
    format!("PONG {argument}")
}

/// A whisper, encoded as a PRIVMSG to the reserved pseudo-channel:
/// `PRIVMSG #jtv :/w <recipient> <text>`
pub fn whisper(recipient: &str, text: &str) -> String {
    format!("PRIVMSG {WHISPER_CHANNEL} :/w {recipient} {text}")
}
