//! Protocol housekeeping: PING replies, membership updates, MODE
//! application, member-list assembly, and per-user tag caching.

use async_trait::async_trait;
use tracing::{error, info, warn};

use tmi_proto::{Message, TWITCH_SERVER_USER};

use crate::connection::{Connection, Stream};
use crate::user::User;

use super::Handler;

/// The always-present first handler in every dispatch chain.
///
/// Everything here is channel-scoped: messages for any channel other
/// than the connection's are logged and ignored, with no state change.
#[derive(Debug, Default)]
pub struct CoreHandler {
    /// Member list being accumulated across a 353 sequence; `None`
    /// outside a sequence.
    pending_names: Option<Vec<String>>,
}

impl CoreHandler {
    /// Create the handler with no pending member list.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<S: Stream> Handler<S> for CoreHandler {
    async fn handle_ping(&mut self, conn: &mut Connection<S>, msg: &Message) -> bool {
        if let Err(err) = conn.send_pong(&msg.command_args).await {
            error!(error = %err, "failed to send PONG");
        }
        true
    }

    async fn handle_join(&mut self, conn: &mut Connection<S>, msg: &Message) -> bool {
        let Some(sender) = msg.sender.as_deref() else {
            warn!(?msg, "[JOIN] unexpected message format");
            return false;
        };
        if Some(msg.command_args.as_str()) != conn.channel() {
            warn!(channel = %msg.command_args, "[JOIN] received for another channel");
            return false;
        }
        if conn.user_list().contains_key(sender) {
            warn!(user = %sender, "[JOIN] user already part of channel");
            return false;
        }
        conn.user_list_mut()
            .insert(sender.to_owned(), User::new(sender));
        info!(user = %sender, channel = %msg.command_args, "[JOIN] user joined");
        true
    }

    async fn handle_part(&mut self, conn: &mut Connection<S>, msg: &Message) -> bool {
        let Some(sender) = msg.sender.as_deref() else {
            warn!(?msg, "[PART] unexpected message format");
            return false;
        };
        if Some(msg.command_args.as_str()) != conn.channel() {
            warn!(channel = %msg.command_args, "[PART] received for another channel");
            return false;
        }
        if conn.user_list_mut().remove(sender).is_none() {
            warn!(user = %sender, "[PART] user not part of channel");
            return false;
        }
        info!(user = %sender, channel = %msg.command_args, "[PART] user left");
        true
    }

    async fn handle_mode(&mut self, conn: &mut Connection<S>, msg: &Message) -> bool {
        // Twitch only ever sends moderator MODE changes as "jtv", with
        // exactly "<channel> <delta> <user>" as arguments.
        let parts: Vec<&str> = msg.command_args.split_whitespace().collect();
        if msg.sender.as_deref() != Some(TWITCH_SERVER_USER) || parts.len() != 3 {
            warn!(?msg, "[MODE] unexpected message format");
            return false;
        }
        let (channel, delta, target) = (parts[0], parts[1], parts[2]);
        if Some(channel) != conn.channel() {
            warn!(channel = %channel, "[MODE] received for another channel");
            return false;
        }
        let Some(user) = conn.user_list_mut().get_mut(target) else {
            warn!(user = %target, "[MODE] user not part of channel");
            return false;
        };
        if let Err(err) = user.apply_mode_delta(delta) {
            warn!(user = %target, error = %err, "[MODE] rejected mode change");
            return false;
        }
        info!(user = %target, delta = %delta, channel = %channel, "[MODE] user mode updated");
        true
    }

    async fn handle_namreply(&mut self, conn: &mut Connection<S>, msg: &Message) -> bool {
        // The first 353 opens a new sequence. This happens before
        // validation: a malformed 353 aborts, but the sequence keeps
        // accumulating from later well-formed ones.
        let pending = self.pending_names.get_or_insert_with(Vec::new);

        let Some(channel) = conn.channel() else {
            error!(?msg, "[NAMES] 353 with no joined channel");
            return false;
        };
        let suffix = format!("{channel} ");
        let valid = msg
            .command_args
            .split_once(':')
            .filter(|(head, _)| head.ends_with(&suffix));
        let Some((_, names)) = valid else {
            error!(?msg, "[NAMES] invalid 353 message format");
            return false;
        };

        // Names may carry a leading @/+ status prefix; Twitch does not
        // use the feature, strip and ignore it.
        pending.extend(
            names
                .split(' ')
                .filter(|name| !name.is_empty())
                .map(|name| name.trim_start_matches(['@', '+']).to_owned()),
        );
        true
    }

    async fn handle_endofnames(&mut self, conn: &mut Connection<S>, _msg: &Message) -> bool {
        let Some(names) = self.pending_names.take() else {
            error!("[NAMES] unexpected 366/RPL_ENDOFNAMES without a preceding 353/RPL_NAMREPLY");
            return false;
        };
        conn.update_user_list(names);
        true
    }

    async fn handle_privmsg(&mut self, conn: &mut Connection<S>, msg: &Message) -> bool {
        let Some(sender) = msg.sender.as_deref() else {
            return false;
        };
        if msg.tags.is_empty() {
            return false;
        }

        if !conn.user_list().contains_key(sender) {
            warn!(user = %sender, channel = ?conn.channel(), "[PRIVMSG] user not part of channel");
            conn.user_list_mut()
                .insert(sender.to_owned(), User::new(sender));
        }
        if let Some(user) = conn.user_list_mut().get_mut(sender) {
            user.merge_tags(&msg.tags);
        }

        // Let other handlers fully handle the PRIVMSG.
        false
    }
}
