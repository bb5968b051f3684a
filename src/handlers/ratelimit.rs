//! Rate limiting for incoming chat messages.
//!
//! Tracks recent PRIVMSGs in two time-windowed indexes, keyed by
//! sender and by message text. A message over either limit is swallowed
//! (handled) so nothing later in the chain reacts to it; everything
//! else is recorded and passed on.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use tmi_proto::{split_command_body, Message};

use crate::config::Config;
use crate::connection::{Connection, Stream};
use crate::error::ClientError;
use crate::events::EventIndex;

use super::Handler;

/// `[ratelimit]` section.
#[derive(Debug, Clone, Deserialize)]
struct RateLimitConfig {
    /// Window length in seconds.
    max_age: u64,
    /// Maximum messages per sender within the window.
    rate_per_sender: Option<usize>,
    /// Maximum identical message texts within the window.
    rate_per_text: Option<usize>,
    /// Only messages matching this pattern (anchored at the start of
    /// the text) are rate limited.
    text_filter: Option<String>,
    /// Log accept/reject decisions at debug level.
    #[serde(default)]
    debug: bool,
}

/// Handler that limits the rate of incoming PRIVMSGs.
pub struct RateLimiter {
    by_sender: EventIndex<String>,
    by_text: EventIndex<String>,
    rate_per_sender: Option<usize>,
    rate_per_text: Option<usize>,
    text_filter: Option<Regex>,
    debug: bool,
}

impl RateLimiter {
    /// Build from the `[ratelimit]` config section.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let plugin_error = |reason: String| ClientError::PluginConfig {
            name: "ratelimit".to_owned(),
            reason,
        };

        let section = config
            .plugin_section("ratelimit")
            .ok_or_else(|| plugin_error("missing [ratelimit] section".to_owned()))?;
        let cfg: RateLimitConfig = section
            .clone()
            .try_into()
            .map_err(|err: toml::de::Error| plugin_error(err.to_string()))?;

        let text_filter = cfg
            .text_filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|err| plugin_error(format!("bad text_filter: {err}")))?;

        let window = Duration::from_secs(cfg.max_age);
        Ok(Self {
            by_sender: EventIndex::new(window),
            by_text: EventIndex::new(window),
            rate_per_sender: cfg.rate_per_sender,
            rate_per_text: cfg.rate_per_text,
            text_filter,
            debug: cfg.debug,
        })
    }

    fn log_decision(&self, decision: &str, sender: &str, text: &str) {
        if self.debug {
            debug!(sender, text, "ratelimit {}", decision);
        }
    }

    /// Whether the text is subject to limiting. With no filter
    /// configured everything is; with one, only texts it matches at
    /// position zero (the way Python's `re.match` anchors).
    fn applies_to(&self, text: &str) -> bool {
        match &self.text_filter {
            None => true,
            Some(filter) => filter.find(text).is_some_and(|m| m.start() == 0),
        }
    }
}

#[async_trait]
impl<S: Stream> Handler<S> for RateLimiter {
    async fn handle_privmsg(&mut self, _conn: &mut Connection<S>, msg: &Message) -> bool {
        let Some((_target, text)) = split_command_body(msg) else {
            warn!(?msg, "got invalid PRIVMSG");
            return false;
        };
        if text.is_empty() {
            warn!(?msg, "got invalid PRIVMSG");
            return false;
        }
        let sender = msg.sender.clone().unwrap_or_default();
        let text = text.to_owned();

        if !self.applies_to(&text) {
            return false;
        }

        if let Some(limit) = self.rate_per_sender {
            if self.by_sender.count_by_payload(&sender) >= limit {
                self.log_decision("REJECT:sender-over-limit", &sender, &text);
                return true;
            }
        }
        if let Some(limit) = self.rate_per_text {
            if self.by_text.count_by_payload(&text) >= limit {
                self.log_decision("REJECT:text-over-limit", &sender, &text);
                return true;
            }
        }

        self.log_decision("PASS", &sender, &text);
        self.by_sender.record(sender);
        self.by_text.record(text);
        false
    }
}
