//! IRC connection: socket ownership, line framing, the login
//! handshake, liveness tracking, and channel membership state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, error, info, warn};

use tmi_proto::{format, LineCodec, ProtocolError};

use crate::config::ConnectionConfig;
use crate::error::ReadError;
use crate::user::User;

/// Capabilities requested on every connection. Twitch gates command
/// echo, JOIN/PART notifications, and message tags behind these.
const CAPABILITIES: [&str; 3] = [
    "twitch.tv/commands",
    "twitch.tv/membership",
    "twitch.tv/tags",
];

/// Read chunk size.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Bound on streams the connection can run over. Production code uses
/// [`TcpStream`]; tests connect over an in-memory duplex pair.
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

/// A live connection to the chat server.
///
/// Owns the socket, the input buffer, the liveness deadline, and the
/// membership table for the single joined channel. All mutation happens
/// on the task running the dispatch loop; nothing here is shared.
pub struct Connection<S = TcpStream> {
    stream: S,
    codec: LineCodec,
    buf: BytesMut,
    /// False once the peer closed or reset the read side.
    read_open: bool,
    activity_timeout: Duration,
    /// Absolute time after which, absent new input, the connection is
    /// considered dead.
    deadline: Instant,
    log_traffic: bool,
    channel: Option<String>,
    users: HashMap<String, User>,
}

impl Connection<TcpStream> {
    /// Open a TCP connection and run the login handshake.
    pub async fn connect(config: &ConnectionConfig) -> std::io::Result<Self> {
        let stream = TcpStream::connect((config.host.as_str(), config.port)).await?;
        debug!(host = %config.host, port = config.port, "connected");
        let mut conn = Self::from_stream(
            stream,
            Duration::from_secs(config.activity_timeout),
            config.log_traffic,
        );
        conn.login(
            &config.nickname,
            config.channel.as_deref(),
            config.password.as_deref(),
        )
        .await?;
        Ok(conn)
    }
}

impl<S: Stream> Connection<S> {
    /// Wrap an already-connected stream.
    pub fn from_stream(stream: S, activity_timeout: Duration, log_traffic: bool) -> Self {
        Self {
            stream,
            codec: LineCodec::new(),
            buf: BytesMut::with_capacity(READ_BUFFER_SIZE),
            read_open: true,
            activity_timeout,
            deadline: Instant::now() + activity_timeout,
            log_traffic,
            channel: None,
            users: HashMap::new(),
        }
    }

    /// Request capabilities, authenticate, and join the configured
    /// channel, if any.
    pub async fn login(
        &mut self,
        nickname: &str,
        channel: Option<&str>,
        password: Option<&str>,
    ) -> std::io::Result<()> {
        self.deadline = Instant::now() + self.activity_timeout;
        for cap in CAPABILITIES {
            self.send_raw(&format::cap_req(cap)).await?;
        }
        if let Some(password) = password {
            self.send_pass(password).await?;
        }
        self.send_nick(nickname).await?;
        if let Some(channel) = channel {
            self.join_channel(channel).await?;
            debug!(channel, "joined");
        }
        Ok(())
    }

    /// Write one raw line, appending CRLF. Fire and forget: there is no
    /// send queue, and a write failure propagates as a connection error.
    pub async fn send_raw(&mut self, text: &str) -> std::io::Result<()> {
        if self.log_traffic {
            debug!("< {}", text);
        }
        let mut out = BytesMut::with_capacity(text.len() + 2);
        self.codec
            .encode(text, &mut out)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        self.stream.write_all(&out).await?;
        self.stream.flush().await
    }

    /// `PONG <argument>` — answer a server PING.
    pub async fn send_pong(&mut self, argument: &str) -> std::io::Result<()> {
        self.send_raw(&format::pong(argument)).await
    }

    /// Send a chat message to a channel.
    pub async fn send_message(&mut self, channel: &str, text: &str) -> std::io::Result<()> {
        self.send_raw(&format::privmsg(channel, text)).await
    }

    /// Send a whisper (a PRIVMSG routed through the `#jtv`
    /// pseudo-channel).
    pub async fn send_whisper(&mut self, recipient: &str, text: &str) -> std::io::Result<()> {
        self.send_raw(&format::whisper(recipient, text)).await
    }

    /// `NICK <nickname>`
    pub async fn send_nick(&mut self, nickname: &str) -> std::io::Result<()> {
        self.send_raw(&format::nick(nickname)).await
    }

    /// `PASS <password>`
    pub async fn send_pass(&mut self, password: &str) -> std::io::Result<()> {
        self.send_raw(&format::pass(password)).await
    }

    /// Join a channel and record it as the connection's channel. Also
    /// sends the empty MODE query; Twitch waits for it before sending
    /// the member list.
    pub async fn join_channel(&mut self, channel: &str) -> std::io::Result<()> {
        self.send_raw(&format::join(channel)).await?;
        self.channel = Some(channel.to_owned());
        self.send_raw(&format::mode_query(channel)).await
    }

    /// `PART <channel>`
    pub async fn part_channel(&mut self, channel: &str) -> std::io::Result<()> {
        self.send_raw(&format::part(channel)).await
    }

    /// The joined channel, if any.
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// The channel membership table, keyed by username.
    pub fn user_list(&self) -> &HashMap<String, User> {
        &self.users
    }

    /// Mutable access to the membership table. Only the core handler
    /// mutates it outside of [`Connection::update_user_list`].
    pub fn user_list_mut(&mut self) -> &mut HashMap<String, User> {
        &mut self.users
    }

    /// Replace the membership table wholesale with the given names,
    /// preserving any already-known [`User`] state for names that
    /// persist.
    pub fn update_user_list(&mut self, names: Vec<String>) {
        let mut new_list = HashMap::with_capacity(names.len());
        for name in names {
            info!(user = %name, channel = ?self.channel, "[NAMES] user joined");
            let user = self
                .users
                .remove(&name)
                .unwrap_or_else(|| User::new(name.clone()));
            new_list.insert(name, user);
        }
        self.users = new_list;
    }

    /// Read the next complete line.
    ///
    /// Returns `Ok(Some(line))` when a CRLF-terminated line is
    /// available within `timeout`; `Err(ReadError::Timeout)` when the
    /// call deadline passes (the connection stays open; callers retry);
    /// `Ok(None)` when the peer closed or reset the socket, or the
    /// liveness deadline expired with no inbound bytes. Buffered
    /// complete lines are drained before a close is reported.
    ///
    /// Oversized and non-UTF-8 lines are dropped with a logged error
    /// and reading continues.
    pub async fn read_next_line(&mut self, timeout: Duration) -> Result<Option<String>, ReadError> {
        let call_deadline = Instant::now() + timeout;

        loop {
            // Drain any complete line already buffered.
            loop {
                match self.codec.decode(&mut self.buf) {
                    Ok(Some(line)) => {
                        if self.log_traffic {
                            debug!("> {}", line);
                        }
                        return Ok(Some(line));
                    }
                    Ok(None) => break,
                    // The codec consumed the bad line; keep going.
                    Err(ProtocolError::LineTooLong { actual, limit }) => {
                        error!(actual, limit, "dropping oversized line");
                    }
                    Err(err) => {
                        error!(error = %err, "dropping undecodable line");
                    }
                }
            }

            if !self.read_open {
                info!("connection closed");
                return Ok(None);
            }

            let now = Instant::now();
            if now >= self.deadline {
                error!("connection timed out, closing");
                self.read_open = false;
                return Ok(None);
            }
            if now >= call_deadline {
                return Err(ReadError::Timeout);
            }

            // Wait for more data, but never past either deadline.
            let wait = call_deadline.min(self.deadline) - now;
            match tokio::time::timeout(wait, self.stream.read_buf(&mut self.buf)).await {
                // Woke up to re-check the deadlines.
                Err(_elapsed) => continue,
                Ok(Ok(0)) => {
                    self.read_open = false;
                }
                Ok(Ok(_)) => {
                    // Got some bytes, reset the liveness deadline.
                    self.deadline = Instant::now() + self.activity_timeout;
                }
                Ok(Err(err)) if err.kind() == std::io::ErrorKind::ConnectionReset => {
                    warn!("connection reset by peer");
                    self.read_open = false;
                }
                Ok(Err(err)) => return Err(ReadError::Io(err)),
            }
        }
    }
}
