//! Error types for the protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// A line exceeded the maximum allowed length.
    ///
    /// The offending line has already been consumed from the input
    /// buffer, so decoding may continue with the next line.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Actual line length, excluding the CRLF terminator.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// A line contained invalid UTF-8.
    ///
    /// Like [`ProtocolError::LineTooLong`], the line has been consumed
    /// and decoding is recoverable.
    #[error("invalid utf-8 in line: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// An underlying I/O failure. The codec traits require the error
    /// type to absorb `std::io::Error` so the codec can drive a framed
    /// transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse an IRC message.
    #[error("invalid message: {line:?}")]
    InvalidMessage {
        /// The raw line that failed to parse.
        line: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing IRC messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// A tag segment was present but nothing followed it.
    #[error("unterminated tags segment")]
    UnterminatedTags,

    /// A prefix was present but nothing followed it.
    #[error("unterminated prefix")]
    UnterminatedPrefix,

    /// The line did not split into a command and its arguments.
    #[error("missing command arguments")]
    MissingArguments,
}
