//! Shared test harness: an in-memory connection with a fake server on
//! the other end of a duplex pipe.

use std::time::Duration;

use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

use tmibot::Connection;

/// The server end of the pipe.
pub struct FakeServer {
    stream: BufReader<DuplexStream>,
}

impl FakeServer {
    /// Send one line to the client, CRLF-terminated.
    pub async fn send_line(&mut self, line: &str) {
        self.stream
            .get_mut()
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .expect("server write");
    }

    /// Read one line the client sent, with the terminator stripped.
    pub async fn expect_line(&mut self) -> String {
        let mut line = String::new();
        self.stream.read_line(&mut line).await.expect("server read");
        line.trim_end_matches(['\r', '\n']).to_owned()
    }
}

/// A connection wired to a [`FakeServer`], with a long liveness window
/// so tests never trip it by accident.
pub fn connected_pair() -> (Connection<DuplexStream>, FakeServer) {
    let (client, server) = duplex(16 * 1024);
    let conn = Connection::from_stream(client, Duration::from_secs(600), false);
    (
        conn,
        FakeServer {
            stream: BufReader::new(server),
        },
    )
}
