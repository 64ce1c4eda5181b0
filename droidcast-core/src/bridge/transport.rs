//! TCP transport to the bridge daemon.
//!
//! One [`BridgeTransport`] is opened per capture cycle and closed
//! unconditionally at the end of it, whatever the outcome. The daemon
//! speaks a strictly sequential pull protocol, so the transport only
//! needs two primitives: drain a buffer out, read an exact byte count
//! back.
//!
//! An optional per-operation deadline bounds each read/write/connect.
//! With `None` a daemon that never responds and never closes the
//! socket stalls the cycle until the peer gives up.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::trace;

use crate::error::CastError;

/// A duplex byte stream to the bridge daemon, scoped to one cycle.
pub struct BridgeTransport {
    stream: Option<TcpStream>,
    io_timeout: Option<Duration>,
}

impl BridgeTransport {
    /// Connect to the daemon at `host:port`.
    ///
    /// Name resolution and TCP connect failures both surface as
    /// [`CastError::Connect`]. When `io_timeout` is set it also bounds
    /// the connect itself.
    pub async fn connect(
        host: &str,
        port: u16,
        io_timeout: Option<Duration>,
    ) -> Result<Self, CastError> {
        let addr = format!("{host}:{port}");
        let connect = TcpStream::connect(&addr);

        let stream = match io_timeout {
            Some(deadline) => tokio::time::timeout(deadline, connect)
                .await
                .map_err(|_| CastError::Timeout(deadline))?,
            None => connect.await,
        }
        .map_err(CastError::Connect)?;

        stream.set_nodelay(true).map_err(CastError::Connect)?;
        trace!("connected to bridge daemon at {addr}");

        Ok(Self {
            stream: Some(stream),
            io_timeout,
        })
    }

    /// Write the whole buffer to the daemon.
    ///
    /// A peer close mid-write maps to [`CastError::Eof`].
    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<(), CastError> {
        let deadline = self.io_timeout;
        let stream = self.stream.as_mut().ok_or(CastError::Closed)?;
        let io = stream.write_all(bytes);

        match deadline {
            Some(d) => tokio::time::timeout(d, io)
                .await
                .map_err(|_| CastError::Timeout(d))?,
            None => io.await,
        }
        .map_err(map_io)
    }

    /// Read exactly `len` bytes from the daemon.
    ///
    /// Returns [`CastError::Eof`] if the peer closes before `len`
    /// bytes arrive.
    pub async fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, CastError> {
        let deadline = self.io_timeout;
        let stream = self.stream.as_mut().ok_or(CastError::Closed)?;
        let mut buf = vec![0u8; len];
        let io = stream.read_exact(&mut buf);

        match deadline {
            Some(d) => tokio::time::timeout(d, io)
                .await
                .map_err(|_| CastError::Timeout(d))?,
            None => io.await,
        }
        .map_err(map_io)?;

        Ok(buf)
    }

    /// Close the connection. Idempotent, never fails.
    pub async fn shutdown(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            trace!("bridge transport closed");
        }
    }

    /// Whether the transport is still open.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

/// Fold the EOF-shaped error kinds into [`CastError::Eof`].
fn map_io(e: std::io::Error) -> CastError {
    use std::io::ErrorKind;
    match e.kind() {
        ErrorKind::UnexpectedEof
        | ErrorKind::WriteZero
        | ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset => CastError::Eof,
        _ => CastError::Io(e),
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connect_refused_is_connect_error() {
        // Port 1 on loopback is essentially never listening.
        let err = BridgeTransport::connect("127.0.0.1", 1, None)
            .await
            .err()
            .expect("connect should fail");
        assert!(matches!(err, CastError::Connect(_)));
    }

    #[tokio::test]
    async fn read_exact_returns_requested_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(b"OKAYextra").await.unwrap();
        });

        let mut transport = BridgeTransport::connect("127.0.0.1", addr.port(), None)
            .await
            .unwrap();
        let status = transport.read_exact(4).await.unwrap();
        assert_eq!(status, b"OKAY");
        let rest = transport.read_exact(5).await.unwrap();
        assert_eq!(rest, b"extra");
        transport.shutdown().await;
    }

    #[tokio::test]
    async fn peer_close_mid_read_is_eof() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(b"OK").await.unwrap();
            // Drop the socket after two bytes.
        });

        let mut transport = BridgeTransport::connect("127.0.0.1", addr.port(), None)
            .await
            .unwrap();
        let err = transport.read_exact(4).await.err().expect("short read");
        assert!(matches!(err, CastError::Eof));
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_use_after_close_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let mut transport = BridgeTransport::connect("127.0.0.1", addr.port(), None)
            .await
            .unwrap();
        transport.shutdown().await;
        transport.shutdown().await;
        assert!(!transport.is_open());

        let err = transport.read_exact(1).await.err().unwrap();
        assert!(matches!(err, CastError::Closed));
    }

    #[tokio::test]
    async fn silent_peer_hits_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_sock, _) = listener.accept().await.unwrap();
            // Hold the socket open without ever writing.
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut transport =
            BridgeTransport::connect("127.0.0.1", addr.port(), Some(Duration::from_millis(50)))
                .await
                .unwrap();
        let err = transport.read_exact(4).await.err().unwrap();
        assert!(matches!(err, CastError::Timeout(_)));
        transport.shutdown().await;
    }
}
