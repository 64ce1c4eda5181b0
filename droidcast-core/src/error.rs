//! Domain-specific error types for the droidcast client.
//!
//! All fallible operations return `Result<T, CastError>`.
//! No panics on invalid input: every error is typed and recoverable;
//! the capture loop catches all of them at the cycle boundary.

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for the droidcast client.
#[derive(Debug, Error)]
pub enum CastError {
    // ── Connection Errors ────────────────────────────────────────
    /// TCP connect (or name resolution) to the bridge daemon failed.
    #[error("failed to connect to bridge daemon: {0}")]
    Connect(#[source] std::io::Error),

    /// The peer closed the connection mid-transfer.
    #[error("connection closed by peer (EOF)")]
    Eof,

    /// The TCP/IO layer reported an error other than EOF.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation exceeded its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The transport was used after it was shut down.
    #[error("transport already closed")]
    Closed,

    // ── Protocol Errors ──────────────────────────────────────────
    /// The service name does not fit in the 4-hex-digit length prefix.
    #[error("service request too long: {len} bytes (max 65535)")]
    RequestTooLong { len: usize },

    /// The framebuffer header version has no known layout.
    #[error("unsupported framebuffer version: {0}")]
    UnsupportedVersion(u32),

    /// A field in the framebuffer header could not be parsed.
    #[error("invalid framebuffer header: {0}")]
    InvalidHeader(&'static str),

    /// A capture-phase transition was attempted out of order.
    #[error("capture phase violation: {0}")]
    PhaseViolation(&'static str),

    // ── Decoding Errors ──────────────────────────────────────────
    /// The header declares a pixel depth the converter cannot decode.
    #[error("unsupported pixel depth: {0} bpp")]
    UnsupportedPixelDepth(u32),

    /// The pixel payload is shorter than the header-declared geometry.
    #[error("framebuffer payload truncated: expected {expected} bytes, got {actual}")]
    PayloadTruncated { expected: usize, actual: usize },

    /// A scale target with a zero dimension.
    #[error("viewport has zero dimension")]
    EmptyViewport,

    // ── Collaborator Errors ──────────────────────────────────────
    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for CastError {
    fn from(s: String) -> Self {
        CastError::Other(s)
    }
}

impl From<&str> for CastError {
    fn from(s: &str) -> Self {
        CastError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = CastError::UnsupportedVersion(99);
        assert!(e.to_string().contains("99"));

        let e = CastError::PayloadTruncated {
            expected: 4,
            actual: 2,
        };
        assert!(e.to_string().contains('4'));
        assert!(e.to_string().contains('2'));
    }

    #[test]
    fn from_string() {
        let e: CastError = "something broke".into();
        assert!(matches!(e, CastError::Other(_)));
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broke");
        let e: CastError = io_err.into();
        assert!(matches!(e, CastError::Io(_)));
    }
}
