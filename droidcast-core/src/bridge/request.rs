//! Smart-socket request codec.
//!
//! Requests to the bridge daemon are ASCII service names framed with a
//! 4-hex-digit length prefix (`0012host:transport-usb`). The daemon
//! answers each request with a fixed 4-byte status, `OKAY` or `FAIL`.

use tracing::trace;

use crate::bridge::transport::BridgeTransport;
use crate::error::CastError;

/// Select the first USB-attached device known to the daemon.
pub const TRANSPORT_USB: &str = "host:transport-usb";

/// Request a framebuffer snapshot from the selected device.
pub const FRAMEBUFFER: &str = "framebuffer:";

// ── ResponseStatus ───────────────────────────────────────────────

/// Outcome of a service request, decoded from the 4-byte wire status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// The daemon accepted the request.
    Okay,
    /// The daemon refused the request (no device, unknown service, …).
    Fail,
}

impl ResponseStatus {
    /// Decode a 4-byte wire status.
    ///
    /// Only bytes 0 and 3 are inspected: `Okay` iff byte 0 is `'O'`
    /// and byte 3 is `'Y'`. The middle bytes are deliberately ignored
    /// for backward compatibility with older daemons, so `OxxY`
    /// decodes as `Okay`. Every non-matching status is `Fail`, a
    /// refusal rather than an error.
    pub fn from_wire(bytes: &[u8; 4]) -> Self {
        if bytes[0] == b'O' && bytes[3] == b'Y' {
            ResponseStatus::Okay
        } else {
            ResponseStatus::Fail
        }
    }

    /// Whether the request was accepted.
    pub fn is_okay(self) -> bool {
        self == ResponseStatus::Okay
    }
}

// ── Request encoding ─────────────────────────────────────────────

/// Frame a service name with its 4-hex-digit length prefix.
///
/// Service names longer than `0xFFFF` bytes cannot be framed; the
/// fixed services this client sends never come close.
pub fn encode_request(service: &str) -> Result<Vec<u8>, CastError> {
    let len = service.len();
    if len > 0xFFFF {
        return Err(CastError::RequestTooLong { len });
    }
    Ok(format!("{len:04X}{service}").into_bytes())
}

/// Encode and send a service request.
pub async fn send_request(
    transport: &mut BridgeTransport,
    service: &str,
) -> Result<(), CastError> {
    let framed = encode_request(service)?;
    trace!(service, "sending bridge request");
    transport.write_all(&framed).await
}

/// Read and decode the daemon's 4-byte status response.
pub async fn read_status(transport: &mut BridgeTransport) -> Result<ResponseStatus, CastError> {
    let bytes = transport.read_exact(4).await?;
    let wire: [u8; 4] = bytes
        .as_slice()
        .try_into()
        .expect("read_exact(4) returned 4 bytes");
    Ok(ResponseStatus::from_wire(&wire))
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_prefixes_hex_length() {
        let framed = encode_request(TRANSPORT_USB).unwrap();
        assert_eq!(framed, b"0012host:transport-usb");

        let framed = encode_request(FRAMEBUFFER).unwrap();
        assert_eq!(framed, b"000Cframebuffer:");
    }

    #[test]
    fn encode_length_is_prefix_plus_body() {
        for service in ["", "a", "host:devices", &"x".repeat(0xFFFF)] {
            let framed = encode_request(service).unwrap();
            assert_eq!(framed.len(), 4 + service.len());
            let prefix = std::str::from_utf8(&framed[..4]).unwrap();
            assert_eq!(usize::from_str_radix(prefix, 16).unwrap(), service.len());
        }
    }

    #[test]
    fn encode_rejects_oversized_service() {
        let service = "y".repeat(0x1_0000);
        let err = encode_request(&service).err().unwrap();
        assert!(matches!(err, CastError::RequestTooLong { len: 0x1_0000 }));
    }

    #[test]
    fn status_checks_only_first_and_fourth_byte() {
        assert!(ResponseStatus::from_wire(b"OKAY").is_okay());
        assert!(ResponseStatus::from_wire(b"OxxY").is_okay());
        assert!(ResponseStatus::from_wire(b"O12Y").is_okay());
        assert!(!ResponseStatus::from_wire(b"OKAX").is_okay());
        assert!(!ResponseStatus::from_wire(b"FAIL").is_okay());
        assert!(!ResponseStatus::from_wire(b"\0\0\0\0").is_okay());
    }
}
