//! ADB smart-socket client.
//!
//! ```text
//! CaptureLoop                          ADB daemon (127.0.0.1:5037)
//! ┌─────────────────────────┐          ┌──────────────────────────┐
//! │ BridgeTransport::connect│ ───TCP──►│                          │
//! │ "host:transport-usb"    │ ───────► │ selects first USB device │
//! │                         │ ◄─────── │ OKAY / FAIL              │
//! │ "framebuffer:"          │ ───────► │                          │
//! │                         │ ◄─────── │ OKAY + version + header  │
//! │ nudge (1 zero byte)     │ ───────► │                          │
//! │                         │ ◄─────── │ raw pixel payload        │
//! └─────────────────────────┘          └──────────────────────────┘
//! ```
//!
//! | Module        | Purpose                                         |
//! |-------------- |-------------------------------------------------|
//! | `transport`   | Per-cycle TCP stream with exact-length I/O      |
//! | `request`     | Hex-length request framing, 4-byte status codec |
//! | `framebuffer` | Version table, header parsing, payload read     |
//! | `session`     | Capture phase machine + handshake orchestrator  |

pub mod framebuffer;
pub mod request;
pub mod session;
pub mod transport;

// ── Re-exports ───────────────────────────────────────────────────

pub use framebuffer::{
    AdbVersionTable, ChannelSpec, FramebufferHeader, RawFrame, VersionTable,
};
pub use request::{FRAMEBUFFER, ResponseStatus, TRANSPORT_USB};
pub use session::{CapturePhase, FramebufferSession};
pub use transport::BridgeTransport;
