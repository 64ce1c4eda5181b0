//! # droidcast-core
//!
//! ADB smart-socket client and framebuffer decoder: mirrors the
//! screen of a USB-attached Android device by pulling single
//! framebuffer snapshots from the local ADB daemon.
//!
//! This crate contains:
//! - **Bridge client**: `BridgeTransport`, request framing and status
//!   codec, version-dependent `FramebufferHeader` parsing, and the
//!   `FramebufferSession` handshake orchestrator
//! - **Image pipeline**: mask-driven pixel decoding into
//!   `DisplayImage`, 90° rotation, aspect-preserving scale-to-fit
//! - **Capture loop**: the connect → pull → convert → present cycle
//!   over a `DisplaySurface` collaborator
//! - **Error**: `CastError` — typed, `thiserror`-based error hierarchy

pub mod bridge;
pub mod capture;
pub mod error;
pub mod image;
pub mod surface;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use bridge::{
    AdbVersionTable, BridgeTransport, CapturePhase, ChannelSpec, FramebufferHeader,
    FramebufferSession, RawFrame, ResponseStatus, VersionTable,
};
pub use capture::{CaptureConfig, CaptureLoop};
pub use error::CastError;
pub use image::{DisplayImage, rotate90, scale_to_fit, to_display_image};
pub use surface::{DisplaySurface, Orientation, SurfaceStatus};
