//! Per-cycle capture session: phase state machine plus the handshake
//! orchestrator.
//!
//! ```text
//!  Disconnected ──► TargetSelected ──► FramebufferRequested
//!                                              │
//!       Done ◄── PayloadRead ◄── HeaderRead ◄──┘
//!
//!  (any read/write failure ──► Failed)
//! ```
//!
//! A session owns its transport for exactly one capture cycle. The
//! caller shuts it down unconditionally at the end of the cycle,
//! whatever the outcome.

use tracing::{debug, trace};

use crate::bridge::framebuffer::{
    self, AdbVersionTable, FramebufferHeader, RawFrame, VersionTable,
};
use crate::bridge::request::{self, FRAMEBUFFER, TRANSPORT_USB};
use crate::bridge::transport::BridgeTransport;
use crate::error::CastError;

// ── CapturePhase ─────────────────────────────────────────────────

/// The current phase of one capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePhase {
    /// Transport open, nothing requested yet. Initial state.
    #[default]
    Disconnected,

    /// `host:transport-usb` accepted; a device is attached.
    TargetSelected,

    /// `framebuffer:` accepted; header bytes are in flight.
    FramebufferRequested,

    /// Header fully parsed; daemon is waiting for the nudge.
    HeaderRead,

    /// Pixel payload fully received.
    PayloadRead,

    /// Cycle complete. Terminal state.
    Done,

    /// A read/write failed mid-cycle. Terminal state.
    Failed,
}

impl std::fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Disconnected => "Disconnected",
            Self::TargetSelected => "TargetSelected",
            Self::FramebufferRequested => "FramebufferRequested",
            Self::HeaderRead => "HeaderRead",
            Self::PayloadRead => "PayloadRead",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };
        write!(f, "{name}")
    }
}

impl CapturePhase {
    /// Whether the cycle reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Valid from: `Disconnected`.
    pub fn select_target(&mut self) -> Result<(), CastError> {
        match self {
            Self::Disconnected => {
                *self = Self::TargetSelected;
                Ok(())
            }
            _ => Err(CastError::PhaseViolation(
                "cannot select target: cycle already past Disconnected",
            )),
        }
    }

    /// Valid from: `TargetSelected`.
    pub fn request_framebuffer(&mut self) -> Result<(), CastError> {
        match self {
            Self::TargetSelected => {
                *self = Self::FramebufferRequested;
                Ok(())
            }
            _ => Err(CastError::PhaseViolation(
                "cannot request framebuffer: target not selected",
            )),
        }
    }

    /// Valid from: `FramebufferRequested`.
    pub fn header_read(&mut self) -> Result<(), CastError> {
        match self {
            Self::FramebufferRequested => {
                *self = Self::HeaderRead;
                Ok(())
            }
            _ => Err(CastError::PhaseViolation(
                "cannot read header: framebuffer not requested",
            )),
        }
    }

    /// Valid from: `HeaderRead`.
    pub fn payload_read(&mut self) -> Result<(), CastError> {
        match self {
            Self::HeaderRead => {
                *self = Self::PayloadRead;
                Ok(())
            }
            _ => Err(CastError::PhaseViolation(
                "cannot read payload: header not read",
            )),
        }
    }

    /// Valid from: `PayloadRead`.
    pub fn finish(&mut self) -> Result<(), CastError> {
        match self {
            Self::PayloadRead => {
                *self = Self::Done;
                Ok(())
            }
            _ => Err(CastError::PhaseViolation(
                "cannot finish: payload not read",
            )),
        }
    }

    /// Force the cycle into `Failed` regardless of current phase.
    pub fn fail(&mut self) {
        *self = Self::Failed;
    }
}

// ── FramebufferSession ───────────────────────────────────────────

/// One capture cycle over an open transport.
pub struct FramebufferSession {
    transport: BridgeTransport,
    phase: CapturePhase,
    table: Box<dyn VersionTable>,
}

impl FramebufferSession {
    /// Wrap a freshly connected transport using the stock ADB
    /// version table.
    pub fn new(transport: BridgeTransport) -> Self {
        Self::with_table(transport, Box::new(AdbVersionTable))
    }

    /// Wrap a transport with an injected version table.
    pub fn with_table(transport: BridgeTransport, table: Box<dyn VersionTable>) -> Self {
        Self {
            transport,
            phase: CapturePhase::Disconnected,
            table,
        }
    }

    /// Current capture phase.
    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// Send `host:transport-usb` and read the status.
    ///
    /// `Ok(false)` means the daemon refused, typically no device
    /// attached. Nothing further is read in that case; the caller
    /// aborts the cycle.
    pub async fn select_target(&mut self) -> Result<bool, CastError> {
        if self.phase != CapturePhase::Disconnected {
            return Err(CastError::PhaseViolation(
                "cannot select target: cycle already past Disconnected",
            ));
        }
        let status = self.exchange(TRANSPORT_USB).await?;
        if !status {
            debug!("target selection refused by daemon");
            return Ok(false);
        }
        self.phase.select_target()?;
        Ok(true)
    }

    /// Send `framebuffer:`; on acceptance read and return the header.
    ///
    /// `Ok(None)` means the service was refused; no further bytes are
    /// read from the connection.
    pub async fn request_framebuffer(&mut self) -> Result<Option<FramebufferHeader>, CastError> {
        if self.phase != CapturePhase::TargetSelected {
            return Err(CastError::PhaseViolation(
                "cannot request framebuffer: target not selected",
            ));
        }
        let status = self.exchange(FRAMEBUFFER).await?;
        if !status {
            debug!("framebuffer service refused by daemon");
            return Ok(None);
        }
        self.phase.request_framebuffer()?;

        match framebuffer::read_header(&mut self.transport, self.table.as_ref()).await {
            Ok(header) => {
                self.phase.header_read()?;
                Ok(Some(header))
            }
            Err(e) => {
                self.phase.fail();
                Err(e)
            }
        }
    }

    /// Nudge the daemon and read the full pixel payload.
    pub async fn read_frame(&mut self, header: &FramebufferHeader) -> Result<RawFrame, CastError> {
        if self.phase != CapturePhase::HeaderRead {
            return Err(CastError::PhaseViolation(
                "cannot read payload: header not read",
            ));
        }
        match framebuffer::read_payload(&mut self.transport, header).await {
            Ok(frame) => {
                self.phase.payload_read()?;
                self.phase.finish()?;
                trace!(bytes = frame.pixels.len(), "frame payload read");
                Ok(frame)
            }
            Err(e) => {
                self.phase.fail();
                Err(e)
            }
        }
    }

    /// Run the whole handshake: select target, request the service,
    /// read header and payload.
    ///
    /// `Ok(None)` on protocol rejection (no device / service refused);
    /// the caller treats that as "abort this cycle", not a failure.
    pub async fn capture(&mut self) -> Result<Option<RawFrame>, CastError> {
        if !self.select_target().await? {
            return Ok(None);
        }
        let Some(header) = self.request_framebuffer().await? else {
            return Ok(None);
        };
        let frame = self.read_frame(&header).await?;
        Ok(Some(frame))
    }

    /// Close the underlying transport. Idempotent.
    pub async fn shutdown(&mut self) {
        self.transport.shutdown().await;
    }

    /// Send one request and decode its status, failing the phase on
    /// I/O errors.
    async fn exchange(&mut self, service: &str) -> Result<bool, CastError> {
        let result = async {
            request::send_request(&mut self.transport, service).await?;
            request::read_status(&mut self.transport).await
        }
        .await;

        match result {
            Ok(status) => Ok(status.is_okay()),
            Err(e) => {
                self.phase.fail();
                Err(e)
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
