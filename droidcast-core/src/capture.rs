//! The capture loop: connect, pull one frame, convert, present,
//! close, repeat.
//!
//! Every failure inside one cycle is caught at the loop boundary,
//! the connection is closed, and the loop proceeds to its next
//! iteration. Nothing escapes to terminate the process.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::bridge::session::FramebufferSession;
use crate::bridge::transport::BridgeTransport;
use crate::error::CastError;
use crate::image::convert::{self, DisplayImage};
use crate::image::transform;
use crate::surface::{DisplaySurface, Orientation, SurfaceStatus};

// ── CaptureConfig ────────────────────────────────────────────────

/// Connection settings for the capture loop.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Bridge daemon host.
    pub host: String,
    /// Bridge daemon port.
    pub port: u16,
    /// Optional per-operation I/O deadline. With `None`, a silent
    /// daemon stalls the cycle until the peer closes.
    pub io_timeout: Option<Duration>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5037,
            io_timeout: None,
        }
    }
}

// ── CaptureLoop ──────────────────────────────────────────────────

/// Single-frame pull-and-display loop over a [`DisplaySurface`].
pub struct CaptureLoop<S: DisplaySurface> {
    config: CaptureConfig,
    surface: S,
    running: Arc<AtomicBool>,
}

impl<S: DisplaySurface> CaptureLoop<S> {
    pub fn new(config: CaptureConfig, surface: S) -> Self {
        Self {
            config,
            surface,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A cloneable handle that can stop the loop from another task.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run until the surface closes or the stop handle is cleared.
    ///
    /// An in-flight cycle is not preemptible: it runs to completion
    /// or failure before cancellation is re-checked.
    pub async fn run(&mut self) -> Result<(), CastError> {
        self.running.store(true, Ordering::SeqCst);

        while self.running.load(Ordering::SeqCst) {
            match self.surface.pump().await {
                SurfaceStatus::Closed => {
                    debug!("surface closed, stopping capture loop");
                    break;
                }
                SurfaceStatus::Busy => continue,
                SurfaceStatus::Idle => {}
            }

            // Mode toggles are read once at the start of each cycle.
            let orientation = self.surface.orientation();
            let viewport = self.surface.viewport();

            match self.capture_cycle(orientation, viewport).await {
                Ok(Some(image)) => {
                    if let Err(e) = self.surface.present(image).await {
                        warn!("surface refused frame: {e}");
                    }
                }
                Ok(None) => trace!("capture cycle rejected, retrying next tick"),
                Err(e) => warn!("capture cycle failed: {e}"),
            }
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Give the surface back once the loop is done with it.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// One full cycle: connect, handshake, pull, convert.
    ///
    /// `Ok(None)` on protocol rejection (no device attached, service
    /// refused). The connection is closed on every exit path.
    async fn capture_cycle(
        &self,
        orientation: Orientation,
        viewport: (u32, u32),
    ) -> Result<Option<DisplayImage>, CastError> {
        let transport = BridgeTransport::connect(
            &self.config.host,
            self.config.port,
            self.config.io_timeout,
        )
        .await?;

        let mut session = FramebufferSession::new(transport);
        let outcome = session.capture().await;
        session.shutdown().await;

        let Some(frame) = outcome? else {
            return Ok(None);
        };

        let mut image = convert::to_display_image(&frame)?;
        if orientation == Orientation::Landscape {
            image = transform::rotate90(&image);
        }

        let (vw, vh) = viewport;
        if vw > 0 && vh > 0 {
            image = transform::scale_to_fit(&image, vw, vh)?;
        }

        Ok(Some(image))
    }
}
