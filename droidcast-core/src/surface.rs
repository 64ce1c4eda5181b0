//! Display surface collaborator boundary.
//!
//! The surface owns window lifecycle, orientation toggling, and the
//! final on-screen presentation; the capture loop only polls it once
//! per iteration and hands it finished frames.

use async_trait::async_trait;

use crate::error::CastError;
use crate::image::convert::DisplayImage;

/// User-selected display orientation, read once per capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Show frames as captured.
    #[default]
    Portrait,
    /// Rotate frames 90° before presenting.
    Landscape,
}

/// What the surface reported when polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus {
    /// No pending events; attempt a capture cycle.
    Idle,
    /// Events were dispatched this tick; skip capturing.
    Busy,
    /// The surface was closed. Sole cancellation signal for the loop.
    Closed,
}

/// A presentation target for finished frames.
#[async_trait]
pub trait DisplaySurface: Send {
    /// Current viewport size in pixels. `(0, 0)` while unsized,
    /// which skips scaling.
    fn viewport(&self) -> (u32, u32);

    /// Orientation currently selected by the user.
    fn orientation(&self) -> Orientation {
        Orientation::Portrait
    }

    /// Dispatch pending surface events. Called once per loop
    /// iteration; this is the loop's only yield point between cycles.
    async fn pump(&mut self) -> SurfaceStatus;

    /// Take ownership of a finished frame for rendering and disposal.
    async fn present(&mut self, image: DisplayImage) -> Result<(), CastError>;
}
