//! Bundled [`DisplaySurface`] implementations.
//!
//! On-screen rendering is the job of an external toolkit; the
//! surfaces shipped here are headless stand-ins. [`PngSurface`]
//! writes each presented frame to a PNG file, [`NullSurface`]
//! discards frames (useful in tests and for protocol soak runs).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use droidcast_core::{CastError, DisplayImage, DisplaySurface, Orientation, SurfaceStatus};

// ── PngSurface ───────────────────────────────────────────────────

/// Writes presented frames as numbered PNG files into a directory.
pub struct PngSurface {
    dir: PathBuf,
    viewport: (u32, u32),
    orientation: Orientation,
    frame_interval: Duration,
    /// Stop after this many frames; `None` runs until interrupted.
    frame_limit: Option<u64>,
    frames_written: u64,
}

impl PngSurface {
    pub fn new(
        dir: PathBuf,
        viewport: (u32, u32),
        orientation: Orientation,
        frame_interval: Duration,
        frame_limit: Option<u64>,
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            viewport,
            orientation,
            frame_interval,
            frame_limit,
            frames_written: 0,
        })
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

#[async_trait]
impl DisplaySurface for PngSurface {
    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    async fn pump(&mut self) -> SurfaceStatus {
        if let Some(limit) = self.frame_limit {
            if self.frames_written >= limit {
                info!("frame limit reached ({limit}), closing surface");
                return SurfaceStatus::Closed;
            }
        }
        // The pause between cycles is the loop's only idle point.
        tokio::time::sleep(self.frame_interval).await;
        SurfaceStatus::Idle
    }

    async fn present(&mut self, frame: DisplayImage) -> Result<(), CastError> {
        let path = self.dir.join(format!("frame-{:05}.png", self.frames_written));
        let (width, height) = (frame.width, frame.height);

        let bitmap = image::RgbaImage::from_raw(width, height, frame.pixels)
            .ok_or_else(|| CastError::Other("frame buffer length mismatch".into()))?;
        bitmap
            .save(&path)
            .map_err(|e| CastError::Other(format!("failed to write {}: {e}", path.display())))?;

        self.frames_written += 1;
        debug!(
            "wrote {width}x{height} frame to {}",
            path.display()
        );
        Ok(())
    }
}

// ── NullSurface ──────────────────────────────────────────────────

/// Discards every frame; closes itself after `frame_limit` presents.
pub struct NullSurface {
    viewport: (u32, u32),
    frame_limit: u64,
    frames_seen: u64,
}

impl NullSurface {
    pub fn new(viewport: (u32, u32), frame_limit: u64) -> Self {
        Self {
            viewport,
            frame_limit,
            frames_seen: 0,
        }
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

#[async_trait]
impl DisplaySurface for NullSurface {
    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    async fn pump(&mut self) -> SurfaceStatus {
        if self.frames_seen >= self.frame_limit {
            SurfaceStatus::Closed
        } else {
            SurfaceStatus::Idle
        }
    }

    async fn present(&mut self, _image: DisplayImage) -> Result<(), CastError> {
        self.frames_seen += 1;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn red_image(w: u32, h: u32) -> DisplayImage {
        let mut pixels = Vec::with_capacity((w * h * 4) as usize);
        for _ in 0..w * h {
            pixels.extend_from_slice(&[255, 0, 0, 255]);
        }
        DisplayImage {
            width: w,
            height: h,
            pixels,
        }
    }

    #[tokio::test]
    async fn png_surface_writes_numbered_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = PngSurface::new(
            dir.path().to_path_buf(),
            (100, 100),
            Orientation::Portrait,
            Duration::from_millis(1),
            Some(2),
        )
        .unwrap();

        assert_eq!(surface.pump().await, SurfaceStatus::Idle);
        surface.present(red_image(4, 2)).await.unwrap();
        surface.present(red_image(4, 2)).await.unwrap();
        assert_eq!(surface.pump().await, SurfaceStatus::Closed);

        let first = dir.path().join("frame-00000.png");
        let reloaded = image::open(&first).unwrap().to_rgba8();
        assert_eq!(reloaded.dimensions(), (4, 2));
        assert_eq!(reloaded.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert!(dir.path().join("frame-00001.png").exists());
    }

    #[tokio::test]
    async fn png_surface_rejects_mismatched_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = PngSurface::new(
            dir.path().to_path_buf(),
            (0, 0),
            Orientation::Portrait,
            Duration::from_millis(1),
            None,
        )
        .unwrap();

        let bad = DisplayImage {
            width: 4,
            height: 4,
            pixels: vec![0; 8],
        };
        assert!(surface.present(bad).await.is_err());
        assert_eq!(surface.frames_written(), 0);
    }

    #[tokio::test]
    async fn null_surface_counts_and_closes() {
        let mut surface = NullSurface::new((0, 0), 1);
        assert_eq!(surface.pump().await, SurfaceStatus::Idle);
        surface.present(red_image(1, 1)).await.unwrap();
        assert_eq!(surface.frames_seen(), 1);
        assert_eq!(surface.pump().await, SurfaceStatus::Closed);
    }
}
