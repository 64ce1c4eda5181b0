//! Bridge daemon respawn orchestration.
//!
//! Killing and restarting the adb server is sometimes required before
//! a device shows up, so startup runs a bounded number of
//! restart-and-probe rounds before surfacing a user-facing failure.
//! This wraps the core capture loop; it is not part of it.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use droidcast_core::{BridgeTransport, CaptureConfig, CastError, FramebufferSession};

use crate::config::DaemonConfig;

/// Restarts the bridge daemon and probes it until a device answers.
pub struct BridgeLauncher {
    adb_path: String,
    attempts: u32,
}

impl BridgeLauncher {
    pub fn new(config: &DaemonConfig) -> Self {
        Self {
            adb_path: config.adb_path.clone(),
            attempts: config.retry_attempts.max(1),
        }
    }

    /// Restart the daemon and probe for an attached device, up to the
    /// configured number of attempts.
    ///
    /// The error returned after the final attempt is the user-facing
    /// "plug your device in and enable USB debugging" moment; the
    /// caller ends the program on it.
    pub async fn ensure_running(&self, capture: &CaptureConfig) -> Result<(), CastError> {
        for attempt in 1..=self.attempts {
            if let Err(e) = self.restart_daemon().await {
                warn!("daemon restart failed: {e}");
            }

            match Self::probe(capture).await {
                Ok(true) => {
                    info!("bridge daemon is up with a device attached");
                    return Ok(());
                }
                Ok(false) => warn!("daemon is up but no USB device answered"),
                Err(e) => warn!("daemon probe failed: {e}"),
            }

            warn!("failed attempt {attempt} of {}", self.attempts);
        }

        Err(CastError::Other(format!(
            "no usable bridge daemon after {} attempts; \
             check that the device is plugged in and USB debugging is enabled",
            self.attempts
        )))
    }

    /// `adb kill-server` followed by `adb start-server`.
    async fn restart_daemon(&self) -> Result<(), CastError> {
        self.adb(&["kill-server"]).await?;
        self.adb(&["start-server"]).await
    }

    async fn adb(&self, args: &[&str]) -> Result<(), CastError> {
        debug!("running {} {}", self.adb_path, args.join(" "));
        let status = Command::new(&self.adb_path)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| CastError::Other(format!("failed to spawn {}: {e}", self.adb_path)))?;

        if status.success() {
            Ok(())
        } else {
            Err(CastError::Other(format!(
                "{} {} exited with {status}",
                self.adb_path,
                args.join(" ")
            )))
        }
    }

    /// Connect and select the USB target once, then disconnect.
    async fn probe(capture: &CaptureConfig) -> Result<bool, CastError> {
        let transport =
            BridgeTransport::connect(&capture.host, capture.port, capture.io_timeout).await?;
        let mut session = FramebufferSession::new(transport);
        let result = session.select_target().await;
        session.shutdown().await;
        result
    }
}
