//! droidcast viewer — entry point.
//!
//! ```text
//! droidcast-viewer                     Mirror with defaults
//! droidcast-viewer --config <path>     Use custom config TOML
//! droidcast-viewer --frames 10         Stop after ten frames
//! droidcast-viewer --gen-config        Dump default config and exit
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use droidcast_core::{CaptureLoop, Orientation};

use droidcast_viewer::config::ViewerConfig;
use droidcast_viewer::daemon::BridgeLauncher;
use droidcast_viewer::surface::PngSurface;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "droidcast-viewer", about = "Android device screen mirror over ADB")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "droidcast-viewer.toml")]
    config: PathBuf,

    /// Daemon port (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for captured PNG frames.
    #[arg(short, long, default_value = "frames")]
    output: PathBuf,

    /// Stop after this many frames (0 = run until interrupted).
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Rotate frames for a landscape display (overrides config).
    #[arg(long)]
    landscape: bool,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ViewerConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = ViewerConfig::load(&cli.config);
    if let Some(port) = cli.port {
        config.network.port = port;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("droidcast-viewer v{}", env!("CARGO_PKG_VERSION"));

    let capture_config = config.capture();

    // ── 1. Bring the bridge daemon up ───────────────────────────

    if config.daemon.autostart {
        let launcher = BridgeLauncher::new(&config.daemon);
        if let Err(e) = launcher.ensure_running(&capture_config).await {
            error!("{e}");
            return Err(e.into());
        }
    }

    // ── 2. Build the display surface ────────────────────────────

    let orientation = if cli.landscape {
        Orientation::Landscape
    } else {
        config.orientation()
    };
    let surface = PngSurface::new(
        cli.output.clone(),
        (config.display.width, config.display.height),
        orientation,
        Duration::from_millis(config.display.frame_interval_ms),
        (cli.frames > 0).then_some(cli.frames),
    )?;

    info!(
        "mirroring to {} ({}x{} viewport)",
        cli.output.display(),
        config.display.width,
        config.display.height
    );

    // ── 3. Run the capture loop ─────────────────────────────────

    let mut capture = CaptureLoop::new(capture_config, surface);
    let stop = capture.stop_handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.store(false, std::sync::atomic::Ordering::SeqCst);
        }
    });

    capture.run().await?;

    let surface = capture.into_surface();
    info!("done, {} frames written", surface.frames_written());
    Ok(())
}
