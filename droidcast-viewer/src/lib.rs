//! # droidcast-viewer
//!
//! Viewer binary plumbing around `droidcast-core`: TOML
//! configuration, bridge daemon respawn, and headless display
//! surfaces for the capture loop to present into.

pub mod config;
pub mod daemon;
pub mod surface;
