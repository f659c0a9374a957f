//! ffpass - multi-pass ffmpeg encoding
//!
//! This library crate exposes the binary's configuration for integration testing.

pub mod config;
