//! # ffpass-av
//!
//! Ordered ffmpeg command assembly and multi-pass encode orchestration.
//!
//! This crate provides:
//!
//! - **Filters** ([`filter`]) -- priority-ordered units of command-line
//!   production, collected in a copy-on-use [`FilterChain`].
//! - **Formats** ([`Format`], [`VideoFormat`], [`AudioFormat`]) -- read-only
//!   descriptions of the desired output.
//! - **Media** ([`Media`]) -- inputs, raw commands and filters for one
//!   transcode, with `save` and `loop_concat`.
//! - **Pass orchestration** ([`PassOrchestrator`]) -- N-pass encodes sharing a
//!   scoped [`PassWorkspace`] that is always removed.
//! - **Collaborators** ([`Prober`], [`ProcessDriver`]) -- ffprobe and ffmpeg
//!   behind traits, with CLI implementations.
//!
//! ## Example
//!
//! ```no_run
//! use ffpass_av::{PadFilter, Dimension, Point, Transcoder, VideoFormat};
//!
//! let transcoder = Transcoder::discover(None, None)?;
//! let mut video = transcoder.open("input.mkv")?;
//! video
//!     .add_input_file(["overlay.mp4"])?
//!     .add_filter(PadFilter::new(Dimension::new(1280, 720)?, Point::new(0, 0)));
//! video.save(&VideoFormat::x264().with_kilobitrate(2500).with_passes(2), "out.mp4")?;
//! # Ok::<(), ffpass_av::Error>(())
//! ```

pub mod command;
pub mod driver;
mod error;
pub mod filter;
pub mod format;
pub mod media;
pub mod passes;
pub mod probe;
pub mod progress;
pub mod tools;
pub mod transcoder;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use driver::{DriverConfig, ExecutionError, FfmpegDriver, ProcessDriver};
pub use error::{Error, Result};
pub use filter::{
    AudioMixFilter, Dimension, Filter, FilterChain, FrozenFilterChain, PadFilter, Point,
    SimpleFilter,
};
pub use format::{AudioFormat, Capabilities, Format, VideoFormat};
pub use media::{Media, MediaKind};
pub use passes::{PassDescriptor, PassOrchestrator, PassState};
pub use probe::{FfprobeProber, Prober, StreamInfo};
pub use progress::{ProgressCallback, ProgressEvent, ProgressListener, ProgressTracker};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};
pub use transcoder::Transcoder;
pub use workspace::PassWorkspace;
