//! Stream descriptor types returned by probing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Streams found in one input file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Path to the probed file.
    pub file_path: PathBuf,
    /// Container format name as reported by the prober (e.g. "mov,mp4,m4a").
    pub container: String,
    /// Duration of the longest stream, if known.
    pub duration: Option<Duration>,
    /// Video streams in the file.
    pub videos: Vec<VideoStream>,
    /// Audio streams in the file.
    pub audios: Vec<AudioStream>,
}

impl StreamInfo {
    /// Whether the file carries at least one video stream.
    pub fn has_video(&self) -> bool {
        !self.videos.is_empty()
    }

    /// Whether the file carries at least one audio stream.
    pub fn has_audio(&self) -> bool {
        !self.audios.is_empty()
    }
}

/// A video stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStream {
    /// Stream index within the container.
    pub index: u32,
    /// Codec name (e.g. "h264").
    pub codec: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Frame rate in FPS.
    pub frame_rate: Option<f64>,
}

/// An audio stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioStream {
    /// Stream index within the container.
    pub index: u32,
    /// Codec name (e.g. "aac").
    pub codec: String,
    /// Number of channels.
    pub channels: u32,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
    /// Language tag.
    pub language: Option<String>,
}
