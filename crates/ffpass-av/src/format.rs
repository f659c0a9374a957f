//! Output format descriptions.
//!
//! A [`Format`] is a read-only description of what an encode should
//! produce. The command builder only talks to the trait, so callers may bring
//! their own implementations; [`VideoFormat`] and [`AudioFormat`] cover the
//! common cases and deserialize from config presets.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::media::Media;
use crate::probe::Prober;
use crate::progress::{ProgressCallback, ProgressListener, ProgressTracker};

/// Which kinds of streams an encode touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub video: bool,
    pub audio: bool,
}

impl Capabilities {
    pub const AUDIO: Self = Self {
        video: false,
        audio: true,
    };
    pub const VIDEO: Self = Self {
        video: true,
        audio: false,
    };
    pub const AUDIO_VIDEO: Self = Self {
        video: true,
        audio: true,
    };

    /// Capabilities present in both sets.
    pub fn intersect(self, other: Self) -> Self {
        Self {
            video: self.video && other.video,
            audio: self.audio && other.audio,
        }
    }
}

/// Read-only description of the desired output of an encode.
pub trait Format {
    /// Stream kinds this format produces.
    fn capabilities(&self) -> Capabilities;

    /// Video encoder name passed as `-vcodec`.
    fn video_codec(&self) -> Option<&str> {
        None
    }

    /// Audio encoder name passed as `-acodec`.
    fn audio_codec(&self) -> Option<&str> {
        None
    }

    /// Target video bitrate in kbit/s.
    fn video_kilobitrate(&self) -> Option<u32> {
        None
    }

    /// Target audio bitrate in kbit/s.
    fn audio_kilobitrate(&self) -> Option<u32> {
        None
    }

    /// Output audio channel count.
    fn audio_channels(&self) -> Option<u32> {
        None
    }

    /// Tokens applied through the filter chain at [`crate::filter::EXTRA_PARAMS_PRIORITY`].
    fn extra_params(&self) -> &[String] {
        &[]
    }

    /// Tokens appended after bitrate and quality flags, before the output path.
    fn additional_params(&self) -> &[String] {
        &[]
    }

    /// Number of encoder passes. Zero is rejected by `save`.
    fn passes(&self) -> u32 {
        1
    }

    /// Listener for one pass of an encode of `media`, if this format reports progress.
    fn progress_listener(
        &self,
        _media: &Media<'_>,
        _prober: &dyn Prober,
        _current_pass: u32,
        _total_passes: u32,
    ) -> Option<Box<dyn ProgressListener>> {
        None
    }
}

/// Build a [`ProgressTracker`] for `media` when a callback is registered.
fn tracker_for(
    callback: Option<&ProgressCallback>,
    media: &Media<'_>,
    prober: &dyn Prober,
    current_pass: u32,
    total_passes: u32,
) -> Option<Box<dyn ProgressListener>> {
    let callback = callback?;
    let duration = match prober.streams(media.path()) {
        Ok(info) => info.duration,
        Err(e) => {
            tracing::debug!("no duration for progress on {:?}: {}", media.path(), e);
            None
        }
    };
    Some(Box::new(ProgressTracker::new(
        duration,
        current_pass,
        total_passes,
        Arc::clone(callback),
    )))
}

fn default_video_kilobitrate() -> Option<u32> {
    Some(1000)
}

fn default_passes() -> u32 {
    1
}

/// A video (plus audio) output format.
///
/// # Example
///
/// ```
/// use ffpass_av::{Format, VideoFormat};
///
/// let format = VideoFormat::x264().with_kilobitrate(2500).with_passes(2);
/// assert_eq!(format.video_codec(), Some("libx264"));
/// assert_eq!(format.passes(), 2);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct VideoFormat {
    #[serde(default)]
    pub video_codec: Option<String>,
    #[serde(default)]
    pub audio_codec: Option<String>,
    #[serde(default = "default_video_kilobitrate")]
    pub kilobitrate: Option<u32>,
    #[serde(default)]
    pub audio_kilobitrate: Option<u32>,
    #[serde(default)]
    pub audio_channels: Option<u32>,
    #[serde(default)]
    pub extra_params: Vec<String>,
    #[serde(default)]
    pub additional_params: Vec<String>,
    #[serde(default = "default_passes")]
    pub passes: u32,
    #[serde(skip)]
    on_progress: Option<ProgressCallback>,
}

impl Default for VideoFormat {
    fn default() -> Self {
        Self {
            video_codec: None,
            audio_codec: None,
            kilobitrate: default_video_kilobitrate(),
            audio_kilobitrate: None,
            audio_channels: None,
            extra_params: Vec::new(),
            additional_params: Vec::new(),
            passes: default_passes(),
            on_progress: None,
        }
    }
}

impl fmt::Debug for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFormat")
            .field("video_codec", &self.video_codec)
            .field("audio_codec", &self.audio_codec)
            .field("kilobitrate", &self.kilobitrate)
            .field("audio_kilobitrate", &self.audio_kilobitrate)
            .field("audio_channels", &self.audio_channels)
            .field("extra_params", &self.extra_params)
            .field("additional_params", &self.additional_params)
            .field("passes", &self.passes)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl VideoFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// H.264 video with AAC audio.
    pub fn x264() -> Self {
        Self::new().with_video_codec("libx264").with_audio_codec("aac")
    }

    pub fn with_video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = Some(codec.into());
        self
    }

    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = Some(codec.into());
        self
    }

    pub fn with_kilobitrate(mut self, kbps: u32) -> Self {
        self.kilobitrate = Some(kbps);
        self
    }

    pub fn with_audio_kilobitrate(mut self, kbps: u32) -> Self {
        self.audio_kilobitrate = Some(kbps);
        self
    }

    pub fn with_audio_channels(mut self, channels: u32) -> Self {
        self.audio_channels = Some(channels);
        self
    }

    pub fn with_extra_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_additional_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_passes(mut self, passes: u32) -> Self {
        self.passes = passes;
        self
    }

    /// Report progress of every pass to `callback`.
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }
}

impl Format for VideoFormat {
    fn capabilities(&self) -> Capabilities {
        Capabilities::AUDIO_VIDEO
    }

    fn video_codec(&self) -> Option<&str> {
        self.video_codec.as_deref()
    }

    fn audio_codec(&self) -> Option<&str> {
        self.audio_codec.as_deref()
    }

    fn video_kilobitrate(&self) -> Option<u32> {
        self.kilobitrate
    }

    fn audio_kilobitrate(&self) -> Option<u32> {
        self.audio_kilobitrate
    }

    fn audio_channels(&self) -> Option<u32> {
        self.audio_channels
    }

    fn extra_params(&self) -> &[String] {
        &self.extra_params
    }

    fn additional_params(&self) -> &[String] {
        &self.additional_params
    }

    fn passes(&self) -> u32 {
        self.passes
    }

    fn progress_listener(
        &self,
        media: &Media<'_>,
        prober: &dyn Prober,
        current_pass: u32,
        total_passes: u32,
    ) -> Option<Box<dyn ProgressListener>> {
        tracker_for(
            self.on_progress.as_ref(),
            media,
            prober,
            current_pass,
            total_passes,
        )
    }
}

/// An audio-only output format.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AudioFormat {
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub kilobitrate: Option<u32>,
    #[serde(default)]
    pub channels: Option<u32>,
    #[serde(default)]
    pub extra_params: Vec<String>,
    #[serde(default)]
    pub additional_params: Vec<String>,
    #[serde(skip)]
    on_progress: Option<ProgressCallback>,
}

impl fmt::Debug for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFormat")
            .field("codec", &self.codec)
            .field("kilobitrate", &self.kilobitrate)
            .field("channels", &self.channels)
            .field("extra_params", &self.extra_params)
            .field("additional_params", &self.additional_params)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl AudioFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    pub fn with_kilobitrate(mut self, kbps: u32) -> Self {
        self.kilobitrate = Some(kbps);
        self
    }

    pub fn with_channels(mut self, channels: u32) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn with_extra_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_additional_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }
}

impl Format for AudioFormat {
    fn capabilities(&self) -> Capabilities {
        Capabilities::AUDIO
    }

    fn audio_codec(&self) -> Option<&str> {
        self.codec.as_deref()
    }

    fn audio_kilobitrate(&self) -> Option<u32> {
        self.kilobitrate
    }

    fn audio_channels(&self) -> Option<u32> {
        self.channels
    }

    fn extra_params(&self) -> &[String] {
        &self.extra_params
    }

    fn additional_params(&self) -> &[String] {
        &self.additional_params
    }

    fn progress_listener(
        &self,
        media: &Media<'_>,
        prober: &dyn Prober,
        current_pass: u32,
        total_passes: u32,
    ) -> Option<Box<dyn ProgressListener>> {
        tracker_for(
            self.on_progress.as_ref(),
            media,
            prober,
            current_pass,
            total_passes,
        )
    }
}
