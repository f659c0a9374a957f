use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use ffpass_av::{AudioFormat, DriverConfig, Format, VideoFormat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub encoding: EncodingConfig,

    /// Named output formats, selected with `--preset`.
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    /// Passed to ffmpeg as `-threads`
    #[serde(default)]
    pub threads: Option<u32>,

    /// Kill an ffmpeg run after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ToolsConfig {
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            threads: self.threads,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EncodingConfig {
    /// Parent of per-encode pass directories (system temp dir if unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// An output format preset.
///
/// ```toml
/// [presets.web]
/// kind = "video"
/// video_codec = "libx264"
/// kilobitrate = 2500
/// passes = 2
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Preset {
    Video(VideoFormat),
    Audio(AudioFormat),
}

impl Preset {
    pub fn format(&self) -> &dyn Format {
        match self {
            Preset::Video(f) => f,
            Preset::Audio(f) => f,
        }
    }
}
