//! FFprobe-based stream probing.

use super::types::*;
use super::Prober;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: String,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

/// [`Prober`] backed by the ffprobe CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    binary: PathBuf,
}

impl FfprobeProber {
    /// Use the given ffprobe executable.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Locate ffprobe via a configured path or `PATH`.
    pub fn discover(config_path: Option<&Path>) -> Result<Self> {
        crate::tools::get_tool_path("ffprobe", config_path).map(Self::new)
    }

    /// Path of the executable this prober runs.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl Prober for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    fn streams(&self, path: &Path) -> Result<StreamInfo> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found("ffprobe")
                } else {
                    Error::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("ffprobe exited with {}", output.status),
                s => s.to_string(),
            };
            return Err(Error::probe(path, message));
        }

        let json_str = String::from_utf8(output.stdout)
            .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))?;

        let ff_output: FfprobeOutput = serde_json::from_str(&json_str)?;

        parse_ffprobe_output(path, ff_output)
    }
}

fn parse_ffprobe_output(path: &Path, output: FfprobeOutput) -> Result<StreamInfo> {
    let format = output
        .format
        .ok_or_else(|| Error::probe(path, "ffprobe reported no format section"))?;

    let mut info = StreamInfo {
        file_path: path.to_path_buf(),
        container: format.format_name,
        duration: format
            .duration
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(Duration::from_secs_f64),
        videos: Vec::new(),
        audios: Vec::new(),
    };

    for stream in output.streams {
        match stream.codec_type.as_deref() {
            Some("video") => info.videos.push(VideoStream {
                index: stream.index,
                codec: stream.codec_name.unwrap_or_default(),
                width: stream.width.unwrap_or(0),
                height: stream.height.unwrap_or(0),
                frame_rate: stream.r_frame_rate.as_deref().and_then(parse_frame_rate),
            }),
            Some("audio") => info.audios.push(AudioStream {
                index: stream.index,
                codec: stream.codec_name.unwrap_or_default(),
                channels: stream.channels.unwrap_or(2),
                sample_rate: stream.sample_rate.and_then(|s| s.parse().ok()),
                language: stream.tags.language,
            }),
            _ => {}
        }
    }

    Ok(info)
}

fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let parts: Vec<&str> = rate_str.split('/').collect();
    if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den != 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate_str.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "h264",
             "width": 1920, "height": 1080, "r_frame_rate": "24000/1001"},
            {"index": 1, "codec_type": "audio", "codec_name": "aac",
             "channels": 6, "sample_rate": "48000", "tags": {"language": "eng"}},
            {"index": 2, "codec_type": "subtitle", "codec_name": "subrip"}
        ],
        "format": {"filename": "a.mp4", "format_name": "mov,mp4,m4a", "duration": "62.500000"}
    }"#;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("24000/1001"), Some(23.976023976023978));
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("invalid"), None);
    }

    #[test]
    fn test_parse_streams() {
        let output: FfprobeOutput = serde_json::from_str(SAMPLE).unwrap();
        let info = parse_ffprobe_output(Path::new("a.mp4"), output).unwrap();

        assert_eq!(info.container, "mov,mp4,m4a");
        assert_eq!(info.duration, Some(Duration::from_millis(62_500)));
        assert_eq!(info.videos.len(), 1);
        assert_eq!(info.videos[0].width, 1920);
        assert_eq!(info.audios.len(), 1);
        assert_eq!(info.audios[0].channels, 6);
        assert_eq!(info.audios[0].sample_rate, Some(48000));
        assert_eq!(info.audios[0].language.as_deref(), Some("eng"));
    }

    #[test]
    fn test_missing_format_is_probe_error() {
        let output: FfprobeOutput = serde_json::from_str(r#"{"streams": []}"#).unwrap();
        let err = parse_ffprobe_output(Path::new("x.bin"), output).unwrap_err();
        assert!(matches!(err, Error::Probe { .. }));
    }

    #[test]
    fn test_missing_binary_is_tool_not_found() {
        let prober = FfprobeProber::new("nonexistent_ffprobe_12345");
        let err = prober.streams(Path::new("a.mp4")).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
