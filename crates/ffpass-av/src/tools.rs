//! Locating the ffmpeg and ffprobe executables.

use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;

use crate::{Error, Result};

/// Availability of one executable.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// Version number from the `-version` banner, e.g. "6.1.1".
    pub version: Option<String>,
    /// Resolved executable.
    pub path: Option<PathBuf>,
}

/// Run `<binary> -version` and report whether it works.
///
/// `binary` may be a bare name searched on `PATH` or a full path.
///
/// ```no_run
/// let info = ffpass_av::check_tool("ffmpeg");
/// if info.available {
///     println!("ffmpeg {}", info.version.unwrap_or_default());
/// }
/// ```
pub fn check_tool(binary: impl AsRef<Path>) -> ToolInfo {
    let binary = binary.as_ref();
    let name = binary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| binary.display().to_string());

    let output = match Command::new(binary).arg("-version").output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            tracing::debug!("{} -version exited with {}", binary.display(), output.status);
            return ToolInfo::missing(name);
        }
        Err(e) => {
            tracing::debug!("{} not runnable: {e}", binary.display());
            return ToolInfo::missing(name);
        }
    };

    let banner = String::from_utf8_lossy(&output.stdout);
    ToolInfo {
        version: parse_version(&banner),
        path: which::which(binary).ok(),
        available: true,
        name,
    }
}

impl ToolInfo {
    fn missing(name: String) -> Self {
        Self {
            name,
            available: false,
            version: None,
            path: None,
        }
    }
}

/// Version token of an ffmpeg-family banner ("ffmpeg version 6.1.1 Copyright ...").
fn parse_version(banner: &str) -> Option<String> {
    let re = Regex::new(r"^\S+ version (\S+)").ok()?;
    let first = banner.lines().next()?;
    re.captures(first).map(|c| c[1].to_string())
}

/// Check ffmpeg and ffprobe, honouring configured paths.
pub fn check_tools(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Vec<ToolInfo> {
    [("ffmpeg", ffmpeg), ("ffprobe", ffprobe)]
        .into_iter()
        .map(|(name, configured)| match configured {
            Some(path) => check_tool(path),
            None => check_tool(name),
        })
        .collect()
}

/// Resolve `name` on `PATH`.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Prefer a configured executable, falling back to `PATH`.
pub fn get_tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => {
            tracing::warn!("configured {name} {:?} does not exist, searching PATH", path);
            require_tool(name)
        }
        None => require_tool(name),
    }
}
