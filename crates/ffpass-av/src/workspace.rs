//! Scoped temporary directory for multi-pass encodes.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

/// Name prefix of every pass directory.
const DIR_PREFIX: &str = "ffmpeg-passes";

/// Temporary directory holding the encoder's pass log files.
///
/// Each `save` creates its own workspace, so concurrent encodes never share
/// log files. The directory is removed by [`PassWorkspace::close`], or on
/// drop if the encode unwinds before reaching it.
///
/// # Example
///
/// ```no_run
/// use ffpass_av::PassWorkspace;
///
/// let workspace = PassWorkspace::new(None)?;
/// // ffmpeg ... -pass 1 -passlogfile <workspace.log_prefix()> ...
/// workspace.close()?;
/// # Ok::<(), ffpass_av::Error>(())
/// ```
#[derive(Debug)]
pub struct PassWorkspace {
    temp_dir: TempDir,
    log_prefix: PathBuf,
}

impl PassWorkspace {
    /// Create a uniquely named directory under `root`, or the system temp
    /// directory when `root` is `None`.
    pub fn new(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(DIR_PREFIX);
        let temp_dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| Error::Workspace(format!("failed to create pass directory: {e}")))?;

        let log_prefix = temp_dir
            .path()
            .join(format!("pass-{}", Uuid::new_v4().simple()));

        Ok(Self {
            temp_dir,
            log_prefix,
        })
    }

    /// Path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Prefix shared by every pass's `-passlogfile`.
    pub fn log_prefix(&self) -> &Path {
        &self.log_prefix
    }

    /// Remove the directory and everything the passes wrote into it.
    pub fn close(self) -> Result<()> {
        let path = self.temp_dir.path().to_path_buf();
        self.temp_dir.close().map_err(|e| {
            Error::Workspace(format!("failed to remove {}: {e}", path.display()))
        })
    }
}
