//! Input probing.
//!
//! The encode pipeline only needs to know that an input can be probed and
//! which kinds of streams it carries. [`Prober`] is the seam; the default
//! implementation shells out to ffprobe.

mod ffprobe;
mod types;

pub use ffprobe::FfprobeProber;
pub use types::*;

use crate::Result;
use std::path::Path;

/// Something that can describe the streams of a media file.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait Prober: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Describe the streams of the file at `path`.
    ///
    /// A file that cannot be opened or understood is an [`crate::Error::Probe`].
    fn streams(&self, path: &Path) -> Result<StreamInfo>;
}
