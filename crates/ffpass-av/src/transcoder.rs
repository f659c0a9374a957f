//! Entry point owning the prober and driver.

use std::path::{Path, PathBuf};

use crate::driver::{FfmpegDriver, ProcessDriver};
use crate::media::{Media, MediaKind};
use crate::probe::{FfprobeProber, Prober};
use crate::{Error, Result};

/// Opens media for transcoding.
///
/// # Example
///
/// ```no_run
/// use ffpass_av::{Transcoder, VideoFormat};
///
/// let transcoder = Transcoder::discover(None, None)?;
/// let mut video = transcoder.open("input.mkv")?;
/// video.save(&VideoFormat::x264().with_passes(2), "output.mp4")?;
/// # Ok::<(), ffpass_av::Error>(())
/// ```
pub struct Transcoder {
    prober: Box<dyn Prober>,
    driver: Box<dyn ProcessDriver>,
    temp_dir: Option<PathBuf>,
}

impl Transcoder {
    pub fn new(prober: impl Prober + 'static, driver: impl ProcessDriver + 'static) -> Self {
        Self {
            prober: Box::new(prober),
            driver: Box::new(driver),
            temp_dir: None,
        }
    }

    /// ffprobe and ffmpeg from configured paths, falling back to `PATH`.
    pub fn discover(ffprobe: Option<&Path>, ffmpeg: Option<&Path>) -> Result<Self> {
        Ok(Self::new(
            FfprobeProber::discover(ffprobe)?,
            FfmpegDriver::discover(ffmpeg)?,
        ))
    }

    /// Root for pass directories of every media this opens.
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    pub fn prober(&self) -> &dyn Prober {
        self.prober.as_ref()
    }

    pub fn driver(&self) -> &dyn ProcessDriver {
        self.driver.as_ref()
    }

    /// Probe `path` and open it as video if it has a video stream, otherwise
    /// as audio if it has an audio stream.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Media<'_>> {
        let path = path.as_ref();
        let streams = self.prober.streams(path).map_err(|e| match e {
            Error::Probe { .. } => e,
            other => Error::probe(path, other.to_string()),
        })?;

        let kind = if streams.has_video() {
            MediaKind::Video
        } else if streams.has_audio() {
            MediaKind::Audio
        } else {
            return Err(Error::Unsupported(format!(
                "unable to detect file format of {}, only audio and video supported",
                path.display()
            )));
        };

        tracing::debug!("opened {:?} as {:?}", path, kind);
        Ok(Media::new(path, kind, self.prober.as_ref(), self.driver.as_ref())
            .with_temp_dir(self.temp_dir.clone()))
    }
}
