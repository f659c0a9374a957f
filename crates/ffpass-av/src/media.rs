//! A transcoding subject and its public operations.

use std::path::{Path, PathBuf};

use crate::command::{build_base, build_concat, path_token};
use crate::driver::ProcessDriver;
use crate::filter::{Filter, FilterChain};
use crate::format::{Capabilities, Format};
use crate::passes::{run_once, validate_pass_count, PassOrchestrator};
use crate::probe::Prober;
use crate::{Error, Result};

/// What kind of media a [`Media`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Audio only. Always encoded in a single pass.
    Audio,
    /// Video, possibly with audio. Encoded in as many passes as the format asks for.
    Video,
}

impl MediaKind {
    pub fn capabilities(self) -> Capabilities {
        match self {
            MediaKind::Audio => Capabilities::AUDIO,
            MediaKind::Video => Capabilities::AUDIO_VIDEO,
        }
    }
}

/// One input to transcode, plus everything registered for its encodes.
///
/// The prober and driver are borrowed from whoever opened the media
/// (usually a [`crate::Transcoder`]). `save` takes `&mut self`: one media
/// runs one encode at a time, while independent media may encode concurrently.
pub struct Media<'a> {
    path: PathBuf,
    kind: MediaKind,
    inputs: Vec<PathBuf>,
    filters: FilterChain,
    commands: Vec<Vec<String>>,
    prober: &'a dyn Prober,
    driver: &'a dyn ProcessDriver,
    temp_root: Option<PathBuf>,
}

impl<'a> Media<'a> {
    pub fn new(
        path: impl Into<PathBuf>,
        kind: MediaKind,
        prober: &'a dyn Prober,
        driver: &'a dyn ProcessDriver,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            inputs: Vec::new(),
            filters: FilterChain::new(),
            commands: Vec::new(),
            prober,
            driver,
            temp_root: None,
        }
    }

    /// Create pass directories under `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_root = dir;
        self
    }

    /// Primary input path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// Auxiliary inputs, in registration order.
    pub fn input_files(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Raw command fragments, in registration order.
    pub fn commands(&self) -> &[Vec<String>] {
        &self.commands
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    pub fn prober(&self) -> &'a dyn Prober {
        self.prober
    }

    pub fn driver(&self) -> &'a dyn ProcessDriver {
        self.driver
    }

    /// Register additional inputs, each passed to the encoder with its own `-i`.
    ///
    /// Every path is probed first; if any cannot be probed nothing is added.
    pub fn add_input_file<I, P>(&mut self, paths: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths: Vec<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();

        for path in &paths {
            path_token(path)?;
            self.prober.streams(path).map_err(|e| match e {
                Error::Probe { .. } => e,
                other => Error::probe(path, other.to_string()),
            })?;
        }

        self.inputs.extend(paths);
        Ok(self)
    }

    /// Register a raw command fragment, inserted verbatim after the filters.
    pub fn add_command<I, S>(&mut self, command: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command: Vec<String> = command.into_iter().map(Into::into).collect();
        if command.is_empty() {
            return Err(Error::InvalidInput("empty command".to_string()));
        }
        self.commands.push(command);
        Ok(self)
    }

    /// Register a filter applied to every later `save`.
    pub fn add_filter(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.add(filter);
        self
    }

    /// Command line of a single-pass encode to `output`, without running it.
    pub fn command_line(
        &self,
        format: &dyn Format,
        output: impl AsRef<Path>,
    ) -> Result<Vec<String>> {
        let mut tokens = build_base(self, format)?;
        tokens.push(path_token(output.as_ref())?);
        Ok(tokens)
    }

    /// Encode into `format`, writing `output`.
    ///
    /// Video runs `format.passes()` passes sharing a temporary log directory
    /// that is removed before this returns. Audio runs once and removes a
    /// partial `output` on failure.
    pub fn save(&mut self, format: &dyn Format, output: impl AsRef<Path>) -> Result<&mut Self> {
        let output = output.as_ref();
        let total = format.passes();
        validate_pass_count(total)?;
        let output_token = path_token(output)?;

        let this: &Media<'a> = self;
        let base = build_base(this, format)?;

        tracing::info!(
            "Encoding {:?} -> {:?} ({:?}, {} pass(es))",
            this.path,
            output,
            this.kind,
            if this.kind == MediaKind::Video { total } else { 1 }
        );

        match this.kind {
            MediaKind::Video => {
                let mut orchestrator = PassOrchestrator::new(this.driver)
                    .with_temp_root(this.temp_root.as_deref());
                orchestrator.run(&base, output, total, |pass, total| {
                    format.progress_listener(this, this.prober, pass, total)
                })?;
            }
            MediaKind::Audio => {
                let mut tokens = base;
                tokens.push(output_token);
                let listener = format.progress_listener(this, this.prober, 1, 1);
                run_once(this.driver, &tokens, output, listener)?;
            }
        }

        tracing::info!("Encoded {:?}", output);
        Ok(self)
    }

    /// Encode the segments listed in a concat `descriptor` file, repeated
    /// `repeat_count` times, into `output`. Always a single pass.
    pub fn loop_concat(
        &mut self,
        format: &dyn Format,
        descriptor: impl AsRef<Path>,
        repeat_count: u32,
        output: impl AsRef<Path>,
    ) -> Result<&mut Self> {
        if repeat_count < 1 {
            return Err(Error::InvalidInput(
                "repeat count should be a positive value".to_string(),
            ));
        }
        let output = output.as_ref();
        let tokens = build_concat(descriptor.as_ref(), repeat_count, format, output)?;

        tracing::info!("Concatenating {:?} x{} -> {:?}", descriptor.as_ref(), repeat_count, output);
        run_once(self.driver, &tokens, output, None)?;
        Ok(self)
    }
}

impl std::fmt::Debug for Media<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Media")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("inputs", &self.inputs)
            .field("filters", &self.filters)
            .field("commands", &self.commands)
            .field("prober", &self.prober.name())
            .field("temp_root", &self.temp_root)
            .finish()
    }
}
