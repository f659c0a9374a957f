//! Multi-pass execution.
//!
//! [`PassOrchestrator`] walks an explicit state machine:
//!
//! ```text
//! Idle -> Preparing -> Running(1..=N) -> Cleaning -> Done
//!             |                |                  \-> Failed
//!             \-> Failed       \-(first failure)-> Cleaning
//! ```
//!
//! Every path that allocated a [`PassWorkspace`] goes through `Cleaning`
//! exactly once before the result is returned.

use std::path::Path;

use crate::command::path_token;
use crate::driver::ProcessDriver;
use crate::progress::ProgressListener;
use crate::workspace::PassWorkspace;
use crate::{Error, Result};

/// Where an orchestrated encode currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Preparing,
    Running { pass: u32, total: u32 },
    Cleaning,
    Done,
    Failed,
}

/// One invocation of the encoder within a multi-pass encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassDescriptor {
    /// 1-based pass number.
    pub index: u32,
    pub total: u32,
    /// Complete command line, output path last.
    pub tokens: Vec<String>,
}

/// Reject pass counts the encoder cannot run.
pub fn validate_pass_count(total: u32) -> Result<()> {
    if total < 1 {
        return Err(Error::InvalidInput(
            "pass count should be a positive value".to_string(),
        ));
    }
    Ok(())
}

/// Expand `base` into one command per pass.
///
/// With more than one pass, `-pass <i> -passlogfile <log_prefix>` is inserted
/// before the output path; a single pass gets neither.
pub fn plan_passes(
    base: &[String],
    output: &Path,
    total: u32,
    log_prefix: &Path,
) -> Result<Vec<PassDescriptor>> {
    validate_pass_count(total)?;
    let output = path_token(output)?;
    let log_prefix = path_token(log_prefix)?;

    Ok((1..=total)
        .map(|index| {
            let mut tokens = base.to_vec();
            if total > 1 {
                tokens.push("-pass".to_string());
                tokens.push(index.to_string());
                tokens.push("-passlogfile".to_string());
                tokens.push(log_prefix.clone());
            }
            tokens.push(output.clone());
            PassDescriptor {
                index,
                total,
                tokens,
            }
        })
        .collect())
}

/// Runs the passes of one encode and owns its temporary directory.
pub struct PassOrchestrator<'d> {
    driver: &'d dyn ProcessDriver,
    temp_root: Option<&'d Path>,
    state: PassState,
}

impl<'d> PassOrchestrator<'d> {
    pub fn new(driver: &'d dyn ProcessDriver) -> Self {
        Self {
            driver,
            temp_root: None,
            state: PassState::Idle,
        }
    }

    /// Create pass directories under `root` instead of the system temp dir.
    pub fn with_temp_root(mut self, root: Option<&'d Path>) -> Self {
        self.temp_root = root;
        self
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    fn transition(&mut self, next: PassState) {
        tracing::trace!("pass state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run `total` passes of `base` writing to `output`.
    ///
    /// `listener_for(pass, total)` supplies an optional progress listener for
    /// each pass. Passes run strictly in order and the first failure stops the
    /// sequence; the pass directory is removed before any error is returned.
    pub fn run<F>(
        &mut self,
        base: &[String],
        output: &Path,
        total: u32,
        mut listener_for: F,
    ) -> Result<()>
    where
        F: FnMut(u32, u32) -> Option<Box<dyn ProgressListener>>,
    {
        self.transition(PassState::Preparing);
        if let Err(e) = validate_pass_count(total) {
            self.transition(PassState::Failed);
            return Err(e);
        }

        let workspace = match PassWorkspace::new(self.temp_root) {
            Ok(ws) => ws,
            Err(e) => {
                self.transition(PassState::Failed);
                return Err(e);
            }
        };
        tracing::debug!("pass directory {}", workspace.path().display());

        let mut failure = None;
        match plan_passes(base, output, total, workspace.log_prefix()) {
            Ok(passes) => {
                for pass in &passes {
                    self.transition(PassState::Running {
                        pass: pass.index,
                        total,
                    });
                    tracing::debug!(pass = pass.index, total, "starting encoder pass");

                    let mut listener = listener_for(pass.index, total);
                    let listener: Option<&mut dyn ProgressListener> = match listener.as_mut() {
                        Some(l) => Some(&mut **l),
                        None => None,
                    };

                    if let Err(e) = self.driver.execute(&pass.tokens, false, listener) {
                        tracing::warn!(pass = pass.index, total, "encoder pass failed: {e}");
                        failure = Some(Error::encoding(e));
                        break;
                    }
                }
            }
            Err(e) => failure = Some(e),
        }

        self.transition(PassState::Cleaning);
        let cleanup = workspace.close();

        match (failure, cleanup) {
            (Some(err), cleanup) => {
                if let Err(e) = cleanup {
                    tracing::warn!("{e}");
                }
                self.transition(PassState::Failed);
                Err(err)
            }
            (None, Err(e)) => {
                self.transition(PassState::Failed);
                Err(e)
            }
            (None, Ok(())) => {
                self.transition(PassState::Done);
                Ok(())
            }
        }
    }
}

/// Run a single encoder invocation whose last token is `output`.
///
/// On failure a partially written `output` is removed before the error is
/// returned. No pass directory is involved.
pub fn run_once(
    driver: &dyn ProcessDriver,
    tokens: &[String],
    output: &Path,
    mut listener: Option<Box<dyn ProgressListener>>,
) -> Result<()> {
    let listener: Option<&mut dyn ProgressListener> = match listener.as_mut() {
        Some(l) => Some(&mut **l),
        None => None,
    };

    driver.execute(tokens, false, listener).map_err(|e| {
        remove_partial_output(output);
        Error::encoding(e)
    })
}

fn remove_partial_output(output: &Path) {
    if output.exists() {
        if let Err(e) = std::fs::remove_file(output) {
            tracing::warn!("failed to remove partial output {}: {e}", output.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingDriver;
    use std::fs;
    use std::path::PathBuf;

    fn base() -> Vec<String> {
        vec!["-y".into(), "-i".into(), "in.mp4".into()]
    }

    fn count(tokens: &[String], needle: &str) -> usize {
        tokens.iter().filter(|t| *t == needle).count()
    }

    #[test]
    fn single_pass_has_no_pass_flags() {
        let passes = plan_passes(&base(), Path::new("out.mp4"), 1, Path::new("/tmp/x/pass-1")).unwrap();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].tokens, ["-y", "-i", "in.mp4", "out.mp4"]);
    }

    #[test]
    fn three_passes_share_prefix() {
        let prefix = PathBuf::from("/tmp/x/pass-abc");
        let passes = plan_passes(&base(), Path::new("out.mp4"), 3, &prefix).unwrap();
        assert_eq!(passes.len(), 3);
        for (i, pass) in passes.iter().enumerate() {
            let n = (i + 1).to_string();
            assert_eq!(pass.index as usize, i + 1);
            assert_eq!(
                pass.tokens[3..],
                ["-pass", n.as_str(), "-passlogfile", "/tmp/x/pass-abc", "out.mp4"]
            );
            assert_eq!(count(&pass.tokens, "-pass"), 1);
        }
    }

    #[test]
    fn zero_passes_rejected() {
        let err = plan_passes(&base(), Path::new("out.mp4"), 0, Path::new("p")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn orchestrator_success_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let driver = RecordingDriver::default();
        let mut orchestrator = PassOrchestrator::new(&driver).with_temp_root(Some(root.path()));

        orchestrator
            .run(&base(), Path::new("out.mp4"), 2, |_, _| None)
            .unwrap();

        assert_eq!(orchestrator.state(), PassState::Done);
        assert_eq!(driver.calls().len(), 2);
        assert!(driver.log_dirs_existed().iter().all(|e| *e));
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn orchestrator_stops_at_first_failure() {
        let root = tempfile::tempdir().unwrap();
        let driver = RecordingDriver::default().fail_on_call(2);
        let mut orchestrator = PassOrchestrator::new(&driver).with_temp_root(Some(root.path()));

        let err = orchestrator
            .run(&base(), Path::new("out.mp4"), 3, |_, _| None)
            .unwrap_err();

        assert_eq!(orchestrator.state(), PassState::Failed);
        assert_eq!(driver.calls().len(), 2);
        assert!(err.execution().unwrap().detail().contains("call 2"));
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn zero_passes_never_touch_disk() {
        let root = tempfile::tempdir().unwrap();
        let driver = RecordingDriver::default();
        let mut orchestrator = PassOrchestrator::new(&driver).with_temp_root(Some(root.path()));

        let err = orchestrator
            .run(&base(), Path::new("out.mp4"), 0, |_, _| None)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(orchestrator.state(), PassState::Failed);
        assert!(driver.calls().is_empty());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn listener_scoped_to_each_pass() {
        let root = tempfile::tempdir().unwrap();
        let driver = RecordingDriver::default();
        let mut orchestrator = PassOrchestrator::new(&driver).with_temp_root(Some(root.path()));
        let mut requested = Vec::new();

        orchestrator
            .run(&base(), Path::new("out.mp4"), 3, |pass, total| {
                requested.push((pass, total));
                None
            })
            .unwrap();

        assert_eq!(requested, [(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn run_once_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp3");
        fs::write(&output, b"partial").unwrap();
        let driver = RecordingDriver::default().fail_on_call(1);

        let err = run_once(&driver, &["-y".to_string()], &output, None).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
        assert!(!output.exists());
    }
}
