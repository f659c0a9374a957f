//! Per-pass progress reporting.
//!
//! The driver feeds every stderr line of the running encoder to a
//! [`ProgressListener`]. [`ProgressTracker`] pulls the `time=` and `speed=`
//! fields out of ffmpeg's status line and turns them into an overall
//! percentage across all passes.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

/// Callback receiving progress events.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Receives raw output lines from a running encoder.
pub trait ProgressListener {
    fn on_line(&mut self, line: &str);
}

/// Progress of an encode at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Current pass, starting at 1.
    pub pass: u32,
    pub total_passes: u32,
    /// Position reached in the current pass.
    pub position: Duration,
    /// Overall completion across all passes, 0.0..=100.0. `None` when the
    /// input duration is unknown.
    pub percent: Option<f64>,
    /// Encoding speed relative to realtime, e.g. `1.5` for `speed=1.5x`.
    pub speed: Option<f64>,
}

/// [`ProgressListener`] extracting position and speed from ffmpeg status lines.
pub struct ProgressTracker {
    duration: Option<Duration>,
    pass: u32,
    total_passes: u32,
    callback: ProgressCallback,
    time_re: Option<Regex>,
    speed_re: Option<Regex>,
}

impl ProgressTracker {
    pub fn new(
        duration: Option<Duration>,
        pass: u32,
        total_passes: u32,
        callback: ProgressCallback,
    ) -> Self {
        Self {
            duration,
            pass,
            total_passes: total_passes.max(1),
            callback,
            time_re: Regex::new(r"time=(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").ok(),
            speed_re: Regex::new(r"speed=\s*(\d+(?:\.\d+)?)x").ok(),
        }
    }

    /// Parse one line; `None` if it carries no position.
    pub fn parse(&self, line: &str) -> Option<ProgressEvent> {
        let caps = self.time_re.as_ref()?.captures(line)?;
        let hours: f64 = caps[1].parse().ok()?;
        let minutes: f64 = caps[2].parse().ok()?;
        let seconds: f64 = caps[3].parse().ok()?;
        let position = Duration::try_from_secs_f64(hours * 3600.0 + minutes * 60.0 + seconds).ok()?;

        let speed = self
            .speed_re
            .as_ref()
            .and_then(|re| re.captures(line))
            .and_then(|c| c[1].parse().ok());

        Some(ProgressEvent {
            pass: self.pass,
            total_passes: self.total_passes,
            position,
            percent: self.percent(position),
            speed,
        })
    }

    fn percent(&self, position: Duration) -> Option<f64> {
        let total = self.duration?.as_secs_f64();
        if total <= 0.0 {
            return None;
        }
        let fraction = (position.as_secs_f64() / total).clamp(0.0, 1.0);
        let done = f64::from(self.pass.saturating_sub(1)) + fraction;
        Some((done / f64::from(self.total_passes) * 100.0).clamp(0.0, 100.0))
    }
}

impl ProgressListener for ProgressTracker {
    fn on_line(&mut self, line: &str) {
        if let Some(event) = self.parse(line) {
            (self.callback)(&event);
        }
    }
}
