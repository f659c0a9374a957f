use super::{Filter, DEFAULT_PRIORITY};
use crate::format::Format;
use crate::media::Media;

/// Mixes `count` audio inputs into one stream, lasting as long as the first.
#[derive(Debug, Clone)]
pub struct AudioMixFilter {
    count: usize,
    priority: i32,
}

impl AudioMixFilter {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Number of mixed inputs.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Filter for AudioMixFilter {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn apply(&self, _media: &Media<'_>, _format: &dyn Format) -> Vec<String> {
        vec![
            "-filter_complex".to_string(),
            format!(
                "amix=inputs={}:duration=first:dropout_transition=3",
                self.count
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::AudioFormat;
    use crate::testing::{audio_media, FakeProber, RecordingDriver};

    #[test]
    fn mixes_all_inputs() {
        let prober = FakeProber::default();
        let driver = RecordingDriver::default();
        let media = audio_media("voice.wav", &prober, &driver);

        let tokens = AudioMixFilter::new(3).apply(&media, &AudioFormat::new());
        assert_eq!(
            tokens,
            ["-filter_complex", "amix=inputs=3:duration=first:dropout_transition=3"]
        );
    }
}
