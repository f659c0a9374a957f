use super::{Filter, DEFAULT_PRIORITY};
use crate::format::Format;
use crate::media::Media;

/// Filter emitting a fixed token list.
#[derive(Debug, Clone)]
pub struct SimpleFilter {
    params: Vec<String>,
    priority: i32,
}

impl SimpleFilter {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl Filter for SimpleFilter {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn apply(&self, _media: &Media<'_>, _format: &dyn Format) -> Vec<String> {
        self.params.clone()
    }
}
