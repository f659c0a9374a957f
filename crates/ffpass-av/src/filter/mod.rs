//! Ordered token-producing filters.
//!
//! Each [`Filter`] contributes a slice of the encoder command line. A
//! [`FilterChain`] collects them and applies them in ascending priority, with
//! ties kept in registration order. `save` never mutates a media's own chain:
//! it clones it, adds its format-derived filters to the copy and freezes the
//! result into a [`FrozenFilterChain`] owned by that one encode.

mod audio_mix;
mod pad;
mod simple;

pub use audio_mix::AudioMixFilter;
pub use pad::{Dimension, PadFilter, Point};
pub use simple::SimpleFilter;

use std::sync::Arc;

use crate::format::Format;
use crate::media::Media;

/// Priority of filters that do not ask for one.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Priority of the filter carrying a format's extra parameters.
pub const EXTRA_PARAMS_PRIORITY: i32 = 10;

/// A unit of command-line production.
pub trait Filter: Send + Sync {
    /// Lower priorities are applied first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Tokens this filter contributes for encoding `media` into `format`.
    fn apply(&self, media: &Media<'_>, format: &dyn Format) -> Vec<String>;
}

/// Append-only collection of filters.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter. Filters cannot be removed once added.
    pub fn add(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filters in application order.
    pub fn ordered(&self) -> Vec<Arc<dyn Filter>> {
        let mut ordered = self.filters.clone();
        // Stable sort keeps registration order among equal priorities.
        ordered.sort_by_key(|f| f.priority());
        ordered
    }

    /// Concatenated tokens of every filter in application order.
    pub fn apply(&self, media: &Media<'_>, format: &dyn Format) -> Vec<String> {
        apply_all(&self.ordered(), media, format)
    }

    /// Immutable, pre-sorted snapshot of this chain.
    pub fn freeze(self) -> FrozenFilterChain {
        FrozenFilterChain {
            filters: self.ordered().into(),
        }
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let priorities: Vec<i32> = self.filters.iter().map(|f| f.priority()).collect();
        f.debug_struct("FilterChain")
            .field("priorities", &priorities)
            .finish()
    }
}

/// A filter chain that can no longer change, sorted once at freeze time.
#[derive(Clone)]
pub struct FrozenFilterChain {
    filters: Arc<[Arc<dyn Filter>]>,
}

impl FrozenFilterChain {
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn apply(&self, media: &Media<'_>, format: &dyn Format) -> Vec<String> {
        apply_all(&self.filters, media, format)
    }
}

fn apply_all(filters: &[Arc<dyn Filter>], media: &Media<'_>, format: &dyn Format) -> Vec<String> {
    filters
        .iter()
        .flat_map(|f| f.apply(media, format))
        .collect()
}
