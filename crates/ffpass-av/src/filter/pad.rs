use super::{Filter, DEFAULT_PRIORITY};
use crate::format::Format;
use crate::media::Media;
use crate::{Error, Result};

/// Output frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    width: u32,
    height: u32,
}

impl Dimension {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidInput(format!(
                "dimension must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl std::str::FromStr for Dimension {
    type Err = Error;

    /// Parses `WIDTHxHEIGHT`, e.g. `1280x720`.
    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| Error::InvalidInput(format!("expected WIDTHxHEIGHT, got {s:?}")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| Error::InvalidInput(format!("bad dimension {s:?}: {e}")))
        };
        Self::new(parse(w)?, parse(h)?)
    }
}

/// Top-left offset of the scaled picture inside the padded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Scales the picture to fit inside a frame, keeping aspect ratio, then pads
/// it to exactly that frame.
#[derive(Debug, Clone)]
pub struct PadFilter {
    dimension: Dimension,
    point: Point,
    priority: i32,
}

impl PadFilter {
    pub fn new(dimension: Dimension, point: Point) -> Self {
        Self {
            dimension,
            point,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }
}

impl Filter for PadFilter {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn apply(&self, _media: &Media<'_>, _format: &dyn Format) -> Vec<String> {
        let (w, h) = (self.dimension.width, self.dimension.height);
        let fit = format!("min({w}/iw\\,{h}/ih)");
        vec![
            "-vf".to_string(),
            format!(
                "scale=iw*{fit}:ih*{fit},pad={w}:{h}:{}:{}",
                self.point.x, self.point.y
            ),
        ]
    }
}
