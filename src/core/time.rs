//! Evaluation time and authoring granularity.
//!
//! Every attribute read or write on the stage is parameterized by an
//! [`EvaluationTime`]. `Default` addresses the untimed default value of an
//! attribute; `Frame` addresses a time sample.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Ordered timeline coordinate.
///
/// `Default` sorts before every frame. Frames are compared with
/// [`f64::total_cmp`] so the type can key ordered and hashed maps.
#[derive(Clone, Copy, Debug, Default)]
pub enum EvaluationTime {
    /// The untimed default value.
    #[default]
    Default,
    /// A time sample.
    Frame(f64),
}

impl EvaluationTime {
    /// Create a frame time.
    #[inline]
    pub const fn frame(t: f64) -> Self {
        Self::Frame(t)
    }

    /// Check if this addresses the default value.
    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Frame value, `None` for the default time.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Default => None,
            Self::Frame(t) => Some(*t),
        }
    }
}

impl PartialEq for EvaluationTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EvaluationTime {}

impl PartialOrd for EvaluationTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EvaluationTime {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Default, Self::Default) => Ordering::Equal,
            (Self::Default, Self::Frame(_)) => Ordering::Less,
            (Self::Frame(_), Self::Default) => Ordering::Greater,
            (Self::Frame(a), Self::Frame(b)) => a.total_cmp(b),
        }
    }
}

impl Hash for EvaluationTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Default => 0u8.hash(state),
            Self::Frame(t) => {
                1u8.hash(state);
                t.to_bits().hash(state);
            }
        }
    }
}

impl From<f64> for EvaluationTime {
    fn from(t: f64) -> Self {
        Self::Frame(t)
    }
}

impl fmt::Display for EvaluationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Frame(t) => write!(f, "{t}"),
        }
    }
}

/// Whether transform and visibility are authored once or every time sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// Author once, as default values.
    #[default]
    Once,
    /// Re-evaluate and author at every time sample.
    PerFrame,
}

impl Granularity {
    #[inline]
    pub fn is_per_frame(self) -> bool {
        matches!(self, Self::PerFrame)
    }
}
