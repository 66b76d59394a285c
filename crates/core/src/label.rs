use std::fmt;

use serde::{Deserialize, Serialize};

/// A label detected in an image.
///
/// `confidence` is a percentage in `[0, 100]` as reported by the detection
/// service. Labels keep the order in which the service returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Human-readable label name (e.g. `"Cat"`).
    pub name: String,

    /// Confidence percentage.
    pub confidence: f32,
}

impl Label {
    /// Create a new label.
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// Renders as `"<name>: <confidence>"`, the line format used in replies.
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.confidence)
    }
}
