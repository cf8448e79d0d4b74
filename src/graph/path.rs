//! Conversion path: a chain of arcs from one node to another.

use crate::model::Unit;
use crate::numeric::{Number, NumericResult};

/// One arc of a path, with the node it arrives at.
#[derive(Debug, Clone)]
pub struct PathStep {
    /// `1 previous = factor next`, or the reverse when `inverted`
    pub factor: Number,
    pub inverted: bool,
    pub weight: f64,
    /// Reference unit of the node this step arrives at
    pub unit: Unit,
    pub label: String,
}

/// Best path between two units, plus the prefix offsets at either end.
///
/// A unit's prefix relative to its node's reference unit is its delta:
/// `mg` sits on the `g` node with delta -3. Deltas are applied with prefix
/// arithmetic, never as arcs.
#[derive(Debug, Clone)]
pub struct ConversionPath {
    pub from_delta: i32,
    pub to_delta: i32,
    pub origin: Unit,
    pub origin_label: String,
    pub steps: Vec<PathStep>,
}

impl ConversionPath {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Product of arc weights; `1.0` for the empty path.
    pub fn weight(&self) -> f64 {
        self.steps.iter().map(|s| s.weight).product()
    }

    /// Node labels from origin to destination.
    pub fn labels(&self) -> Vec<&str> {
        std::iter::once(self.origin_label.as_str())
            .chain(self.steps.iter().map(|s| s.label.as_str()))
            .collect()
    }

    /// Combined factor between the two nodes: forward factors multiplied,
    /// then divided once by the product of inverted factors.
    pub fn factor(&self) -> NumericResult<Number> {
        let mut forward = Number::from(1);
        let mut backward = Number::from(1);
        for step in &self.steps {
            if step.inverted {
                backward = backward.checked_mul(&step.factor)?;
            } else {
                forward = forward.checked_mul(&step.factor)?;
            }
        }
        forward.checked_div(&backward)
    }
}
