//! Stepped closed intervals of permissible counts.

use std::fmt;

use crate::error::{Error, Result};

/// A closed interval with a step: `{min, min + step, ...} ∩ [min, max]`.
///
/// Used to express permissible edge counts, vertex degrees and member sizes.
///
/// ```
/// use setset_rs::range::Range;
///
/// let even = Range::new(0, 6, 2).unwrap();
/// assert!(even.contains(4));
/// assert!(!even.contains(3));
/// assert!(!even.contains(8));
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Range {
    min: u32,
    max: u32,
    step: u32,
}

impl Range {
    pub fn new(min: u32, max: u32, step: u32) -> Result<Self> {
        if min > max {
            return Err(Error::RangeViolation(format!("min {} exceeds max {}", min, max)));
        }
        if step == 0 {
            return Err(Error::RangeViolation("step must be positive".to_string()));
        }
        Ok(Self { min, max, step })
    }

    /// The range holding exactly `value`.
    pub fn exactly(value: u32) -> Self {
        Self {
            min: value,
            max: value,
            step: 1,
        }
    }

    /// `[0, max]` with step 1.
    pub fn at_most(max: u32) -> Self {
        Self { min: 0, max, step: 1 }
    }

    /// Parses a `(min, max, step)` triple as supplied by untyped callers.
    pub fn from_slice(values: &[i64]) -> Result<Self> {
        let &[min, max, step] = values else {
            return Err(Error::TypeMismatch(format!(
                "a range needs exactly 3 integers, got {}",
                values.len()
            )));
        };
        let bound = |v: i64| {
            u32::try_from(v).map_err(|_| Error::RangeViolation(format!("range bound {} is out of range", v)))
        };
        Range::new(bound(min)?, bound(max)?, bound(step)?)
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max && (value - self.min) % self.step == 0
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 1 {
            write!(f, "[{}, {}]", self.min, self.max)
        } else {
            write!(f, "[{}, {}] step {}", self.min, self.max, self.step)
        }
    }
}
