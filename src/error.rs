//! Error type shared by all fallible operations.

use std::io;

use num_bigint::BigUint;
use thiserror::Error;

/// Errors reported by the diagram store, the algebra, serialization and the
/// frontier compiler.
#[derive(Debug, Error)]
pub enum Error {
    /// An element outside `[1, limit]` was used.
    #[error("element {elem} is outside the universe [1, {limit}]")]
    OutOfRange {
        /// The offending element.
        elem: u64,
        /// Current universe limit.
        limit: u32,
    },

    /// A node was requested whose child does not lie strictly below it.
    #[error("node for element {elem} cannot have a child rooted at element {child}")]
    Unordered {
        /// Element of the requested node.
        elem: u32,
        /// Top element of the offending child.
        child: u32,
    },

    /// An input had the wrong shape.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A size, count or range bound is out of its permitted domain.
    #[error("range violation: {0}")]
    RangeViolation(String),

    /// The cardinality does not fit in a native integer.
    ///
    /// The exact count is carried along, so callers can fall back to it.
    #[error("cardinality {0} overflows a native integer, use `size()` instead")]
    Overflow(BigUint),

    /// A strict removal targeted an absent member or element.
    #[error("not found: {0}")]
    NotFound(String),

    /// Serialized input is malformed or truncated.
    #[error("malformed diagram at line {line}: {reason}")]
    Format {
        /// 1-based line number where parsing stopped.
        line: usize,
        /// Human-readable description.
        reason: String,
    },

    /// The frontier compiler was configured inconsistently.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Quotient or remainder by a family containing the empty set.
    #[error("division by a family containing the empty set")]
    EmptySetDivisor,

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        Error::Format {
            line,
            reason: reason.into(),
        }
    }
}
