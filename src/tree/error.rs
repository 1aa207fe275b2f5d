//! Error types for tree operations.
//!
//! Absent keys are never errors: lookups return `Option`. The variants here
//! cover API misuse (operations a view does not support, cursor misuse) and
//! rejected configuration.

use thiserror::Error;

/// Errors reported by tree maps, tree sets and their views.
///
/// # Examples
///
/// ```rust
/// use sylva::tree::{TreeError, TreeMap};
///
/// let mut map: TreeMap<i32, &str> = (0..10).map(|key| (key, "v")).collect();
/// let mut view = map.head_map_mut(4);
/// assert_eq!(
///     view.put(2, "x"),
///     Err(TreeError::Unsupported { operation: "put" })
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The operation is not available on this kind of view.
    #[error("unsupported operation: {operation}")]
    Unsupported {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// `remove` was called on a cursor that has no current entry.
    #[error("cursor has no current entry to remove")]
    NoCurrentEntry,

    /// A configuration value could not be accepted.
    #[error("invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// Name of the offending setting.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

impl TreeError {
    /// Creates an [`TreeError::Unsupported`] for the named operation.
    #[must_use]
    pub const fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    /// Creates an [`TreeError::InvalidConfig`].
    ///
    /// # Arguments
    ///
    /// * `field` - Name of the setting
    /// * `message` - Why the value was rejected
    #[must_use]
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type TreeResult<T> = Result<T, TreeError>;

/// A broken structural invariant found by `check_invariants`.
///
/// These indicate a defect in the engine itself, never a caller error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invariant violated at node {node}: {message}")]
pub struct InvariantViolation {
    /// Arena index of the node where the violation was detected.
    pub node: u32,
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    pub(crate) fn new(node: u32, message: impl Into<String>) -> Self {
        Self {
            node,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_unsupported_display() {
        let error = TreeError::unsupported("clear");
        assert_eq!(error.to_string(), "unsupported operation: clear");
    }

    #[rstest]
    fn test_no_current_entry_display() {
        assert_eq!(
            TreeError::NoCurrentEntry.to_string(),
            "cursor has no current entry to remove"
        );
    }

    #[rstest]
    fn test_invalid_config_display() {
        let error = TreeError::invalid_config("search", "unknown strategy `fast`");
        assert_eq!(
            error.to_string(),
            "invalid configuration for search: unknown strategy `fast`"
        );
    }

    #[rstest]
    fn test_invariant_violation_display() {
        let violation = InvariantViolation::new(7, "separator out of order");
        assert_eq!(
            violation.to_string(),
            "invariant violated at node 7: separator out of order"
        );
    }

    #[rstest]
    fn test_errors_implement_error_trait() {
        let _: &dyn std::error::Error = &TreeError::NoCurrentEntry;
        let _: &dyn std::error::Error = &InvariantViolation::new(0, "x");
    }
}
