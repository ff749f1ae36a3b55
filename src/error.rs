//! Error types shared by the problem model and both solvers.

use thiserror::Error;

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;

/// Failures surfaced by the solvers. A failing call never leaves the solver in a corrupted state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// b0, b1, W or a state vector has an inconsistent dimension.
    #[error("shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        found: String,
    },

    /// Unknown preference key or a preference value that cannot be used.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Invalid argument to an operation, e.g. a non-positive beta.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("problem is not set, call set_qubo() in advance")]
    ProblemNotSet,

    #[error("not prepared, call prepare() in advance")]
    NotPrepared,

    /// The brute-force search space exceeds the configured ceiling.
    #[error("problem with {bits} bits exceeds the brute-force limit of {limit} bits")]
    ProblemTooLarge { bits: usize, limit: usize },

    #[error("search cancelled")]
    Cancelled,
}

impl SolverError {
    pub(crate) fn shape(what: &'static str, expected: impl ToString, found: impl ToString) -> Self {
        Self::ShapeMismatch {
            what,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SolverError;

    #[test]
    fn test_error_messages() {
        let err = SolverError::shape("W", "(3, 2)", "(2, 3)");
        assert_eq!(
            err.to_string(),
            "shape mismatch for W: expected (3, 2), found (2, 3)"
        );

        let err = SolverError::ProblemTooLarge { bits: 70, limit: 40 };
        assert_eq!(
            err.to_string(),
            "problem with 70 bits exceeds the brute-force limit of 40 bits"
        );
    }
}
