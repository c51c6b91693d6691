use std::time::Duration;

use thiserror::Error;

/// Errors raised while building or searching poset covers.
///
/// Every variant is a local precondition failure; nothing here is retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CoverError {
    /// Malformed input: an empty domain, orders over different labels, or unparsable text.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation was called on arguments that break its documented precondition.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// The input has more labels than the configured [`Solver`](crate::Solver) accepts.
    #[error("{labels} labels exceeds the configured limit of {limit}")]
    TooManyLabels {
        /// Labels in the input.
        labels: usize,
        /// [`SolverConfig::max_labels`](crate::SolverConfig::max_labels).
        limit: usize,
    },

    /// The configured time limit elapsed before a cover was found.
    #[error("time limit of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

/// Result alias for cover operations.
pub type Result<T> = std::result::Result<T, CoverError>;
