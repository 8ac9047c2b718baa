//! Error taxonomy for the scheduling engine (spec §7).
//!
//! Stages fail fast and return the first error they hit. `PreValidation` and
//! `ValidationFailure` carry the full ordered message list rather than just
//! the first one, since callers need the whole picture to act on them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("pre-validation failed with {} error(s): {}", .0.len(), .0.join("; "))]
    PreValidation(Vec<String>),

    #[error("internal model invariant violated: {0}")]
    ModelInvalid(String),

    #[error("solver proved the problem infeasible")]
    SolverInfeasible,

    #[error("solver exhausted its time budget without finding a feasible solution")]
    SolverTimeout,

    #[error("post-solve validation disagreed with the extracted assignment: {}", .0.join("; "))]
    ValidationFailure(Vec<String>),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
