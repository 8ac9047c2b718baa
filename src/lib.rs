//! A university timetable constraint-programming engine: normalize raw JSON
//! config into a canonical [`Problem`], statically pre-validate it, build an
//! ILP model over a sparse decision-variable universe, solve it with HiGHS,
//! extract and independently re-validate the resulting [`Schedule`], and, on
//! infeasibility, explain why.

pub mod cp_model;
pub mod error;
pub mod explain;
pub mod extract;
pub mod ids;
pub mod model;
pub mod normalize;
pub mod prevalidate;
pub mod problem;
pub mod schedule;
pub mod solve;
pub mod validate;

pub use error::{Result, SchedulerError};
pub use explain::explain_infeasibility;
pub use extract::extract;
pub use normalize::normalize;
pub use prevalidate::{pre_validate, PreValidationResult};
pub use problem::Problem;
pub use schedule::Schedule;
pub use solve::{solve, SolveOptions, SolveResult, SolverStatus};
pub use validate::{validate, ValidationResult};

use model::build_model;

/// Runs the full pipeline end-to-end: normalize, pre-validate, build,
/// solve, extract, post-validate. Returns the first error encountered; a
/// caller that wants partial diagnostics (e.g. to show pre-validation
/// warnings alongside a successful solve) should call the stage functions
/// directly instead. Returns the `Problem` alongside the `Schedule` so a
/// caller can build `Schedule::export` without re-normalizing.
pub fn run(raw: &serde_json::Value, options: &SolveOptions) -> Result<(Problem, Schedule)> {
    let problem = normalize(raw)?;

    let pre = pre_validate(&problem);
    if !pre.is_valid() {
        return Err(SchedulerError::PreValidation(pre.errors));
    }

    let (cp, index) = build_model(&problem)?;
    let all_vars = index.all_vars();
    let result = solve(cp, &all_vars, options)?;

    let schedule = extract(&problem, &index, &result);
    let post = validate(&problem, &schedule);
    if !post.is_valid() {
        return Err(SchedulerError::ValidationFailure(post.violations));
    }

    Ok((problem, schedule))
}
