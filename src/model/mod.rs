//! ModelBuilder (spec §4.3): turns a validated [`Problem`] into a finalized
//! [`CpModel`] plus the [`VariableIndex`] needed to later extract a solution.

pub mod constraints;
pub mod objective;
pub mod variables;

use log::info;

use crate::cp_model::CpModel;
use crate::error::{Result, SchedulerError};
use crate::prevalidate::pre_validate;
use crate::problem::Problem;
use variables::VariableIndex;

/// Builds the full model: the sparse variable universe, H1-H4 and H8, and
/// the weighted soft objective. Callers are expected to have already run
/// [`pre_validate`] and refused to proceed on errors (spec §4.2); this
/// function re-runs it defensively and reports any error as
/// [`SchedulerError::ModelInvalid`], since reaching here with an invalid
/// `Problem` is itself an internal invariant violation rather than ordinary
/// user input.
pub fn build_model(problem: &Problem) -> Result<(CpModel, VariableIndex)> {
    let pre = pre_validate(problem);
    if !pre.is_valid() {
        return Err(SchedulerError::ModelInvalid(format!(
            "build_model called on a Problem that fails pre-validation: {}",
            pre.errors.join("; ")
        )));
    }

    let mut cp = CpModel::new();
    let index = variables::enumerate_variables(problem, &mut cp);
    if index.is_empty() {
        return Err(SchedulerError::ModelInvalid(
            "no decision variables could be enumerated (curriculum/availability/room-type \
             constraints leave nothing schedulable)"
                .to_string(),
        ));
    }

    constraints::add_class_slot_uniqueness(problem, &mut cp, &index);
    constraints::add_teacher_non_conflict(problem, &mut cp, &index);
    constraints::add_room_non_conflict(problem, &mut cp, &index);
    constraints::add_weekly_hours(problem, &mut cp, &index);
    constraints::add_double_period_coupling(problem, &mut cp, &index);

    let presence = objective::build_presence_indicators(problem, &mut cp, &index);
    objective::add_soft_objective(problem, &mut cp, &index, &presence);

    info!(
        "model built: {} variables, {} constraints",
        cp.num_vars(),
        cp.num_constraints()
    );

    Ok((cp, index))
}
