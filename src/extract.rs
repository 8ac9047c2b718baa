//! SolutionExtractor (spec §4.5): turns a solver [`Valuation`] back into a
//! human-readable [`Schedule`].

use log::debug;

use crate::model::variables::VariableIndex;
use crate::problem::Problem;
use crate::schedule::{Assignment, Schedule, ScheduleMeta};
use crate::solve::{SolveResult, Valuation};

/// Scans `(class, day, period)` in the same lexicographic order the
/// variable universe was enumerated in (spec §5 determinism property) and
/// picks the unique `true` variable per slot, H1 guaranteeing there is at
/// most one.
pub fn extract(problem: &Problem, index: &VariableIndex, result: &SolveResult) -> Schedule {
    let valuation: &Valuation = &result.valuation;
    let mut assignments = Vec::new();

    for c in problem.class_ids() {
        for d in 0..problem.days {
            for p in 0..problem.periods_per_day {
                let Some(vars) = index.by_cdp.get(&(c, d, p)) else {
                    continue;
                };
                for &var in vars {
                    if valuation.is_true(var) {
                        let (_, _, _, s, t, r) = index.tuple_of[&var];
                        assignments.push(Assignment {
                            day: d + 1,
                            period: p + 1,
                            class: problem.class(c).class_id.clone(),
                            subject: problem.subject(s).subject_id.clone(),
                            teacher: problem.teacher(t).teacher_id.clone(),
                            room: problem.room(r).room_id.clone(),
                        });
                        break; // H1: at most one true variable per (c,d,p).
                    }
                }
            }
        }
    }

    debug!("extracted {} assignments from the solution", assignments.len());

    Schedule {
        meta: ScheduleMeta {
            status: result.status.into(),
            objective_value: result.objective_value,
            days: problem.days,
            periods_per_day: problem.periods_per_day,
        },
        assignments,
    }
}
