//! InfeasibilityExplainer (spec §4.7): a superset of `PreValidator`'s checks
//! run with looser thresholds, intended to be called after the solver
//! itself reports infeasibility, to give a human actionable hints about
//! which constraint is most likely unsatisfiable.
//!
//! Grounded on `original_source/timetable_solver/validator.py`, which the
//! original runs again post-hoc with relaxed thresholds when CP-SAT itself
//! returns INFEASIBLE, on the basis that a model-level explanation (e.g. an
//! unsatisfiable core) isn't available from every backend.

use crate::prevalidate::pre_validate;
use crate::problem::Problem;

/// Re-runs the static checks plus a handful of additional near-miss
/// diagnostics that `pre_validate` doesn't surface as errors because they
/// are survivable in isolation but, combined with the others, are a common
/// cause of a solver-level INFEASIBLE.
pub fn explain_infeasibility(problem: &Problem) -> Vec<String> {
    let mut reasons = Vec::new();

    let pre = pre_validate(problem);
    reasons.extend(pre.errors);

    // Teachers with zero availability entirely.
    for teacher in &problem.teachers {
        if teacher.availability.count_available() == 0 {
            reasons.push(format!(
                "teacher `{}` has zero available slots and cannot be assigned anything",
                teacher.teacher_id
            ));
        }
    }

    // Subjects nobody is qualified to teach at all (even outside any curriculum).
    for subject in &problem.subjects {
        let qualified = problem
            .teachers
            .iter()
            .any(|t| t.can_teach.iter().any(|&s| problem.subject(s).subject_id == subject.subject_id));
        if !qualified {
            reasons.push(format!(
                "subject `{}` has no qualified teacher anywhere in the problem",
                subject.subject_id
            ));
        }
    }

    // Room types entirely uncovered, independent of whether they're referenced
    // by any curriculum (pre_validate only checks referenced subjects).
    for subject in &problem.subjects {
        let has_room = problem.rooms.iter().any(|r| r.room_type == subject.room_type);
        if !has_room {
            reasons.push(format!(
                "subject `{}` requires room type `{}`, which no room has",
                subject.subject_id, subject.room_type
            ));
        }
    }

    // Per-subject qualified-teacher capacity vs. demand: E4 only compares
    // aggregate demand against aggregate availability across *all*
    // teachers, which hides a shortage concentrated on the one or two
    // teachers actually qualified for a given subject.
    let referenced_subjects: std::collections::BTreeSet<_> = problem
        .classes
        .iter()
        .flat_map(|c| c.curriculum.iter().copied())
        .collect();
    for subject_id in referenced_subjects {
        let subject = problem.subject(subject_id);
        let demand: u64 = problem
            .classes
            .iter()
            .filter(|c| c.curriculum.contains(&subject_id))
            .map(|_| subject.hours_per_week as u64)
            .sum();
        let capacity: u64 = problem
            .teachers
            .iter()
            .filter(|t| t.can_teach.contains(&subject_id))
            .map(|t| t.availability.count_available() as u64)
            .sum();
        if demand > capacity {
            reasons.push(format!(
                "subject `{}` needs {demand} hours but its qualified teacher(s) only have {capacity} \
                 available slots combined, even though global teacher capacity looks sufficient",
                subject.subject_id
            ));
        }
    }

    // Per-class curriculum hours vs. this class's *effective* slots once
    // breaks are subtracted, restated without the 95%-tight threshold so
    // every class close to its ceiling is surfaced, not just the worst one.
    let available = problem.available_slots_per_class();
    for class in &problem.classes {
        let required: u64 = class
            .curriculum
            .iter()
            .map(|&s| problem.subject(s).hours_per_week as u64)
            .sum();
        if available > 0 && required as f64 > available as f64 * 0.85 {
            reasons.push(format!(
                "class `{}` needs {required}/{available} available slots ({:.1}%); little slack \
                 remains for H8 double-period pairing or teacher/room contention",
                class.class_id,
                required as f64 / available as f64 * 100.0
            ));
        }
    }

    // Double-period subjects that land on a horizon with no adjacent pair
    // of free periods anywhere, which makes H8 unsatisfiable regardless of
    // teacher/room supply.
    for subject in problem.subjects.iter().filter(|s| s.is_double_period) {
        let mut any_adjacent_pair = false;
        'outer: for d in 0..problem.days {
            for p in 0..problem.periods_per_day.saturating_sub(1) {
                if !problem.is_break(d, p) && !problem.is_break(d, p + 1) {
                    any_adjacent_pair = true;
                    break 'outer;
                }
            }
        }
        if !any_adjacent_pair {
            reasons.push(format!(
                "subject `{}` requires a double period but no day has two adjacent non-break \
                 slots anywhere in the horizon",
                subject.subject_id
            ));
        }
    }

    reasons
}
