//! Hard constraints H1-H4, H8 (spec §4.3). H5-H7 are enforced by omitting
//! the corresponding variables from `V` at enumeration time (see
//! `variables.rs`); H6 is enforced structurally by the same omission.

use log::info;

use crate::cp_model::CpModel;
use crate::model::variables::VariableIndex;
use crate::problem::Problem;

fn sum_expr(vars: &[crate::cp_model::BoolVar]) -> good_lp::Expression {
    vars.iter().copied().map(good_lp::Expression::from).sum()
}

/// H1: at most one assignment per `(class, day, period)`.
pub fn add_class_slot_uniqueness(problem: &Problem, cp: &mut CpModel, index: &VariableIndex) {
    let mut emitted = 0;
    for c in problem.class_ids() {
        for d in 0..problem.days {
            for p in 0..problem.periods_per_day {
                if let Some(vars) = index.by_cdp.get(&(c, d, p)) {
                    cp.add_le(sum_expr(vars), 1.0);
                    emitted += 1;
                }
            }
        }
    }
    info!("H1: added {emitted} class-slot-uniqueness constraints");
}

/// H2: at most one assignment per `(teacher, day, period)`.
pub fn add_teacher_non_conflict(problem: &Problem, cp: &mut CpModel, index: &VariableIndex) {
    let mut emitted = 0;
    for t in problem.teacher_ids() {
        for d in 0..problem.days {
            for p in 0..problem.periods_per_day {
                if let Some(vars) = index.by_tdp.get(&(t, d, p)) {
                    cp.add_le(sum_expr(vars), 1.0);
                    emitted += 1;
                }
            }
        }
    }
    info!("H2: added {emitted} teacher-non-conflict constraints");
}

/// H3: at most one assignment per `(room, day, period)`.
pub fn add_room_non_conflict(problem: &Problem, cp: &mut CpModel, index: &VariableIndex) {
    let mut emitted = 0;
    for r in problem.room_ids() {
        for d in 0..problem.days {
            for p in 0..problem.periods_per_day {
                if let Some(vars) = index.by_rdp.get(&(r, d, p)) {
                    cp.add_le(sum_expr(vars), 1.0);
                    emitted += 1;
                }
            }
        }
    }
    info!("H3: added {emitted} room-non-conflict constraints");
}

/// H4: every `(class, curriculum subject)` must receive exactly its
/// weekly-hours quota.
pub fn add_weekly_hours(problem: &Problem, cp: &mut CpModel, index: &VariableIndex) {
    let mut emitted = 0;
    for c in problem.class_ids() {
        for &s in &problem.class(c).curriculum {
            let required = problem.subject(s).hours_per_week as f64;
            let vars = index.by_cs.get(&(c, s)).cloned().unwrap_or_default();
            cp.add_eq(sum_expr(&vars), required);
            emitted += 1;
        }
    }
    info!("H4: added {emitted} weekly-hours constraints");
}

/// H8: double-period subjects appear in same-day adjacent pairs with
/// identical teacher and room, and never start in the last period.
///
/// For each `(class, subject, day, teacher, room)` combination we introduce
/// one auxiliary "pair-start" boolean `z[p]` per adjacent slot `(p, p+1)`
/// that could both legally hold the subject, and tie every decision
/// variable `var[p]` to the pair(s) it could belong to by *equality*:
/// `var[p] == z[p-1] + z[p]` (the term for a `z` that doesn't exist is 0).
///
/// This deliberately does *not* bi-implicate every adjacent pair directly
/// (`var[p] <=> var[p+1]` for every `p`), since chaining those across a
/// whole day's periods would transitively force every period sharing a
/// `(teacher, room)` combination to be uniformly all-occupied or
/// all-free — wrong whenever a subject's weekly hours split into more than
/// one pair, or a day has more periods than one occurrence needs. Each
/// `z[p]` is independent, so distinct occurrences land in disjoint blocks,
/// and a `var[p]` with no `z` able to cover it (every adjacent slot pruned
/// by availability or a break) is forced to 0 by the same equality, with no
/// separate isolation pass required.
pub fn add_double_period_coupling(problem: &Problem, cp: &mut CpModel, index: &VariableIndex) {
    let mut paired = 0;
    let mut tied = 0;
    let p_count = problem.periods_per_day as usize;

    for c in problem.class_ids() {
        let curriculum = problem.class(c).curriculum.clone();
        for &s in &curriculum {
            if !problem.subject(s).is_double_period {
                continue;
            }
            let qualified_teachers: Vec<_> = problem
                .teacher_ids()
                .filter(|&t| problem.teacher(t).can_teach.contains(&s))
                .collect();
            let compatible_rooms: Vec<_> = problem
                .room_ids()
                .filter(|&r| problem.room(r).room_type == problem.subject(s).room_type)
                .collect();

            for d in 0..problem.days {
                for &t in &qualified_teachers {
                    for &r in &compatible_rooms {
                        let per_period: Vec<Option<_>> = (0..problem.periods_per_day)
                            .map(|p| index.get((c, d, p, s, t, r)))
                            .collect();

                        // z_starts_at[p] is Some(z) when periods p and p+1
                        // could both legally carry this occurrence.
                        let mut z_starts_at: Vec<Option<_>> = vec![None; p_count.saturating_sub(1)];
                        for p in 0..p_count.saturating_sub(1) {
                            if let (Some(_), Some(_)) = (per_period[p], per_period[p + 1]) {
                                let name = format!(
                                    "pair_{c}_{s}_d{d}_{t}_{r}_p{p}"
                                );
                                z_starts_at[p] = Some(cp.new_bool_var(&name));
                                paired += 1;
                            }
                        }

                        for p in 0..p_count {
                            let Some(var) = per_period[p] else { continue };
                            let mut covering = good_lp::Expression::from(0);
                            if p > 0 {
                                if let Some(z) = z_starts_at[p - 1] {
                                    covering += good_lp::Expression::from(z);
                                }
                            }
                            if p < z_starts_at.len() {
                                if let Some(z) = z_starts_at[p] {
                                    covering += good_lp::Expression::from(z);
                                }
                            }
                            cp.add_eq(good_lp::Expression::from(var) - covering, 0.0);
                            tied += 1;
                        }
                    }
                }
            }
        }
    }
    info!("H8: created {paired} candidate pairs, tied {tied} decision variables to them");
}
