//! Auxiliary presence indicators and the five weighted soft-penalty terms
//! (spec §4.3). Zero-weight terms are still added structurally, since the
//! model's shape must stay input-agnostic; the one exception (also spec
//! §4.3) is that the heavy-subject machinery is omitted entirely when no
//! heavy subject exists in the problem.

use std::collections::HashMap;

use good_lp::Expression;
use log::info;

use crate::cp_model::{BoolVar, CpModel};
use crate::ids::{ClassId, TeacherId};
use crate::model::variables::VariableIndex;
use crate::problem::Problem;

/// `y_teacher[t,d,p]`, `y_class[c,d,p]` and (if any heavy subject exists)
/// `heavy[c,d,p]`. `None` means the indicator is definitionally 0 because no
/// decision variable could ever contribute to that slot.
pub struct PresenceIndicators {
    pub y_teacher: HashMap<(TeacherId, u32, u32), Option<BoolVar>>,
    pub y_class: HashMap<(ClassId, u32, u32), Option<BoolVar>>,
    pub heavy: Option<HashMap<(ClassId, u32, u32), Option<BoolVar>>>,
}

fn opt_expr(var: Option<BoolVar>) -> Expression {
    match var {
        Some(v) => Expression::from(v),
        None => Expression::from(0),
    }
}

fn sum_expr(vars: &[BoolVar]) -> Expression {
    vars.iter().copied().map(Expression::from).sum()
}

/// `Σ vars == y`, or `y` fixed at 0 (by simply never creating it) when
/// `vars` is empty.
fn presence_var(cp: &mut CpModel, vars: &[BoolVar], name: &str) -> Option<BoolVar> {
    if vars.is_empty() {
        return None;
    }
    let y = cp.new_bool_var(name);
    cp.add_eq(sum_expr(vars) - Expression::from(y), 0.0);
    Some(y)
}

pub fn build_presence_indicators(
    problem: &Problem,
    cp: &mut CpModel,
    index: &VariableIndex,
) -> PresenceIndicators {
    let mut y_teacher = HashMap::new();
    for t in problem.teacher_ids() {
        for d in 0..problem.days {
            for p in 0..problem.periods_per_day {
                let vars = index.by_tdp.get(&(t, d, p)).cloned().unwrap_or_default();
                let name = format!("y_teacher_{t}_d{d}_p{p}");
                y_teacher.insert((t, d, p), presence_var(cp, &vars, &name));
            }
        }
    }

    let mut y_class = HashMap::new();
    for c in problem.class_ids() {
        for d in 0..problem.days {
            for p in 0..problem.periods_per_day {
                let vars = index.by_cdp.get(&(c, d, p)).cloned().unwrap_or_default();
                let name = format!("y_class_{c}_d{d}_p{p}");
                y_class.insert((c, d, p), presence_var(cp, &vars, &name));
            }
        }
    }

    let heavy_subjects: Vec<_> = problem
        .subject_ids()
        .filter(|&s| problem.subject(s).is_heavy)
        .collect();
    let heavy = if heavy_subjects.is_empty() {
        None
    } else {
        let mut map = HashMap::new();
        for c in problem.class_ids() {
            for d in 0..problem.days {
                for p in 0..problem.periods_per_day {
                    let mut vars = Vec::new();
                    for &s in &heavy_subjects {
                        if let Some(vs) = index.by_cdps.get(&(c, d, p, s)) {
                            vars.extend_from_slice(vs);
                        }
                    }
                    let name = format!("heavy_{c}_d{d}_p{p}");
                    map.insert((c, d, p), presence_var(cp, &vars, &name));
                }
            }
        }
        Some(map)
    };

    info!(
        "built presence indicators: {} teacher-slots, {} class-slots, heavy={}",
        y_teacher.len(),
        y_class.len(),
        heavy.is_some()
    );

    PresenceIndicators {
        y_teacher,
        y_class,
        heavy,
    }
}

/// Adds the five weighted soft-penalty terms to the model's objective and
/// returns the number of penalty terms added (for diagnostics/tests).
pub fn add_soft_objective(
    problem: &Problem,
    cp: &mut CpModel,
    index: &VariableIndex,
    presence: &PresenceIndicators,
) -> usize {
    let mut terms = 0;
    let w = &problem.weights;

    // Teacher idle-transition: |y_teacher[t,d,p] - y_teacher[t,d,p-1]|.
    for t in problem.teacher_ids() {
        for d in 0..problem.days {
            for p in 1..problem.periods_per_day {
                let now = presence.y_teacher[&(t, d, p)];
                let prev = presence.y_teacher[&(t, d, p - 1)];
                let diff = match (now, prev) {
                    (None, None) => Expression::from(0),
                    (Some(a), None) | (None, Some(a)) => Expression::from(a),
                    (Some(a), Some(b)) => {
                        Expression::from(cp.xor_indicator(a, b, &format!("idle_trans_{t}_d{d}_p{p}")))
                    }
                };
                cp.add_objective_term(w.teacher_idle_transition as f64, diff);
                terms += 1;
            }
        }
    }

    // Class consecutive overrun: max(0, Σ_window y_class - M) per window of
    // length M+1.
    let m = problem.tuning.max_consecutive_periods;
    for c in problem.class_ids() {
        for d in 0..problem.days {
            let mut start = 0u32;
            while start < problem.periods_per_day {
                let end = (start + m + 1).min(problem.periods_per_day);
                if end - start <= m {
                    break; // window doesn't fully fit; spec's `continue` short-circuits the rest too
                }
                let window_vars: Vec<BoolVar> = (start..end)
                    .filter_map(|p| presence.y_class[&(c, d, p)])
                    .collect();
                let window_len = (end - start) as i64;
                let sum = sum_expr(&window_vars);
                let overrun = cp.overrun_var(
                    sum,
                    m as f64,
                    window_len,
                    &format!("overrun_{c}_d{d}_s{start}"),
                );
                cp.add_objective_term(w.class_consecutive_overrun as f64, overrun);
                terms += 1;
                start += 1;
            }
        }
    }

    // Subject spread excess: max(0, day_count(c,s,d) - 1).
    for c in problem.class_ids() {
        for &s in &problem.class(c).curriculum {
            for d in 0..problem.days {
                let mut day_vars = Vec::new();
                for p in 0..problem.periods_per_day {
                    if let Some(vars) = index.by_cdps.get(&(c, d, p, s)) {
                        day_vars.extend_from_slice(vars);
                    }
                }
                if day_vars.is_empty() {
                    continue;
                }
                let ub = problem.periods_per_day as i64;
                let excess = cp.overrun_var(
                    sum_expr(&day_vars),
                    1.0,
                    ub,
                    &format!("excess_{c}_{s}_d{d}"),
                );
                cp.add_objective_term(w.subject_spread_excess as f64, excess);
                terms += 1;
            }
        }
    }

    // Heavy back-to-back: heavy[c,d,p] AND heavy[c,d,p+1]. Omitted entirely
    // when no heavy subject exists in the problem.
    if let Some(heavy) = &presence.heavy {
        for c in problem.class_ids() {
            for d in 0..problem.days {
                for p in 0..problem.periods_per_day.saturating_sub(1) {
                    let a = heavy[&(c, d, p)];
                    let b = heavy[&(c, d, p + 1)];
                    let pair = match (a, b) {
                        (Some(a), Some(b)) => {
                            Expression::from(cp.and_indicator(a, b, &format!("heavy_pair_{c}_d{d}_p{p}")))
                        }
                        _ => Expression::from(0),
                    };
                    cp.add_objective_term(w.heavy_back_to_back as f64, pair);
                    terms += 1;
                }
            }
        }
    }

    // Teacher early/late imbalance: |early_count - late_count|.
    for t in problem.teacher_ids() {
        let mut early_sum = Expression::from(0);
        let mut late_sum = Expression::from(0);
        for d in 0..problem.days {
            for &p in problem.tuning.early_periods.iter().filter(|&&p| p < problem.periods_per_day) {
                early_sum += opt_expr(presence.y_teacher[&(t, d, p)]);
            }
            for &p in problem.tuning.late_periods.iter().filter(|&&p| p < problem.periods_per_day) {
                late_sum += opt_expr(presence.y_teacher[&(t, d, p)]);
            }
        }
        let ub = problem.days as i64
            * problem
                .tuning
                .early_periods
                .len()
                .max(problem.tuning.late_periods.len()) as i64;
        let imbalance = cp.abs_equality(early_sum - late_sum, ub, &format!("imbalance_{t}"));
        cp.add_objective_term(w.teacher_early_late_imbalance as f64, imbalance);
        terms += 1;
    }

    info!("added {terms} soft-penalty terms to the objective");
    terms
}
