//! End-to-end scenarios S1-S6 exercised through the public API only.

use serde_json::json;
use timetable_engine::model::build_model;
use timetable_engine::{extract, pre_validate, solve, validate, SchedulerError, SolveOptions};

fn solve_options() -> SolveOptions {
    SolveOptions {
        max_time_seconds: 5.0,
        num_workers: 1,
        random_seed: Some(1234),
        log_progress: false,
    }
}

/// S1 - trivially feasible: one class, one subject needing 2 hours, one
/// teacher, one room, a 1-day/2-period horizon with no slack at all.
#[test]
fn s1_trivially_feasible() {
    let raw = json!({
        "classes": ["A"],
        "subjects": {"M": {"hours_per_week": 2, "room_type": "std"}},
        "teachers": {"T1": {"can_teach": ["M"]}},
        "rooms": {"R1": {"type": "std"}},
        "days": 1,
        "periods_per_day": 2,
    });
    let problem = timetable_engine::normalize(&raw).unwrap();
    assert!(pre_validate(&problem).is_valid());

    let (cp, index) = build_model(&problem).unwrap();
    let all_vars = index.all_vars();
    let result = solve(cp, &all_vars, &solve_options()).unwrap();
    let schedule = extract(&problem, &index, &result);

    assert_eq!(schedule.assignments.len(), 2);
    for a in &schedule.assignments {
        assert_eq!(a.class, "A");
        assert_eq!(a.subject, "M");
        assert_eq!(a.teacher, "T1");
        assert_eq!(a.room, "R1");
    }
    let mut periods: Vec<u32> = schedule.assignments.iter().map(|a| a.period).collect();
    periods.sort();
    assert_eq!(periods, vec![1, 2]);
    assert_eq!(schedule.meta.objective_value, 0.0);

    assert!(validate(&problem, &schedule).is_valid());
}

/// S2 - hard infeasible, caught by PreValidator: 3 hours demanded against a
/// 2-slot horizon.
#[test]
fn s2_hard_infeasible_caught_by_prevalidator() {
    let raw = json!({
        "classes": ["A"],
        "subjects": {"M": {"hours_per_week": 3}},
        "teachers": {"T1": {"can_teach": ["M"]}},
        "rooms": {"R1": {}},
        "days": 1,
        "periods_per_day": 2,
    });
    let problem = timetable_engine::normalize(&raw).unwrap();
    let pre = pre_validate(&problem);
    assert!(!pre.is_valid());
    assert!(pre.errors.iter().any(|e| e.starts_with("E1")));

    let err = build_model(&problem).unwrap_err();
    assert!(matches!(err, SchedulerError::ModelInvalid(_)));
}

/// S3 - unqualified subject: a subject nobody can teach.
#[test]
fn s3_unqualified_subject() {
    let raw = json!({
        "classes": ["A"],
        "subjects": {"M": {"hours_per_week": 1}},
        "teachers": {"T1": {"can_teach": []}},
        "rooms": {"R1": {}},
    });
    let problem = timetable_engine::normalize(&raw).unwrap();
    let pre = pre_validate(&problem);
    assert!(!pre.is_valid());
    assert!(pre.errors.iter().any(|e| e.starts_with("E2")));
}

/// S4 - double-period coupling: a 2-hour double-period subject across 3
/// periods must land on a valid adjacent pair, leaving exactly one free
/// period, never an isolated single.
#[test]
fn s4_double_period_coupling() {
    let raw = json!({
        "classes": ["A"],
        "subjects": {"L": {"hours_per_week": 2, "is_double_period": true, "room_type": "lab"}},
        "teachers": {"T1": {"can_teach": ["L"]}},
        "rooms": {"R1": {"type": "lab"}},
        "days": 1,
        "periods_per_day": 3,
    });
    let problem = timetable_engine::normalize(&raw).unwrap();
    assert!(pre_validate(&problem).is_valid());

    let (cp, index) = build_model(&problem).unwrap();
    let all_vars = index.all_vars();
    let result = solve(cp, &all_vars, &solve_options()).unwrap();
    let schedule = extract(&problem, &index, &result);

    assert_eq!(schedule.assignments.len(), 2);
    let mut periods: Vec<u32> = schedule.assignments.iter().map(|a| a.period).collect();
    periods.sort();
    assert_eq!(periods[1] - periods[0], 1, "the two periods must be adjacent");

    assert!(validate(&problem, &schedule).is_valid());
}

/// S5 - teacher conflict: two classes both need the one teacher qualified
/// for `M`, who has only a single available slot. A second, unrelated
/// teacher pads the aggregate availability PreValidator's E4 check sees,
/// so the shortage is invisible there and only surfaces once H2 (teacher
/// non-conflict) collides with H4 (weekly hours) in the model itself.
#[test]
fn s5_teacher_conflict_infeasible() {
    let raw = json!({
        "classes": ["A", "B"],
        "subjects": {"M": {"hours_per_week": 1}},
        "teachers": {
            "T1": {"can_teach": ["M"], "availability": [[true, false]]},
            "T2": {"can_teach": [], "availability": [[true, true]]},
        },
        "rooms": {"R1": {}},
        "days": 1,
        "periods_per_day": 2,
        "class_subjects": {"A": ["M"], "B": ["M"]},
    });
    let problem = timetable_engine::normalize(&raw).unwrap();
    let pre = pre_validate(&problem);
    assert!(pre.is_valid(), "the shortage is per-teacher-qualification, invisible to E4's aggregate check: {:?}", pre.errors);

    let (cp, index) = build_model(&problem).unwrap();
    let all_vars = index.all_vars();
    let err = solve(cp, &all_vars, &solve_options()).unwrap_err();
    assert!(matches!(err, SchedulerError::SolverInfeasible));

    let reasons = timetable_engine::explain_infeasibility(&problem);
    assert!(!reasons.is_empty());
}

/// S6 - soft optimization: a heavy subject's two weekly hours can either
/// land back-to-back (penalized) or spread across two days (free); the
/// solver must prefer the zero-cost spread.
#[test]
fn s6_soft_optimization_prefers_spread() {
    let raw = json!({
        "classes": ["A"],
        "subjects": {"H": {"hours_per_week": 2, "is_heavy": true}},
        "teachers": {"T1": {"can_teach": ["H"]}},
        "rooms": {"R1": {}},
        "days": 2,
        "periods_per_day": 1,
    });
    let problem = timetable_engine::normalize(&raw).unwrap();
    assert!(pre_validate(&problem).is_valid());

    let (cp, index) = build_model(&problem).unwrap();
    let all_vars = index.all_vars();
    let result = solve(cp, &all_vars, &solve_options()).unwrap();
    let schedule = extract(&problem, &index, &result);

    // Only one period per day, so the two hours necessarily land on
    // different days; no heavy-back-to-back penalty can apply and the
    // minimum achievable objective is 0.
    assert_eq!(schedule.meta.objective_value, 0.0);
    assert!(validate(&problem, &schedule).is_valid());
}
