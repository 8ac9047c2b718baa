//! PostValidator (spec §4.6): independently re-checks H1-H8 against an
//! extracted [`Schedule`], without trusting that the model and extractor
//! agree. Every check here is re-derived straight from `problem`, deliberately
//! duplicating logic already enforced by `ModelBuilder`, since the point of
//! this stage is to catch a bug in that enforcement rather than assume it.

use std::collections::{HashMap, HashSet};

use crate::problem::Problem;
use crate::schedule::{Assignment, Schedule};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub violations: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn validate(problem: &Problem, schedule: &Schedule) -> ValidationResult {
    let mut violations = Vec::new();

    let subject_by_id: HashMap<&str, _> = problem
        .subjects
        .iter()
        .map(|s| (s.subject_id.as_str(), s))
        .collect();
    let teacher_by_id: HashMap<&str, _> = problem
        .teachers
        .iter()
        .map(|t| (t.teacher_id.as_str(), t))
        .collect();
    let room_by_id: HashMap<&str, _> = problem.rooms.iter().map(|r| (r.room_id.as_str(), r)).collect();
    let class_by_id: HashMap<&str, _> = problem.classes.iter().map(|c| (c.class_id.as_str(), c)).collect();

    // H1: at most one assignment per (class, day, period).
    check_unique(&schedule.assignments, |a| (a.class.clone(), a.day, a.period), "class", &mut violations);
    // H2: at most one assignment per (teacher, day, period).
    check_unique(&schedule.assignments, |a| (a.teacher.clone(), a.day, a.period), "teacher", &mut violations);
    // H3: at most one assignment per (room, day, period).
    check_unique(&schedule.assignments, |a| (a.room.clone(), a.day, a.period), "room", &mut violations);

    for a in &schedule.assignments {
        let day0 = a.day - 1;
        let period0 = a.period - 1;

        // H5: teacher must be available at this slot.
        if let Some(teacher) = teacher_by_id.get(a.teacher.as_str()) {
            if !teacher.availability.is_available(day0 as usize, period0 as usize) {
                violations.push(format!(
                    "H5: teacher `{}` assigned at day {}/period {} while marked unavailable",
                    a.teacher, a.day, a.period
                ));
            }
            // H6 (qualification half): teacher must be able to teach the subject.
            if let Some(subject) = subject_by_id.get(a.subject.as_str()) {
                let qualifies = teacher
                    .can_teach
                    .iter()
                    .any(|&s| problem.subject(s).subject_id == subject.subject_id);
                if !qualifies {
                    violations.push(format!(
                        "H6: teacher `{}` is not qualified to teach `{}`",
                        a.teacher, a.subject
                    ));
                }
            }
        } else {
            violations.push(format!("unknown teacher `{}` in extracted schedule", a.teacher));
        }

        // H6 (room-type half): room type must match the subject's required type.
        if let (Some(room), Some(subject)) = (room_by_id.get(a.room.as_str()), subject_by_id.get(a.subject.as_str())) {
            if room.room_type != subject.room_type {
                violations.push(format!(
                    "H6: room `{}` (type `{}`) does not match subject `{}` (requires `{}`)",
                    a.room, room.room_type, a.subject, subject.room_type
                ));
            }
        }

        // H7: must not land on an institution break.
        if problem.is_break(day0, period0) {
            violations.push(format!(
                "H7: assignment for class `{}` lands on an institution break (day {}/period {})",
                a.class, a.day, a.period
            ));
        }

        if !class_by_id.contains_key(a.class.as_str()) {
            violations.push(format!("unknown class `{}` in extracted schedule", a.class));
        }
    }

    // H4: every (class, curriculum subject) must receive exactly its weekly-hours quota.
    for class in &problem.classes {
        for &s in &class.curriculum {
            let subject = problem.subject(s);
            let actual = schedule
                .assignments
                .iter()
                .filter(|a| a.class == class.class_id && a.subject == subject.subject_id)
                .count() as u32;
            if actual != subject.hours_per_week {
                violations.push(format!(
                    "H4: class `{}` subject `{}` has {} assigned hours, expected {}",
                    class.class_id, subject.subject_id, actual, subject.hours_per_week
                ));
            }
        }
    }

    // H8: double-period subjects must appear in same-day adjacent pairs
    // with identical teacher and room.
    for subject in problem.subjects.iter().filter(|s| s.is_double_period) {
        let mut by_class_day: HashMap<(&str, u32), Vec<&Assignment>> = HashMap::new();
        for a in schedule.assignments.iter().filter(|a| a.subject == subject.subject_id) {
            by_class_day.entry((a.class.as_str(), a.day)).or_default().push(a);
        }
        for ((class, day), mut occurrences) in by_class_day {
            occurrences.sort_by_key(|a| a.period);
            if occurrences.len() % 2 != 0 {
                violations.push(format!(
                    "H8: class `{class}` has an odd number of `{}` periods on day {day}",
                    subject.subject_id
                ));
                continue;
            }
            for pair in occurrences.chunks(2) {
                let [a, b] = pair else { continue };
                let adjacent = b.period == a.period + 1;
                let same_teacher = a.teacher == b.teacher;
                let same_room = a.room == b.room;
                if !adjacent || !same_teacher || !same_room {
                    violations.push(format!(
                        "H8: class `{class}` `{}` periods {}/{} on day {day} are not a valid \
                         double-period pair (adjacent={adjacent}, same_teacher={same_teacher}, \
                         same_room={same_room})",
                        subject.subject_id, a.period, b.period
                    ));
                }
            }
        }
    }

    ValidationResult { violations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{ScheduleMeta, SolveStatus};
    use serde_json::json;

    fn problem() -> Problem {
        let raw = json!({
            "classes": ["A"],
            "subjects": {"M": {"hours_per_week": 2, "room_type": "std"}},
            "teachers": {"T1": {"can_teach": ["M"]}},
            "rooms": {"R1": {"type": "std"}},
            "days": 1,
            "periods_per_day": 2,
        });
        crate::normalize::normalize(&raw).unwrap()
    }

    fn meta() -> ScheduleMeta {
        ScheduleMeta {
            status: SolveStatus::Optimal,
            objective_value: 0.0,
            days: 1,
            periods_per_day: 2,
        }
    }

    #[test]
    fn accepts_a_correct_schedule() {
        let schedule = Schedule {
            meta: meta(),
            assignments: vec![
                Assignment { day: 1, period: 1, class: "A".into(), subject: "M".into(), teacher: "T1".into(), room: "R1".into() },
                Assignment { day: 1, period: 2, class: "A".into(), subject: "M".into(), teacher: "T1".into(), room: "R1".into() },
            ],
        };
        let result = validate(&problem(), &schedule);
        assert!(result.is_valid(), "{:?}", result.violations);
    }

    #[test]
    fn rejects_wrong_hour_count() {
        let schedule = Schedule {
            meta: meta(),
            assignments: vec![Assignment {
                day: 1, period: 1, class: "A".into(), subject: "M".into(), teacher: "T1".into(), room: "R1".into(),
            }],
        };
        let result = validate(&problem(), &schedule);
        assert!(!result.is_valid());
        assert!(result.violations.iter().any(|v| v.starts_with("H4")));
    }

    #[test]
    fn rejects_double_booked_room() {
        let schedule = Schedule {
            meta: meta(),
            assignments: vec![
                Assignment { day: 1, period: 1, class: "A".into(), subject: "M".into(), teacher: "T1".into(), room: "R1".into() },
                Assignment { day: 1, period: 1, class: "A".into(), subject: "M".into(), teacher: "T1".into(), room: "R1".into() },
            ],
        };
        let result = validate(&problem(), &schedule);
        assert!(!result.is_valid());
    }
}

fn check_unique<K: std::hash::Hash + Eq + std::fmt::Debug>(
    assignments: &[Assignment],
    key_fn: impl Fn(&Assignment) -> K,
    label: &str,
    violations: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for a in assignments {
        let key = key_fn(a);
        if !seen.insert(key) {
            violations.push(format!("double-booked {label} at day {}/period {}", a.day, a.period));
        }
    }
}
