//! PreValidator (spec §4.2): static analysis over a [`Problem`], run before
//! any decision variable exists. Never touches the solver.
//!
//! Grounded on `original_source/timetable_solver/validator.py`'s
//! `pre_validate_input`, which the distilled spec summarized into the E1-E6
//! checklist; the info/warning messages here mirror that function's output.

use std::collections::HashMap;

use crate::problem::Problem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl PreValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the static feasibility checks of spec §4.2. Ordering of emitted
/// messages follows the insertion order of classes/subjects/teachers/rooms
/// in `problem`, making two calls over the same `Problem` idempotent.
pub fn pre_validate(problem: &Problem) -> PreValidationResult {
    let mut result = PreValidationResult {
        errors: Vec::new(),
        warnings: Vec::new(),
        info: Vec::new(),
    };

    let total_slots = problem.days as u64 * problem.periods_per_day as u64;
    let blocked = problem.blocked_slot_count() as u64;
    let available_per_class = total_slots.saturating_sub(blocked);

    result.info.push(format!(
        "total slots per class: {total_slots} ({} days x {} periods)",
        problem.days, problem.periods_per_day
    ));
    result.info.push(format!("blocked slots: {blocked}"));
    result
        .info
        .push(format!("available slots: {available_per_class}"));

    // E1: required hours exceed available slots.
    for class in &problem.classes {
        let required: u64 = class
            .curriculum
            .iter()
            .map(|&s| problem.subject(s).hours_per_week as u64)
            .sum();
        if required > available_per_class {
            result.errors.push(format!(
                "E1: class `{}` requires {} hours but only {} slots are available (exceeds by {})",
                class.class_id,
                required,
                available_per_class,
                required - available_per_class
            ));
        } else if available_per_class > 0
            && required as f64 > available_per_class as f64 * 0.95
        {
            result.warnings.push(format!(
                "class `{}` utilization is very tight: {required}/{available_per_class} hours ({:.1}%)",
                class.class_id,
                required as f64 / available_per_class as f64 * 100.0
            ));
        }
        result
            .info
            .push(format!("class `{}`: {required}/{available_per_class} hours", class.class_id));
    }

    // E2: a curriculum subject with no qualified teacher.
    let referenced_subjects: std::collections::BTreeSet<_> = problem
        .classes
        .iter()
        .flat_map(|c| c.curriculum.iter().copied())
        .collect();
    for &subject_id in &referenced_subjects {
        let subject = problem.subject(subject_id);
        let qualified = problem
            .teachers
            .iter()
            .any(|t| t.can_teach.contains(&subject_id));
        if !qualified {
            result.errors.push(format!(
                "E2: subject `{}` appears in a curriculum but no teacher can teach it",
                subject.subject_id
            ));
        }
    }

    // E3: a subject's room_type has no matching room, E6: lab-typed subjects with no lab room.
    let mut room_type_counts: HashMap<&str, u32> = HashMap::new();
    for room in &problem.rooms {
        *room_type_counts.entry(room.room_type.as_str()).or_insert(0) += 1;
    }
    let mut subject_room_needs: HashMap<&str, u32> = HashMap::new();
    for &subject_id in &referenced_subjects {
        *subject_room_needs
            .entry(problem.subject(subject_id).room_type.as_str())
            .or_insert(0) += 1;
    }
    for (&room_type, &need_count) in &subject_room_needs {
        if !room_type_counts.contains_key(room_type) {
            result.errors.push(format!(
                "E3: {need_count} subject(s) require `{room_type}` rooms but none exist"
            ));
        }
    }
    let lab_subjects = referenced_subjects
        .iter()
        .filter(|&&s| {
            let rt = &problem.subject(s).room_type;
            rt == "lab" || rt == "computer"
        })
        .count();
    let lab_rooms = problem
        .rooms
        .iter()
        .filter(|r| r.room_type == "lab" || r.room_type == "computer")
        .count();
    if lab_subjects > 0 && lab_rooms == 0 {
        result.errors.push(
            "E6: lab-typed subjects exist but no lab-typed room is available".to_string(),
        );
    }
    result
        .info
        .push(format!("room types: {room_type_counts:?}"));
    result
        .info
        .push(format!("subject room needs: {subject_room_needs:?}"));

    // E4: total teaching demand exceeds total teacher-available slots.
    let total_demand = problem.total_teaching_demand();
    let total_availability = problem.total_teacher_availability();
    result
        .info
        .push(format!("total teaching demand: {total_demand} hours"));
    result
        .info
        .push(format!("total teacher availability: {total_availability} slots"));
    if total_demand > total_availability {
        result.errors.push(format!(
            "E4: insufficient teacher capacity: {total_demand} hours needed but only {total_availability} teacher-slots available (shortage {})",
            total_demand - total_availability
        ));
    } else if total_availability > 0
        && total_demand as f64 > total_availability as f64 * 0.90
    {
        result.warnings.push(format!(
            "global teacher utilization is very tight: {total_demand}/{total_availability} ({:.1}%)",
            total_demand as f64 / total_availability as f64 * 100.0
        ));
    }

    // E5: more classes than rooms.
    if problem.classes.len() > problem.rooms.len() {
        result.errors.push(format!(
            "E5: {} classes but only {} rooms (every class could simultaneously need one)",
            problem.classes.len(),
            problem.rooms.len()
        ));
    }

    // Per-teacher warnings: low availability, demand >> capacity.
    for teacher in &problem.teachers {
        let available = teacher.availability.count_available() as u64;
        let total = problem.days as u64 * problem.periods_per_day as u64;
        if total > 0 && available as f64 <= total as f64 * 0.5 {
            result.warnings.push(format!(
                "teacher `{}` has low availability: {available}/{total} slots ({:.1}% unavailable)",
                teacher.teacher_id,
                (total - available) as f64 / total as f64 * 100.0
            ));
        }
        let mut max_demand = 0u64;
        for &s in &teacher.can_teach {
            let classes_needing = problem
                .classes
                .iter()
                .filter(|c| c.curriculum.contains(&s))
                .count() as u64;
            max_demand += classes_needing * problem.subject(s).hours_per_week as u64;
        }
        if available > 0 && max_demand > available * 2 {
            result.warnings.push(format!(
                "teacher `{}` maximum possible demand ({max_demand} hours) is more than 2x capacity ({available} slots)",
                teacher.teacher_id
            ));
        }
    }

    // Double-period subjects: advisory.
    let double_period_count = problem
        .subjects
        .iter()
        .filter(|s| s.is_double_period)
        .count();
    if double_period_count > 0 {
        result.warnings.push(format!(
            "{double_period_count} subject(s) require consecutive periods, reducing scheduling flexibility"
        ));
    }

    // Blocked slots interacting with tight classes.
    if blocked > 0 {
        for class in &problem.classes {
            let required: u64 = class
                .curriculum
                .iter()
                .map(|&s| problem.subject(s).hours_per_week as u64)
                .sum();
            if available_per_class > 0 && required as f64 > available_per_class as f64 * 0.8 {
                result.warnings.push(format!(
                    "class `{}`: institution breaks reduce flexibility and may cause infeasibility",
                    class.class_id
                ));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn e1_hours_exceed_available_slots() {
        let raw = json!({
            "classes": ["A"],
            "subjects": {"M": {"hours_per_week": 3}},
            "teachers": {"T1": {"can_teach": ["M"]}},
            "rooms": {"R1": {}},
            "days": 1,
            "periods_per_day": 2,
        });
        let problem = crate::normalize::normalize(&raw).unwrap();
        let result = pre_validate(&problem);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.starts_with("E1")));
    }

    #[test]
    fn e2_subject_with_no_qualified_teacher() {
        let raw = json!({
            "classes": ["A"],
            "subjects": {"M": {"hours_per_week": 1}},
            "teachers": {"T1": {"can_teach": []}},
            "rooms": {"R1": {}},
        });
        let problem = crate::normalize::normalize(&raw).unwrap();
        let result = pre_validate(&problem);
        assert!(result.errors.iter().any(|e| e.starts_with("E2")));
    }

    #[test]
    fn e3_room_type_with_no_matching_room() {
        let raw = json!({
            "classes": ["A"],
            "subjects": {"M": {"hours_per_week": 1, "room_type": "lab"}},
            "teachers": {"T1": {"can_teach": ["M"]}},
            "rooms": {"R1": {"type": "standard"}},
        });
        let problem = crate::normalize::normalize(&raw).unwrap();
        let result = pre_validate(&problem);
        assert!(result.errors.iter().any(|e| e.starts_with("E3")));
    }

    #[test]
    fn idempotent_on_same_problem() {
        let raw = json!({
            "classes": ["A"],
            "subjects": {"M": {"hours_per_week": 1}},
            "teachers": {"T1": {"can_teach": ["M"]}},
            "rooms": {"R1": {}},
        });
        let problem = crate::normalize::normalize(&raw).unwrap();
        assert_eq!(pre_validate(&problem), pre_validate(&problem));
    }
}
