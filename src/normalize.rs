//! Normalizer (spec §4.1): maps an already-parsed raw configuration
//! (`serde_json::Value`, as handed over by whatever JSON/YAML front end is
//! wired up outside this crate) to a canonical, validated [`Problem`].

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SchedulerError};
use crate::ids::SubjectId;
use crate::problem::{
    Availability, BreakSlot, ClassDef, Problem, RoomDef, SubjectDef, TeacherDef, Tuning, Weights,
};

fn missing(field: &str) -> SchedulerError {
    SchedulerError::Config(format!("missing required field `{field}`"))
}

/// Entries of an entity collection that may be supplied either as a JSON
/// object keyed by id, or as an array of bare id strings / id-bearing
/// records (spec §4.1).
fn entity_entries(value: &Value, id_keys: &[&str]) -> Result<Vec<(String, Value)>> {
    match value {
        Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok((s.clone(), Value::Null)),
                Value::Object(obj) => {
                    let id = id_keys
                        .iter()
                        .chain(std::iter::once(&"id"))
                        .find_map(|k| obj.get(*k))
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            SchedulerError::Config(
                                "array entry is missing an id field".to_string(),
                            )
                        })?;
                    Ok((id.to_string(), Value::Object(obj.clone())))
                }
                _ => Err(SchedulerError::Config(
                    "array entries must be strings or objects".to_string(),
                )),
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(SchedulerError::Config(
            "expected an object or array".to_string(),
        )),
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawSubject {
    hours_per_week: Option<u32>,
    room_type: Option<String>,
    is_heavy: Option<bool>,
    is_double_period: Option<bool>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawTeacher {
    can_teach: Option<Vec<String>>,
    availability: Option<Vec<Vec<Value>>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawRoom {
    #[serde(rename = "type")]
    room_type: Option<String>,
    capacity: Option<u32>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawBreak {
    day: Option<Value>,
    start_period: Option<u32>,
    period: Option<u32>,
    duration: Option<u32>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawWeights {
    teacher_idle_transition: Option<u32>,
    class_consecutive_overrun: Option<u32>,
    subject_spread_excess: Option<u32>,
    heavy_back_to_back: Option<u32>,
    teacher_early_late_imbalance: Option<u32>,
}

fn record<T: for<'de> Deserialize<'de> + Default>(value: Value) -> Result<T> {
    if value.is_null() {
        Ok(T::default())
    } else {
        serde_json::from_value(value)
            .map_err(|e| SchedulerError::Config(format!("malformed record: {e}")))
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::Null => false,
        _ => true,
    }
}

/// Normalizes a raw, already-parsed configuration into a canonical `Problem`.
pub fn normalize(raw: &Value) -> Result<Problem> {
    let classes_value = raw.get("classes").ok_or_else(|| missing("classes"))?;
    let subjects_value = raw.get("subjects").ok_or_else(|| missing("subjects"))?;
    let teachers_value = raw.get("teachers").ok_or_else(|| missing("teachers"))?;
    let rooms_value = raw.get("rooms").cloned().unwrap_or(Value::Null);

    let days = raw.get("days").and_then(Value::as_u64).unwrap_or(5) as u32;
    let periods_per_day = raw
        .get("periods_per_day")
        .and_then(Value::as_u64)
        .unwrap_or(6) as u32;
    if days == 0 || periods_per_day == 0 {
        return Err(SchedulerError::Config(
            "days and periods_per_day must be at least 1".to_string(),
        ));
    }

    // Subjects first: classes/teachers reference them by id.
    let subject_entries = entity_entries(subjects_value, &["subject_id"])?;
    let mut subject_index: HashMap<String, SubjectId> = HashMap::new();
    let mut subjects = Vec::with_capacity(subject_entries.len());
    for (i, (id, value)) in subject_entries.into_iter().enumerate() {
        let raw: RawSubject = record(value)?;
        subject_index.insert(id.clone(), SubjectId::from(i));
        subjects.push(SubjectDef {
            subject_id: id,
            hours_per_week: raw.hours_per_week.unwrap_or(1),
            room_type: raw.room_type.unwrap_or_else(|| "standard".to_string()),
            is_heavy: raw.is_heavy.unwrap_or(false),
            is_double_period: raw.is_double_period.unwrap_or(false),
        });
    }

    let resolve_subject = |id: &str| -> Result<SubjectId> {
        subject_index
            .get(id)
            .copied()
            .ok_or_else(|| SchedulerError::Config(format!("unknown subject id `{id}`")))
    };

    // Teachers.
    let teacher_entries = entity_entries(teachers_value, &["teacher_id"])?;
    let mut teachers = Vec::with_capacity(teacher_entries.len());
    for (id, value) in teacher_entries {
        let raw: RawTeacher = record(value)?;
        let can_teach = match raw.can_teach {
            Some(ids) => ids
                .iter()
                .map(|s| resolve_subject(s))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };
        let availability = match raw.availability {
            Some(matrix) => {
                if matrix.len() != days as usize
                    || matrix.iter().any(|row| row.len() != periods_per_day as usize)
                {
                    return Err(SchedulerError::Config(format!(
                        "teacher `{id}` availability matrix must be {days}x{periods_per_day}"
                    )));
                }
                let bool_matrix: Vec<Vec<bool>> = matrix
                    .into_iter()
                    .map(|row| row.iter().map(truthy).collect())
                    .collect();
                Availability::from_matrix(bool_matrix)
            }
            None => Availability::all_available(days as usize, periods_per_day as usize),
        };
        teachers.push(TeacherDef {
            teacher_id: id,
            can_teach,
            availability,
        });
    }

    // Rooms.
    let room_entries = entity_entries(&rooms_value, &["room_id"])?;
    let mut rooms = Vec::with_capacity(room_entries.len());
    for (id, value) in room_entries {
        let raw: RawRoom = record(value)?;
        rooms.push(RoomDef {
            room_id: id,
            room_type: raw.room_type.unwrap_or_else(|| "standard".to_string()),
            capacity: raw.capacity,
        });
    }

    // Classes + curriculum (class_subjects), defaulting to the full subject set.
    let class_ids: Vec<String> = match classes_value {
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    SchedulerError::Config("classes must be a list of string ids".to_string())
                })
            })
            .collect::<Result<Vec<_>>>()?,
        _ => {
            return Err(SchedulerError::Config(
                "classes must be a JSON array of ids".to_string(),
            ))
        }
    };

    let full_subject_set: Vec<SubjectId> = (0..subjects.len()).map(SubjectId::from).collect();
    let class_subjects_raw = raw.get("class_subjects");
    let mut classes = Vec::with_capacity(class_ids.len());
    for class_id in class_ids {
        let curriculum = match class_subjects_raw.and_then(|v| v.get(&class_id)) {
            Some(Value::Array(ids)) => {
                let mut resolved = Vec::with_capacity(ids.len());
                let mut ok = true;
                for v in ids {
                    match v.as_str().map(resolve_subject) {
                        Some(Ok(id)) => resolved.push(id),
                        _ => {
                            ok = false;
                            break;
                        }
                    }
                }
                if ok {
                    resolved
                } else {
                    full_subject_set.clone()
                }
            }
            _ => full_subject_set.clone(),
        };
        if curriculum.is_empty() {
            return Err(SchedulerError::Config(format!(
                "class `{class_id}` has an empty curriculum"
            )));
        }
        classes.push(ClassDef {
            class_id,
            curriculum,
        });
    }

    // Institution-wide breaks, clipped to [0, P).
    let break_entries = raw
        .get("institution")
        .and_then(|v| v.get("breaks"))
        .or_else(|| raw.get("breaks"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut breaks = Vec::with_capacity(break_entries.len());
    for value in break_entries {
        let raw_break: RawBreak = record(value)?;
        let day = match raw_break.day {
            None => None,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("all") => None,
            Some(Value::Number(n)) => {
                let d = n.as_i64().unwrap_or(-1);
                if d < 0 { None } else { Some(d as u32) }
            }
            Some(_) => None,
        };
        let start_period = raw_break
            .start_period
            .or(raw_break.period)
            .unwrap_or(0)
            .min(periods_per_day.saturating_sub(1));
        let duration = raw_break
            .duration
            .unwrap_or(1)
            .min(periods_per_day - start_period);
        breaks.push(BreakSlot {
            day,
            start_period,
            duration,
        });
    }

    // Soft-constraint weights.
    let weights_raw: RawWeights = record(raw.get("weights").cloned().unwrap_or(Value::Null))?;
    let defaults = Weights::default();
    let weights = Weights {
        teacher_idle_transition: weights_raw
            .teacher_idle_transition
            .unwrap_or(defaults.teacher_idle_transition),
        class_consecutive_overrun: weights_raw
            .class_consecutive_overrun
            .unwrap_or(defaults.class_consecutive_overrun),
        subject_spread_excess: weights_raw
            .subject_spread_excess
            .unwrap_or(defaults.subject_spread_excess),
        heavy_back_to_back: weights_raw
            .heavy_back_to_back
            .unwrap_or(defaults.heavy_back_to_back),
        teacher_early_late_imbalance: weights_raw
            .teacher_early_late_imbalance
            .unwrap_or(defaults.teacher_early_late_imbalance),
    };

    // Tuning.
    let mut tuning = Tuning::defaults_for(periods_per_day);
    if let Some(v) = raw.get("max_consecutive_periods").and_then(Value::as_u64) {
        tuning.max_consecutive_periods = v as u32;
    }
    if let Some(Value::Array(items)) = raw.get("early_periods") {
        tuning.early_periods = items.iter().filter_map(Value::as_u64).map(|v| v as u32).collect();
    }
    if let Some(Value::Array(items)) = raw.get("late_periods") {
        tuning.late_periods = items.iter().filter_map(Value::as_u64).map(|v| v as u32).collect();
    }

    if classes.is_empty() {
        return Err(SchedulerError::Config("classes must be non-empty".to_string()));
    }

    Ok(Problem {
        days,
        periods_per_day,
        classes,
        subjects,
        teachers,
        rooms,
        breaks,
        weights,
        tuning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_full_curriculum_and_matrix_shapes() {
        let raw = json!({
            "classes": ["A"],
            "subjects": {"M": {"hours_per_week": 2}},
            "teachers": {"T1": {"can_teach": ["M"]}},
            "rooms": {"R1": {"type": "standard"}},
            "days": 1,
            "periods_per_day": 2,
        });
        let problem = normalize(&raw).unwrap();
        assert_eq!(problem.classes.len(), 1);
        assert_eq!(problem.classes[0].curriculum.len(), 1);
        assert_eq!(problem.teachers[0].availability.days(), 1);
        assert_eq!(problem.teachers[0].availability.periods(), 2);
        assert!(problem.teachers[0].availability.is_available(0, 0));
    }

    #[test]
    fn string_sequences_get_defaulted_records() {
        let raw = json!({
            "classes": ["A"],
            "subjects": ["M"],
            "teachers": ["T1"],
            "rooms": ["R1"],
        });
        let problem = normalize(&raw).unwrap();
        assert_eq!(problem.subjects[0].hours_per_week, 1);
        assert_eq!(problem.subjects[0].room_type, "standard");
        assert_eq!(problem.rooms[0].room_type, "standard");
        assert!(problem.teachers[0].can_teach.is_empty());
    }

    #[test]
    fn missing_classes_is_config_error() {
        let raw = json!({"subjects": {}, "teachers": {}});
        assert!(matches!(normalize(&raw), Err(SchedulerError::Config(_))));
    }

    #[test]
    fn bad_availability_shape_is_rejected() {
        let raw = json!({
            "classes": ["A"],
            "subjects": {"M": {}},
            "teachers": {"T1": {"availability": [[1]]}},
            "days": 2,
            "periods_per_day": 2,
        });
        assert!(matches!(normalize(&raw), Err(SchedulerError::Config(_))));
    }
}
