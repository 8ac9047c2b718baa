//! The solution representation produced by `SolutionExtractor` (spec §4.5)
//! and consumed by `PostValidator`, `InfeasibilityExplainer` callers, and the
//! HTTP surface's JSON encoding.
//!
//! Grounded on the teacher's `data.rs` `SchedulingOutput`/`Assignment`
//! shape, generalized from a flat assignment list to the three `(day,
//! period)`-grid views spec §4.5 requires.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::problem::Problem;
use crate::solve::SolverStatus;

/// One lesson: a subject taught by a teacher in a room, at a particular
/// `(class, day, period)`. `day`/`period` are 1-based, matching how a school
/// timetable is normally printed, even though every other module in this
/// crate indexes days/periods from 0.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub day: u32,
    pub period: u32,
    pub class: String,
    pub subject: String,
    pub teacher: String,
    pub room: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl From<SolverStatus> for SolveStatus {
    fn from(s: SolverStatus) -> Self {
        match s {
            SolverStatus::Optimal => SolveStatus::Optimal,
            SolverStatus::Feasible => SolveStatus::Feasible,
            SolverStatus::Infeasible => SolveStatus::Infeasible,
            SolverStatus::Unknown => SolveStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleMeta {
    pub status: SolveStatus,
    pub objective_value: f64,
    pub days: u32,
    pub periods_per_day: u32,
}

/// The extracted solution: a flat, 1-based-day/period assignment list (the
/// canonical form everything else derives views from) plus metadata.
/// `day`/`period` are emitted 1-based in the JSON encoding so downstream
/// consumers don't have to special-case a zero-indexed school timetable.
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub meta: ScheduleMeta,
    pub assignments: Vec<Assignment>,
}

impl Schedule {
    /// The `(class, day, period)` view: a lookup by class id string.
    pub fn by_class(&self, class_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.class == class_id)
            .collect()
    }

    /// The `(teacher, day, period)` view.
    pub fn by_teacher(&self, teacher_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.teacher == teacher_id)
            .collect()
    }

    /// The `(room, day, period)` view.
    pub fn by_room(&self, room_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.room == room_id)
            .collect()
    }

    /// Builds the canonical export shape: one `D x P` grid per class,
    /// teacher and room, each cell either the `Assignment` occupying it or
    /// `Free`. This is what the HTTP surface serializes; `assignments`
    /// remains the flat form `extract`/`validate` operate on internally.
    pub fn export(&self, problem: &Problem) -> TimetableExport {
        let class_timetables = problem
            .classes
            .iter()
            .map(|c| (c.class_id.clone(), self.grid_for(problem, |a| a.class == c.class_id)))
            .collect();
        let teacher_timetables = problem
            .teachers
            .iter()
            .map(|t| (t.teacher_id.clone(), self.grid_for(problem, |a| a.teacher == t.teacher_id)))
            .collect();
        let room_utilization = problem
            .rooms
            .iter()
            .map(|r| (r.room_id.clone(), self.grid_for(problem, |a| a.room == r.room_id)))
            .collect();

        TimetableExport {
            meta: self.meta.clone(),
            class_timetables,
            teacher_timetables,
            room_utilization,
        }
    }

    fn grid_for(&self, problem: &Problem, matches: impl Fn(&Assignment) -> bool) -> TimetableGrid {
        let mut grid: TimetableGrid = (0..problem.days)
            .map(|_| (0..problem.periods_per_day).map(|_| TimetableCell::Free).collect())
            .collect();
        for a in self.assignments.iter().filter(|a| matches(a)) {
            grid[(a.day - 1) as usize][(a.period - 1) as usize] = TimetableCell::Occupied(a.clone());
        }
        grid
    }
}

/// One `(day, period)` cell in an exported timetable grid.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TimetableCell {
    Occupied(Assignment),
    /// Serializes as JSON `null`.
    Free,
}

/// Rows indexed by day, columns by period, both 0-based in memory even
/// though the `Assignment`s they contain carry 1-based `day`/`period`.
pub type TimetableGrid = Vec<Vec<TimetableCell>>;

/// The canonical export shape spec §4.5 asks for: three named sections,
/// each a `class_id`/`teacher_id`/`room_id` keyed map to a `D x P` grid.
/// Keys are `BTreeMap`s so the JSON encoding is deterministically ordered.
#[derive(Debug, Clone, Serialize)]
pub struct TimetableExport {
    pub meta: ScheduleMeta,
    pub class_timetables: BTreeMap<String, TimetableGrid>,
    pub teacher_timetables: BTreeMap<String, TimetableGrid>,
    pub room_utilization: BTreeMap<String, TimetableGrid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn problem() -> Problem {
        let raw = json!({
            "classes": ["A"],
            "subjects": {"M": {"hours_per_week": 1, "room_type": "std"}},
            "teachers": {"T1": {"can_teach": ["M"]}},
            "rooms": {"R1": {"type": "std"}},
            "days": 1,
            "periods_per_day": 2,
        });
        crate::normalize::normalize(&raw).unwrap()
    }

    #[test]
    fn export_has_a_free_null_cell_and_an_occupied_cell() {
        let schedule = Schedule {
            meta: ScheduleMeta {
                status: SolveStatus::Optimal,
                objective_value: 0.0,
                days: 1,
                periods_per_day: 2,
            },
            assignments: vec![Assignment {
                day: 1,
                period: 1,
                class: "A".into(),
                subject: "M".into(),
                teacher: "T1".into(),
                room: "R1".into(),
            }],
        };
        let export = schedule.export(&problem());
        let value = serde_json::to_value(&export).unwrap();

        assert!(value.get("class_timetables").is_some());
        assert!(value.get("teacher_timetables").is_some());
        assert!(value.get("room_utilization").is_some());

        let grid = &value["class_timetables"]["A"];
        assert_eq!(grid[0][0]["subject"], "M");
        assert!(grid[0][1].is_null(), "the second period must serialize as a free null cell");
    }
}
