//! The canonical, immutable problem description (spec §3).
//!
//! A `Problem` is produced once by the normalizer and then read by every
//! later stage. Nothing downstream mutates it.

use crate::ids::{ClassId, RoomId, SubjectId, TeacherId};

/// A cohort of students sharing a timetable.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub class_id: String,
    /// Subjects this class must be taught, in the order they were declared.
    pub curriculum: Vec<SubjectId>,
}

/// A subject taught to one or more classes.
#[derive(Debug, Clone)]
pub struct SubjectDef {
    pub subject_id: String,
    pub hours_per_week: u32,
    pub room_type: String,
    pub is_heavy: bool,
    pub is_double_period: bool,
}

/// A `days x periods_per_day` availability mask, 1 = permitted to teach.
#[derive(Debug, Clone)]
pub struct Availability {
    days: usize,
    periods: usize,
    mask: Vec<bool>,
}

impl Availability {
    pub fn all_available(days: usize, periods: usize) -> Self {
        Availability {
            days,
            periods,
            mask: vec![true; days * periods],
        }
    }

    pub fn from_matrix(matrix: Vec<Vec<bool>>) -> Self {
        let days = matrix.len();
        let periods = matrix.first().map(|row| row.len()).unwrap_or(0);
        let mut mask = Vec::with_capacity(days * periods);
        for row in &matrix {
            mask.extend_from_slice(row);
        }
        Availability { days, periods, mask }
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn is_available(&self, day: usize, period: usize) -> bool {
        self.mask[day * self.periods + period]
    }

    pub fn count_available(&self) -> usize {
        self.mask.iter().filter(|&&a| a).count()
    }
}

/// A teacher qualified to teach a set of subjects at certain times.
#[derive(Debug, Clone)]
pub struct TeacherDef {
    pub teacher_id: String,
    pub can_teach: Vec<SubjectId>,
    pub availability: Availability,
}

/// A physical room of a given type. `capacity` is reserved for future
/// constraints; it is carried but never constrained (spec §9 open question).
#[derive(Debug, Clone)]
pub struct RoomDef {
    pub room_id: String,
    pub room_type: String,
    pub capacity: Option<u32>,
}

/// An institution-wide break, e.g. lunch. `day = None` means every day.
#[derive(Debug, Clone, Copy)]
pub struct BreakSlot {
    pub day: Option<u32>,
    pub start_period: u32,
    pub duration: u32,
}

/// Weights for the five soft-penalty terms of spec §4.3. All non-negative.
#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub teacher_idle_transition: u32,
    pub class_consecutive_overrun: u32,
    pub subject_spread_excess: u32,
    pub heavy_back_to_back: u32,
    pub teacher_early_late_imbalance: u32,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            teacher_idle_transition: 2,
            class_consecutive_overrun: 3,
            subject_spread_excess: 2,
            heavy_back_to_back: 1,
            teacher_early_late_imbalance: 1,
        }
    }
}

/// Tunable thresholds that parameterize the soft-penalty terms.
#[derive(Debug, Clone)]
pub struct Tuning {
    pub max_consecutive_periods: u32,
    pub early_periods: Vec<u32>,
    pub late_periods: Vec<u32>,
}

impl Tuning {
    pub fn defaults_for(periods_per_day: u32) -> Self {
        Tuning {
            max_consecutive_periods: 3,
            early_periods: vec![0, 1],
            late_periods: vec![periods_per_day.saturating_sub(2), periods_per_day.saturating_sub(1)],
        }
    }
}

/// The canonical, validated problem description. Immutable after normalization.
#[derive(Debug, Clone)]
pub struct Problem {
    pub days: u32,
    pub periods_per_day: u32,
    pub classes: Vec<ClassDef>,
    pub subjects: Vec<SubjectDef>,
    pub teachers: Vec<TeacherDef>,
    pub rooms: Vec<RoomDef>,
    pub breaks: Vec<BreakSlot>,
    pub weights: Weights,
    pub tuning: Tuning,
}

impl Problem {
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.index()]
    }

    pub fn subject(&self, id: SubjectId) -> &SubjectDef {
        &self.subjects[id.index()]
    }

    pub fn teacher(&self, id: TeacherId) -> &TeacherDef {
        &self.teachers[id.index()]
    }

    pub fn room(&self, id: RoomId) -> &RoomDef {
        &self.rooms[id.index()]
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len()).map(ClassId::from)
    }

    pub fn subject_ids(&self) -> impl Iterator<Item = SubjectId> {
        (0..self.subjects.len()).map(SubjectId::from)
    }

    pub fn teacher_ids(&self) -> impl Iterator<Item = TeacherId> {
        (0..self.teachers.len()).map(TeacherId::from)
    }

    pub fn room_ids(&self) -> impl Iterator<Item = RoomId> {
        (0..self.rooms.len()).map(RoomId::from)
    }

    /// Total weekly teaching demand: sum over classes of sum over curriculum hours.
    pub fn total_teaching_demand(&self) -> u64 {
        self.classes
            .iter()
            .flat_map(|c| c.curriculum.iter())
            .map(|&s| self.subject(s).hours_per_week as u64)
            .sum()
    }

    /// Total teacher-available slots across the horizon.
    pub fn total_teacher_availability(&self) -> u64 {
        self.teachers
            .iter()
            .map(|t| t.availability.count_available() as u64)
            .sum()
    }

    /// Total horizon slots minus institution-wide break slots, i.e. the
    /// slots actually free for any class to be taught in.
    pub fn available_slots_per_class(&self) -> u64 {
        let total = self.days as u64 * self.periods_per_day as u64;
        total.saturating_sub(self.blocked_slot_count() as u64)
    }

    /// Number of distinct (day, period) slots removed by institution breaks.
    pub fn blocked_slot_count(&self) -> usize {
        let mut blocked = vec![false; (self.days * self.periods_per_day) as usize];
        for b in &self.breaks {
            let days: Vec<u32> = match b.day {
                Some(d) => vec![d],
                None => (0..self.days).collect(),
            };
            for d in days {
                for offset in 0..b.duration {
                    let p = b.start_period + offset;
                    if p < self.periods_per_day {
                        blocked[(d * self.periods_per_day + p) as usize] = true;
                    }
                }
            }
        }
        blocked.iter().filter(|&&b| b).count()
    }

    pub fn is_break(&self, day: u32, period: u32) -> bool {
        self.breaks.iter().any(|b| {
            let affects_day = matches!(b.day, None) || b.day == Some(day);
            affects_day && period >= b.start_period && period < b.start_period + b.duration
        })
    }
}
