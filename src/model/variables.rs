//! The sparse decision-variable universe `V` (spec §3) and its prefix
//! indexes for O(1) constraint-emission lookups (spec §9 design note:
//! "a flat sorted table ... with companion prefix indexes for O(1) range
//! scans during constraint emission").

use std::collections::HashMap;

use log::{debug, trace};

use crate::cp_model::{BoolVar, CpModel};
use crate::ids::{ClassId, RoomId, SubjectId, TeacherId};
use crate::problem::Problem;

pub type Tuple = (ClassId, u32, u32, SubjectId, TeacherId, RoomId);

/// The decision-variable universe, keyed for O(1) lookup by the full tuple
/// and by every prefix spec §3 calls out: `(c,d,p)`, `(c,d,p,s)`,
/// `(c,d,p,s,t)`, plus `(t,d,p)`, `(r,d,p)` and `(c,s)` for the hard
/// constraints and the weekly-hours / subject-spread soft terms.
#[derive(Default)]
pub struct VariableIndex {
    pub by_tuple: HashMap<Tuple, BoolVar>,
    pub tuple_of: HashMap<BoolVar, Tuple>,
    pub by_cdp: HashMap<(ClassId, u32, u32), Vec<BoolVar>>,
    pub by_cdps: HashMap<(ClassId, u32, u32, SubjectId), Vec<BoolVar>>,
    pub by_cdpst: HashMap<(ClassId, u32, u32, SubjectId, TeacherId), Vec<BoolVar>>,
    pub by_tdp: HashMap<(TeacherId, u32, u32), Vec<BoolVar>>,
    pub by_rdp: HashMap<(RoomId, u32, u32), Vec<BoolVar>>,
    pub by_cs: HashMap<(ClassId, SubjectId), Vec<BoolVar>>,
    len: usize,
}

impl VariableIndex {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn insert(&mut self, tuple: Tuple, var: BoolVar) {
        let (c, d, p, s, t, r) = tuple;
        self.by_tuple.insert(tuple, var);
        self.tuple_of.insert(var, tuple);
        self.by_cdp.entry((c, d, p)).or_default().push(var);
        self.by_cdps.entry((c, d, p, s)).or_default().push(var);
        self.by_cdpst.entry((c, d, p, s, t)).or_default().push(var);
        self.by_tdp.entry((t, d, p)).or_default().push(var);
        self.by_rdp.entry((r, d, p)).or_default().push(var);
        self.by_cs.entry((c, s)).or_default().push(var);
        self.len += 1;
    }

    pub fn get(&self, tuple: Tuple) -> Option<BoolVar> {
        self.by_tuple.get(&tuple).copied()
    }

    /// Every decision variable this index knows about, for handing to
    /// [`crate::solve::solve`] as the set of variables to read back.
    pub fn all_vars(&self) -> Vec<BoolVar> {
        self.by_tuple.values().copied().collect()
    }
}

/// Enumerates `V` exactly once, in the deterministic lexicographic order of
/// spec §5 ("all enumerations ... proceed in the lexicographic order of
/// their index keys as supplied in the Problem"): classes, then day, then
/// period, then the class's curriculum in declaration order, then teachers
/// and rooms in declaration order. Tuples ruled out by qualification (H6),
/// availability (H5) or an institution break (H7) are never created.
pub fn enumerate_variables(problem: &Problem, cp: &mut CpModel) -> VariableIndex {
    let mut index = VariableIndex::default();

    for c in problem.class_ids() {
        let class = problem.class(c);
        for d in 0..problem.days {
            for p in 0..problem.periods_per_day {
                if problem.is_break(d, p) {
                    continue; // H7: break slots never get a variable.
                }
                for &s in &class.curriculum {
                    let subject = problem.subject(s);
                    for t in problem.teacher_ids() {
                        let teacher = problem.teacher(t);
                        if !teacher.can_teach.contains(&s) {
                            continue;
                        }
                        if !teacher.availability.is_available(d as usize, p as usize) {
                            continue; // H5: unavailable slots never get a variable.
                        }
                        for r in problem.room_ids() {
                            let room = problem.room(r);
                            if room.room_type != subject.room_type {
                                continue; // H6: enforced structurally.
                            }
                            let name = format!(
                                "x_{}_d{d}_p{p}_{}_{}_{}",
                                class.class_id, subject.subject_id, teacher.teacher_id, room.room_id
                            );
                            let var = cp.new_bool_var(&name);
                            index.insert((c, d, p, s, t, r), var);
                        }
                    }
                }
            }
        }
    }

    debug!(
        "enumerated {} decision variables (sparse universe, {} classes x {} days x {} periods)",
        index.len(),
        problem.classes.len(),
        problem.days,
        problem.periods_per_day
    );
    trace!(
        "variable count by naive dense upper bound would have been {}",
        problem.classes.len()
            * problem.days as usize
            * problem.periods_per_day as usize
            * problem.subjects.len()
            * problem.teachers.len()
            * problem.rooms.len()
    );
    index
}
