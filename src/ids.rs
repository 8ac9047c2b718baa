//! Interned identifiers for the four entity kinds in a [`crate::problem::Problem`].
//!
//! Each id is a dense index into the corresponding `Vec` on `Problem`
//! (`ClassId(i)` names `problem.classes[i]`, and so on). Using small integers
//! instead of the original string identifiers lets constraint emission and
//! extraction use flat arrays and `HashMap`s keyed by `Copy` types rather
//! than nested string-keyed maps.

use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            fn from(i: usize) -> Self {
                $name(i as u32)
            }
        }
    };
}

entity_id!(ClassId);
entity_id!(SubjectId);
entity_id!(TeacherId);
entity_id!(RoomId);
