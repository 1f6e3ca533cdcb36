//! Field-Capacity Guard
//!
//! Advisory checks consulted before an add-field action is offered. The draft
//! model does not enforce them on import, so the validator re-checks counts.

use std::fmt;

use crate::draft::PassDraft;
use crate::layout::{FieldGroup, FieldLimit};

/// Slots still free in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Count(usize),
    Unlimited,
}

impl Remaining {
    pub fn has_room(&self) -> bool {
        match self {
            Remaining::Count(n) => *n > 0,
            Remaining::Unlimited => true,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::Count(n) => write!(f, "{n}"),
            Remaining::Unlimited => f.write_str("unlimited"),
        }
    }
}

pub fn can_add_field(draft: &PassDraft, group: FieldGroup) -> bool {
    remaining_field_count(draft, group).has_room()
}

/// Saturates at zero when the group already overflows its limit.
pub fn remaining_field_count(draft: &PassDraft, group: FieldGroup) -> Remaining {
    match draft.layout().limit(group) {
        FieldLimit::Unlimited => Remaining::Unlimited,
        FieldLimit::Max(max) => Remaining::Count(max.saturating_sub(draft.fields(group).len())),
    }
}
