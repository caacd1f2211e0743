//! Advisory auto-assignment: suggest the least-loaded roster member.
//!
//! Load is the number of `in_progress` tasks assigned to a user. Tasks whose
//! assignee is not on the roster count toward nobody. Ties go to whoever
//! comes first in roster order. Nothing here mutates the board.

use serde::Serialize;

use crate::model::{Roster, Status, Task, User};

/// One roster member's current load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workload<'a> {
    pub user: &'a User,
    pub in_progress: usize,
}

/// In-progress counts for every roster member, in roster order.
#[must_use]
pub fn workload<'a>(roster: &'a Roster, tasks: &[Task]) -> Vec<Workload<'a>> {
    roster
        .iter()
        .map(|user| Workload {
            user,
            in_progress: tasks
                .iter()
                .filter(|t| t.status == Status::InProgress && t.assignee_id == user.id)
                .count(),
        })
        .collect()
}

/// The first roster member with the fewest in-progress tasks.
///
/// Returns `None` only when the roster is empty.
#[must_use]
pub fn suggest_assignee<'a>(roster: &'a Roster, tasks: &[Task]) -> Option<&'a User> {
    // `min_by_key` keeps the first of equal minima.
    workload(roster, tasks)
        .into_iter()
        .min_by_key(|w| w.in_progress)
        .map(|w| w.user)
}
