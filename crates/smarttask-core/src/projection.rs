//! Read-only board views: status filter, text search, and aggregate counts.
//!
//! [`project`] is a pure function of the task list, the roster, and a
//! [`ViewQuery`]. Aggregates always describe the whole board; only the list
//! of visible tasks is narrowed by the query. Visible tasks keep store order.

use serde::Serialize;
use std::{fmt, str::FromStr};

use crate::clock::{HOUR_MS, MINUTE_MS};
use crate::model::{ParseEnumError, Roster, Status, Task};

/// Status lens applied to the visible list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    #[must_use]
    pub fn matches(self, status: Status) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Status>().map(Self::Only).map_err(|_| ParseEnumError {
            expected: "filter",
            got: s.to_string(),
        })
    }
}

/// What the user is currently looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: StatusFilter,
    pub search: String,
}

impl ViewQuery {
    #[must_use]
    pub fn new(filter: StatusFilter, search: impl Into<String>) -> Self {
        Self {
            filter,
            search: search.into(),
        }
    }
}

/// Whole-board counts, independent of the active filter and search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    pub total: usize,
    pub in_progress: usize,
    pub late: usize,
}

impl Aggregates {
    #[must_use]
    pub fn of(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut acc, task| {
            acc.total += 1;
            if task.status == Status::InProgress {
                acc.in_progress += 1;
            }
            if task.is_late {
                acc.late += 1;
            }
            acc
        })
    }
}

/// The visible slice of the board plus whole-board aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    pub tasks: Vec<&'a Task>,
    pub aggregates: Aggregates,
}

/// Apply `query` to `tasks`.
#[must_use]
pub fn project<'a>(tasks: &'a [Task], roster: &Roster, query: &ViewQuery) -> View<'a> {
    let needle = query.search.trim().to_lowercase();

    let visible = tasks
        .iter()
        .filter(|task| query.filter.matches(task.status))
        .filter(|task| needle.is_empty() || matches_search(task, roster, &needle))
        .collect();

    View {
        tasks: visible,
        aggregates: Aggregates::of(tasks),
    }
}

/// `needle` must already be trimmed and lowercased.
fn matches_search(task: &Task, roster: &Roster, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle)
        || task.description.to_lowercase().contains(needle)
        || roster
            .display_name(&task.assignee_id)
            .to_lowercase()
            .contains(needle)
}

/// Coarse age label for list metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeAge {
    JustNow,
    Minutes(i64),
    Hours(i64),
    Days(i64),
}

impl fmt::Display for RelativeAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JustNow => f.write_str("just now"),
            Self::Minutes(m) => write!(f, "{m} min ago"),
            Self::Hours(h) => write!(f, "{h} h ago"),
            Self::Days(d) => write!(f, "{d} d ago"),
        }
    }
}

/// How long ago `then` was, rounded to the nearest minute, hour, or day.
///
/// Times in the future are reported as [`RelativeAge::JustNow`].
#[must_use]
pub fn relative_age(then: i64, now: i64) -> RelativeAge {
    let minutes = round_div(now.saturating_sub(then), MINUTE_MS);
    if minutes < 1 {
        return RelativeAge::JustNow;
    }
    if minutes < 60 {
        return RelativeAge::Minutes(minutes);
    }
    let hours = round_div(minutes, HOUR_MS / MINUTE_MS);
    if hours < 24 {
        return RelativeAge::Hours(hours);
    }
    RelativeAge::Days(round_div(hours, 24))
}

/// Integer division rounding half away from zero, for non-negative inputs.
const fn round_div(value: i64, divisor: i64) -> i64 {
    if value <= 0 {
        return 0;
    }
    (value + divisor / 2) / divisor
}
