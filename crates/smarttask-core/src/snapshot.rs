//! Snapshot codec: the whole task collection as one JSON array.
//!
//! There is no version tag. Decoding is strict about structure and about the
//! store's invariants (unique ids, non-empty titles); a snapshot that breaks
//! either is reported as corrupt and the caller decides how to recover.

use std::collections::HashSet;

use crate::error::ErrorCode;
use crate::model::{Task, TaskId};

/// Why a persisted snapshot was rejected.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Not a JSON array of task records.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Two records share an id.
    #[error("duplicate task id in snapshot: {0}")]
    DuplicateId(TaskId),

    /// A record has a blank title.
    #[error("task {0} has an empty title")]
    EmptyTitle(TaskId),
}

impl SnapshotError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::CorruptSnapshot
    }
}

/// Serialize the collection verbatim, derived fields included.
///
/// # Errors
///
/// Returns [`SnapshotError::Json`] if serialization fails.
pub fn encode(tasks: &[Task]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(tasks)?)
}

/// Parse and validate a snapshot. Order is preserved.
///
/// # Errors
///
/// Returns a [`SnapshotError`] when the text is not a task array, when ids
/// repeat, or when a title is blank.
pub fn decode(raw: &str) -> Result<Vec<Task>, SnapshotError> {
    let tasks: Vec<Task> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if task.title.trim().is_empty() {
            return Err(SnapshotError::EmptyTitle(task.id.clone()));
        }
        if !seen.insert(&task.id) {
            return Err(SnapshotError::DuplicateId(task.id.clone()));
        }
    }

    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Status, UserId};

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: TaskId::new(id),
            title: title.to_string(),
            description: "desc".to_string(),
            assignee_id: UserId::new("u1"),
            status: Status::InProgress,
            created_at: 100,
            started_at: Some(150),
            completed_at: None,
            deadline: Some(200),
            is_late: true,
        }
    }

    #[test]
    fn encode_keeps_derived_fields() {
        let raw = encode(&[task("t1", "A")]).unwrap();
        assert!(raw.contains("\"isLate\":true"));
        assert!(raw.contains("\"startedAt\":150"));
        assert!(raw.starts_with('['));
    }

    #[test]
    fn decode_preserves_order() {
        let tasks = vec![task("t2", "B"), task("t1", "A")];
        let decoded = decode(&encode(&tasks).unwrap()).unwrap();
        assert_eq!(decoded, tasks);
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(decode("[]").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_rejected() {
        for raw in ["", "not json", "{}", "[{\"id\":1}]", "null", "[1,2]"] {
            assert!(
                matches!(decode(raw), Err(SnapshotError::Json(_))),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = encode(&[task("t1", "A"), task("t1", "B")]).unwrap();
        assert!(matches!(decode(&raw), Err(SnapshotError::DuplicateId(id)) if id.as_str() == "t1"));
    }

    #[test]
    fn blank_titles_are_rejected() {
        let raw = encode(&[task("t1", "   ")]).unwrap();
        let err = decode(&raw).unwrap_err();
        assert!(matches!(err, SnapshotError::EmptyTitle(_)));
        assert_eq!(err.code(), ErrorCode::CorruptSnapshot);
    }
}
