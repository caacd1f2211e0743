//! The task store: lifecycle state machine, staleness evaluation, and
//! snapshot persistence.
//!
//! A [`TaskStore`] owns the canonical task list, most recent first. Every
//! mutation is followed by a full-snapshot write to its [`Storage`] under a
//! single key.
//!
//! # Invariants
//!
//! - Task ids are unique for the lifetime of the store.
//! - Titles are non-empty after trimming.
//! - `started_at` is stamped on the first entry into `in_progress` only;
//!   `completed_at` is stamped on every entry into `done`.
//! - `is_late` is recomputed after every load and never trusted from disk.
//! - A missing or corrupt snapshot is replaced by the seed set, which is
//!   written back. A snapshot that exists but cannot be read is left alone.
//!
//! # Persistence failures
//!
//! Mutations persist best-effort: a failed write is logged, the store is
//! marked dirty, and the mutation still succeeds in memory. Callers that need
//! durability call [`TaskStore::flush`] and handle its error.

use std::io;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, HOUR_MS};
use crate::config::{DEFAULT_STORAGE_KEY, ProjectConfig};
use crate::error::ErrorCode;
use crate::model::{InvalidTransition, Roster, Status, Task, TaskId, UserId};
use crate::snapshot;
use crate::storage::{Storage, StorageError};

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 7;

/// How `transition` treats edges outside the lifecycle graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Any status may be set from any status.
    #[default]
    Permissive,
    /// Only `pending -> in_progress -> done -> pending` is accepted.
    Strict,
}

/// Errors a store operation can return to its caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task title is empty")]
    EmptyTitle,

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyTitle => ErrorCode::EmptyTitle,
            Self::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
        }
    }
}

/// Input for [`TaskStore::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assignee: UserId,
    pub deadline: Option<i64>,
}

impl NewTask {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn assignee(mut self, assignee: UserId) -> Self {
        self.assignee = assignee;
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Option<i64>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Outcome of a status change on a known task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub id: TaskId,
    pub from: Status,
    pub to: Status,
}

/// Owned task collection mirrored to a key-value backend.
pub struct TaskStore<S, C> {
    tasks: Vec<Task>,
    storage: S,
    clock: C,
    roster: Roster,
    key: String,
    policy: TransitionPolicy,
    rng: StdRng,
    dirty: bool,
    read_failed: bool,
}

impl<S: Storage, C: Clock> TaskStore<S, C> {
    /// An empty, unloaded store using the default key and permissive policy.
    pub fn new(storage: S, clock: C) -> Self {
        Self {
            tasks: Vec::new(),
            storage,
            clock,
            roster: Roster::builtin(),
            key: DEFAULT_STORAGE_KEY.to_string(),
            policy: TransitionPolicy::default(),
            rng: StdRng::from_entropy(),
            dirty: false,
            read_failed: false,
        }
    }

    /// Build and load a store in one step.
    pub fn open(storage: S, clock: C) -> Self {
        let mut store = Self::new(storage, clock);
        store.load();
        store
    }

    /// Build and load a store with key and policy taken from `config`.
    pub fn open_with_config(storage: S, clock: C, config: &ProjectConfig) -> Self {
        let mut store = Self::new(storage, clock)
            .with_key(&config.storage.key)
            .with_policy(config.lifecycle.transitions);
        store.load();
        store
    }

    #[must_use]
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Make id generation deterministic.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// All tasks, most recently created first.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when the last write failed and memory is ahead of storage.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True when the last `load` could not read the snapshot.
    ///
    /// The in-memory list was kept as it was; writing it back would replace
    /// whatever storage still holds.
    #[must_use]
    pub const fn read_failed(&self) -> bool {
        self.read_failed
    }

    // -----------------------------------------------------------------------
    // Load / persist
    // -----------------------------------------------------------------------

    /// Replace the in-memory list with the persisted snapshot.
    ///
    /// Missing or corrupt snapshots are replaced by the seed set, which is
    /// written back immediately. Lateness is recomputed afterwards; if any
    /// flag changed the store is left dirty.
    ///
    /// A read error keeps the current list and writes nothing; see
    /// [`TaskStore::read_failed`].
    pub fn load(&mut self) -> &[Task] {
        let raw = match self.storage.read(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %self.key, error = %e, code = %e.code(), "snapshot unreadable, keeping current tasks");
                self.read_failed = true;
                return &self.tasks;
            }
        };
        self.read_failed = false;

        match raw.as_deref().map(snapshot::decode) {
            Some(Ok(tasks)) => {
                debug!(key = %self.key, count = tasks.len(), "snapshot loaded");
                self.tasks = tasks;
            }
            Some(Err(e)) => {
                warn!(key = %self.key, error = %e, code = %e.code(), "corrupt snapshot, restoring seed tasks");
                self.install_seed();
            }
            None => {
                debug!(key = %self.key, "no snapshot, installing seed tasks");
                self.install_seed();
            }
        }

        // Flags recomputed here differ from what is stored; the next flush writes them.
        let now = self.clock.now_millis();
        if self.evaluate_staleness(now) {
            self.dirty = true;
        }
        &self.tasks
    }

    /// Re-read storage, picking up writes from other processes.
    ///
    /// Returns `true` if the in-memory list changed.
    pub fn reload(&mut self) -> bool {
        let before = self.tasks.clone();
        self.load();
        self.tasks != before
    }

    /// Write the full collection under the store's key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend rejects the write. The store is
    /// left dirty in that case.
    pub fn persist(&mut self) -> Result<(), StorageError> {
        let result = self.write_snapshot();
        self.dirty = result.is_err();
        result
    }

    /// Retry a failed write, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store is dirty and the retry fails.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }
        self.persist()
    }

    fn write_snapshot(&mut self) -> Result<(), StorageError> {
        let body = snapshot::encode(&self.tasks).map_err(|e| StorageError::Write {
            key: self.key.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        self.storage.write(&self.key, &body)
    }

    fn persist_best_effort(&mut self) {
        if let Err(e) = self.persist() {
            warn!(key = %self.key, error = %e, "snapshot write failed, store left dirty");
        }
    }

    fn install_seed(&mut self) {
        let now = self.clock.now_millis();
        let first = self.next_id();
        self.tasks = vec![Task {
            id: first,
            title: "Review area B".to_string(),
            description: "Quick luggage check in zone B".to_string(),
            assignee_id: UserId::new("u2"),
            status: Status::Pending,
            created_at: now - 6 * HOUR_MS,
            started_at: None,
            completed_at: None,
            deadline: None,
            is_late: false,
        }];

        let second_created = now - 2 * HOUR_MS;
        let second = Task {
            id: self.next_id(),
            title: "Restock cart 3".to_string(),
            description: "Bring supplies to cart 3".to_string(),
            assignee_id: UserId::new("u3"),
            status: Status::InProgress,
            created_at: second_created,
            started_at: Some(second_created),
            completed_at: None,
            deadline: None,
            is_late: false,
        };
        self.tasks.push(second);
        self.persist_best_effort();
    }

    fn next_id(&mut self) -> TaskId {
        loop {
            let suffix: String = (0..ID_SUFFIX_LEN)
                .map(|_| char::from(ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())]))
                .collect();
            let candidate = TaskId::new(format!("t{suffix}"));
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a pending task at the front of the list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyTitle`] if the title is blank; nothing is
    /// inserted in that case.
    pub fn create(&mut self, new: NewTask) -> Result<Task, StoreError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let now = self.clock.now_millis();
        let mut task = Task {
            id: self.next_id(),
            title: title.to_string(),
            description: new.description.trim().to_string(),
            assignee_id: new.assignee,
            status: Status::Pending,
            created_at: now,
            started_at: None,
            completed_at: None,
            deadline: new.deadline,
            is_late: false,
        };
        task.refresh_lateness(now);

        debug!(id = %task.id, assignee = %task.assignee_id, "task created");
        self.tasks.insert(0, task.clone());
        self.persist_best_effort();
        Ok(task)
    }

    /// Set a task's status. Unknown ids are a no-op (`Ok(None)`).
    ///
    /// # Errors
    ///
    /// Under [`TransitionPolicy::Strict`], returns
    /// [`StoreError::InvalidTransition`] for edges outside the graph.
    pub fn transition(
        &mut self,
        id: &TaskId,
        status: Status,
    ) -> Result<Option<Transition>, StoreError> {
        let now = self.clock.now_millis();
        let policy = self.policy;

        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            debug!(id = %id, "transition on unknown task ignored");
            return Ok(None);
        };

        let from = task.status;
        if policy == TransitionPolicy::Strict {
            from.can_transition_to(status)?;
        }

        task.status = status;
        if status == Status::InProgress && task.started_at.is_none() {
            task.started_at = Some(now);
        }
        if status == Status::Done {
            task.completed_at = Some(now);
        }

        let transition = Transition {
            id: task.id.clone(),
            from,
            to: status,
        };
        debug!(id = %transition.id, from = %from, to = %status, "task transitioned");
        self.persist_best_effort();
        Ok(Some(transition))
    }

    /// Remove a task. Returns `false` (and writes nothing) if it was absent.
    pub fn delete(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        if self.tasks.len() == before {
            debug!(id = %id, "delete on unknown task ignored");
            return false;
        }

        debug!(id = %id, "task deleted");
        self.persist_best_effort();
        true
    }

    /// Remove every task and persist the empty list. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        debug!(removed, "all tasks cleared");
        self.persist_best_effort();
        removed
    }

    // -----------------------------------------------------------------------
    // Staleness
    // -----------------------------------------------------------------------

    /// Recompute every `is_late` flag against `now`. Does not persist.
    ///
    /// Returns `true` if any flag changed.
    pub fn evaluate_staleness(&mut self, now: i64) -> bool {
        let mut changed = false;
        for task in &mut self.tasks {
            changed |= task.refresh_lateness(now);
        }
        changed
    }

    /// Timer body: evaluate at the clock's now and persist if anything changed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now_millis();
        let changed = self.evaluate_staleness(now);
        if changed {
            debug!(late = self.tasks.iter().filter(|t| t.is_late).count(), "lateness changed");
            self.persist_best_effort();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{MINUTE_MS, ManualClock};
    use crate::storage::MemoryStorage;
    use std::time::Duration;

    const T0: i64 = 1_700_000_000_000;

    fn empty_store() -> TaskStore<MemoryStorage, ManualClock> {
        let storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, "[]");
        TaskStore::open(storage, ManualClock::new(T0)).with_rng_seed(7)
    }

    fn persisted(store: &TaskStore<MemoryStorage, ManualClock>) -> Vec<Task> {
        let raw = store.storage().get(store.key()).expect("snapshot must exist");
        snapshot::decode(raw).expect("snapshot must decode")
    }

    #[test]
    fn create_yields_pending_task_at_front() {
        let mut store = empty_store();
        let first = store.create(NewTask::new("First")).unwrap();
        store.clock().advance(Duration::from_secs(1));
        let second = store
            .create(
                NewTask::new("  Second  ")
                    .description(" wipe counters ")
                    .assignee(UserId::new("u3")),
            )
            .unwrap();

        assert_eq!(second.status, Status::Pending);
        assert_eq!(second.created_at, T0 + 1_000);
        assert_eq!(second.title, "Second");
        assert_eq!(second.description, "wipe counters");
        assert_ne!(first.id, second.id);
        assert!(second.id.as_str().starts_with('t'));
        assert_eq!(second.id.as_str().len(), 1 + ID_SUFFIX_LEN);

        let ids: Vec<&TaskId> = store.tasks().iter().map(|t| &t.id).collect();
        assert_eq!(ids, [&second.id, &first.id]);
        assert_eq!(persisted(&store), store.tasks());
    }

    #[test]
    fn create_rejects_blank_titles() {
        let mut store = empty_store();
        store.create(NewTask::new("Keep")).unwrap();
        let before = store.tasks().to_vec();

        for title in ["", "   ", "\t\n"] {
            let err = store.create(NewTask::new(title)).unwrap_err();
            assert!(matches!(err, StoreError::EmptyTitle));
            assert_eq!(err.code(), ErrorCode::EmptyTitle);
        }
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn create_accepts_unknown_assignee() {
        let mut store = empty_store();
        let task = store
            .create(NewTask::new("Ghost").assignee(UserId::new("u404")))
            .unwrap();
        assert_eq!(task.assignee_id.as_str(), "u404");
    }

    #[test]
    fn create_with_past_deadline_is_late_immediately() {
        let mut store = empty_store();
        let task = store
            .create(NewTask::new("Overdue").deadline(Some(T0 - MINUTE_MS)))
            .unwrap();
        assert!(task.is_late);
    }

    #[test]
    fn started_at_is_stamped_once() {
        let mut store = empty_store();
        let id = store.create(NewTask::new("Sweep")).unwrap().id;

        store.clock().advance(Duration::from_secs(60));
        store.transition(&id, Status::InProgress).unwrap();
        let started = store.get(&id).unwrap().started_at;
        assert_eq!(started, Some(T0 + 60_000));

        store.clock().advance(Duration::from_secs(60));
        let t = store.transition(&id, Status::InProgress).unwrap().unwrap();
        assert_eq!(t.from, Status::InProgress);
        assert_eq!(store.get(&id).unwrap().started_at, started);
    }

    #[test]
    fn reopen_keeps_history_and_repeats() {
        let mut store = empty_store();
        let id = store.create(NewTask::new("Gate check")).unwrap().id;

        store.transition(&id, Status::InProgress).unwrap();
        store.clock().advance(Duration::from_secs(5));
        store.transition(&id, Status::Done).unwrap();
        let done = store.get(&id).unwrap().clone();
        assert_eq!(done.completed_at, Some(T0 + 5_000));

        for _ in 0..3 {
            store.transition(&id, Status::Pending).unwrap();
            let reopened = store.get(&id).unwrap();
            assert_eq!(reopened.status, Status::Pending);
            assert_eq!(reopened.started_at, done.started_at);
            assert!(reopened.completed_at.is_some());

            store.transition(&id, Status::InProgress).unwrap();
            store.transition(&id, Status::Done).unwrap();
        }
        assert_eq!(store.get(&id).unwrap().started_at, done.started_at);
    }

    #[test]
    fn permissive_policy_accepts_any_edge() {
        let mut store = empty_store();
        let id = store.create(NewTask::new("Jump")).unwrap().id;

        let t = store.transition(&id, Status::Done).unwrap().unwrap();
        assert_eq!((t.from, t.to), (Status::Pending, Status::Done));
        assert!(store.get(&id).unwrap().started_at.is_none());
        assert_eq!(store.get(&id).unwrap().completed_at, Some(T0));

        store.clock().advance(Duration::from_secs(10));
        let t = store.transition(&id, Status::Done).unwrap().unwrap();
        assert_eq!((t.from, t.to), (Status::Done, Status::Done));
        assert_eq!(store.get(&id).unwrap().completed_at, Some(T0 + 10_000));
    }

    #[test]
    fn strict_policy_rejects_illegal_edges() {
        let mut store = empty_store().with_policy(TransitionPolicy::Strict);
        let id = store.create(NewTask::new("Strict")).unwrap().id;

        let err = store.transition(&id, Status::Done).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
        assert_eq!(store.get(&id).unwrap().status, Status::Pending);

        store.transition(&id, Status::InProgress).unwrap();
        assert!(store.transition(&id, Status::Pending).is_err());
        store.transition(&id, Status::Done).unwrap();
        store.transition(&id, Status::Pending).unwrap();
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut store = empty_store();
        store.create(NewTask::new("Real")).unwrap();
        let before = store.tasks().to_vec();
        let missing = TaskId::new("tmissing");

        assert!(store.transition(&missing, Status::Done).unwrap().is_none());
        assert!(!store.delete(&missing));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn delete_removes_and_persists() {
        let mut store = empty_store();
        let a = store.create(NewTask::new("A")).unwrap().id;
        let b = store.create(NewTask::new("B")).unwrap().id;

        assert!(store.delete(&a));
        assert!(store.get(&a).is_none());
        let saved = persisted(&store);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, b);
    }

    #[test]
    fn clear_persists_empty_list_that_stays_empty() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::open(storage, ManualClock::new(T0));
        assert_eq!(store.len(), 2);

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
        assert_eq!(store.storage().get(DEFAULT_STORAGE_KEY), Some("[]"));

        store.load();
        assert!(store.is_empty());
    }

    #[test]
    fn staleness_tracks_deadline_and_status() {
        let mut store = empty_store();
        let id = store
            .create(NewTask::new("Due soon").deadline(Some(T0 + 10 * MINUTE_MS)))
            .unwrap()
            .id;

        assert!(!store.evaluate_staleness(T0 + 10 * MINUTE_MS));
        assert!(!store.get(&id).unwrap().is_late);

        assert!(store.evaluate_staleness(T0 + 10 * MINUTE_MS + 1));
        assert!(store.get(&id).unwrap().is_late);
        assert!(!store.evaluate_staleness(T0 + 20 * MINUTE_MS));

        store.transition(&id, Status::Done).unwrap();
        assert!(store.evaluate_staleness(T0 + 20 * MINUTE_MS));
        assert!(!store.get(&id).unwrap().is_late);
    }

    #[test]
    fn tick_persists_only_on_change() {
        let mut store = empty_store();
        store
            .create(NewTask::new("Due").deadline(Some(T0 + MINUTE_MS)))
            .unwrap();

        store.storage_mut().set_read_only(true);
        assert!(!store.tick());
        assert!(!store.is_dirty());

        store.storage_mut().set_read_only(false);
        store.clock().advance(Duration::from_secs(61));
        assert!(store.tick());
        assert!(persisted(&store)[0].is_late);
    }

    #[test]
    fn missing_snapshot_installs_and_persists_seed() {
        let store = TaskStore::open(MemoryStorage::new(), ManualClock::new(T0));

        let tasks = store.tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Review area B");
        assert_eq!(tasks[0].status, Status::Pending);
        assert_eq!(tasks[0].created_at, T0 - 6 * HOUR_MS);
        assert_eq!(tasks[1].status, Status::InProgress);
        assert_eq!(tasks[1].created_at, T0 - 2 * HOUR_MS);
        assert!(tasks.iter().all(|t| t.deadline.is_none()));
        assert_ne!(tasks[0].id, tasks[1].id);

        assert_eq!(persisted(&store), tasks);
    }

    #[test]
    fn corrupt_snapshot_installs_seed() {
        for raw in ["{oops", "{}", "[{\"title\":\"no id\"}]"] {
            let storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, raw);
            let store = TaskStore::open(storage, ManualClock::new(T0));
            assert_eq!(store.len(), 2, "{raw:?} should fall back to seed");
            assert_eq!(persisted(&store), store.tasks());
        }
    }

    #[test]
    fn persisted_is_late_is_not_trusted() {
        let mut store = empty_store();
        store.create(NewTask::new("No deadline")).unwrap();
        let mut tampered = store.tasks().to_vec();
        tampered[0].is_late = true;
        let raw = snapshot::encode(&tampered).unwrap();

        let storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, &raw);
        let reloaded = TaskStore::open(storage, ManualClock::new(T0));
        assert!(!reloaded.tasks()[0].is_late);
    }

    #[test]
    fn persist_then_load_roundtrips() {
        let mut store = empty_store();
        let id = store
            .create(
                NewTask::new("Roundtrip")
                    .description("all fields")
                    .assignee(UserId::new("u4"))
                    .deadline(Some(T0 + HOUR_MS)),
            )
            .unwrap()
            .id;
        store.transition(&id, Status::InProgress).unwrap();
        store.transition(&id, Status::Done).unwrap();
        store.persist().unwrap();

        let raw = store.storage().get(DEFAULT_STORAGE_KEY).unwrap().to_string();
        let reloaded = TaskStore::open(
            MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, &raw),
            ManualClock::new(T0),
        );
        assert_eq!(reloaded.tasks(), store.tasks());
    }

    #[test]
    fn stale_flags_on_load_are_flushed() {
        let mut board = vec![Task {
            id: TaskId::new("t0000001"),
            title: "Overdue".to_string(),
            description: String::new(),
            assignee_id: UserId::default(),
            status: Status::Pending,
            created_at: T0 - HOUR_MS,
            started_at: None,
            completed_at: None,
            deadline: Some(T0 - MINUTE_MS),
            is_late: false,
        }];
        let raw = snapshot::encode(&board).unwrap();
        let mut store = TaskStore::open(
            MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, &raw),
            ManualClock::new(T0),
        );

        assert!(store.tasks()[0].is_late);
        assert!(store.is_dirty());
        store.flush().unwrap();
        board[0].is_late = true;
        assert_eq!(persisted(&store), board);
        assert!(!store.is_dirty());
    }

    #[test]
    fn read_error_on_open_does_not_overwrite_snapshot() {
        let mut source = empty_store();
        source.create(NewTask::new("Keep me")).unwrap();
        let raw = snapshot::encode(source.tasks()).unwrap();

        let mut storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, &raw);
        storage.set_unreadable(true);
        let store = TaskStore::open(storage, ManualClock::new(T0));

        assert!(store.read_failed());
        assert!(store.is_empty());
        assert!(!store.is_dirty());
        assert_eq!(store.storage().get(DEFAULT_STORAGE_KEY), Some(raw.as_str()));
    }

    #[test]
    fn reload_keeps_board_when_read_fails() {
        let mut store = empty_store();
        for title in ["One", "Two", "Three", "Four", "Five"] {
            store.create(NewTask::new(title)).unwrap();
        }
        let before = store.tasks().to_vec();

        store.storage_mut().set_unreadable(true);
        assert!(!store.reload());
        assert!(store.read_failed());
        assert_eq!(store.tasks(), before.as_slice());

        store.storage_mut().set_unreadable(false);
        assert_eq!(persisted(&store), before);
        assert!(!store.reload());
        assert!(!store.read_failed());
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn failed_write_marks_dirty_until_flushed() {
        let mut store = empty_store();
        store.storage_mut().set_read_only(true);

        let task = store.create(NewTask::new("Buffered")).unwrap();
        assert!(store.is_dirty());
        assert!(store.get(&task.id).is_some());
        assert!(store.flush().is_err());

        store.storage_mut().set_read_only(false);
        store.flush().unwrap();
        assert!(!store.is_dirty());
        assert_eq!(persisted(&store)[0].id, task.id);
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let mut store = empty_store();
        assert!(!store.reload());

        let external = vec![Task {
            id: TaskId::new("text0001"),
            title: "From elsewhere".to_string(),
            description: String::new(),
            assignee_id: UserId::new("u1"),
            status: Status::Pending,
            created_at: T0,
            started_at: None,
            completed_at: None,
            deadline: None,
            is_late: false,
        }];
        let raw = snapshot::encode(&external).unwrap();
        store.storage_mut().write(DEFAULT_STORAGE_KEY, &raw).unwrap();

        assert!(store.reload());
        assert_eq!(store.tasks(), external.as_slice());
    }

    #[test]
    fn custom_key_is_used() {
        let config = ProjectConfig {
            storage: crate::config::StorageConfig {
                key: "board_b".to_string(),
            },
            ..ProjectConfig::default()
        };
        let store = TaskStore::open_with_config(MemoryStorage::new(), ManualClock::new(T0), &config);
        assert!(store.storage().get("board_b").is_some());
        assert!(store.storage().get(DEFAULT_STORAGE_KEY).is_none());
    }
}
