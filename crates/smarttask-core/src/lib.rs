//! smarttask-core library.
//!
//! The task lifecycle engine ([`store::TaskStore`]), the read-only board
//! projection ([`projection`]), and the auto-assignment heuristic
//! ([`assign`]), plus the collaborators they are parameterized over:
//! [`clock::Clock`], [`storage::Storage`], and [`model::Roster`].
//!
//! # Conventions
//!
//! - **Errors**: one `thiserror` enum per concern, each mapping to an [`error::ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod assign;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod projection;
pub mod schedule;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use model::{Roster, Status, Task, TaskId, User, UserId};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{NewTask, TaskStore, Transition, TransitionPolicy};
