//! Board data model: tasks, their lifecycle status, and the roster.

pub mod task;
pub mod user;

pub use task::{InvalidTransition, ParseEnumError, Status, Task, TaskId};
pub use user::{Roster, UNASSIGNED, User, UserId};
