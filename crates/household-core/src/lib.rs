//! # Household Core Library
//!
//! Core business logic for tracking recurring household chores. All
//! operations are available through the standalone `household-cli` binary,
//! which is a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Recurrence**: a pure engine that computes a chore's next due date
//!   from its policy (daily, weekly on given weekdays, biweekly, monthly,
//!   every N days) and a reference instant
//! - **Chores**: chore, person and completion types, assignee rotation,
//!   day-based agendas and the completion workflow
//! - **Stats**: completion counts and leaderboard
//! - **Storage**: SQLite repositories and TOML configuration
//!
//! ## Key Components
//!
//! - [`next_due`]: Recurrence engine entry point
//! - [`HouseholdDb`]: Chore, people and completion-log persistence
//! - [`Agenda`]: Today / overdue / upcoming views
//! - [`Config`]: Application configuration management

pub mod chore;
pub mod error;
pub mod recurrence;
pub mod stats;
pub mod storage;

pub use chore::{
    complete_chore, Agenda, Chore, ChoreCompletion, ChoreDraft, ChorePriority, CompletionOutcome,
    Person, Rotation,
};
pub use error::{ConfigError, CoreError, DatabaseError, RecurrenceError, ValidationError};
pub use recurrence::{next_due, next_due_from_record, DaySet, FrequencyRecord, RecurrencePolicy};
pub use stats::{ChoreStats, LeaderboardEntry};
pub use storage::{ChoreRepository, CompletionLog, Config, HouseholdDb, PersonRepository};
