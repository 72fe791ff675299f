//! Repository traits over the household tables.
//!
//! Each query returns fresh rows; nothing is cached between calls.
//! [`HouseholdDb`](super::HouseholdDb) implements all three over SQLite.

use chrono::{DateTime, Utc};

use crate::chore::{Chore, ChoreCompletion, Person};
use crate::error::Result;

/// Household members.
pub trait PersonRepository {
    fn create_person(&self, person: &Person) -> Result<()>;
    fn get_person(&self, id: &str) -> Result<Option<Person>>;
    /// All people, oldest first.
    fn list_people(&self) -> Result<Vec<Person>>;
    /// Fails with `NotFound` if the person does not exist.
    fn update_person(&self, person: &Person) -> Result<()>;
    /// Fails with `NotFound` if the person does not exist.
    fn delete_person(&self, id: &str) -> Result<()>;
}

/// Chore records. Every list is ordered by `next_due`, earliest first.
pub trait ChoreRepository {
    fn create_chore(&self, chore: &Chore) -> Result<()>;
    fn get_chore(&self, id: &str) -> Result<Option<Chore>>;
    fn list_chores(&self) -> Result<Vec<Chore>>;
    /// Fails with `NotFound` if the chore does not exist.
    fn update_chore(&self, chore: &Chore) -> Result<()>;
    /// Removes the chore and its completions. Fails with `NotFound` if missing.
    fn delete_chore(&self, id: &str) -> Result<()>;
    /// Chores with `next_due < before`.
    fn chores_due_before(&self, before: DateTime<Utc>) -> Result<Vec<Chore>>;
    /// Chores with `from <= next_due < to`.
    fn chores_due_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Chore>>;
    fn count_chores(&self) -> Result<u64>;
}

/// Append-only completion history. Lists are newest first.
pub trait CompletionLog {
    fn append_completion(&self, completion: &ChoreCompletion) -> Result<()>;
    fn list_completions(
        &self,
        chore_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<ChoreCompletion>>;
    /// Completions with `completed_at >= since`.
    fn completions_since(&self, since: DateTime<Utc>) -> Result<Vec<ChoreCompletion>>;
    fn count_completions(&self) -> Result<u64>;
}
