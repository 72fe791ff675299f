//! Household chores, the people who do them, and the completion history.
//!
//! A [`Chore`] carries its [`RecurrencePolicy`] and the instant it is next
//! due. Completing it appends a [`ChoreCompletion`] and moves `next_due`
//! forward through the recurrence engine; see [`complete_chore`].

mod agenda;
mod completion;
mod person;

pub use agenda::{day_start, Agenda};
pub use completion::{complete_chore, CompletionOutcome};
pub use person::{Person, DEFAULT_PERSON_COLOR};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{RecurrenceError, ValidationError};
use crate::recurrence::RecurrencePolicy;

/// Room used when none is given.
pub const DEFAULT_ROOM: &str = "General";

/// How urgent a chore is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChorePriority {
    Low,
    #[default]
    Medium,
    High,
}

impl ChorePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChorePriority::Low => "low",
            ChorePriority::Medium => "medium",
            ChorePriority::High => "high",
        }
    }
}

impl fmt::Display for ChorePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChorePriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ChorePriority::Low),
            "medium" => Ok(ChorePriority::Medium),
            "high" => Ok(ChorePriority::High),
            other => Err(ValidationError::InvalidValue {
                field: "priority".to_string(),
                message: format!("expected low, medium or high, got '{other}'"),
            }),
        }
    }
}

/// Who does the chore next.
///
/// - `Fixed`: the current assignee keeps it.
/// - `RoundRobin`: each completion hands it to the next assignee in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    Fixed,
    RoundRobin,
}

impl Rotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::Fixed => "fixed",
            Rotation::RoundRobin => "round_robin",
        }
    }
}

impl FromStr for Rotation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Rotation::Fixed),
            "round_robin" | "round-robin" | "rotate" => Ok(Rotation::RoundRobin),
            other => Err(ValidationError::InvalidValue {
                field: "rotation".to_string(),
                message: format!("expected fixed or round_robin, got '{other}'"),
            }),
        }
    }
}

/// A recurring household task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chore {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub room: String,
    pub frequency: RecurrencePolicy,
    /// Person ids, in rotation order.
    pub assignees: Vec<String>,
    pub rotation: Rotation,
    pub rotation_index: u32,
    pub priority: ChorePriority,
    pub estimated_minutes: Option<u32>,
    pub next_due: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Chore {
    /// Person currently responsible, if anyone is assigned.
    pub fn current_assignee(&self) -> Option<&str> {
        if self.assignees.is_empty() {
            return None;
        }
        let idx = self.rotation_index as usize % self.assignees.len();
        self.assignees.get(idx).map(String::as_str)
    }

    /// Hand the chore to the next person, if the rotation says so.
    pub fn rotate(&mut self) {
        if self.rotation == Rotation::RoundRobin && !self.assignees.is_empty() {
            let len = self.assignees.len() as u32;
            self.rotation_index = (self.rotation_index % len + 1) % len;
        }
    }

    /// Set the room; blank means [`DEFAULT_ROOM`].
    pub fn set_room(&mut self, room: &str) {
        self.room = room_or_default(Some(room));
    }

    /// Move `next_due` forward from `completed_at`.
    ///
    /// Calendar arithmetic happens in `completed_at`'s zone.
    pub fn reschedule<Tz: TimeZone>(
        &mut self,
        completed_at: &DateTime<Tz>,
    ) -> Result<(), RecurrenceError> {
        self.next_due = self.frequency.next_due(completed_at)?.with_timezone(&Utc);
        Ok(())
    }
}

fn room_or_default(room: Option<&str>) -> String {
    room.map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ROOM)
        .to_string()
}

/// Input for a new chore.
#[derive(Debug, Clone)]
pub struct ChoreDraft {
    pub name: String,
    pub description: Option<String>,
    pub room: Option<String>,
    pub frequency: RecurrencePolicy,
    pub assignees: Vec<String>,
    pub rotation: Rotation,
    pub priority: ChorePriority,
    pub estimated_minutes: Option<u32>,
    pub next_due: DateTime<Utc>,
}

impl ChoreDraft {
    /// Validate and assign an id.
    ///
    /// # Errors
    /// Fails when the trimmed name is empty or nobody is assigned.
    pub fn into_chore(self, now: DateTime<Utc>) -> Result<Chore, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::Required("name".to_string()));
        }
        let assignees: Vec<String> = self
            .assignees
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if assignees.is_empty() {
            return Err(ValidationError::Required("assignees".to_string()));
        }

        Ok(Chore {
            id: Uuid::new_v4().to_string(),
            name,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            room: room_or_default(self.room.as_deref()),
            frequency: self.frequency,
            assignees,
            rotation: self.rotation,
            rotation_index: 0,
            priority: self.priority,
            estimated_minutes: self.estimated_minutes,
            next_due: self.next_due,
            created_at: now,
        })
    }
}

/// One entry of the append-only completion log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoreCompletion {
    pub id: String,
    pub chore_id: String,
    pub completed_by: String,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
}
