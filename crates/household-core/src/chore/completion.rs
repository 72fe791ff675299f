use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Chore, ChoreCompletion};
use crate::error::{CoreError, Result, ValidationError};
use crate::storage::{ChoreRepository, CompletionLog};

/// What a completion changed.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub completion: ChoreCompletion,
    pub previous_due: DateTime<Utc>,
    /// The chore as persisted, with its new `next_due` and assignee.
    pub chore: Chore,
}

/// Record that `completed_by` did the chore and schedule the next occurrence.
///
/// The next due instant is computed from `completed_at` in its own zone.
/// Nothing is written if the chore is missing or its next date cannot be
/// computed. Callers that need atomicity across both writes should use
/// [`HouseholdDb::complete_chore`](crate::storage::HouseholdDb::complete_chore).
pub fn complete_chore<S, Tz>(
    store: &S,
    chore_id: &str,
    completed_by: &str,
    completed_at: &DateTime<Tz>,
    notes: Option<String>,
) -> Result<CompletionOutcome>
where
    S: ChoreRepository + CompletionLog + ?Sized,
    Tz: TimeZone,
{
    let completed_by = completed_by.trim();
    if completed_by.is_empty() {
        return Err(ValidationError::Required("completed_by".to_string()).into());
    }

    let mut chore = store
        .get_chore(chore_id)?
        .ok_or_else(|| CoreError::NotFound {
            kind: "chore",
            id: chore_id.to_string(),
        })?;

    let previous_due = chore.next_due;
    chore.reschedule(completed_at)?;
    chore.rotate();

    let completion = ChoreCompletion {
        id: Uuid::new_v4().to_string(),
        chore_id: chore.id.clone(),
        completed_by: completed_by.to_string(),
        completed_at: completed_at.with_timezone(&Utc),
        notes: notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    };
    store.append_completion(&completion)?;
    store.update_chore(&chore)?;

    tracing::debug!(
        chore_id = %chore.id,
        completed_by = %completion.completed_by,
        next_due = %chore.next_due,
        "chore completed"
    );

    Ok(CompletionOutcome {
        completion,
        previous_due,
        chore,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chore::{ChoreDraft, ChorePriority, Rotation};
    use crate::recurrence::RecurrencePolicy;
    use crate::storage::HouseholdDb;

    fn seed(db: &HouseholdDb, frequency: RecurrencePolicy, rotation: Rotation) -> Chore {
        let chore = ChoreDraft {
            name: "Vacuum".to_string(),
            description: None,
            room: Some("Living room".to_string()),
            frequency,
            assignees: vec!["alice".to_string(), "bob".to_string()],
            rotation,
            priority: ChorePriority::Low,
            estimated_minutes: Some(30),
            next_due: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
        .into_chore(Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap())
        .unwrap();
        db.create_chore(&chore).unwrap();
        chore
    }

    #[test]
    fn completion_logs_and_reschedules() {
        let db = HouseholdDb::open_memory().unwrap();
        let chore = seed(&db, RecurrencePolicy::Biweekly, Rotation::Fixed);
        let at = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();

        let outcome = complete_chore(&db, &chore.id, "alice", &at, Some(" done ".into())).unwrap();
        assert_eq!(outcome.previous_due, chore.next_due);
        assert_eq!(
            outcome.chore.next_due,
            Utc.with_ymd_and_hms(2024, 1, 17, 10, 0, 0).unwrap()
        );
        assert_eq!(outcome.completion.notes.as_deref(), Some("done"));

        let stored = db.get_chore(&chore.id).unwrap().unwrap();
        assert_eq!(stored.next_due, outcome.chore.next_due);
        let log = db.list_completions(Some(&chore.id), None).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].completed_by, "alice");
        assert_eq!(log[0].completed_at, at);
    }

    #[test]
    fn round_robin_hands_over_on_completion() {
        let db = HouseholdDb::open_memory().unwrap();
        let chore = seed(&db, RecurrencePolicy::Daily, Rotation::RoundRobin);
        let at = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();

        let first = complete_chore(&db, &chore.id, "alice", &at, None).unwrap();
        assert_eq!(first.chore.current_assignee(), Some("bob"));
        let second = complete_chore(&db, &chore.id, "bob", &at, None).unwrap();
        assert_eq!(second.chore.current_assignee(), Some("alice"));
        assert_eq!(db.count_completions().unwrap(), 2);
    }

    #[test]
    fn unknown_chore_writes_nothing() {
        let db = HouseholdDb::open_memory().unwrap();
        let err = complete_chore(&db, "missing", "alice", &Utc::now(), None).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "chore", .. }));
        assert_eq!(db.count_completions().unwrap(), 0);
    }

    #[test]
    fn blank_completer_is_rejected() {
        let db = HouseholdDb::open_memory().unwrap();
        let chore = seed(&db, RecurrencePolicy::Daily, Rotation::Fixed);
        let err = complete_chore(&db, &chore.id, "  ", &Utc::now(), None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(db.count_completions().unwrap(), 0);
    }
}
