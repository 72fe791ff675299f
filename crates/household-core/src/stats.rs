//! Chore completion statistics.
//!
//! Counts completions overall and within a trailing window, per person,
//! and ranks people into a leaderboard.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chore::{ChoreCompletion, Person, DEFAULT_PERSON_COLOR};
use crate::error::Result;
use crate::storage::{ChoreRepository, CompletionLog};

/// Snapshot of completion statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChoreStats {
    pub total_completed: u64,
    pub completed_in_window: u64,
    pub window_days: u32,
    /// Completions within the window, keyed by person id.
    pub by_person: BTreeMap<String, u64>,
    pub total_chores: u64,
}

/// Shown for completions by someone no longer in the household.
pub const UNKNOWN_PERSON: &str = "Unknown";

/// One row of the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub person_id: String,
    pub name: String,
    pub color: String,
    pub count: u64,
}

impl ChoreStats {
    /// Start of the trailing window ending at `now`.
    pub fn window_start(now: DateTime<Utc>, window_days: u32) -> DateTime<Utc> {
        now.checked_sub_signed(Duration::days(i64::from(window_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Tally completions. Only those at or after the window start count
    /// toward `completed_in_window` and `by_person`.
    pub fn tally(
        total_completed: u64,
        completions: &[ChoreCompletion],
        total_chores: u64,
        now: DateTime<Utc>,
        window_days: u32,
    ) -> Self {
        let since = Self::window_start(now, window_days);
        let mut by_person = BTreeMap::new();
        let mut completed_in_window = 0;
        for completion in completions.iter().filter(|c| c.completed_at >= since) {
            completed_in_window += 1;
            *by_person.entry(completion.completed_by.clone()).or_insert(0) += 1;
        }

        Self {
            total_completed,
            completed_in_window,
            window_days,
            by_person,
            total_chores,
        }
    }

    /// Gather statistics from storage.
    pub fn collect<S>(store: &S, now: DateTime<Utc>, window_days: u32) -> Result<Self>
    where
        S: ChoreRepository + CompletionLog + ?Sized,
    {
        let recent = store.completions_since(Self::window_start(now, window_days))?;
        Ok(Self::tally(
            store.count_completions()?,
            &recent,
            store.count_chores()?,
            now,
            window_days,
        ))
    }

    /// People ranked by completions in the window, most first.
    /// Ties share a rank and are ordered by person id. Names and colors come
    /// from `people`; ids not found there show as [`UNKNOWN_PERSON`].
    pub fn leaderboard(&self, people: &[Person]) -> Vec<LeaderboardEntry> {
        let mut rows: Vec<(&String, u64)> = self.by_person.iter().map(|(p, c)| (p, *c)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(rows.len());
        for (idx, (person_id, count)) in rows.into_iter().enumerate() {
            let rank = match entries.last() {
                Some(prev) if prev.count == count => prev.rank,
                _ => idx + 1,
            };
            let person = people.iter().find(|p| &p.id == person_id);
            entries.push(LeaderboardEntry {
                rank,
                person_id: person_id.clone(),
                name: person.map_or_else(|| UNKNOWN_PERSON.to_string(), |p| p.name.clone()),
                color: person.map_or_else(|| DEFAULT_PERSON_COLOR.to_string(), |p| p.color.clone()),
                count,
            });
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn done(by: &str, day: u32) -> ChoreCompletion {
        ChoreCompletion {
            id: format!("{by}-{day}"),
            chore_id: "c".to_string(),
            completed_by: by.to_string(),
            completed_at: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            notes: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn window_excludes_older_completions() {
        let log = vec![done("alice", 1), done("alice", 13), done("bob", 14), done("bob", 19)];
        let stats = ChoreStats::tally(10, &log, 4, now(), 7);
        assert_eq!(stats.total_completed, 10);
        assert_eq!(stats.completed_in_window, 3);
        assert_eq!(stats.by_person.get("alice"), Some(&1));
        assert_eq!(stats.by_person.get("bob"), Some(&2));
        assert_eq!(stats.total_chores, 4);
    }

    #[test]
    fn leaderboard_orders_by_count_then_id() {
        let log = vec![
            done("carol", 15),
            done("bob", 15),
            done("bob", 16),
            done("alice", 17),
            done("dave", 18),
            done("dave", 19),
        ];
        let board = ChoreStats::tally(6, &log, 1, now(), 7).leaderboard(&[]);
        let rows: Vec<_> = board
            .iter()
            .map(|e| (e.rank, e.person_id.as_str(), e.count))
            .collect();
        assert_eq!(
            rows,
            vec![
                (1, "bob", 2),
                (1, "dave", 2),
                (3, "alice", 1),
                (3, "carol", 1),
            ]
        );
    }

    #[test]
    fn empty_log_has_empty_leaderboard() {
        let stats = ChoreStats::tally(0, &[], 0, now(), 7);
        assert_eq!(stats.completed_in_window, 0);
        assert!(stats.leaderboard(&[]).is_empty());
    }

    #[test]
    fn huge_window_does_not_overflow() {
        let stats = ChoreStats::tally(1, &[done("alice", 1)], 1, now(), u32::MAX);
        assert_eq!(stats.completed_in_window, 1);
    }

    #[test]
    fn leaderboard_shows_names_and_colors() {
        let mut bob = Person::new("Bob", Some("#22c55e"), None, now()).unwrap();
        bob.id = "bob".to_string();
        let log = vec![done("bob", 15), done("bob", 16), done("gone", 17)];
        let board = ChoreStats::tally(3, &log, 1, now(), 7).leaderboard(&[bob]);

        assert_eq!(board[0].name, "Bob");
        assert_eq!(board[0].color, "#22c55e");
        assert_eq!(board[1].person_id, "gone");
        assert_eq!(board[1].name, UNKNOWN_PERSON);
        assert_eq!(board[1].color, DEFAULT_PERSON_COLOR);
    }
}
