//! Day-based views over chores: today, overdue, upcoming, on a date.
//!
//! Days are calendar days in the zone of the `now` handed to [`Agenda::new`].

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};

use super::Chore;
use crate::error::Result;
use crate::recurrence::resolve_local;
use crate::storage::ChoreRepository;

/// First instant of `date` in `tz`, as UTC.
///
/// When midnight falls into a DST gap, the day starts at the end of the gap.
pub fn day_start<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    resolve_local(tz, midnight)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Chore agenda as seen at a given moment.
pub struct Agenda<'a, R: ?Sized, Tz: TimeZone> {
    repo: &'a R,
    now: DateTime<Tz>,
}

impl<'a, R, Tz> Agenda<'a, R, Tz>
where
    R: ChoreRepository + ?Sized,
    Tz: TimeZone,
{
    pub fn new(repo: &'a R, now: DateTime<Tz>) -> Self {
        Self { repo, now }
    }

    fn local_date(&self) -> NaiveDate {
        self.now.date_naive()
    }

    fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        day_start(&self.now.timezone(), date)
    }

    fn plus_days(date: NaiveDate, days: u64) -> NaiveDate {
        date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
    }

    /// Everything due today or earlier, earliest first.
    pub fn today(&self) -> Result<Vec<Chore>> {
        let tomorrow = Self::plus_days(self.local_date(), 1);
        self.repo.chores_due_before(self.start_of(tomorrow))
    }

    /// Everything due before today.
    pub fn overdue(&self) -> Result<Vec<Chore>> {
        self.repo.chores_due_before(self.start_of(self.local_date()))
    }

    /// Everything due on one of the next `days` days, today excluded.
    pub fn upcoming(&self, days: u32) -> Result<Vec<Chore>> {
        let today = self.local_date();
        let from = self.start_of(Self::plus_days(today, 1));
        let to = self.start_of(Self::plus_days(today, u64::from(days) + 1));
        self.repo.chores_due_between(from, to)
    }

    /// Everything due on `date`.
    pub fn on(&self, date: NaiveDate) -> Result<Vec<Chore>> {
        let from = self.start_of(date);
        let to = self.start_of(Self::plus_days(date, 1));
        self.repo.chores_due_between(from, to)
    }
}
