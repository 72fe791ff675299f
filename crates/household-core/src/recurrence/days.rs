use chrono::Weekday;
use std::fmt;

use crate::error::RecurrenceError;

/// A set of weekdays, numbered 0 (Sunday) through 6 (Saturday).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DaySet(u8);

impl DaySet {
    const ALL: u8 = 0b0111_1111;

    /// Build from weekday numbers, rejecting anything outside 0..=6.
    pub fn from_numbers<I>(days: I) -> Result<Self, RecurrenceError>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut bits = 0u8;
        for day in days {
            if !(0..=6).contains(&day) {
                return Err(RecurrenceError::InvalidWeekday(day));
            }
            bits |= 1 << day;
        }
        Ok(Self(bits))
    }

    /// Build from a bit mask (bit 0 = Sunday). Bits above Saturday are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_sunday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_sunday()) != 0
    }

    /// Weekday numbers in ascending order.
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..7).filter(move |d| self.0 & (1 << d) != 0)
    }

    /// Smallest configured weekday number.
    pub fn first(&self) -> Option<u8> {
        self.numbers().next()
    }

    /// Smallest configured weekday number strictly greater than `day`.
    pub fn next_after(&self, day: u8) -> Option<u8> {
        self.numbers().find(|&d| d > day)
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut set = Self::default();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Debug for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.numbers()).finish()
    }
}
