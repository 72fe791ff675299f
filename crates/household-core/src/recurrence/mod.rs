//! Chore recurrence engine.
//!
//! Computes when a recurring chore is due next, given its [`RecurrencePolicy`]
//! and a reference instant (normally the moment the chore was completed).
//!
//! The engine is a pure function of its two inputs: it never reads the clock,
//! touches storage, or keeps state. Calendar arithmetic happens in the time
//! zone of the reference instant, so time-of-day is carried over unchanged and
//! "weekday" means the weekday as observed in that zone. Across a daylight
//! saving change a repeated wall-clock time takes its first occurrence and a
//! skipped one moves forward by the length of the gap.
//!
//! Two inputs are quietly substituted rather than rejected:
//! - a `Weekly` policy with no weekdays behaves as a 7-day interval;
//! - a `Custom` interval that is missing or not positive becomes 7 days.
//!
//! Both emit a `tracing` warning. Unknown policy kinds are rejected when the
//! stored record is parsed (see [`FrequencyRecord`]), never defaulted.

mod days;
mod record;

pub use days::DaySet;
pub use record::FrequencyRecord;

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDateTime, Offset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::RecurrenceError;

/// Interval used when a policy does not carry a usable one.
pub const DEFAULT_INTERVAL_DAYS: u64 = 7;

/// Length of a biweekly cycle.
pub const BIWEEKLY_INTERVAL_DAYS: u64 = 14;

/// How often a chore repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FrequencyRecord", into = "FrequencyRecord")]
pub enum RecurrencePolicy {
    /// Every day.
    Daily,
    /// On specific weekdays.
    Weekly { weekdays: DaySet },
    /// Every 14 days.
    Biweekly,
    /// Same day of month, one calendar month later.
    Monthly,
    /// Every `interval_days` days.
    Custom { interval_days: Option<i64> },
}

impl RecurrencePolicy {
    /// Weekly policy from weekday numbers (0 = Sunday).
    pub fn weekly<I>(days: I) -> Result<Self, RecurrenceError>
    where
        I: IntoIterator<Item = i64>,
    {
        Ok(Self::Weekly {
            weekdays: DaySet::from_numbers(days)?,
        })
    }

    /// Custom policy with an explicit interval.
    pub fn every(interval_days: i64) -> Self {
        Self::Custom {
            interval_days: Some(interval_days),
        }
    }

    /// Stored tag for this policy.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly { .. } => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Custom { .. } => "custom",
        }
    }

    /// See [`next_due`].
    pub fn next_due<Tz: TimeZone>(
        &self,
        reference: &DateTime<Tz>,
    ) -> Result<DateTime<Tz>, RecurrenceError> {
        next_due(self, reference)
    }
}

impl Default for RecurrencePolicy {
    fn default() -> Self {
        Self::Weekly {
            weekdays: DaySet::from_iter([chrono::Weekday::Mon]),
        }
    }
}

/// Compute the next due instant for `policy`, counting from `reference`.
///
/// # Errors
/// Returns [`RecurrenceError::OutOfRange`] only when the result is beyond
/// chrono's supported range.
pub fn next_due<Tz: TimeZone>(
    policy: &RecurrencePolicy,
    reference: &DateTime<Tz>,
) -> Result<DateTime<Tz>, RecurrenceError> {
    match policy {
        RecurrencePolicy::Daily => add_days(reference, 1),
        RecurrencePolicy::Biweekly => add_days(reference, BIWEEKLY_INTERVAL_DAYS),
        RecurrencePolicy::Custom { interval_days } => {
            let days = match *interval_days {
                Some(n) if n > 0 => n.unsigned_abs(),
                other => {
                    tracing::warn!(
                        interval_days = ?other,
                        "custom recurrence has no positive interval, using {DEFAULT_INTERVAL_DAYS} days"
                    );
                    DEFAULT_INTERVAL_DAYS
                }
            };
            add_days(reference, days)
        }
        RecurrencePolicy::Monthly => shift_local(reference, "1 month", |naive| {
            naive.checked_add_months(Months::new(1))
        }),
        RecurrencePolicy::Weekly { weekdays } => {
            let Some(first) = weekdays.first() else {
                tracing::warn!(
                    "weekly recurrence has no weekdays, using {DEFAULT_INTERVAL_DAYS} days"
                );
                return add_days(reference, DEFAULT_INTERVAL_DAYS);
            };

            // Never due on the reference day itself.
            let current = (reference.weekday().num_days_from_sunday() as u8 + 1) % 7;
            let offset = match weekdays.next_after(current) {
                Some(day) => day - current,
                None => 7 - current + first,
            };
            add_days(reference, 1 + u64::from(offset))
        }
    }
}

/// Parse a stored record and compute its next due instant in one step.
///
/// # Errors
/// Returns [`RecurrenceError::UnknownPolicy`] for an unrecognized tag,
/// [`RecurrenceError::InvalidWeekday`] for bad weekday numbers, and
/// [`RecurrenceError::OutOfRange`] as for [`next_due`].
pub fn next_due_from_record<Tz: TimeZone>(
    record: &FrequencyRecord,
    reference: &DateTime<Tz>,
) -> Result<DateTime<Tz>, RecurrenceError> {
    let policy = RecurrencePolicy::try_from(record.clone())?;
    next_due(&policy, reference)
}

fn add_days<Tz: TimeZone>(
    reference: &DateTime<Tz>,
    days: u64,
) -> Result<DateTime<Tz>, RecurrenceError> {
    shift_local(reference, &format!("{days} days"), |naive| {
        naive.checked_add_days(Days::new(days))
    })
}

/// Move the wall-clock time of `reference` and map it back into its zone.
fn shift_local<Tz, F>(
    reference: &DateTime<Tz>,
    what: &str,
    shift: F,
) -> Result<DateTime<Tz>, RecurrenceError>
where
    Tz: TimeZone,
    F: FnOnce(NaiveDateTime) -> Option<NaiveDateTime>,
{
    shift(reference.naive_local())
        .and_then(|naive| resolve_local(&reference.timezone(), naive))
        .ok_or_else(|| out_of_range(reference, what))
}

/// Map a wall-clock time into `tz`.
///
/// A time repeated by a backward transition resolves to its first
/// occurrence. A time skipped by a forward transition keeps the offset in
/// effect before the gap, so it lands that far past the gap (02:30 on a
/// spring-forward night becomes 03:30). `None` only when the result is
/// outside chrono's range.
pub(crate) fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt);
    }
    let before_gap = naive.checked_sub_days(Days::new(1)).unwrap_or(naive);
    let offset = tz.offset_from_utc_datetime(&before_gap).fix();
    let utc = naive.checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?;
    Some(tz.from_utc_datetime(&utc))
}

fn out_of_range<Tz: TimeZone>(reference: &DateTime<Tz>, what: &str) -> RecurrenceError {
    RecurrenceError::OutOfRange {
        reference: reference.naive_local().to_string(),
        what: what.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc, Weekday};
    use proptest::prelude::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // 2024-01-01 is a Monday.
    fn monday() -> DateTime<Utc> {
        utc(2024, 1, 1, 9, 30)
    }

    #[test]
    fn daily_adds_one_day() {
        let t = monday();
        assert_eq!(next_due(&RecurrencePolicy::Daily, &t).unwrap(), t + Duration::days(1));
    }

    #[test]
    fn biweekly_adds_fourteen_days() {
        let t = monday();
        assert_eq!(
            next_due(&RecurrencePolicy::Biweekly, &t).unwrap(),
            t + Duration::days(14)
        );
    }

    #[test]
    fn custom_adds_interval() {
        let t = monday();
        assert_eq!(
            next_due(&RecurrencePolicy::every(10), &t).unwrap(),
            utc(2024, 1, 11, 9, 30)
        );
        assert_eq!(
            next_due(&RecurrencePolicy::every(1), &t).unwrap(),
            t + Duration::days(1)
        );
    }

    #[test]
    fn custom_without_positive_interval_falls_back_to_a_week() {
        let t = monday();
        let week = t + Duration::days(7);
        for interval_days in [None, Some(0), Some(-3)] {
            let policy = RecurrencePolicy::Custom { interval_days };
            assert_eq!(next_due(&policy, &t).unwrap(), week, "{interval_days:?}");
        }
    }

    #[test]
    fn monthly_keeps_day_of_month_and_time() {
        assert_eq!(
            next_due(&RecurrencePolicy::Monthly, &utc(2024, 5, 15, 18, 5)).unwrap(),
            utc(2024, 6, 15, 18, 5)
        );
        assert_eq!(
            next_due(&RecurrencePolicy::Monthly, &utc(2024, 12, 20, 7, 0)).unwrap(),
            utc(2025, 1, 20, 7, 0)
        );
    }

    #[test]
    fn monthly_clamps_to_last_day_of_shorter_month() {
        assert_eq!(
            next_due(&RecurrencePolicy::Monthly, &utc(2024, 1, 31, 0, 0)).unwrap(),
            utc(2024, 2, 29, 0, 0)
        );
        assert_eq!(
            next_due(&RecurrencePolicy::Monthly, &utc(2023, 1, 31, 0, 0)).unwrap(),
            utc(2023, 2, 28, 0, 0)
        );
        assert_eq!(
            next_due(&RecurrencePolicy::Monthly, &utc(2024, 3, 31, 12, 0)).unwrap(),
            utc(2024, 4, 30, 12, 0)
        );
    }

    #[test]
    fn weekly_from_monday_goes_to_wednesday() {
        let policy = RecurrencePolicy::weekly([1, 3, 5]).unwrap();
        let due = next_due(&policy, &monday()).unwrap();
        assert_eq!(due, utc(2024, 1, 3, 9, 30));
        assert_eq!(due.weekday(), Weekday::Wed);
    }

    #[test]
    fn weekly_from_saturday_wraps_to_monday() {
        let policy = RecurrencePolicy::weekly([1, 3, 5]).unwrap();
        let due = next_due(&policy, &utc(2024, 1, 6, 20, 0)).unwrap();
        assert_eq!(due, utc(2024, 1, 8, 20, 0));
    }

    #[test]
    fn weekly_from_friday_wraps_past_weekend() {
        let policy = RecurrencePolicy::weekly([1, 3, 5]).unwrap();
        let due = next_due(&policy, &utc(2024, 1, 5, 8, 0)).unwrap();
        assert_eq!(due, utc(2024, 1, 8, 8, 0));
    }

    #[test]
    fn weekly_skips_the_day_after_reference_even_when_configured() {
        // Tuesday reference, Wednesday only: the candidate day is Wednesday,
        // but only weekdays after it count, so the result is a week later.
        let policy = RecurrencePolicy::weekly([3]).unwrap();
        let due = next_due(&policy, &utc(2024, 1, 2, 10, 0)).unwrap();
        assert_eq!(due, utc(2024, 1, 10, 10, 0));
    }

    #[test]
    fn weekly_single_day_repeats_each_week() {
        let policy = RecurrencePolicy::weekly([1]).unwrap();
        let due = next_due(&policy, &monday()).unwrap();
        assert_eq!(due, utc(2024, 1, 8, 9, 30));
    }

    #[test]
    fn weekly_without_days_behaves_as_seven_day_interval() {
        let empty = RecurrencePolicy::Weekly {
            weekdays: DaySet::default(),
        };
        for t in [monday(), utc(2024, 2, 29, 23, 59), utc(2023, 12, 31, 0, 0)] {
            assert_eq!(
                next_due(&empty, &t).unwrap(),
                next_due(&RecurrencePolicy::every(7), &t).unwrap()
            );
        }
    }

    #[test]
    fn weekday_is_taken_in_the_reference_zone() {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        // Saturday evening in New York, already Sunday in UTC.
        let local = est.with_ymd_and_hms(2024, 1, 6, 23, 30, 0).unwrap();
        let policy = RecurrencePolicy::weekly([1]).unwrap();

        let due_local = next_due(&policy, &local).unwrap();
        assert_eq!(due_local, est.with_ymd_and_hms(2024, 1, 8, 23, 30, 0).unwrap());

        let due_utc = next_due(&policy, &local.with_timezone(&Utc)).unwrap();
        assert_eq!(due_utc, utc(2024, 1, 15, 4, 30));
    }

    #[test]
    fn record_with_unknown_tag_is_a_configuration_error() {
        let record = FrequencyRecord {
            kind: "yearly".to_string(),
            days_of_week: None,
            custom_days: None,
        };
        let err = next_due_from_record(&record, &monday()).unwrap_err();
        assert_eq!(
            err,
            RecurrenceError::UnknownPolicy {
                tag: "yearly".to_string()
            }
        );
    }

    #[test]
    fn record_is_parsed_then_computed() {
        let record: FrequencyRecord =
            serde_json::from_str(r#"{"type":"weekly","daysOfWeek":[5,1,3]}"#).unwrap();
        assert_eq!(
            next_due_from_record(&record, &monday()).unwrap(),
            utc(2024, 1, 3, 9, 30)
        );
    }

    #[test]
    fn overflow_is_reported() {
        let end = DateTime::<Utc>::MAX_UTC;
        assert!(matches!(
            next_due(&RecurrencePolicy::Daily, &end),
            Err(RecurrenceError::OutOfRange { .. })
        ));
    }

    mod daylight_saving {
        use super::*;
        use chrono::NaiveDate;
        use chrono_tz::America::New_York;
        use chrono_tz::Tz;

        // 2024: clocks spring forward on Mar 10 at 02:00 and fall back on
        // Nov 3 at 02:00 in New York.
        fn ny(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
            let naive = NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap();
            New_York.from_local_datetime(&naive).earliest().unwrap()
        }

        fn utc_offset_hours(dt: &DateTime<Tz>) -> i32 {
            dt.offset().fix().local_minus_utc() / 3600
        }

        #[test]
        fn skipped_hour_moves_past_the_gap() {
            let cases = [
                (RecurrencePolicy::Daily, ny(2024, 3, 9, 2, 30)),
                (RecurrencePolicy::every(3), ny(2024, 3, 7, 2, 30)),
                (RecurrencePolicy::Biweekly, ny(2024, 2, 25, 2, 30)),
                (RecurrencePolicy::Monthly, ny(2024, 2, 10, 2, 30)),
            ];
            for (policy, reference) in cases {
                let due = next_due(&policy, &reference).unwrap();
                assert_eq!(due, ny(2024, 3, 10, 3, 30), "{policy:?}");
                assert_eq!(utc_offset_hours(&due), -4);
            }
        }

        #[test]
        fn repeated_hour_takes_first_occurrence() {
            let cases = [
                (RecurrencePolicy::Daily, ny(2024, 11, 2, 1, 30)),
                (RecurrencePolicy::every(5), ny(2024, 10, 29, 1, 30)),
                (RecurrencePolicy::Biweekly, ny(2024, 10, 20, 1, 30)),
                (RecurrencePolicy::Monthly, ny(2024, 10, 3, 1, 30)),
                (RecurrencePolicy::weekly([0]).unwrap(), ny(2024, 10, 31, 1, 30)),
            ];
            for (policy, reference) in cases {
                let due = next_due(&policy, &reference).unwrap();
                assert_eq!(due.naive_local(), ny(2024, 11, 3, 1, 30).naive_local(), "{policy:?}");
                assert_eq!(utc_offset_hours(&due), -4, "{policy:?}");
            }
        }

        #[test]
        fn weekly_steps_over_a_skipped_hour() {
            // Saturday 02:30; Sunday 02:30 does not exist but Monday's does.
            let policy = RecurrencePolicy::weekly([1]).unwrap();
            let due = next_due(&policy, &ny(2024, 3, 9, 2, 30)).unwrap();
            assert_eq!(due, ny(2024, 3, 11, 2, 30));
            assert_eq!(due.weekday(), Weekday::Mon);

            let sunday_only = RecurrencePolicy::weekly([0]).unwrap();
            let due = next_due(&sunday_only, &ny(2024, 3, 8, 2, 30)).unwrap();
            assert_eq!(due, ny(2024, 3, 10, 3, 30));
        }

        #[test]
        fn wall_clock_is_kept_across_transitions() {
            let spring = next_due(&RecurrencePolicy::Daily, &ny(2024, 3, 9, 9, 0)).unwrap();
            assert_eq!(spring, ny(2024, 3, 10, 9, 0));
            assert_eq!((spring - ny(2024, 3, 9, 9, 0)).num_hours(), 23);

            let fall = next_due(&RecurrencePolicy::Daily, &ny(2024, 11, 2, 9, 0)).unwrap();
            assert_eq!(fall, ny(2024, 11, 3, 9, 0));
            assert_eq!((fall - ny(2024, 11, 2, 9, 0)).num_hours(), 25);
        }

        fn any_ny_instant() -> impl Strategy<Value = DateTime<Tz>> {
            any_instant().prop_map(|t| t.with_timezone(&New_York))
        }

        proptest! {
            #[test]
            fn never_fails_in_a_dst_zone(policy in any_policy(), t in any_ny_instant()) {
                let due = next_due(&policy, &t).unwrap();
                prop_assert!(due > t);
                let kept = due.time() == t.time();
                let pushed_past_gap = due.time() == t.time() + Duration::hours(1);
                prop_assert!(kept || pushed_past_gap, "{} -> {}", t, due);
            }
        }
    }

    fn any_instant() -> impl Strategy<Value = DateTime<Utc>> {
        // 2000-01-01 .. 2100-01-01
        (946_684_800i64..4_102_444_800i64).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn any_policy() -> impl Strategy<Value = RecurrencePolicy> {
        prop_oneof![
            Just(RecurrencePolicy::Daily),
            Just(RecurrencePolicy::Biweekly),
            Just(RecurrencePolicy::Monthly),
            proptest::option::of(-30i64..400).prop_map(|interval_days| {
                RecurrencePolicy::Custom { interval_days }
            }),
            (0u8..128).prop_map(|mask| RecurrencePolicy::Weekly {
                weekdays: DaySet::from_bits(mask),
            }),
        ]
    }

    proptest! {
        #[test]
        fn always_moves_forward(policy in any_policy(), t in any_instant()) {
            let due = next_due(&policy, &t).unwrap();
            prop_assert!(due > t);
        }

        #[test]
        fn is_deterministic(policy in any_policy(), t in any_instant()) {
            prop_assert_eq!(next_due(&policy, &t).unwrap(), next_due(&policy, &t).unwrap());
        }

        #[test]
        fn preserves_time_of_day(policy in any_policy(), t in any_instant()) {
            let due = next_due(&policy, &t).unwrap();
            prop_assert_eq!(due.time(), t.time());
        }

        #[test]
        fn weekly_lands_on_a_configured_day(mask in 1u8..128, t in any_instant()) {
            let weekdays = DaySet::from_bits(mask);
            let due = next_due(&RecurrencePolicy::Weekly { weekdays }, &t).unwrap();
            prop_assert!(weekdays.contains(due.weekday()));
            let gap = (due - t).num_days();
            prop_assert!((2..=8).contains(&gap), "gap was {} days", gap);
        }

        #[test]
        fn custom_matches_interval(n in 1i64..1000, t in any_instant()) {
            prop_assert_eq!(
                next_due(&RecurrencePolicy::every(n), &t).unwrap(),
                t + Duration::days(n)
            );
        }
    }
}
