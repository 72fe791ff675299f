//! Stored form of a recurrence policy.
//!
//! Chores keep their policy as a small JSON object in a text column:
//! `{"type":"weekly","daysOfWeek":[1,3,5]}` or
//! `{"type":"custom","customDays":10}`. Converting a record into a
//! [`RecurrencePolicy`] is where unknown or malformed shapes are rejected.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{DaySet, RecurrencePolicy};
use crate::error::RecurrenceError;

/// Loosely-typed policy as persisted and exchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_days: Option<i64>,
}

impl TryFrom<FrequencyRecord> for RecurrencePolicy {
    type Error = RecurrenceError;

    fn try_from(record: FrequencyRecord) -> Result<Self, Self::Error> {
        match record.kind.as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly {
                weekdays: DaySet::from_numbers(record.days_of_week.unwrap_or_default())?,
            }),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "custom" => Ok(Self::Custom {
                interval_days: record.custom_days,
            }),
            _ => Err(RecurrenceError::UnknownPolicy { tag: record.kind }),
        }
    }
}

impl From<RecurrencePolicy> for FrequencyRecord {
    fn from(policy: RecurrencePolicy) -> Self {
        let kind = policy.kind().to_string();
        match policy {
            RecurrencePolicy::Weekly { weekdays } => Self {
                kind,
                days_of_week: Some(weekdays.numbers().map(i64::from).collect()),
                custom_days: None,
            },
            RecurrencePolicy::Custom { interval_days } => Self {
                kind,
                days_of_week: None,
                custom_days: interval_days,
            },
            _ => Self {
                kind,
                days_of_week: None,
                custom_days: None,
            },
        }
    }
}

/// Accepts either a JSON record or a bare tag such as `daily`.
impl FromStr for RecurrencePolicy {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let record = if s.starts_with('{') {
            serde_json::from_str::<FrequencyRecord>(s)
                .map_err(|e| RecurrenceError::Malformed(e.to_string()))?
        } else {
            FrequencyRecord {
                kind: s.to_string(),
                days_of_week: None,
                custom_days: None,
            }
        };
        Self::try_from(record)
    }
}

impl RecurrencePolicy {
    /// JSON text for the policy column.
    pub fn to_record_json(&self) -> String {
        // A record only holds strings, integers and integer lists.
        serde_json::to_string(&FrequencyRecord::from(self.clone()))
            .unwrap_or_else(|_| format!(r#"{{"type":"{}"}}"#, self.kind()))
    }
}
