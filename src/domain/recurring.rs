//! Recurring transaction templates and their cadence.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;
use crate::domain::transaction::TransactionKind;

/// A template from which a scheduler periodically materializes transactions.
///
/// `next_due_date` is derived by the schedule calculator; the engine only
/// advances the schedule — creating the resulting transaction is the
/// caller's job, using the prefill in `template`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringTransaction {
    pub id: Uuid,
    pub name: String,
    pub template: TransactionTemplate,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_processed_date: Option<NaiveDate>,
    pub next_due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for RecurringTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for RecurringTransaction {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for RecurringTransaction {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.frequency)
    }
}

/// Prefill data for the transaction a recurring template generates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionTemplate {
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub amount_cents: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Cadence of a recurring template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Advances a date by exactly one period.
    ///
    /// Month and year steps clamp to the end of the target month, so
    /// Jan 31 + one month lands on Feb 28/29.
    pub fn advance(self, from: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => from + Duration::days(1),
            Frequency::Weekly => from + Duration::weeks(1),
            Frequency::Biweekly => from + Duration::weeks(2),
            Frequency::Monthly => shift_month(from, 1),
            Frequency::Yearly => shift_year(from, 1),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Every 2 weeks",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    let mut day = date.day();
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    day = day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap()
}

fn shift_year(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let day = date.day().min(days_in_month(year, date.month()));
    NaiveDate::from_ymd_opt(year, date.month(), day).unwrap()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn advance_covers_every_cadence() {
        let base = date(2024, 1, 15);
        assert_eq!(Frequency::Daily.advance(base), date(2024, 1, 16));
        assert_eq!(Frequency::Weekly.advance(base), date(2024, 1, 22));
        assert_eq!(Frequency::Biweekly.advance(base), date(2024, 1, 29));
        assert_eq!(Frequency::Monthly.advance(base), date(2024, 2, 15));
        assert_eq!(Frequency::Yearly.advance(base), date(2025, 1, 15));
    }

    #[test]
    fn monthly_advance_clamps_to_month_end() {
        assert_eq!(Frequency::Monthly.advance(date(2024, 1, 31)), date(2024, 2, 29));
        assert_eq!(Frequency::Monthly.advance(date(2023, 1, 31)), date(2023, 2, 28));
        assert_eq!(Frequency::Monthly.advance(date(2024, 3, 31)), date(2024, 4, 30));
    }

    #[test]
    fn yearly_advance_clamps_leap_day() {
        assert_eq!(Frequency::Yearly.advance(date(2024, 2, 29)), date(2025, 2, 28));
    }
}
