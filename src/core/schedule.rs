//! Pure schedule math for recurring templates.

use chrono::NaiveDate;

use crate::domain::Frequency;
use crate::errors::{LedgerError, Result};

/// Hard cap on candidate advances, guarding against a malformed cadence.
pub const MAX_SCHEDULE_STEPS: usize = 10_000;

/// Computes the next occurrence of a recurring template.
///
/// Steps one period at a time from `last_processed_date` (or from
/// `start_date` when nothing was processed yet) until the candidate is
/// strictly after `today` and strictly after the last processed date, and
/// returns the first such candidate. Purely computational, no I/O; the loop
/// is bounded because every step strictly advances the candidate, and
/// capped at [`MAX_SCHEDULE_STEPS`].
pub fn next_due_date(
    start_date: NaiveDate,
    frequency: Frequency,
    last_processed_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NaiveDate> {
    let base = last_processed_date.unwrap_or(start_date);
    let mut candidate = frequency.advance(base);
    let mut steps = 1usize;
    while candidate <= today
        || last_processed_date.is_some_and(|last| candidate <= last)
    {
        if steps >= MAX_SCHEDULE_STEPS {
            return Err(LedgerError::ScheduleOverflow(MAX_SCHEDULE_STEPS));
        }
        let advanced = frequency.advance(candidate);
        if advanced <= candidate {
            return Err(LedgerError::ScheduleOverflow(steps));
        }
        candidate = advanced;
        steps += 1;
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn returns_smallest_congruent_date_after_today() {
        // Monthly from Jan 15, nothing processed, mid-March: Feb 15 is
        // skipped, Mar 15 is the first candidate strictly in the future.
        let next = next_due_date(date(2024, 1, 15), Frequency::Monthly, None, date(2024, 3, 10))
            .unwrap();
        assert_eq!(next, date(2024, 3, 15));
    }

    #[test]
    fn stays_strictly_after_last_processed() {
        let next = next_due_date(
            date(2024, 1, 1),
            Frequency::Weekly,
            Some(date(2024, 6, 3)),
            date(2024, 5, 1),
        )
        .unwrap();
        assert_eq!(next, date(2024, 6, 10));
        assert!(next > date(2024, 6, 3));
    }

    #[test]
    fn first_candidate_in_the_future_is_kept() {
        let next = next_due_date(date(2030, 1, 1), Frequency::Daily, None, date(2024, 1, 1))
            .unwrap();
        assert_eq!(next, date(2030, 1, 2));
    }

    #[test]
    fn result_is_strictly_after_today_and_last_processed() {
        let cases = [
            (date(2020, 2, 29), Frequency::Yearly, None, date(2024, 3, 1)),
            (
                date(2024, 1, 31),
                Frequency::Monthly,
                Some(date(2024, 2, 29)),
                date(2024, 2, 10),
            ),
            (date(2024, 1, 1), Frequency::Biweekly, None, date(2024, 12, 31)),
        ];
        for (start, frequency, last, today) in cases {
            let next = next_due_date(start, frequency, last, today).unwrap();
            assert!(next > today);
            if let Some(last) = last {
                assert!(next > last);
            }
        }
    }

    #[test]
    fn daily_catchup_over_years_stays_bounded() {
        let next = next_due_date(date(2000, 1, 1), Frequency::Daily, None, date(2024, 1, 1));
        assert!(next.is_ok());
    }
}
