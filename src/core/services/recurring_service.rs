//! Recurring template lifecycle and schedule advancement.
//!
//! The engine only keeps schedules correct; materializing the due
//! transaction is the caller's job, using the template's prefill.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::core::effects::transaction_effects;
use crate::core::schedule::next_due_date;
use crate::domain::{Frequency, RecurringTransaction, Transaction, TransactionTemplate};
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

/// Caller-editable recurring fields; `None` leaves a field unchanged.
#[derive(Debug, Default, Clone)]
pub struct RecurringPatch {
    pub name: Option<String>,
    pub template: Option<TransactionTemplate>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Operations on recurring transaction templates.
pub struct RecurringService;

impl RecurringService {
    /// Adds a recurring template with a freshly derived next due date.
    pub fn create(
        ledger: &mut Ledger,
        name: impl Into<String>,
        template: TransactionTemplate,
        frequency: Frequency,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Uuid> {
        Self::create_with_reference(
            ledger,
            name,
            template,
            frequency,
            start_date,
            end_date,
            Utc::now().date_naive(),
        )
    }

    /// As [`create`](Self::create), with an explicit "today" for the
    /// schedule derivation.
    pub fn create_with_reference(
        ledger: &mut Ledger,
        name: impl Into<String>,
        template: TransactionTemplate,
        frequency: Frequency,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Uuid> {
        validate_template(&template, start_date)?;
        let next = if start_date > today {
            start_date
        } else {
            next_due_date(start_date, frequency, None, today)?
        };
        let record = RecurringTransaction {
            id: Uuid::new_v4(),
            name: name.into(),
            template,
            frequency,
            start_date,
            end_date,
            last_processed_date: None,
            next_due_date: next,
            created_at: Utc::now(),
        };
        let id = record.id;
        ledger.recurring_transactions.push(record);
        ledger.touch();
        tracing::debug!(recurring = %id, "created recurring template");
        Ok(id)
    }

    /// Records that an occurrence was processed and advances the schedule.
    ///
    /// Creates no transaction; returns the re-derived next due date for the
    /// caller to schedule against.
    pub fn mark_processed(
        ledger: &mut Ledger,
        id: Uuid,
        processed_date: NaiveDate,
    ) -> Result<NaiveDate> {
        Self::mark_processed_with_reference(ledger, id, processed_date, Utc::now().date_naive())
    }

    /// As [`mark_processed`](Self::mark_processed), with an explicit
    /// "today" for the schedule derivation.
    pub fn mark_processed_with_reference(
        ledger: &mut Ledger,
        id: Uuid,
        processed_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<NaiveDate> {
        let record = ledger
            .recurring(id)
            .ok_or(LedgerError::RecurringNotFound(id))?;
        // Derive before writing anything, so a schedule failure leaves the
        // record untouched.
        let next = next_due_date(
            record.start_date,
            record.frequency,
            Some(processed_date),
            today,
        )?;
        let record = ledger
            .recurring_mut(id)
            .ok_or(LedgerError::RecurringNotFound(id))?;
        record.last_processed_date = Some(processed_date);
        record.next_due_date = next;
        ledger.touch();
        tracing::debug!(recurring = %id, %next, "advanced recurring schedule");
        Ok(next)
    }

    /// Applies caller-editable fields and re-derives the next due date.
    pub fn update(ledger: &mut Ledger, id: Uuid, patch: RecurringPatch) -> Result<()> {
        Self::update_with_reference(ledger, id, patch, Utc::now().date_naive())
    }

    /// As [`update`](Self::update), with an explicit "today".
    pub fn update_with_reference(
        ledger: &mut Ledger,
        id: Uuid,
        patch: RecurringPatch,
        today: NaiveDate,
    ) -> Result<()> {
        let mut updated = ledger
            .recurring(id)
            .ok_or(LedgerError::RecurringNotFound(id))?
            .clone();
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(template) = patch.template {
            updated.template = template;
        }
        if let Some(frequency) = patch.frequency {
            updated.frequency = frequency;
        }
        if let Some(start_date) = patch.start_date {
            updated.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            updated.end_date = Some(end_date);
        }
        validate_template(&updated.template, updated.start_date)?;
        updated.next_due_date = if updated.last_processed_date.is_none()
            && updated.start_date > today
        {
            updated.start_date
        } else {
            next_due_date(
                updated.start_date,
                updated.frequency,
                updated.last_processed_date,
                today,
            )?
        };

        let record = ledger
            .recurring_mut(id)
            .ok_or(LedgerError::RecurringNotFound(id))?;
        *record = updated;
        ledger.touch();
        Ok(())
    }

    /// Removes a recurring template, returning it.
    pub fn delete(ledger: &mut Ledger, id: Uuid) -> Result<RecurringTransaction> {
        ledger
            .remove_recurring(id)
            .ok_or(LedgerError::RecurringNotFound(id))
    }

    /// Templates due on or before `reference` that have not ended.
    pub fn due_as_of(ledger: &Ledger, reference: NaiveDate) -> Vec<&RecurringTransaction> {
        ledger
            .recurring_transactions
            .iter()
            .filter(|record| record.next_due_date <= reference)
            .filter(|record| {
                record
                    .end_date
                    .map_or(true, |end| record.next_due_date <= end)
            })
            .collect()
    }

    /// Returns a snapshot of the ledger's recurring templates.
    pub fn list(ledger: &Ledger) -> Vec<&RecurringTransaction> {
        ledger.recurring_transactions.iter().collect()
    }
}

fn validate_template(template: &TransactionTemplate, start_date: NaiveDate) -> Result<()> {
    let probe = Transaction::new(template.kind.clone(), template.amount_cents, start_date);
    transaction_effects(&probe).map(|_| ())
}
