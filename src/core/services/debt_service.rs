//! Debt lifecycle and the mirrored-payment protocol.
//!
//! Every recorded payment exists twice: as a [`DebtPayment`] owned by its
//! debt and as a mirrored ledger [`Transaction`] moving the cash on the
//! chosen account. The pair is written and removed as a unit, together with
//! the debt's re-derived balance and status.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::coordinator::MutationBatch;
use crate::core::effects::{reversed, transaction_effects};
use crate::domain::{Debt, DebtKind, DebtPayment, DebtPaymentKind, DebtStatus, Transaction, TransactionKind};
use crate::errors::{LedgerError, Result};
use crate::ledger::{Ledger, DEBT_COLLECTIONS_CATEGORY, DEBT_PAYMENTS_CATEGORY};

/// Caller-editable debt fields; `None` leaves a field unchanged.
///
/// Balance and status are never taken from the caller.
#[derive(Debug, Default, Clone)]
pub struct DebtPatch {
    pub name: Option<String>,
    pub kind: Option<DebtKind>,
    pub payee_id: Option<Uuid>,
    pub notes: Option<String>,
    pub initial_amount_cents: Option<i64>,
}

/// Operations on debts and their mirrored payments.
pub struct DebtService;

impl DebtService {
    /// Adds a debt, normalizing its derived fields, and returns its id.
    pub fn create_debt(ledger: &mut Ledger, debt: Debt) -> Result<Uuid> {
        if debt.initial_amount_cents < 0 {
            return Err(LedgerError::NonPositiveAmount(debt.initial_amount_cents));
        }
        let mut debt = debt;
        debt.current_balance_cents = debt.initial_amount_cents;
        debt.status = DebtStatus::derive(debt.initial_amount_cents, debt.current_balance_cents);
        let id = debt.id;
        ledger.debts.push(debt);
        ledger.touch();
        tracing::debug!(debt = %id, "created debt");
        Ok(id)
    }

    /// Records a payment against a debt and returns the payment id.
    ///
    /// Builds the mirrored transaction (reserved category, the debt's payee,
    /// a back-link to the payment), applies its account effect, reduces the
    /// debt balance, re-derives the status, and commits payment +
    /// transaction + debt + account delta as one batch.
    pub fn record_payment(
        ledger: &mut Ledger,
        debt_id: Uuid,
        kind: DebtPaymentKind,
        amount_cents: i64,
        account_id: Uuid,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<Uuid> {
        let debt = ledger
            .debt(debt_id)
            .ok_or(LedgerError::DebtNotFound(debt_id))?
            .clone();

        let payment_id = Uuid::new_v4();
        let txn_kind = match kind {
            DebtPaymentKind::Outgoing => TransactionKind::Expense {
                account_id,
                category_id: DEBT_PAYMENTS_CATEGORY,
                saving_goal_id: None,
            },
            DebtPaymentKind::Incoming => TransactionKind::Income {
                account_id,
                category_id: DEBT_COLLECTIONS_CATEGORY,
                saving_goal_id: None,
            },
        };
        let mut mirrored = Transaction::new(txn_kind, amount_cents, date);
        mirrored.payee_id = debt.payee_id;
        mirrored.notes = notes.clone();
        mirrored.debt_payment_id = Some(payment_id);
        let deltas = transaction_effects(&mirrored)?;

        let payment = DebtPayment {
            id: payment_id,
            debt_id,
            kind,
            amount_cents,
            account_id,
            date,
            notes,
            transaction_id: mirrored.id,
        };

        let mut updated = debt;
        updated.current_balance_cents -= amount_cents;
        updated.status =
            DebtStatus::derive(updated.initial_amount_cents, updated.current_balance_cents);

        let mut batch = MutationBatch::new();
        batch
            .add_deltas(deltas)
            .insert_transaction(mirrored)
            .insert_debt_payment(payment)
            .replace_debt(updated);
        batch.commit(ledger)?;
        tracing::debug!(debt = %debt_id, payment = %payment_id, "recorded debt payment");
        Ok(payment_id)
    }

    /// Deletes a payment and its mirrored transaction as a unit, restoring
    /// the debt balance and the account balance they had moved.
    pub fn delete_payment(ledger: &mut Ledger, payment_id: Uuid) -> Result<()> {
        let payment = ledger
            .debt_payment(payment_id)
            .ok_or(LedgerError::DebtPaymentNotFound(payment_id))?
            .clone();
        let debt = ledger
            .debt(payment.debt_id)
            .ok_or(LedgerError::DebtNotFound(payment.debt_id))?
            .clone();
        let mirrored = ledger
            .transaction(payment.transaction_id)
            .ok_or(LedgerError::TransactionNotFound(payment.transaction_id))?
            .clone();

        let mut updated = debt;
        updated.current_balance_cents += payment.amount_cents;
        updated.status =
            DebtStatus::derive(updated.initial_amount_cents, updated.current_balance_cents);

        let mut batch = MutationBatch::new();
        batch
            .add_deltas(reversed(&transaction_effects(&mirrored)?))
            .remove_transaction(mirrored.id)
            .remove_debt_payment(payment.id)
            .replace_debt(updated);
        batch.commit(ledger)?;
        tracing::debug!(payment = %payment_id, "deleted debt payment");
        Ok(())
    }

    /// Applies caller-editable fields to a debt.
    ///
    /// Changing the initial amount is rejected with `InitialAmountLocked`
    /// once any payment exists. Balance and status are always re-derived
    /// from stored values, never taken from the patch.
    pub fn update_debt(ledger: &mut Ledger, id: Uuid, patch: DebtPatch) -> Result<()> {
        let mut updated = ledger
            .debt(id)
            .ok_or(LedgerError::DebtNotFound(id))?
            .clone();

        if let Some(initial) = patch.initial_amount_cents {
            if initial != updated.initial_amount_cents {
                if ledger.debt_payment_count(id) > 0 {
                    return Err(LedgerError::InitialAmountLocked(id));
                }
                if initial < 0 {
                    return Err(LedgerError::NonPositiveAmount(initial));
                }
                updated.initial_amount_cents = initial;
                // No payments exist, so the outstanding balance is the
                // initial amount itself.
                updated.current_balance_cents = initial;
            }
        }
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(kind) = patch.kind {
            updated.kind = kind;
        }
        if let Some(payee_id) = patch.payee_id {
            updated.payee_id = Some(payee_id);
        }
        if let Some(notes) = patch.notes {
            updated.notes = Some(notes);
        }
        updated.status =
            DebtStatus::derive(updated.initial_amount_cents, updated.current_balance_cents);

        let mut batch = MutationBatch::new();
        batch.replace_debt(updated);
        batch.commit(ledger)
    }

    /// Removes a debt that has no recorded payments, returning it.
    pub fn delete_debt(ledger: &mut Ledger, id: Uuid) -> Result<Debt> {
        let index = ledger
            .debts
            .iter()
            .position(|debt| debt.id == id)
            .ok_or(LedgerError::DebtNotFound(id))?;
        if ledger.debt_payment_count(id) > 0 {
            return Err(LedgerError::DebtHasPayments(id));
        }
        let removed = ledger.debts.remove(index);
        ledger.touch();
        tracing::debug!(debt = %id, "deleted debt");
        Ok(removed)
    }

    /// Returns a snapshot of the ledger's debts.
    pub fn list(ledger: &Ledger) -> Vec<&Debt> {
        ledger.debts.iter().collect()
    }
}
