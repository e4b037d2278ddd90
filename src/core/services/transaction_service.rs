//! Create, amend, and delete ledger transactions while keeping every
//! aggregate they touch in sync.

use uuid::Uuid;

use crate::core::coordinator::MutationBatch;
use crate::core::effects::{merge, reversed, transaction_effects};
use crate::domain::Transaction;
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

/// Validated operations on ledger transactions.
pub struct TransactionService;

impl TransactionService {
    /// Records a new transaction and applies its effects, returning its id.
    ///
    /// Debt-linked records cannot be created here; the debt service builds
    /// its mirrored transactions itself.
    pub fn create(ledger: &mut Ledger, txn: Transaction) -> Result<Uuid> {
        if txn.is_debt_linked() {
            return Err(LedgerError::DebtLinkedEdit(txn.id));
        }
        let deltas = transaction_effects(&txn)?;
        let id = txn.id;
        let mut batch = MutationBatch::new();
        batch.add_deltas(deltas).insert_transaction(txn);
        batch.commit(ledger)?;
        tracing::debug!(transaction = %id, "created transaction");
        Ok(id)
    }

    /// Replaces the transaction identified by `id` with `updated`.
    ///
    /// The old effects are reverted and the new ones applied as one merged
    /// batch, so each aggregate moves by a single net delta. Identity and
    /// creation stamp are preserved from the stored record.
    pub fn update(ledger: &mut Ledger, id: Uuid, updated: Transaction) -> Result<()> {
        let old = ledger
            .transaction(id)
            .ok_or(LedgerError::TransactionNotFound(id))?
            .clone();
        if old.is_debt_linked() || updated.is_debt_linked() {
            return Err(LedgerError::DebtLinkedEdit(id));
        }
        let mut replacement = updated;
        replacement.id = old.id;
        replacement.created_at = old.created_at;

        let deltas = merge(
            reversed(&transaction_effects(&old)?)
                .into_iter()
                .chain(transaction_effects(&replacement)?),
        );
        let mut batch = MutationBatch::new();
        batch.add_deltas(deltas).replace_transaction(replacement);
        batch.commit(ledger)?;
        tracing::debug!(transaction = %id, "amended transaction");
        Ok(())
    }

    /// Reverts the transaction's effects and removes it, returning the
    /// removed record.
    pub fn delete(ledger: &mut Ledger, id: Uuid) -> Result<Transaction> {
        let old = ledger
            .transaction(id)
            .ok_or(LedgerError::TransactionNotFound(id))?
            .clone();
        if old.is_debt_linked() {
            return Err(LedgerError::DebtLinkedDelete(id));
        }
        let mut batch = MutationBatch::new();
        batch
            .add_deltas(reversed(&transaction_effects(&old)?))
            .remove_transaction(id);
        batch.commit(ledger)?;
        tracing::debug!(transaction = %id, "deleted transaction");
        Ok(old)
    }

    /// Returns a snapshot of the ledger's transactions.
    pub fn list(ledger: &Ledger) -> Vec<&Transaction> {
        ledger.transactions.iter().collect()
    }
}
