//! The mutation coordinator: every multi-entity change is staged into a
//! [`MutationBatch`] and committed against the ledger as one unit.
//!
//! Commit validates the whole batch before the first write, so a rejected
//! operation leaves the ledger exactly as it was. The coordinator (together
//! with the reconcile job) is the only writer of derived fields.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::core::effects::{AggregateRef, Delta};
use crate::domain::{Debt, DebtPayment, GoalStatus, SavingGoal, Transaction};
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

/// Staged aggregate deltas and record writes, applied all-or-nothing.
#[derive(Debug, Default)]
pub struct MutationBatch {
    deltas: BTreeMap<AggregateRef, i64>,
    insert_transactions: Vec<Transaction>,
    replace_transactions: Vec<Transaction>,
    remove_transactions: Vec<Uuid>,
    insert_debt_payments: Vec<DebtPayment>,
    remove_debt_payments: Vec<Uuid>,
    replace_debts: Vec<Debt>,
    replace_goals: Vec<SavingGoal>,
    remove_goals: Vec<Uuid>,
    detach_goal_from_transactions: Vec<Uuid>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages signed deltas, merging per aggregate.
    pub fn add_deltas<I>(&mut self, deltas: I) -> &mut Self
    where
        I: IntoIterator<Item = Delta>,
    {
        for delta in deltas {
            *self.deltas.entry(delta.target).or_insert(0) += delta.amount_cents;
        }
        self
    }

    pub fn insert_transaction(&mut self, txn: Transaction) -> &mut Self {
        self.insert_transactions.push(txn);
        self
    }

    pub fn replace_transaction(&mut self, txn: Transaction) -> &mut Self {
        self.replace_transactions.push(txn);
        self
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> &mut Self {
        self.remove_transactions.push(id);
        self
    }

    pub fn insert_debt_payment(&mut self, payment: DebtPayment) -> &mut Self {
        self.insert_debt_payments.push(payment);
        self
    }

    pub fn remove_debt_payment(&mut self, id: Uuid) -> &mut Self {
        self.remove_debt_payments.push(id);
        self
    }

    pub fn replace_debt(&mut self, debt: Debt) -> &mut Self {
        self.replace_debts.push(debt);
        self
    }

    pub fn replace_goal(&mut self, goal: SavingGoal) -> &mut Self {
        self.replace_goals.push(goal);
        self
    }

    pub fn remove_goal(&mut self, id: Uuid) -> &mut Self {
        self.remove_goals.push(id);
        self
    }

    /// Stages clearing the saving-goal link on a transaction.
    pub fn detach_goal_link(&mut self, transaction_id: Uuid) -> &mut Self {
        self.detach_goal_from_transactions.push(transaction_id);
        self
    }

    /// Applies the whole batch to the ledger, or nothing at all.
    ///
    /// Account delta targets must exist; goal delta targets that do not
    /// resolve are skipped, since the engine validates existence only for
    /// accounts and debts. Goals whose amount moved get their status
    /// re-derived here.
    pub fn commit(self, ledger: &mut Ledger) -> Result<()> {
        self.validate(ledger)?;

        let mut touched_goals: Vec<Uuid> = Vec::new();
        for (target, amount) in &self.deltas {
            match *target {
                AggregateRef::Account(id) => {
                    if let Some(account) = ledger.account_mut(id) {
                        account.current_balance_cents += amount;
                    }
                }
                AggregateRef::Goal(id) => {
                    if let Some(goal) = ledger.goal_mut(id) {
                        goal.current_amount_cents += amount;
                        touched_goals.push(id);
                    }
                }
            }
        }

        for debt in self.replace_debts {
            if let Some(slot) = ledger.debt_mut(debt.id) {
                *slot = debt;
            }
        }
        for goal in self.replace_goals {
            if let Some(slot) = ledger.goal_mut(goal.id) {
                *slot = goal;
            }
        }
        for txn in self.replace_transactions {
            if let Some(slot) = ledger.transaction_mut(txn.id) {
                *slot = txn;
            }
        }
        for id in self.detach_goal_from_transactions {
            if let Some(txn) = ledger.transaction_mut(id) {
                txn.detach_saving_goal();
            }
        }
        for txn in self.insert_transactions {
            ledger.transactions.push(txn);
        }
        for payment in self.insert_debt_payments {
            ledger.debt_payments.push(payment);
        }
        for id in self.remove_transactions {
            ledger.transactions.retain(|txn| txn.id != id);
        }
        for id in self.remove_debt_payments {
            ledger.debt_payments.retain(|payment| payment.id != id);
        }
        for id in self.remove_goals {
            ledger.saving_goals.retain(|goal| goal.id != id);
        }

        for id in touched_goals {
            if let Some(goal) = ledger.goal_mut(id) {
                goal.status =
                    GoalStatus::derive(goal.current_amount_cents, goal.target_amount_cents);
            }
        }

        ledger.touch();
        tracing::debug!(ledger = %ledger.id, "committed mutation batch");
        Ok(())
    }

    fn validate(&self, ledger: &Ledger) -> Result<()> {
        for target in self.deltas.keys() {
            if let AggregateRef::Account(id) = *target {
                if ledger.account(id).is_none() {
                    return Err(LedgerError::AccountNotFound(id));
                }
            }
        }
        for txn in &self.replace_transactions {
            if ledger.transaction(txn.id).is_none() {
                return Err(LedgerError::TransactionNotFound(txn.id));
            }
        }
        for id in &self.remove_transactions {
            if ledger.transaction(*id).is_none() {
                return Err(LedgerError::TransactionNotFound(*id));
            }
        }
        for id in &self.remove_debt_payments {
            if ledger.debt_payment(*id).is_none() {
                return Err(LedgerError::DebtPaymentNotFound(*id));
            }
        }
        for debt in &self.replace_debts {
            if ledger.debt(debt.id).is_none() {
                return Err(LedgerError::DebtNotFound(debt.id));
            }
        }
        for goal in &self.replace_goals {
            if ledger.goal(goal.id).is_none() {
                return Err(LedgerError::GoalNotFound(goal.id));
            }
        }
        for id in &self.remove_goals {
            if ledger.goal(*id).is_none() {
                return Err(LedgerError::GoalNotFound(*id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::effects::{transaction_effects, AggregateRef};
    use crate::domain::{Account, AccountKind, TransactionKind};
    use chrono::NaiveDate;

    fn ledger_with_account(balance: i64) -> (Ledger, Uuid) {
        let mut ledger = Ledger::new("Batch");
        let id = ledger.add_account(Account::new("Checking", AccountKind::Bank, balance));
        (ledger, id)
    }

    #[test]
    fn commit_applies_deltas_and_records_together() {
        let (mut ledger, account_id) = ledger_with_account(100_000);
        let txn = Transaction::new(
            TransactionKind::Expense {
                account_id,
                category_id: Uuid::new_v4(),
                saving_goal_id: None,
            },
            20_000,
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        );
        let mut batch = MutationBatch::new();
        batch
            .add_deltas(transaction_effects(&txn).unwrap())
            .insert_transaction(txn);
        batch.commit(&mut ledger).expect("commit batch");

        assert_eq!(ledger.account(account_id).unwrap().current_balance_cents, 80_000);
        assert_eq!(ledger.transaction_count(), 1);
    }

    #[test]
    fn commit_against_missing_account_changes_nothing() {
        let (mut ledger, account_id) = ledger_with_account(50_000);
        let mut batch = MutationBatch::new();
        batch.add_deltas([
            Delta::new(AggregateRef::Account(account_id), -10_000),
            Delta::new(AggregateRef::Account(Uuid::new_v4()), 10_000),
        ]);
        let txn = Transaction::new(
            TransactionKind::Expense {
                account_id,
                category_id: Uuid::new_v4(),
                saving_goal_id: None,
            },
            10_000,
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        );
        batch.insert_transaction(txn);

        let err = batch.commit(&mut ledger).expect_err("missing account");
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
        assert_eq!(ledger.account(account_id).unwrap().current_balance_cents, 50_000);
        assert_eq!(ledger.transaction_count(), 0);
    }

    #[test]
    fn deltas_on_missing_goals_are_skipped() {
        let (mut ledger, account_id) = ledger_with_account(10_000);
        let mut batch = MutationBatch::new();
        batch.add_deltas([
            Delta::new(AggregateRef::Account(account_id), -1_000),
            Delta::new(AggregateRef::Goal(Uuid::new_v4()), -1_000),
        ]);
        batch.commit(&mut ledger).expect("commit batch");
        assert_eq!(ledger.account(account_id).unwrap().current_balance_cents, 9_000);
    }
}
