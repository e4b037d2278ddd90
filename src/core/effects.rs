//! Signed effect of a transaction on the aggregates it touches.
//!
//! Everything here is pure: the same function computes the deltas for apply
//! and, negated, for revert. Aggregates are always moved by
//! `stored value + delta`; full resummation happens only in the reconcile
//! job.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::domain::{Transaction, TransactionKind};
use crate::errors::{LedgerError, Result};

/// Target of a balance delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AggregateRef {
    Account(Uuid),
    Goal(Uuid),
}

/// A signed movement against one aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub target: AggregateRef,
    pub amount_cents: i64,
}

impl Delta {
    pub fn new(target: AggregateRef, amount_cents: i64) -> Self {
        Self {
            target,
            amount_cents,
        }
    }

    pub fn negated(self) -> Self {
        Self {
            target: self.target,
            amount_cents: -self.amount_cents,
        }
    }
}

/// Computes the signed deltas a transaction applies to accounts and goals.
///
/// Expenses subtract from their account (and linked goal), income adds,
/// transfers move the amount between two distinct accounts. Validation
/// happens here, before any write: non-positive amounts and same-account
/// transfers are rejected.
pub fn transaction_effects(txn: &Transaction) -> Result<Vec<Delta>> {
    if txn.amount_cents <= 0 {
        return Err(LedgerError::NonPositiveAmount(txn.amount_cents));
    }
    let amount = txn.amount_cents;
    let mut deltas = Vec::with_capacity(2);
    match txn.kind {
        TransactionKind::Expense {
            account_id,
            saving_goal_id,
            ..
        } => {
            deltas.push(Delta::new(AggregateRef::Account(account_id), -amount));
            if let Some(goal_id) = saving_goal_id {
                deltas.push(Delta::new(AggregateRef::Goal(goal_id), -amount));
            }
        }
        TransactionKind::Income {
            account_id,
            saving_goal_id,
            ..
        } => {
            deltas.push(Delta::new(AggregateRef::Account(account_id), amount));
            if let Some(goal_id) = saving_goal_id {
                deltas.push(Delta::new(AggregateRef::Goal(goal_id), amount));
            }
        }
        TransactionKind::Transfer {
            from_account_id,
            to_account_id,
        } => {
            if from_account_id == to_account_id {
                return Err(LedgerError::InvalidTransfer);
            }
            deltas.push(Delta::new(AggregateRef::Account(from_account_id), -amount));
            deltas.push(Delta::new(AggregateRef::Account(to_account_id), amount));
        }
    }
    Ok(deltas)
}

/// Negates a set of deltas, used to revert a transaction's effect.
pub fn reversed(deltas: &[Delta]) -> Vec<Delta> {
    deltas.iter().map(|delta| delta.negated()).collect()
}

/// Sums deltas per target, dropping entries that cancel out.
///
/// Reverting an old version and applying a new one lands on each aggregate
/// as a single net movement, so no transient inconsistent state is ever
/// written.
pub fn merge<I>(deltas: I) -> Vec<Delta>
where
    I: IntoIterator<Item = Delta>,
{
    let mut merged: BTreeMap<AggregateRef, i64> = BTreeMap::new();
    for delta in deltas {
        *merged.entry(delta.target).or_insert(0) += delta.amount_cents;
    }
    merged
        .into_iter()
        .filter(|(_, amount)| *amount != 0)
        .map(|(target, amount)| Delta::new(target, amount))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn expense(account_id: Uuid, goal: Option<Uuid>, amount: i64) -> Transaction {
        Transaction::new(
            TransactionKind::Expense {
                account_id,
                category_id: Uuid::new_v4(),
                saving_goal_id: goal,
            },
            amount,
            date(),
        )
    }

    #[test]
    fn expense_subtracts_from_account_and_goal() {
        let account = Uuid::new_v4();
        let goal = Uuid::new_v4();
        let deltas = transaction_effects(&expense(account, Some(goal), 250)).unwrap();
        assert_eq!(
            deltas,
            vec![
                Delta::new(AggregateRef::Account(account), -250),
                Delta::new(AggregateRef::Goal(goal), -250),
            ]
        );
    }

    #[test]
    fn income_adds_to_account_and_goal() {
        let account = Uuid::new_v4();
        let goal = Uuid::new_v4();
        let txn = Transaction::new(
            TransactionKind::Income {
                account_id: account,
                category_id: Uuid::new_v4(),
                saving_goal_id: Some(goal),
            },
            1_000,
            date(),
        );
        let deltas = transaction_effects(&txn).unwrap();
        assert_eq!(
            deltas,
            vec![
                Delta::new(AggregateRef::Account(account), 1_000),
                Delta::new(AggregateRef::Goal(goal), 1_000),
            ]
        );
    }

    #[test]
    fn transfer_moves_between_distinct_accounts() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let txn = Transaction::new(
            TransactionKind::Transfer {
                from_account_id: from,
                to_account_id: to,
            },
            100,
            date(),
        );
        let deltas = transaction_effects(&txn).unwrap();
        assert!(deltas.contains(&Delta::new(AggregateRef::Account(from), -100)));
        assert!(deltas.contains(&Delta::new(AggregateRef::Account(to), 100)));
    }

    #[test]
    fn same_account_transfer_is_rejected() {
        let account = Uuid::new_v4();
        let txn = Transaction::new(
            TransactionKind::Transfer {
                from_account_id: account,
                to_account_id: account,
            },
            100,
            date(),
        );
        assert!(matches!(
            transaction_effects(&txn),
            Err(LedgerError::InvalidTransfer)
        ));
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let txn = expense(Uuid::new_v4(), None, 0);
        assert!(matches!(
            transaction_effects(&txn),
            Err(LedgerError::NonPositiveAmount(0))
        ));
    }

    #[test]
    fn reverted_then_reapplied_deltas_cancel() {
        let txn = expense(Uuid::new_v4(), Some(Uuid::new_v4()), 300);
        let apply = transaction_effects(&txn).unwrap();
        let combined = merge(reversed(&apply).into_iter().chain(apply.clone()));
        assert!(combined.is_empty());
    }

    #[test]
    fn merge_sums_per_target() {
        let account = Uuid::new_v4();
        let old = expense(account, None, 200);
        let new = expense(account, None, 300);
        let combined = merge(
            reversed(&transaction_effects(&old).unwrap())
                .into_iter()
                .chain(transaction_effects(&new).unwrap()),
        );
        assert_eq!(
            combined,
            vec![Delta::new(AggregateRef::Account(account), -100)]
        );
    }
}
