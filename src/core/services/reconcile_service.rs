//! Offline drift detection and repair.
//!
//! The hot path moves aggregates incrementally; this job is the safety net
//! that replays every transaction and debt payment to recompute each
//! aggregate from scratch, reports where the stored values diverge, and can
//! write the recomputed values back.

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crate::core::effects::{transaction_effects, AggregateRef};
use crate::domain::{DebtStatus, GoalStatus};
use crate::errors::Result;
use crate::ledger::Ledger;

/// One divergence between a stored aggregate and its full-replay value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    AccountBalance {
        account_id: Uuid,
        stored_cents: i64,
        recomputed_cents: i64,
    },
    DebtBalance {
        debt_id: Uuid,
        stored_cents: i64,
        recomputed_cents: i64,
    },
    DebtStatus {
        debt_id: Uuid,
        stored: DebtStatus,
        recomputed: DebtStatus,
    },
    GoalAmount {
        goal_id: Uuid,
        stored_cents: i64,
        recomputed_cents: i64,
    },
    GoalStatus {
        goal_id: Uuid,
        stored: GoalStatus,
        recomputed: GoalStatus,
    },
}

/// Outcome of an audit or repair pass.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub drifts: Vec<Drift>,
    /// Referential anomalies the replay cannot repair (dangling references,
    /// broken mirror pairs).
    pub warnings: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.drifts.is_empty() && self.warnings.is_empty()
    }
}

/// Full-replay reconciliation over one ledger.
pub struct ReconcileService;

impl ReconcileService {
    /// Recomputes every aggregate by replay and reports divergences without
    /// writing anything.
    pub fn audit(ledger: &Ledger) -> Result<ReconcileReport> {
        let (replay, mut report) = replay_aggregates(ledger);

        for account in &ledger.accounts {
            let recomputed = account.initial_balance_cents
                + replay
                    .get(&AggregateRef::Account(account.id))
                    .copied()
                    .unwrap_or(0);
            if recomputed != account.current_balance_cents {
                report.drifts.push(Drift::AccountBalance {
                    account_id: account.id,
                    stored_cents: account.current_balance_cents,
                    recomputed_cents: recomputed,
                });
            }
        }

        for goal in &ledger.saving_goals {
            let recomputed = replay
                .get(&AggregateRef::Goal(goal.id))
                .copied()
                .unwrap_or(0);
            if recomputed != goal.current_amount_cents {
                report.drifts.push(Drift::GoalAmount {
                    goal_id: goal.id,
                    stored_cents: goal.current_amount_cents,
                    recomputed_cents: recomputed,
                });
            }
            let status = GoalStatus::derive(recomputed, goal.target_amount_cents);
            if status != goal.status {
                report.drifts.push(Drift::GoalStatus {
                    goal_id: goal.id,
                    stored: goal.status,
                    recomputed: status,
                });
            }
        }

        for debt in &ledger.debts {
            let paid: i64 = ledger
                .payments_for_debt(debt.id)
                .map(|payment| payment.amount_cents)
                .sum();
            let recomputed = debt.initial_amount_cents - paid;
            if recomputed != debt.current_balance_cents {
                report.drifts.push(Drift::DebtBalance {
                    debt_id: debt.id,
                    stored_cents: debt.current_balance_cents,
                    recomputed_cents: recomputed,
                });
            }
            let status = DebtStatus::derive(debt.initial_amount_cents, recomputed);
            if status != debt.status {
                report.drifts.push(Drift::DebtStatus {
                    debt_id: debt.id,
                    stored: debt.status,
                    recomputed: status,
                });
            }
        }

        Ok(report)
    }

    /// Audits and then writes every recomputed value back, returning what
    /// was repaired.
    pub fn repair(ledger: &mut Ledger) -> Result<ReconcileReport> {
        let report = Self::audit(ledger)?;
        for drift in &report.drifts {
            match *drift {
                Drift::AccountBalance {
                    account_id,
                    recomputed_cents,
                    ..
                } => {
                    if let Some(account) = ledger.account_mut(account_id) {
                        account.current_balance_cents = recomputed_cents;
                    }
                }
                Drift::DebtBalance {
                    debt_id,
                    recomputed_cents,
                    ..
                } => {
                    if let Some(debt) = ledger.debt_mut(debt_id) {
                        debt.current_balance_cents = recomputed_cents;
                    }
                }
                Drift::DebtStatus {
                    debt_id, recomputed, ..
                } => {
                    if let Some(debt) = ledger.debt_mut(debt_id) {
                        debt.status = recomputed;
                    }
                }
                Drift::GoalAmount {
                    goal_id,
                    recomputed_cents,
                    ..
                } => {
                    if let Some(goal) = ledger.goal_mut(goal_id) {
                        goal.current_amount_cents = recomputed_cents;
                    }
                }
                Drift::GoalStatus {
                    goal_id, recomputed, ..
                } => {
                    if let Some(goal) = ledger.goal_mut(goal_id) {
                        goal.status = recomputed;
                    }
                }
            }
        }
        if !report.drifts.is_empty() {
            ledger.touch();
            tracing::info!(repaired = report.drifts.len(), "repaired aggregate drift");
        }
        Ok(report)
    }
}

/// Replays every transaction into per-aggregate sums and collects
/// referential warnings along the way.
fn replay_aggregates(ledger: &Ledger) -> (BTreeMap<AggregateRef, i64>, ReconcileReport) {
    let mut sums: BTreeMap<AggregateRef, i64> = BTreeMap::new();
    let mut report = ReconcileReport::default();
    let account_ids: HashSet<Uuid> = ledger.accounts.iter().map(|account| account.id).collect();

    for txn in &ledger.transactions {
        match transaction_effects(txn) {
            Ok(deltas) => {
                for delta in deltas {
                    if let AggregateRef::Account(id) = delta.target {
                        if !account_ids.contains(&id) {
                            report.warnings.push(format!(
                                "transaction {} references unknown account {}",
                                txn.id, id
                            ));
                            continue;
                        }
                    }
                    *sums.entry(delta.target).or_insert(0) += delta.amount_cents;
                }
            }
            Err(err) => {
                report
                    .warnings
                    .push(format!("transaction {} has an invalid shape: {}", txn.id, err));
            }
        }
    }

    for payment in &ledger.debt_payments {
        if ledger.debt(payment.debt_id).is_none() {
            report.warnings.push(format!(
                "debt payment {} references unknown debt {}",
                payment.id, payment.debt_id
            ));
        }
        match ledger.transaction(payment.transaction_id) {
            None => report.warnings.push(format!(
                "debt payment {} has no mirrored transaction {}",
                payment.id, payment.transaction_id
            )),
            Some(txn) if txn.debt_payment_id != Some(payment.id) => {
                report.warnings.push(format!(
                    "debt payment {} and transaction {} do not point at each other",
                    payment.id, txn.id
                ));
            }
            Some(_) => {}
        }
    }
    for txn in &ledger.transactions {
        if let Some(payment_id) = txn.debt_payment_id {
            match ledger.debt_payment(payment_id) {
                None => report.warnings.push(format!(
                    "transaction {} points at missing debt payment {}",
                    txn.id, payment_id
                )),
                Some(payment) if payment.transaction_id != txn.id => {
                    report.warnings.push(format!(
                        "transaction {} and debt payment {} do not point at each other",
                        txn.id, payment_id
                    ));
                }
                Some(_) => {}
            }
        }
    }

    (sums, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::{DebtService, TransactionService};
    use crate::domain::{Account, AccountKind, Debt, DebtKind, DebtPaymentKind, Transaction, TransactionKind};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    fn populated_ledger() -> (Ledger, Uuid) {
        let mut ledger = Ledger::new("Reconcile");
        let account_id = ledger.add_account(Account::new("Checking", AccountKind::Bank, 100_000));
        let txn = Transaction::new(
            TransactionKind::Expense {
                account_id,
                category_id: Uuid::new_v4(),
                saving_goal_id: None,
            },
            25_000,
            date(),
        );
        TransactionService::create(&mut ledger, txn).unwrap();
        let debt_id =
            DebtService::create_debt(&mut ledger, Debt::new("Loan", DebtKind::OwedByMe, 50_000))
                .unwrap();
        DebtService::record_payment(
            &mut ledger,
            debt_id,
            DebtPaymentKind::Outgoing,
            10_000,
            account_id,
            date(),
            None,
        )
        .unwrap();
        (ledger, account_id)
    }

    #[test]
    fn a_consistent_ledger_audits_clean() {
        let (ledger, _) = populated_ledger();
        let report = ReconcileService::audit(&ledger).unwrap();
        assert!(report.is_clean(), "unexpected report: {report:?}");
    }

    #[test]
    fn artificial_drift_is_detected_and_repaired() {
        let (mut ledger, account_id) = populated_ledger();
        ledger.account_mut(account_id).unwrap().current_balance_cents += 7;

        let report = ReconcileService::audit(&ledger).unwrap();
        assert_eq!(report.drifts.len(), 1);
        assert!(matches!(
            report.drifts[0],
            Drift::AccountBalance {
                stored_cents,
                recomputed_cents,
                ..
            } if stored_cents == recomputed_cents + 7
        ));

        ReconcileService::repair(&mut ledger).unwrap();
        let after = ReconcileService::audit(&ledger).unwrap();
        assert!(after.is_clean());
    }

    #[test]
    fn broken_mirror_pairs_are_reported() {
        let (mut ledger, _) = populated_ledger();
        // Sever the pair from the transaction side.
        let payment_txn_id = ledger.debt_payments[0].transaction_id;
        ledger
            .transaction_mut(payment_txn_id)
            .unwrap()
            .debt_payment_id = None;

        let report = ReconcileService::audit(&ledger).unwrap();
        assert!(
            report
                .warnings
                .iter()
                .any(|warning| warning.contains("do not point at each other")),
            "unexpected warnings: {:?}",
            report.warnings
        );
    }
}
