//! Saving-goal lifecycle. Goal progress itself moves only through
//! transaction effects; this service manages the records and the
//! detach-on-delete rule.

use uuid::Uuid;

use crate::core::coordinator::MutationBatch;
use crate::domain::{GoalStatus, SavingGoal};
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

/// Caller-editable goal fields; `None` leaves a field unchanged.
#[derive(Debug, Default, Clone)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub target_amount_cents: Option<i64>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Operations on saving goals.
pub struct GoalService;

impl GoalService {
    /// Adds a goal, normalizing its derived fields, and returns its id.
    pub fn create_goal(ledger: &mut Ledger, goal: SavingGoal) -> Result<Uuid> {
        let mut goal = goal;
        goal.current_amount_cents = 0;
        goal.status = GoalStatus::derive(goal.current_amount_cents, goal.target_amount_cents);
        let id = goal.id;
        ledger.saving_goals.push(goal);
        ledger.touch();
        tracing::debug!(goal = %id, "created saving goal");
        Ok(id)
    }

    /// Applies caller-editable fields; status is re-derived, never accepted
    /// from the caller.
    pub fn update_goal(ledger: &mut Ledger, id: Uuid, patch: GoalPatch) -> Result<()> {
        let mut updated = ledger
            .goal(id)
            .ok_or(LedgerError::GoalNotFound(id))?
            .clone();
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(target) = patch.target_amount_cents {
            updated.target_amount_cents = target;
        }
        if let Some(icon) = patch.icon {
            updated.icon = Some(icon);
        }
        if let Some(color) = patch.color {
            updated.color = Some(color);
        }
        updated.status =
            GoalStatus::derive(updated.current_amount_cents, updated.target_amount_cents);

        let mut batch = MutationBatch::new();
        batch.replace_goal(updated);
        batch.commit(ledger)
    }

    /// Removes a goal, detaching it from every referencing transaction.
    ///
    /// The detach is a batched field clear: the transactions stay, no
    /// balance moves.
    pub fn delete_goal(ledger: &mut Ledger, id: Uuid) -> Result<()> {
        ledger.goal(id).ok_or(LedgerError::GoalNotFound(id))?;

        let mut batch = MutationBatch::new();
        for txn in &ledger.transactions {
            if txn.saving_goal_id() == Some(id) {
                batch.detach_goal_link(txn.id);
            }
        }
        batch.remove_goal(id);
        batch.commit(ledger)?;
        tracing::debug!(goal = %id, "deleted saving goal");
        Ok(())
    }

    /// Returns a snapshot of the ledger's saving goals.
    pub fn list(ledger: &Ledger) -> Vec<&SavingGoal> {
        ledger.saving_goals.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::TransactionService;
    use crate::domain::{Account, AccountKind, Transaction, TransactionKind};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()
    }

    fn setup(target: i64) -> (Ledger, Uuid, Uuid) {
        let mut ledger = Ledger::new("Goals");
        let account_id = ledger.add_account(Account::new("Savings", AccountKind::Savings, 0));
        let goal_id =
            GoalService::create_goal(&mut ledger, SavingGoal::new("Vacation", target)).unwrap();
        (ledger, account_id, goal_id)
    }

    fn goal_income(account_id: Uuid, goal_id: Uuid, amount: i64) -> Transaction {
        Transaction::new(
            TransactionKind::Income {
                account_id,
                category_id: Uuid::new_v4(),
                saving_goal_id: Some(goal_id),
            },
            amount,
            date(),
        )
    }

    #[test]
    fn goal_completes_when_linked_income_reaches_the_target() {
        let (mut ledger, account_id, goal_id) = setup(100_000);
        TransactionService::create(&mut ledger, goal_income(account_id, goal_id, 100_000))
            .unwrap();
        let goal = ledger.goal(goal_id).unwrap();
        assert_eq!(goal.current_amount_cents, 100_000);
        assert_eq!(goal.status, GoalStatus::Completed);
    }

    #[test]
    fn deleting_the_funding_transaction_reverts_the_goal() {
        let (mut ledger, account_id, goal_id) = setup(100_000);
        let id = TransactionService::create(&mut ledger, goal_income(account_id, goal_id, 100_000))
            .unwrap();
        TransactionService::delete(&mut ledger, id).unwrap();
        let goal = ledger.goal(goal_id).unwrap();
        assert_eq!(goal.current_amount_cents, 0);
        assert_eq!(goal.status, GoalStatus::Active);
    }

    #[test]
    fn delete_goal_detaches_transactions_without_moving_balances() {
        let (mut ledger, account_id, goal_id) = setup(100_000);
        let txn_id =
            TransactionService::create(&mut ledger, goal_income(account_id, goal_id, 40_000))
                .unwrap();

        GoalService::delete_goal(&mut ledger, goal_id).unwrap();
        assert!(ledger.goal(goal_id).is_none());
        let txn = ledger.transaction(txn_id).unwrap();
        assert_eq!(txn.saving_goal_id(), None);
        assert_eq!(
            ledger.account(account_id).unwrap().current_balance_cents,
            40_000
        );
    }

    #[test]
    fn shrinking_the_target_can_complete_the_goal() {
        let (mut ledger, account_id, goal_id) = setup(100_000);
        TransactionService::create(&mut ledger, goal_income(account_id, goal_id, 60_000)).unwrap();
        GoalService::update_goal(
            &mut ledger,
            goal_id,
            GoalPatch {
                target_amount_cents: Some(50_000),
                ..GoalPatch::default()
            },
        )
        .unwrap();
        assert_eq!(ledger.goal(goal_id).unwrap().status, GoalStatus::Completed);
    }
}
