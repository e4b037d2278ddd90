//! Ledger transactions and the tagged variant describing their shape.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A recorded financial movement.
///
/// The amount is always stored positive; its sign against each aggregate is
/// derived from the kind and the account's role in it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub amount_cents: i64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Back-reference to the debt payment that owns this record, when it was
    /// created by the debt mirroring service. Linked records may only be
    /// amended or deleted through that service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_payment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount_cents: i64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount_cents,
            date,
            payee_id: None,
            notes: None,
            debt_payment_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_payee(mut self, payee_id: Uuid) -> Self {
        self.payee_id = Some(payee_id);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// The saving goal this transaction feeds, if any.
    pub fn saving_goal_id(&self) -> Option<Uuid> {
        match self.kind {
            TransactionKind::Expense { saving_goal_id, .. }
            | TransactionKind::Income { saving_goal_id, .. } => saving_goal_id,
            TransactionKind::Transfer { .. } => None,
        }
    }

    /// Clears the saving goal link, used when a goal is removed.
    pub fn detach_saving_goal(&mut self) {
        match &mut self.kind {
            TransactionKind::Expense { saving_goal_id, .. }
            | TransactionKind::Income { saving_goal_id, .. } => *saving_goal_id = None,
            TransactionKind::Transfer { .. } => {}
        }
    }

    pub fn is_debt_linked(&self) -> bool {
        self.debt_payment_id.is_some()
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("txn:{} [{}]", self.id, self.kind)
    }
}

/// Shape of a transaction. Each variant carries exactly the references that
/// are valid for it, so a transfer with a category or an expense with two
/// accounts cannot be represented.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    Expense {
        account_id: Uuid,
        category_id: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        saving_goal_id: Option<Uuid>,
    },
    Income {
        account_id: Uuid,
        category_id: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        saving_goal_id: Option<Uuid>,
    },
    Transfer {
        from_account_id: Uuid,
        to_account_id: Uuid,
    },
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Expense { .. } => "Expense",
            TransactionKind::Income { .. } => "Income",
            TransactionKind::Transfer { .. } => "Transfer",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_with_internal_tag() {
        let txn = Transaction::new(
            TransactionKind::Expense {
                account_id: Uuid::new_v4(),
                category_id: Uuid::new_v4(),
                saving_goal_id: None,
            },
            1_500,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        let json = serde_json::to_value(&txn).expect("serialize transaction");
        assert_eq!(json["type"], "expense");
        assert!(json.get("saving_goal_id").is_none());
        let back: Transaction = serde_json::from_value(json).expect("deserialize transaction");
        assert_eq!(back, txn);
    }

    #[test]
    fn detach_saving_goal_only_touches_goal_linked_kinds() {
        let mut txn = Transaction::new(
            TransactionKind::Income {
                account_id: Uuid::new_v4(),
                category_id: Uuid::new_v4(),
                saving_goal_id: Some(Uuid::new_v4()),
            },
            100,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        txn.detach_saving_goal();
        assert_eq!(txn.saving_goal_id(), None);

        let mut transfer = Transaction::new(
            TransactionKind::Transfer {
                from_account_id: Uuid::new_v4(),
                to_account_id: Uuid::new_v4(),
            },
            100,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        transfer.detach_saving_goal();
        assert_eq!(transfer.saving_goal_id(), None);
    }
}
