//! Debts and the payments recorded against them.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Money owed to or by the ledger owner.
///
/// `current_balance_cents` and `status` are derived:
/// `current = initial − Σ(payment amounts)`, and status follows
/// [`DebtStatus::derive`]. Both are written only by the debt service and the
/// reconcile job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Debt {
    pub id: Uuid,
    pub name: String,
    pub kind: DebtKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_id: Option<Uuid>,
    /// Mutable only while the debt has no recorded payments.
    pub initial_amount_cents: i64,
    pub current_balance_cents: i64,
    pub status: DebtStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Debt {
    pub fn new(name: impl Into<String>, kind: DebtKind, initial_amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            payee_id: None,
            initial_amount_cents,
            current_balance_cents: initial_amount_cents,
            status: DebtStatus::derive(initial_amount_cents, initial_amount_cents),
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_payee(mut self, payee_id: Uuid) -> Self {
        self.payee_id = Some(payee_id);
        self
    }
}

impl Identifiable for Debt {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Debt {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Debt {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.name, self.status)
    }
}

/// Direction of a debt relative to the ledger owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DebtKind {
    OwedByMe,
    OwedToMe,
}

/// Repayment state of a debt, always derived from its amounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DebtStatus {
    Pending,
    Partial,
    Paid,
}

impl DebtStatus {
    /// Single source of truth for debt status.
    ///
    /// A zero initial amount always reads as paid; otherwise a balance at or
    /// below zero is paid, a balance at or above the initial amount is
    /// pending, anything in between is partial.
    pub fn derive(initial_amount_cents: i64, current_balance_cents: i64) -> DebtStatus {
        if initial_amount_cents == 0 || current_balance_cents <= 0 {
            DebtStatus::Paid
        } else if current_balance_cents >= initial_amount_cents {
            DebtStatus::Pending
        } else {
            DebtStatus::Partial
        }
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DebtStatus::Pending => "Pending",
            DebtStatus::Partial => "Partial",
            DebtStatus::Paid => "Paid",
        };
        f.write_str(label)
    }
}

/// A payment recorded against a debt, always paired 1:1 with the mirrored
/// ledger [`Transaction`](crate::domain::Transaction) identified by
/// `transaction_id`. The pair is created and destroyed as a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebtPayment {
    pub id: Uuid,
    pub debt_id: Uuid,
    pub kind: DebtPaymentKind,
    pub amount_cents: i64,
    pub account_id: Uuid,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub transaction_id: Uuid,
}

impl Identifiable for DebtPayment {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Cash direction of a debt payment: money handed out or received.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DebtPaymentKind {
    Outgoing,
    Incoming,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_a_pure_function_of_the_amounts() {
        assert_eq!(DebtStatus::derive(1_000, 1_000), DebtStatus::Pending);
        assert_eq!(DebtStatus::derive(1_000, 600), DebtStatus::Partial);
        assert_eq!(DebtStatus::derive(1_000, 0), DebtStatus::Paid);
        assert_eq!(DebtStatus::derive(1_000, -50), DebtStatus::Paid);
        // Overpaid start reads as pending until payments bring it down.
        assert_eq!(DebtStatus::derive(1_000, 1_500), DebtStatus::Pending);
    }

    #[test]
    fn zero_initial_amount_is_always_paid() {
        assert_eq!(DebtStatus::derive(0, 0), DebtStatus::Paid);
        assert_eq!(DebtStatus::derive(0, 100), DebtStatus::Paid);
    }

    #[test]
    fn new_debt_derives_pending_status() {
        let debt = Debt::new("Car loan", DebtKind::OwedByMe, 50_000);
        assert_eq!(debt.current_balance_cents, 50_000);
        assert_eq!(debt.status, DebtStatus::Pending);
    }
}
