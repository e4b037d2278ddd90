use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Represents a financial account tracked within the ledger.
///
/// `initial_balance_cents` is fixed at creation; `current_balance_cents` is
/// derived and only ever written by the mutation coordinator, so that
/// `current = initial + Σ(signed effect of every live transaction)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub initial_balance_cents: i64,
    pub current_balance_cents: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Account {
    /// Creates a new account whose current balance starts at the initial one.
    pub fn new(name: impl Into<String>, kind: AccountKind, initial_balance_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            initial_balance_cents,
            current_balance_cents: initial_balance_cents,
            icon: None,
            color: None,
        }
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("{} ({:?})", self.name, self.kind)
    }
}

/// Enumerates the supported account classifications. Display-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountKind {
    Bank,
    Cash,
    Savings,
    Card,
    Other,
}
