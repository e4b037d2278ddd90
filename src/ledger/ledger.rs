use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Account, Category, Debt, DebtPayment, Payee, RecurringTransaction, SavingGoal, Transaction,
};

pub(crate) const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Well-known category backing mirrored outgoing debt payments.
pub const DEBT_PAYMENTS_CATEGORY: Uuid = Uuid::from_u128(0xd0b7_a4f1_3c6e_4b2a_9f01_5e8d_2c4a_7b10);
/// Well-known category backing mirrored incoming debt collections.
pub const DEBT_COLLECTIONS_CATEGORY: Uuid =
    Uuid::from_u128(0xd0b7_a4f1_3c6e_4b2a_9f01_5e8d_2c4a_7b11);

static RESERVED_CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    vec![
        Category::reserved(DEBT_PAYMENTS_CATEGORY, "Debt payments"),
        Category::reserved(DEBT_COLLECTIONS_CATEGORY, "Debt collections"),
    ]
});

/// All records for one user namespace, one instance per logical ledger.
///
/// Derived fields on the contained entities (balances, statuses, next due
/// dates) are written only through the mutation coordinator and the
/// reconcile job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub payees: Vec<Payee>,
    #[serde(default)]
    pub saving_goals: Vec<SavingGoal>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub debt_payments: Vec<DebtPayment>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub recurring_transactions: Vec<RecurringTransaction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            accounts: Vec::new(),
            categories: RESERVED_CATEGORIES.clone(),
            payees: Vec::new(),
            saving_goals: Vec::new(),
            debts: Vec::new(),
            debt_payments: Vec::new(),
            transactions: Vec::new(),
            recurring_transactions: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn add_category(&mut self, category: Category) -> Uuid {
        let id = category.id;
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn add_payee(&mut self, payee: Payee) -> Uuid {
        let id = payee.id;
        self.payees.push(payee);
        self.touch();
        id
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn payee(&self, id: Uuid) -> Option<&Payee> {
        self.payees.iter().find(|payee| payee.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub(crate) fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn goal(&self, id: Uuid) -> Option<&SavingGoal> {
        self.saving_goals.iter().find(|goal| goal.id == id)
    }

    pub(crate) fn goal_mut(&mut self, id: Uuid) -> Option<&mut SavingGoal> {
        self.saving_goals.iter_mut().find(|goal| goal.id == id)
    }

    pub fn debt(&self, id: Uuid) -> Option<&Debt> {
        self.debts.iter().find(|debt| debt.id == id)
    }

    pub(crate) fn debt_mut(&mut self, id: Uuid) -> Option<&mut Debt> {
        self.debts.iter_mut().find(|debt| debt.id == id)
    }

    pub fn debt_payment(&self, id: Uuid) -> Option<&DebtPayment> {
        self.debt_payments.iter().find(|payment| payment.id == id)
    }

    /// Payments recorded against one debt.
    pub fn payments_for_debt(&self, debt_id: Uuid) -> impl Iterator<Item = &DebtPayment> {
        self.debt_payments
            .iter()
            .filter(move |payment| payment.debt_id == debt_id)
    }

    pub fn debt_payment_count(&self, debt_id: Uuid) -> usize {
        self.payments_for_debt(debt_id).count()
    }

    pub fn recurring(&self, id: Uuid) -> Option<&RecurringTransaction> {
        self.recurring_transactions.iter().find(|rec| rec.id == id)
    }

    pub(crate) fn recurring_mut(&mut self, id: Uuid) -> Option<&mut RecurringTransaction> {
        self.recurring_transactions
            .iter_mut()
            .find(|rec| rec.id == id)
    }

    pub(crate) fn remove_recurring(&mut self, id: Uuid) -> Option<RecurringTransaction> {
        let index = self
            .recurring_transactions
            .iter()
            .position(|rec| rec.id == id)?;
        let removed = self.recurring_transactions.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
