//! Pure entity types for the ledger engine. No I/O, no storage.

pub mod account;
pub mod category;
pub mod common;
pub mod debt;
pub mod payee;
pub mod recurring;
pub mod saving_goal;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use category::Category;
pub use common::{Displayable, Identifiable, NamedEntity};
pub use debt::{Debt, DebtKind, DebtPayment, DebtPaymentKind, DebtStatus};
pub use payee::Payee;
pub use recurring::{Frequency, RecurringTransaction, TransactionTemplate};
pub use saving_goal::{GoalStatus, SavingGoal};
pub use transaction::{Transaction, TransactionKind};
