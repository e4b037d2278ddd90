pub mod debt_service;
pub mod goal_service;
pub mod reconcile_service;
pub mod recurring_service;
pub mod transaction_service;

pub use debt_service::{DebtPatch, DebtService};
pub use goal_service::{GoalPatch, GoalService};
pub use reconcile_service::{Drift, ReconcileReport, ReconcileService};
pub use recurring_service::{RecurringPatch, RecurringService};
pub use transaction_service::TransactionService;
