//! The ledger aggregate root: durable records for one user namespace.

#[allow(clippy::module_inception)]
pub mod ledger;

pub use ledger::{Ledger, DEBT_COLLECTIONS_CATEGORY, DEBT_PAYMENTS_CATEGORY};
