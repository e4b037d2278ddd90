#![doc(test(attr(deny(warnings))))]

//! Ledger Core records financial movements (expenses, income, transfers,
//! debt repayments) and keeps the denormalized aggregates they feed —
//! account balances, debt balances and statuses, saving-goal progress —
//! correct after every mutation.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
