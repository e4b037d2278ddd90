use thiserror::Error;
use uuid::Uuid;

/// Error type that captures ledger engine failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Saving goal not found: {0}")]
    GoalNotFound(Uuid),
    #[error("Debt not found: {0}")]
    DebtNotFound(Uuid),
    #[error("Debt payment not found: {0}")]
    DebtPaymentNotFound(Uuid),
    #[error("Recurring transaction not found: {0}")]
    RecurringNotFound(Uuid),
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(i64),
    #[error("Transfer source and destination must be different accounts")]
    InvalidTransfer,
    #[error("Transaction {0} mirrors a debt payment; amend it through the debt service")]
    DebtLinkedEdit(Uuid),
    #[error("Transaction {0} mirrors a debt payment; delete it through the debt service")]
    DebtLinkedDelete(Uuid),
    #[error("Debt {0} has recorded payments; its initial amount is locked")]
    InitialAmountLocked(Uuid),
    #[error("Debt {0} still has recorded payments; delete them first")]
    DebtHasPayments(Uuid),
    #[error("Schedule computation for recurring template exceeded {0} steps")]
    ScheduleOverflow(usize),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
