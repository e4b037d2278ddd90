//! Persistence for ledger snapshots.
//!
//! A ledger is stored as one JSON document per name; saving is a temp-file
//! write followed by a rename, so on-disk state is always either the old or
//! the new snapshot — aggregates and records can never be persisted out of
//! sync with each other.

pub mod json_backend;

pub use json_backend::JsonStorage;

use crate::errors::Result;
use crate::ledger::Ledger;

/// Abstraction over persistence backends capable of storing ledgers and
/// their backups.
pub trait StorageBackend: Send + Sync {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<Ledger>;
    fn list_ledgers(&self) -> Result<Vec<String>>;
    fn delete(&self, name: &str) -> Result<()>;
    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<()>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger>;
}
