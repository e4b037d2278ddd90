use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A counterparty referenced by transactions and debts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payee {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Payee {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            notes: None,
        }
    }
}

impl Identifiable for Payee {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Payee {
    fn name(&self) -> &str {
        &self.name
    }
}
