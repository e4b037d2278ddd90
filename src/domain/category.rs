use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A transaction category. Categories are a directory maintained by outer
/// layers; the engine only stores them and reserves two of them for debt
/// mirroring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Reserved categories back mirrored debt payments and cannot be removed.
    #[serde(default)]
    pub reserved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            reserved: false,
            icon: None,
            color: None,
        }
    }

    /// Builds a reserved category with a well-known identifier.
    pub fn reserved(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            reserved: true,
            icon: None,
            color: None,
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}
