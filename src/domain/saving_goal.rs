use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A saving target fed by goal-linked income and expense transactions.
///
/// `current_amount_cents` and `status` are derived; only the mutation
/// coordinator and the reconcile job write them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavingGoal {
    pub id: Uuid,
    pub name: String,
    pub target_amount_cents: i64,
    pub current_amount_cents: i64,
    pub status: GoalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SavingGoal {
    pub fn new(name: impl Into<String>, target_amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_amount_cents,
            current_amount_cents: 0,
            status: GoalStatus::derive(0, target_amount_cents),
            icon: None,
            color: None,
        }
    }
}

impl Identifiable for SavingGoal {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for SavingGoal {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for SavingGoal {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.name, self.status)
    }
}

/// Progress state of a saving goal, derived from its amounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GoalStatus {
    Active,
    Completed,
}

impl GoalStatus {
    /// Completed once the saved amount reaches the target.
    pub fn derive(current_amount_cents: i64, target_amount_cents: i64) -> GoalStatus {
        if current_amount_cents >= target_amount_cents {
            GoalStatus::Completed
        } else {
            GoalStatus::Active
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalStatus::Active => "Active",
            GoalStatus::Completed => "Completed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_flips_exactly_at_the_target() {
        assert_eq!(GoalStatus::derive(999, 1_000), GoalStatus::Active);
        assert_eq!(GoalStatus::derive(1_000, 1_000), GoalStatus::Completed);
        assert_eq!(GoalStatus::derive(1_001, 1_000), GoalStatus::Completed);
    }
}
