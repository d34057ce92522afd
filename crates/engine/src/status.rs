use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Lifecycle status shared by budgets, wallets and categories.
///
/// The engine only ever writes `Active` and `Archived`; cascade deletion
/// removes rows outright. `Deleted` exists for callers that soft-hide
/// records before scheduling a real cascade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    #[default]
    Active,
    Archived,
    Deleted,
}

impl EntityStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Deleted => "deleted",
        }
    }
}

impl TryFrom<&str> for EntityStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "deleted" => Ok(Self::Deleted),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid entity status: {other}"
            ))),
        }
    }
}
