//! Concern domain model.
//!
//! # Responsibility
//! - Define the top-level diagram record a user owns.
//! - Map the analysis/goal-setting category to its storage form.
//!
//! # Invariants
//! - `content` is trimmed, non-blank and at most 40 chars when persisted.
//! - Deleting a concern removes all of its nodes and their links.

use serde::{Deserialize, Serialize};

/// Opaque caller identity. Authentication happens outside this crate; every
/// operation only receives the already-resolved owner id.
pub type UserId = i64;

/// Stable storage identifier of a concern row.
pub type ConcernId = i64;

/// Diagram kind. Decides how node roles are labelled, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernCategory {
    /// Why-why analysis: trace a problem back to its causes.
    Analysis,
    /// Goal setting: break a goal down into measures and actions.
    GoalSetting,
}

impl ConcernCategory {
    /// Storage form of the category.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::GoalSetting => "goal_setting",
        }
    }

    /// Parses the storage form back. `None` for unknown values.
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "analysis" => Some(Self::Analysis),
            "goal_setting" => Some(Self::GoalSetting),
            _ => None,
        }
    }
}

/// A user's top-level analysis or goal-setting topic. Acts as the synthetic
/// root of its diagram when exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concern {
    pub id: ConcernId,
    pub owner_id: UserId,
    pub content: String,
    pub category: ConcernCategory,
    /// Epoch milliseconds, set on insert.
    pub created_at: i64,
    /// Epoch milliseconds, bumped on every update.
    pub updated_at: i64,
}
