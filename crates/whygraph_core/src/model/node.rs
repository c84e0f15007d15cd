//! Node domain model.
//!
//! # Responsibility
//! - Define the diagram node record and its category-dependent role codes.
//!
//! # Invariants
//! - `node_type` codes are 1..=4; code 0 is reserved for the synthetic root
//!   in graph exports and never stored on a node.
//! - A node may have `to_root = true` and node-to-node links at the same time.

use crate::model::concern::{ConcernCategory, ConcernId};
use serde::{Deserialize, Serialize};

/// Stable storage identifier of a node row.
pub type NodeId = i64;

/// Role of a node within its diagram. The code is fixed; what the role means
/// to the user depends on the owning concern's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Analysis: a "why" statement. Goal setting: the goal itself.
    Statement,
    /// Analysis: an identified cause. Goal setting: a measurable outcome.
    Factor,
    /// Analysis: a countermeasure. Goal setting: a concrete action.
    Action,
    /// Free-form remark in either category.
    Memo,
}

impl NodeType {
    /// Integer code used in storage and in the export payload.
    pub fn code(self) -> i64 {
        match self {
            Self::Statement => 1,
            Self::Factor => 2,
            Self::Action => 3,
            Self::Memo => 4,
        }
    }

    /// Parses a stored code. `None` for anything outside 1..=4.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Statement),
            2 => Some(Self::Factor),
            3 => Some(Self::Action),
            4 => Some(Self::Memo),
            _ => None,
        }
    }

    /// User-facing label, dependent on the owning concern's category.
    pub fn label(self, category: ConcernCategory) -> &'static str {
        match (category, self) {
            (ConcernCategory::Analysis, Self::Statement) => "why",
            (ConcernCategory::Analysis, Self::Factor) => "cause",
            (ConcernCategory::Analysis, Self::Action) => "countermeasure",
            (ConcernCategory::GoalSetting, Self::Statement) => "goal",
            (ConcernCategory::GoalSetting, Self::Factor) => "measure",
            (ConcernCategory::GoalSetting, Self::Action) => "action",
            (_, Self::Memo) => "memo",
        }
    }
}

/// Diagram node read model. Carries the outgoing link set so one fetch is
/// enough to render or export the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub concern_id: ConcernId,
    pub content: String,
    pub node_type: NodeType,
    /// Node connects directly to the concern's synthetic root.
    pub to_root: bool,
    /// Outgoing node-to-node links, target ids ascending.
    pub targets: Vec<NodeId>,
    /// Epoch milliseconds, set on insert.
    pub created_at: i64,
    /// Epoch milliseconds, bumped on every update.
    pub updated_at: i64,
}

/// Field values for creating a node. Links to targets are established in the
/// same transaction as the insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDraft {
    pub content: String,
    pub node_type: NodeType,
    pub to_root: bool,
    pub targets: Vec<NodeId>,
}

impl NodeDraft {
    /// Draft with no root connection and no targets.
    pub fn new(content: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            content: content.into(),
            node_type,
            to_root: false,
            targets: Vec::new(),
        }
    }
}
