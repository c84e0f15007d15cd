//! Core domain logic for whygraph: user-owned why-why-analysis and
//! goal-setting diagrams, persisted in SQLite and exported as a nodes/links
//! payload for client-side rendering.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::concern::{Concern, ConcernCategory, ConcernId, UserId};
pub use model::content::{normalize_content, ContentError, CONTENT_MAX_CHARS};
pub use model::node::{NodeDraft, NodeId, NodeRecord, NodeType};
pub use repo::concern_repo::{ConcernRepository, RepoError, RepoResult, SqliteConcernRepository};
pub use repo::node_repo::{NodeRepository, SqliteNodeRepository};
pub use service::concern_service::ConcernService;
pub use service::graph_service::{
    GraphExport, GraphLink, GraphNode, GraphService, ROOT_LOCAL_ID,
};
pub use service::node_service::NodeService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
