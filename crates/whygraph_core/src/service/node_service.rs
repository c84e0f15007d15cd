//! Node use-case service.
//!
//! # Responsibility
//! - Provide the node creation variants the authoring UI exposes: plain
//!   node, root-connected node, "connect to this node" source, and
//!   "add a connection target" target.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Creating a target node and linking it from its source happens in two
//!   repository calls; a failed link leaves the new node in place, matching
//!   the original two-step form flow.

use crate::model::concern::{ConcernId, UserId};
use crate::model::node::{NodeDraft, NodeId, NodeRecord, NodeType};
use crate::repo::node_repo::{NodeRepository, RepoResult};

/// Use-case service wrapper for node CRUD and link operations.
pub struct NodeService<R: NodeRepository> {
    repo: R,
}

impl<R: NodeRepository> NodeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a node from the general form: any combination of root flag
    /// and initial targets.
    pub fn create_node(
        &self,
        owner: UserId,
        concern_id: ConcernId,
        draft: &NodeDraft,
    ) -> RepoResult<NodeId> {
        self.repo.create_node(owner, concern_id, draft)
    }

    /// Creates a node connected directly to the concern's synthetic root.
    pub fn create_root_node(
        &self,
        owner: UserId,
        concern_id: ConcernId,
        content: &str,
        node_type: NodeType,
    ) -> RepoResult<NodeId> {
        let draft = NodeDraft {
            content: content.to_string(),
            node_type,
            to_root: true,
            targets: Vec::new(),
        };
        self.repo.create_node(owner, concern_id, &draft)
    }

    /// Creates a node that points at an existing target node.
    pub fn create_source_node(
        &self,
        owner: UserId,
        concern_id: ConcernId,
        content: &str,
        node_type: NodeType,
        target_id: NodeId,
    ) -> RepoResult<NodeId> {
        let draft = NodeDraft {
            content: content.to_string(),
            node_type,
            to_root: false,
            targets: vec![target_id],
        };
        self.repo.create_node(owner, concern_id, &draft)
    }

    /// Creates a node that an existing source node then points at.
    pub fn create_target_node(
        &self,
        owner: UserId,
        concern_id: ConcernId,
        content: &str,
        node_type: NodeType,
        source_id: NodeId,
    ) -> RepoResult<NodeId> {
        let draft = NodeDraft::new(content, node_type);
        let node_id = self.repo.create_node(owner, concern_id, &draft)?;
        self.repo.add_node_target(owner, source_id, node_id)?;
        Ok(node_id)
    }

    /// Gets one node with its outgoing link set.
    pub fn get_node(&self, owner: UserId, id: NodeId) -> RepoResult<Option<NodeRecord>> {
        self.repo.get_node(owner, id)
    }

    /// Lists a concern's nodes in creation order.
    pub fn list_nodes(&self, owner: UserId, concern_id: ConcernId) -> RepoResult<Vec<NodeRecord>> {
        self.repo.list_nodes(owner, concern_id)
    }

    /// Replaces content, role and root flag of one node.
    pub fn update_node(
        &self,
        owner: UserId,
        id: NodeId,
        content: &str,
        node_type: NodeType,
        to_root: bool,
    ) -> RepoResult<()> {
        self.repo.update_node(owner, id, content, node_type, to_root)
    }

    /// Replaces the whole outgoing link set of one node.
    pub fn set_node_targets(
        &self,
        owner: UserId,
        id: NodeId,
        targets: &[NodeId],
    ) -> RepoResult<()> {
        self.repo.set_node_targets(owner, id, targets)
    }

    /// Deletes one node and every link touching it.
    pub fn delete_node(&self, owner: UserId, id: NodeId) -> RepoResult<()> {
        self.repo.delete_node(owner, id)
    }
}
