//! Diagram export use-case.
//!
//! # Responsibility
//! - Turn one concern and its nodes into the nodes/links payload consumed by
//!   the force-layout renderer.
//!
//! # Invariants
//! - The synthetic root is always first, always local id 0.
//! - Local ids are assigned by creation-order rank and are reproducible
//!   across calls absent intervening writes.
//! - Every emitted link references local ids present in the node list.

use crate::model::concern::{ConcernId, UserId};
use crate::model::node::NodeId;
use crate::repo::concern_repo::ConcernRepository;
use crate::repo::node_repo::{NodeRepository, RepoError, RepoResult};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;

/// Local id of the synthetic root inside an export payload. Also used as the
/// `node_type` of the root and of every to-root link.
pub const ROOT_LOCAL_ID: i64 = 0;

/// One node descriptor in the export payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Diagram-local id: 0 for the root, creation-order rank + 1 otherwise.
    pub id: i64,
    pub content: String,
    pub is_root: bool,
    /// Role code of the node; 0 for the root.
    pub node_type: i64,
    /// Native storage id. Absent (not null) on the root descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nid: Option<NodeId>,
}

/// One directed link descriptor in the export payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    /// Local id of the link's source node.
    pub source: i64,
    /// Local id of the link's target; 0 for to-root links.
    pub target: i64,
    /// Role code copied from the source node; 0 for to-root links.
    pub node_type: i64,
}

/// Full export payload for one concern diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Use-case service producing diagram exports.
pub struct GraphService<C: ConcernRepository, N: NodeRepository> {
    concerns: C,
    nodes: N,
}

impl<C: ConcernRepository, N: NodeRepository> GraphService<C, N> {
    /// Creates a service using the provided repository implementations.
    pub fn new(concerns: C, nodes: N) -> Self {
        Self { concerns, nodes }
    }

    /// Exports the full diagram of one concern.
    ///
    /// # Contract
    /// - Fails with `ConcernNotFound` when the concern is missing or owned by
    ///   someone else; no partial payload is ever returned.
    /// - The payload holds exactly N+1 node descriptors for N stored nodes.
    /// - Per node, a to-root link is emitted before its node-to-node links.
    pub fn export(&self, owner: UserId, concern_id: ConcernId) -> RepoResult<GraphExport> {
        let concern = self
            .concerns
            .get_concern(owner, concern_id)?
            .ok_or(RepoError::ConcernNotFound(concern_id))?;
        let records = self.nodes.list_nodes(owner, concern_id)?;

        // Creation-order rank + 1, root takes 0.
        let local_ids: BTreeMap<NodeId, i64> = records
            .iter()
            .enumerate()
            .map(|(rank, record)| (record.id, rank as i64 + 1))
            .collect();

        let mut nodes = Vec::with_capacity(records.len() + 1);
        nodes.push(GraphNode {
            id: ROOT_LOCAL_ID,
            content: concern.content,
            is_root: true,
            node_type: 0,
            nid: None,
        });
        for record in &records {
            nodes.push(GraphNode {
                id: local_ids[&record.id],
                content: record.content.clone(),
                is_root: false,
                node_type: record.node_type.code(),
                nid: Some(record.id),
            });
        }

        let mut links = Vec::new();
        for record in &records {
            let source = local_ids[&record.id];
            if record.to_root {
                links.push(GraphLink {
                    source,
                    target: ROOT_LOCAL_ID,
                    node_type: 0,
                });
            }
            for target_id in &record.targets {
                let target = *local_ids.get(target_id).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "link target {target_id} is not part of concern {concern_id}"
                    ))
                })?;
                links.push(GraphLink {
                    source,
                    target,
                    node_type: record.node_type.code(),
                });
            }
        }

        info!(
            "event=graph_export module=service status=ok concern_id={} nodes={} links={}",
            concern_id,
            nodes.len(),
            links.len()
        );

        Ok(GraphExport { nodes, links })
    }
}
