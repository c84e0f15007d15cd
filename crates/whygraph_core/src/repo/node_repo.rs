//! Node repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped persistence APIs for diagram nodes.
//! - Own link-set replacement logic (`set_node_targets`) with atomic
//!   semantics.
//!
//! # Invariants
//! - Ownership always resolves through the owning concern; nodes carry no
//!   owner column of their own.
//! - Link writes verify that both endpoints belong to the same concern and
//!   roll back entirely when any endpoint fails the check.
//! - Node listing is deterministic: `created_at ASC, id ASC`.

use crate::model::concern::{ConcernId, UserId};
use crate::model::content::normalize_content;
use crate::model::node::{NodeDraft, NodeId, NodeRecord, NodeType};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::{BTreeMap, BTreeSet};

pub use crate::repo::concern_repo::{RepoError, RepoResult};
use crate::repo::concern_repo::ensure_connection_ready;

const NODE_SELECT_SQL: &str = "SELECT
    n.id AS id,
    n.concern_id AS concern_id,
    n.content AS content,
    n.node_type AS node_type,
    n.to_root AS to_root,
    n.created_at AS created_at,
    n.updated_at AS updated_at
FROM nodes n
JOIN concerns c ON c.id = n.concern_id";

/// Repository interface for node CRUD and link operations.
pub trait NodeRepository {
    /// Creates one node under a concern, links included, in one transaction.
    fn create_node(
        &self,
        owner: UserId,
        concern_id: ConcernId,
        draft: &NodeDraft,
    ) -> RepoResult<NodeId>;
    /// Loads one node with its outgoing link set.
    fn get_node(&self, owner: UserId, id: NodeId) -> RepoResult<Option<NodeRecord>>;
    /// Lists a concern's nodes in creation order with their link sets.
    fn list_nodes(&self, owner: UserId, concern_id: ConcernId) -> RepoResult<Vec<NodeRecord>>;
    /// Replaces content, role and root flag of one node.
    fn update_node(
        &self,
        owner: UserId,
        id: NodeId,
        content: &str,
        node_type: NodeType,
        to_root: bool,
    ) -> RepoResult<()>;
    /// Replaces the whole outgoing link set of one node in one transaction.
    fn set_node_targets(&self, owner: UserId, id: NodeId, targets: &[NodeId]) -> RepoResult<()>;
    /// Adds one outgoing link; adding an existing link is a no-op.
    fn add_node_target(
        &self,
        owner: UserId,
        source_id: NodeId,
        target_id: NodeId,
    ) -> RepoResult<()>;
    /// Deletes one node and every link touching it.
    fn delete_node(&self, owner: UserId, id: NodeId) -> RepoResult<()>;
}

/// SQLite-backed node repository.
pub struct SqliteNodeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNodeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NodeRepository for SqliteNodeRepository<'_> {
    fn create_node(
        &self,
        owner: UserId,
        concern_id: ConcernId,
        draft: &NodeDraft,
    ) -> RepoResult<NodeId> {
        let content = normalize_content(&draft.content)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_owned_concern(&tx, owner, concern_id)?;

        tx.execute(
            "INSERT INTO nodes (concern_id, content, node_type, to_root)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                concern_id,
                content,
                draft.node_type.code(),
                bool_to_int(draft.to_root),
            ],
        )?;
        let node_id = tx.last_insert_rowid();

        for target_id in dedup_targets(&draft.targets) {
            insert_link_checked(&tx, owner, concern_id, node_id, target_id)?;
        }

        tx.commit()?;
        Ok(node_id)
    }

    fn get_node(&self, owner: UserId, id: NodeId) -> RepoResult<Option<NodeRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NODE_SELECT_SQL}
             WHERE n.id = ?1
               AND c.owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id, owner])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut node = parse_node_row(row)?;
        node.targets = load_targets(self.conn, id)?;
        Ok(Some(node))
    }

    fn list_nodes(&self, owner: UserId, concern_id: ConcernId) -> RepoResult<Vec<NodeRecord>> {
        // One deferred transaction so nodes and links come from a single
        // consistent read.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        ensure_owned_concern(&tx, owner, concern_id)?;

        let mut nodes = Vec::new();
        {
            let mut stmt = tx.prepare(&format!(
                "{NODE_SELECT_SQL}
                 WHERE n.concern_id = ?1
                   AND c.owner_id = ?2
                 ORDER BY n.created_at ASC, n.id ASC;"
            ))?;
            let mut rows = stmt.query(params![concern_id, owner])?;
            while let Some(row) = rows.next()? {
                nodes.push(parse_node_row(row)?);
            }

            let mut targets_by_source: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
            let mut link_stmt = tx.prepare(
                "SELECT l.source_id, l.target_id
                 FROM node_links l
                 JOIN nodes n ON n.id = l.source_id
                 WHERE n.concern_id = ?1
                 ORDER BY l.source_id ASC, l.target_id ASC;",
            )?;
            let mut link_rows = link_stmt.query(params![concern_id])?;
            while let Some(row) = link_rows.next()? {
                let source_id: NodeId = row.get(0)?;
                let target_id: NodeId = row.get(1)?;
                targets_by_source.entry(source_id).or_default().push(target_id);
            }

            for node in &mut nodes {
                if let Some(targets) = targets_by_source.remove(&node.id) {
                    node.targets = targets;
                }
            }
        }

        tx.commit()?;
        Ok(nodes)
    }

    fn update_node(
        &self,
        owner: UserId,
        id: NodeId,
        content: &str,
        node_type: NodeType,
        to_root: bool,
    ) -> RepoResult<()> {
        let content = normalize_content(content)?;

        let changed = self.conn.execute(
            "UPDATE nodes
             SET
                content = ?3,
                node_type = ?4,
                to_root = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND concern_id IN (SELECT id FROM concerns WHERE owner_id = ?2);",
            params![id, owner, content, node_type.code(), bool_to_int(to_root)],
        )?;

        if changed == 0 {
            return Err(RepoError::NodeNotFound(id));
        }

        Ok(())
    }

    fn set_node_targets(&self, owner: UserId, id: NodeId, targets: &[NodeId]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let concern_id =
            owned_node_concern(&tx, owner, id)?.ok_or(RepoError::NodeNotFound(id))?;

        tx.execute("DELETE FROM node_links WHERE source_id = ?1;", params![id])?;
        for target_id in dedup_targets(targets) {
            insert_link_checked(&tx, owner, concern_id, id, target_id)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn add_node_target(
        &self,
        owner: UserId,
        source_id: NodeId,
        target_id: NodeId,
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let concern_id = owned_node_concern(&tx, owner, source_id)?
            .ok_or(RepoError::NodeNotFound(source_id))?;

        insert_link_checked(&tx, owner, concern_id, source_id, target_id)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_node(&self, owner: UserId, id: NodeId) -> RepoResult<()> {
        // Cascade removes links in both directions.
        let changed = self.conn.execute(
            "DELETE FROM nodes
             WHERE id = ?1
               AND concern_id IN (SELECT id FROM concerns WHERE owner_id = ?2);",
            params![id, owner],
        )?;

        if changed == 0 {
            return Err(RepoError::NodeNotFound(id));
        }

        Ok(())
    }
}

fn parse_node_row(row: &Row<'_>) -> RepoResult<NodeRecord> {
    let code: i64 = row.get("node_type")?;
    let node_type = NodeType::from_code(code).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid node type `{code}` in nodes.node_type"))
    })?;

    let to_root = match row.get::<_, i64>("to_root")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid to_root value `{other}` in nodes.to_root"
            )));
        }
    };

    Ok(NodeRecord {
        id: row.get("id")?,
        concern_id: row.get("concern_id")?,
        content: row.get("content")?,
        node_type,
        to_root,
        targets: Vec::new(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_targets(conn: &Connection, source_id: NodeId) -> RepoResult<Vec<NodeId>> {
    let mut stmt = conn.prepare(
        "SELECT target_id
         FROM node_links
         WHERE source_id = ?1
         ORDER BY target_id ASC;",
    )?;
    let mut rows = stmt.query(params![source_id])?;
    let mut targets = Vec::new();
    while let Some(row) = rows.next()? {
        targets.push(row.get(0)?);
    }
    Ok(targets)
}

fn ensure_owned_concern(conn: &Connection, owner: UserId, concern_id: ConcernId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM concerns
            WHERE id = ?1 AND owner_id = ?2
        );",
        params![concern_id, owner],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::ConcernNotFound(concern_id));
    }
    Ok(())
}

fn owned_node_concern(
    conn: &Connection,
    owner: UserId,
    node_id: NodeId,
) -> RepoResult<Option<ConcernId>> {
    let concern_id = conn
        .query_row(
            "SELECT n.concern_id
             FROM nodes n
             JOIN concerns c ON c.id = n.concern_id
             WHERE n.id = ?1
               AND c.owner_id = ?2;",
            params![node_id, owner],
            |row| row.get(0),
        )
        .optional()?;
    Ok(concern_id)
}

/// Inserts one link after verifying the target is caller-owned and sits in
/// the same concern as the source. Foreign-owned targets look missing, not
/// cross-concern.
fn insert_link_checked(
    conn: &Connection,
    owner: UserId,
    concern_id: ConcernId,
    source_id: NodeId,
    target_id: NodeId,
) -> RepoResult<()> {
    let target_concern = owned_node_concern(conn, owner, target_id)?;

    match target_concern {
        None => Err(RepoError::NodeNotFound(target_id)),
        Some(found) if found != concern_id => Err(RepoError::CrossConcernTarget {
            source: source_id,
            target: target_id,
        }),
        Some(_) => {
            conn.execute(
                "INSERT OR IGNORE INTO node_links (source_id, target_id)
                 VALUES (?1, ?2);",
                params![source_id, target_id],
            )?;
            Ok(())
        }
    }
}

fn dedup_targets(targets: &[NodeId]) -> impl Iterator<Item = NodeId> {
    targets.iter().copied().collect::<BTreeSet<_>>().into_iter()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
