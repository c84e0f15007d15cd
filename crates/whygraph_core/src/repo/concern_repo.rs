//! Concern repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over `concerns` storage.
//! - Own the shared repository error type and schema-readiness guard.
//!
//! # Invariants
//! - Every query filters by `owner_id`; a concern another user owns is
//!   indistinguishable from a missing one.
//! - Deleting a concern cascades to its nodes and their links.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::concern::{Concern, ConcernCategory, ConcernId, UserId};
use crate::model::content::{normalize_content, ContentError};
use crate::model::node::NodeId;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONCERN_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    content,
    category,
    created_at,
    updated_at
FROM concerns";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for concern/node persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Content failed validation; nothing was persisted.
    Validation(ContentError),
    /// A link endpoint belongs to a different concern than its source.
    CrossConcernTarget { source: NodeId, target: NodeId },
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Concern does not exist or is not owned by the caller.
    ConcernNotFound(ConcernId),
    /// Node does not exist or is not owned by the caller.
    NodeNotFound(NodeId),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing from the connection.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::CrossConcernTarget { source, target } => write!(
                f,
                "node {target} belongs to a different concern than node {source}"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::ConcernNotFound(id) => write!(f, "concern not found: {id}"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContentError> for RepoError {
    fn from(value: ContentError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for concern CRUD operations.
pub trait ConcernRepository {
    /// Creates one concern and returns its id.
    fn create_concern(
        &self,
        owner: UserId,
        content: &str,
        category: ConcernCategory,
    ) -> RepoResult<ConcernId>;
    /// Loads one concern by id.
    fn get_concern(&self, owner: UserId, id: ConcernId) -> RepoResult<Option<Concern>>;
    /// Lists the owner's concerns, newest first.
    fn list_concerns(&self, owner: UserId) -> RepoResult<Vec<Concern>>;
    /// Replaces content and category of one concern.
    fn update_concern(
        &self,
        owner: UserId,
        id: ConcernId,
        content: &str,
        category: ConcernCategory,
    ) -> RepoResult<()>;
    /// Deletes one concern with all of its nodes and links.
    fn delete_concern(&self, owner: UserId, id: ConcernId) -> RepoResult<()>;
}

/// SQLite-backed concern repository.
pub struct SqliteConcernRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteConcernRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ConcernRepository for SqliteConcernRepository<'_> {
    fn create_concern(
        &self,
        owner: UserId,
        content: &str,
        category: ConcernCategory,
    ) -> RepoResult<ConcernId> {
        let content = normalize_content(content)?;

        self.conn.execute(
            "INSERT INTO concerns (owner_id, content, category)
             VALUES (?1, ?2, ?3);",
            params![owner, content, category.as_db_str()],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_concern(&self, owner: UserId, id: ConcernId) -> RepoResult<Option<Concern>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONCERN_SELECT_SQL}
             WHERE id = ?1
               AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id, owner])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_concern_row(row)?));
        }

        Ok(None)
    }

    fn list_concerns(&self, owner: UserId) -> RepoResult<Vec<Concern>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONCERN_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY created_at DESC, id DESC;"
        ))?;

        let mut rows = stmt.query(params![owner])?;
        let mut concerns = Vec::new();
        while let Some(row) = rows.next()? {
            concerns.push(parse_concern_row(row)?);
        }

        Ok(concerns)
    }

    fn update_concern(
        &self,
        owner: UserId,
        id: ConcernId,
        content: &str,
        category: ConcernCategory,
    ) -> RepoResult<()> {
        let content = normalize_content(content)?;

        let changed = self.conn.execute(
            "UPDATE concerns
             SET
                content = ?3,
                category = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND owner_id = ?2;",
            params![id, owner, content, category.as_db_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::ConcernNotFound(id));
        }

        Ok(())
    }

    fn delete_concern(&self, owner: UserId, id: ConcernId) -> RepoResult<()> {
        // foreign_keys=ON makes this cascade through nodes into node_links.
        let changed = self.conn.execute(
            "DELETE FROM concerns
             WHERE id = ?1
               AND owner_id = ?2;",
            params![id, owner],
        )?;

        if changed == 0 {
            return Err(RepoError::ConcernNotFound(id));
        }

        Ok(())
    }
}

fn parse_concern_row(row: &Row<'_>) -> RepoResult<Concern> {
    let category_text: String = row.get("category")?;
    let category = ConcernCategory::from_db_str(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in concerns.category"
        ))
    })?;

    Ok(Concern {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        content: row.get("content")?,
        category,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Verifies that a connection went through `open_db` bootstrap before any
/// repository is built on top of it.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["concerns", "nodes", "node_links"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}
