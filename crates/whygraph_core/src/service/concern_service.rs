//! Concern use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::concern::{Concern, ConcernCategory, ConcernId, UserId};
use crate::repo::concern_repo::{ConcernRepository, RepoResult};

/// Use-case service wrapper for concern CRUD operations.
pub struct ConcernService<R: ConcernRepository> {
    repo: R,
}

impl<R: ConcernRepository> ConcernService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new concern for the caller.
    pub fn create_concern(
        &self,
        owner: UserId,
        content: &str,
        category: ConcernCategory,
    ) -> RepoResult<ConcernId> {
        self.repo.create_concern(owner, content, category)
    }

    /// Gets one concern by id. `None` covers missing and foreign-owned ids.
    pub fn get_concern(&self, owner: UserId, id: ConcernId) -> RepoResult<Option<Concern>> {
        self.repo.get_concern(owner, id)
    }

    /// Lists the caller's concerns, newest first.
    pub fn list_concerns(&self, owner: UserId) -> RepoResult<Vec<Concern>> {
        self.repo.list_concerns(owner)
    }

    /// Replaces content and category of one concern.
    pub fn update_concern(
        &self,
        owner: UserId,
        id: ConcernId,
        content: &str,
        category: ConcernCategory,
    ) -> RepoResult<()> {
        self.repo.update_concern(owner, id, content, category)
    }

    /// Deletes one concern with all of its nodes and links.
    pub fn delete_concern(&self, owner: UserId, id: ConcernId) -> RepoResult<()> {
        self.repo.delete_concern(owner, id)
    }
}
