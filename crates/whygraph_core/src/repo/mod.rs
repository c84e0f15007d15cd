//! Persistence repositories.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD APIs over concern/node storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every operation takes the calling owner and only reaches rows that
//!   owner can see; foreign ids surface as not-found, never as data.
//! - Write paths validate content before any SQL mutation.

pub mod concern_repo;
pub mod node_repo;
