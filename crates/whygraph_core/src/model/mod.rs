//! Domain model for concern diagrams.
//!
//! # Responsibility
//! - Define the canonical `Concern` and `Node` records shared by all layers.
//! - Keep content validation in one place, invoked by repository write paths.
//!
//! # Invariants
//! - Every `Node` belongs to exactly one `Concern`.
//! - Node-to-node links never cross concern boundaries.

pub mod concern;
pub mod content;
pub mod node;
