//! Domain model for recurring availability.
//!
//! # Responsibility
//! - Define the two canonical record kinds: the abstract recurrence template
//!   (series) and its concrete occurrence instances.
//!
//! # Invariants
//! - Templates and occurrences are distinct record kinds joined by a series
//!   id; a template is never treated as its own first occurrence.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod occurrence;
pub mod template;
