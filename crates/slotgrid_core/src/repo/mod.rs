//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the template and
//!   occurrence stores.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Template writes must enforce `RecurrenceTemplate::validate()` before
//!   persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod occurrence_repo;
pub mod template_repo;
