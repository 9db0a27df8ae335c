//! Core domain logic for slotgrid: recurring availability templates and
//! their lazily materialized, bookable occurrence instances.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod expand;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use expand::expand_candidates;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::occurrence::{DateWindow, OccurrenceId, OccurrenceInstance};
pub use model::template::{
    OwnerId, RecurrenceKind, RecurrenceTemplate, SeriesId, TemplateValidationError, WeekdaySet,
};
pub use repo::occurrence_repo::{
    OccurrenceOwnership, OccurrenceRepository, OccurrenceView, SqliteOccurrenceRepository,
};
pub use repo::template_repo::{
    RepoError, RepoResult, SqliteTemplateRepository, TemplateRepository,
};
pub use service::deletion_service::{DeletionError, DeletionService};
pub use service::materializer::Materializer;
pub use service::schedule_service::ScheduleService;
pub use service::template_service::{CreateTemplateRequest, TemplateService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
