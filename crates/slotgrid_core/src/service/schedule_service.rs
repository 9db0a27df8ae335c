//! Instance query service.
//!
//! # Responsibility
//! - Return materialized occurrences for an owner across all their series,
//!   filling window gaps first.
//! - Supply the default window when the caller omits one.
//!
//! # Invariants
//! - Materialize-then-read: every active template of the owner is
//!   materialized for the window before the store is queried.
//! - Empty or inverted windows degrade to empty results, never errors.
//! - The default window is the current local calendar week, never "all time".

use crate::model::occurrence::DateWindow;
use crate::model::template::OwnerId;
use crate::repo::occurrence_repo::{OccurrenceRepository, OccurrenceView};
use crate::repo::template_repo::{RepoResult, TemplateRepository};
use crate::service::materializer::Materializer;
use chrono::Local;
use log::info;

/// Use-case service for owner-scoped occurrence window queries.
pub struct ScheduleService<'a, T: TemplateRepository, O: OccurrenceRepository> {
    templates: &'a T,
    occurrences: &'a O,
}

impl<'a, T: TemplateRepository, O: OccurrenceRepository> ScheduleService<'a, T, O> {
    pub fn new(templates: &'a T, occurrences: &'a O) -> Self {
        Self {
            templates,
            occurrences,
        }
    }

    /// Returns all active occurrences of `owner` whose start falls inside
    /// `window`, materializing missing ones first.
    ///
    /// When `window` is `None`, the current local Monday..Sunday week is
    /// used. An owner with no templates yields an empty list.
    pub fn get_occurrences(
        &self,
        owner: OwnerId,
        window: Option<DateWindow>,
    ) -> RepoResult<Vec<OccurrenceView>> {
        let window = window.unwrap_or_else(|| DateWindow::week_of(Local::now().date_naive()));
        if window.is_empty() {
            info!(
                "event=occurrence_query module=service status=empty_window owner={owner} window_start={} window_end={}",
                window.start, window.end
            );
            return Ok(Vec::new());
        }

        let materializer = Materializer::new(self.templates, self.occurrences);
        for template in self.templates.list_active_for_owner(owner)? {
            materializer.materialize(template.uuid, window)?;
        }

        let views = self.occurrences.list_for_owner_in_window(owner, window)?;
        info!(
            "event=occurrence_query module=service status=ok owner={owner} window_start={} window_end={} rows={}",
            window.start,
            window.end,
            views.len()
        );
        Ok(views)
    }
}
