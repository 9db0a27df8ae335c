//! Instance materializer.
//!
//! # Responsibility
//! - Ensure every valid occurrence inside a query window exists in the
//!   occurrence store, without duplicating existing rows.
//!
//! # Invariants
//! - Materialization is always bounded by the caller's window; there is no
//!   eager whole-lifetime generation.
//! - Repeated or concurrent calls over the same or overlapping windows never
//!   produce two occurrences with the same `(series, start)`; the store's
//!   unique constraint is the backstop, and a conflict is a no-op.
//! - Tombstoned occurrences count as "already materialized" and stay gone.

use crate::expand::expand_candidates;
use crate::model::occurrence::{DateWindow, OccurrenceInstance};
use crate::model::template::SeriesId;
use crate::repo::occurrence_repo::OccurrenceRepository;
use crate::repo::template_repo::{RepoResult, TemplateRepository};
use log::debug;

/// Fills occurrence gaps for one series inside one query window.
pub struct Materializer<'a, T: TemplateRepository, O: OccurrenceRepository> {
    templates: &'a T,
    occurrences: &'a O,
}

impl<'a, T: TemplateRepository, O: OccurrenceRepository> Materializer<'a, T, O> {
    pub fn new(templates: &'a T, occurrences: &'a O) -> Self {
        Self {
            templates,
            occurrences,
        }
    }

    /// Materializes all missing occurrences of `series` inside `window`.
    ///
    /// Returns the number of rows actually inserted. Idempotent: a second
    /// call over the same window inserts nothing. A tombstoned or missing
    /// series is a no-op, not an error.
    pub fn materialize(&self, series: SeriesId, window: DateWindow) -> RepoResult<u32> {
        let Some(template) = self.templates.get_template(series, false)? else {
            debug!("event=materialize module=service status=skip series={series}");
            return Ok(0);
        };

        let candidates = expand_candidates(&template, window);
        let mut inserted: u32 = 0;
        for start_at in candidates {
            let end_at = start_at.date().and_time(template.time_end);
            let occurrence = OccurrenceInstance::new(
                template.uuid,
                start_at,
                end_at,
                template.location_ref.clone(),
            );
            if self.occurrences.insert_if_absent(&occurrence)? {
                inserted += 1;
            }
        }

        debug!(
            "event=materialize module=service status=ok series={series} window_start={} window_end={} inserted={inserted}",
            window.start, window.end
        );
        Ok(inserted)
    }
}
