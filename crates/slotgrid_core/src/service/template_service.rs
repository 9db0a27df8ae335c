//! Template creation boundary.
//!
//! # Responsibility
//! - Accept availability definitions from configuration callers and persist
//!   them as series templates.
//!
//! # Invariants
//! - Invalid rules are rejected synchronously and never partially persisted.
//! - Rule editing is not supported in place; callers delete the series and
//!   create a new one.

use crate::model::template::{OwnerId, RecurrenceKind, RecurrenceTemplate, SeriesId, WeekdaySet};
use crate::repo::template_repo::{RepoResult, TemplateRepository};
use chrono::{NaiveDate, NaiveTime};
use log::info;

/// Request model for publishing a recurring availability rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTemplateRequest {
    pub owner_uuid: OwnerId,
    pub kind: RecurrenceKind,
    /// Required non-empty for weekly kind; ignored for daily.
    pub weekdays: WeekdaySet,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub effective_start: NaiveDate,
    /// `None` leaves the series unbounded.
    pub effective_end: Option<NaiveDate>,
    pub location_ref: Option<String>,
}

/// Use-case service for template creation.
pub struct TemplateService<'a, R: TemplateRepository> {
    repo: &'a R,
}

impl<'a, R: TemplateRepository> TemplateService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Persists a new series template and returns its series id.
    ///
    /// # Errors
    /// - `RepoError::Validation` for rule-shape violations (weekly with no
    ///   weekdays, non-positive time range, inverted effective range).
    pub fn create_template(&self, request: &CreateTemplateRequest) -> RepoResult<SeriesId> {
        let template = RecurrenceTemplate::new(
            request.owner_uuid,
            request.kind,
            request.weekdays,
            request.time_start,
            request.time_end,
            request.effective_start,
            request.effective_end,
            request.location_ref.clone(),
        );

        let series = self.repo.create_template(&template)?;
        info!(
            "event=template_create module=service status=ok series={series} owner={} kind={:?}",
            request.owner_uuid, request.kind
        );
        Ok(series)
    }
}
