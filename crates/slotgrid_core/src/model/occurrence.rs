//! Occurrence instance domain model and query windows.
//!
//! # Responsibility
//! - Define the concrete, dated, bookable record a series materializes into.
//! - Define the inclusive date window callers query over.
//!
//! # Invariants
//! - `(series_uuid, start_at)` is unique across active and tombstoned rows;
//!   a tombstoned occurrence permanently blocks re-materialization of the
//!   same candidate.
//! - `end_at` is always after `start_at` (inherited from template
//!   validation; both sides are copied at materialization time).

use crate::model::template::SeriesId;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one materialized occurrence.
pub type OccurrenceId = Uuid;

/// One concrete, dated materialization of a recurrence template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceInstance {
    pub uuid: OccurrenceId,
    /// Owning series.
    pub series_uuid: SeriesId,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    /// Copied from the template at materialization time, never re-derived.
    pub location_ref: Option<String>,
    /// Soft delete tombstone. Tombstoned occurrences are never resurrected
    /// by later materialization passes.
    pub is_deleted: bool,
}

impl OccurrenceInstance {
    /// Creates an active occurrence with a generated id.
    pub fn new(
        series_uuid: SeriesId,
        start_at: NaiveDateTime,
        end_at: NaiveDateTime,
        location_ref: Option<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            series_uuid,
            start_at,
            end_at,
            location_ref,
            is_deleted: false,
        }
    }

    /// Marks this occurrence as softly deleted (tombstoned).
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Returns whether this occurrence is visible/bookable.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Caller-supplied date range, inclusive on both ends.
///
/// An inverted window is representable and degrades to empty results
/// everywhere; a calendar must never fail merely because a week is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns whether the window covers no dates at all.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Returns the Monday..Sunday week containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        let monday = date
            - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()));
        Self {
            start: monday,
            end: monday + chrono::Duration::days(6),
        }
    }
}
