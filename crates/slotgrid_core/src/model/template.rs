//! Recurrence template (series) domain model.
//!
//! # Responsibility
//! - Define the abstract repeating rule a provider publishes.
//! - Validate rule shape at the creation boundary, before any persistence.
//!
//! # Invariants
//! - `uuid` is the stable series identity; occurrences reference it forever.
//! - A template row is never itself bookable and never appears in occurrence
//!   query output.
//! - `is_deleted` is the source of truth for tombstone state; there is no
//!   transition back to active.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a recurring series.
pub type SeriesId = Uuid;

/// Opaque identifier of the provider owning a series.
///
/// Account management lives outside this core; ownership is an equality
/// check against this value.
pub type OwnerId = Uuid;

/// Supported recurrence shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    /// One occurrence per date in the effective range.
    Daily,
    /// One occurrence per date whose weekday is in the template's set.
    Weekly,
}

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Set of weekdays a weekly template fires on, packed as a 7-bit mask
/// (bit 0 = Monday).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Returns the empty set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from the given weekdays. Duplicates are harmless.
    pub fn from_weekdays(weekdays: &[Weekday]) -> Self {
        let mut set = Self::empty();
        for weekday in weekdays {
            set.insert(*weekday);
        }
        set
    }

    pub fn insert(&mut self, weekday: Weekday) {
        self.0 |= 1 << weekday.num_days_from_monday();
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates contained weekdays in Monday-first order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_WEEKDAYS
            .iter()
            .copied()
            .filter(|weekday| self.contains(*weekday))
    }
}

/// Rule-shape violations detected at the template creation boundary.
///
/// These are rejected synchronously; an invalid template is never persisted,
/// not even partially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValidationError {
    /// Weekly kind with no weekday selected.
    EmptyWeekdaySet,
    /// `time_end` must be strictly after `time_start`.
    NonPositiveTimeRange {
        time_start: NaiveTime,
        time_end: NaiveTime,
    },
    /// `effective_end` (when set) must not precede `effective_start`.
    InvertedEffectiveRange {
        effective_start: NaiveDate,
        effective_end: NaiveDate,
    },
}

impl Display for TemplateValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyWeekdaySet => {
                write!(f, "weekly template requires a non-empty weekday set")
            }
            Self::NonPositiveTimeRange {
                time_start,
                time_end,
            } => write!(
                f,
                "time range end {time_end} must be after start {time_start}"
            ),
            Self::InvertedEffectiveRange {
                effective_start,
                effective_end,
            } => write!(
                f,
                "effective end {effective_end} precedes effective start {effective_start}"
            ),
        }
    }
}

impl Error for TemplateValidationError {}

/// Canonical series record: the abstract recurring availability rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceTemplate {
    /// Stable series id used by occurrences, deletion and auditing.
    pub uuid: SeriesId,
    /// Provider owning this series.
    pub owner_uuid: OwnerId,
    pub kind: RecurrenceKind,
    /// Meaningful only when `kind == RecurrenceKind::Weekly`.
    pub weekdays: WeekdaySet,
    /// Time-of-day each occurrence starts.
    pub time_start: NaiveTime,
    /// Time-of-day each occurrence ends. Strictly after `time_start`.
    pub time_end: NaiveTime,
    /// First date (inclusive) the rule applies.
    pub effective_start: NaiveDate,
    /// Last date (inclusive) the rule applies. `None` means unbounded.
    pub effective_end: Option<NaiveDate>,
    /// Opaque external location id, copied onto occurrences at
    /// materialization time.
    pub location_ref: Option<String>,
    /// Soft delete tombstone; tombstoned series never materialize again.
    pub is_deleted: bool,
}

impl RecurrenceTemplate {
    /// Creates a template with a generated series id.
    pub fn new(
        owner_uuid: OwnerId,
        kind: RecurrenceKind,
        weekdays: WeekdaySet,
        time_start: NaiveTime,
        time_end: NaiveTime,
        effective_start: NaiveDate,
        effective_end: Option<NaiveDate>,
        location_ref: Option<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            owner_uuid,
            kind,
            weekdays,
            time_start,
            time_end,
            effective_start,
            effective_end,
            location_ref,
            is_deleted: false,
        }
    }

    /// Validates rule shape.
    ///
    /// # Errors
    /// - `EmptyWeekdaySet` for weekly kind without weekdays.
    /// - `NonPositiveTimeRange` when `time_end <= time_start`.
    /// - `InvertedEffectiveRange` when the bounded effective range is inverted.
    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        if self.kind == RecurrenceKind::Weekly && self.weekdays.is_empty() {
            return Err(TemplateValidationError::EmptyWeekdaySet);
        }

        if self.time_end <= self.time_start {
            return Err(TemplateValidationError::NonPositiveTimeRange {
                time_start: self.time_start,
                time_end: self.time_end,
            });
        }

        if let Some(effective_end) = self.effective_end {
            if effective_end < self.effective_start {
                return Err(TemplateValidationError::InvertedEffectiveRange {
                    effective_start: self.effective_start,
                    effective_end,
                });
            }
        }

        Ok(())
    }

    /// Marks this series as softly deleted (tombstoned).
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Returns whether this series still participates in materialization.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}
