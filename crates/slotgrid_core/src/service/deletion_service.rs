//! Deletion coordinator.
//!
//! # Responsibility
//! - Tombstone a single occurrence, or a whole series (template plus every
//!   occurrence under it), on behalf of an authorized owner.
//!
//! # Invariants
//! - Both operations require the caller to own the affected series; a
//!   mismatch reveals nothing beyond "not permitted".
//! - Deletion is terminal: tombstoned rows never re-enter materialization
//!   output and are never regenerated.
//! - Deleting an already-inactive row is a no-op success, so caller retries
//!   stay simple.

use crate::model::occurrence::OccurrenceId;
use crate::model::template::{OwnerId, SeriesId};
use crate::repo::occurrence_repo::OccurrenceRepository;
use crate::repo::template_repo::{RepoError, TemplateRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for deletion use-cases.
#[derive(Debug)]
pub enum DeletionError {
    /// Caller does not own the affected series. Intentionally carries no
    /// detail about the resource.
    Unauthorized,
    /// Target occurrence or series does not exist.
    NotFound(Uuid),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for DeletionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "not permitted"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DeletionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DeletionError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Use-case service for occurrence and series deletion.
pub struct DeletionService<'a, T: TemplateRepository, O: OccurrenceRepository> {
    templates: &'a T,
    occurrences: &'a O,
}

impl<'a, T: TemplateRepository, O: OccurrenceRepository> DeletionService<'a, T, O> {
    pub fn new(templates: &'a T, occurrences: &'a O) -> Self {
        Self {
            templates,
            occurrences,
        }
    }

    /// Tombstones exactly one occurrence and returns its series id.
    ///
    /// Sibling occurrences and the template itself are untouched. Deleting
    /// an already-tombstoned occurrence succeeds without effect.
    pub fn delete_occurrence(
        &self,
        caller: OwnerId,
        id: OccurrenceId,
    ) -> Result<SeriesId, DeletionError> {
        let Some(ownership) = self.occurrences.get_ownership(id)? else {
            return Err(DeletionError::NotFound(id));
        };
        if ownership.owner_uuid != caller {
            return Err(DeletionError::Unauthorized);
        }

        if !ownership.is_deleted {
            self.occurrences.soft_delete_occurrence(id)?;
        }

        info!(
            "event=occurrence_delete module=service status=ok occurrence={id} series={}",
            ownership.series_uuid
        );
        Ok(ownership.series_uuid)
    }

    /// Tombstones the template and every active occurrence under it,
    /// regardless of which query window materialized them.
    ///
    /// Returns the number of occurrences deactivated by this call. Repeating
    /// the call is a no-op success returning zero.
    pub fn delete_series(&self, caller: OwnerId, series: SeriesId) -> Result<u64, DeletionError> {
        let Some(template) = self.templates.get_template(series, true)? else {
            return Err(DeletionError::NotFound(series));
        };
        if template.owner_uuid != caller {
            return Err(DeletionError::Unauthorized);
        }

        let deleted = self.templates.soft_delete_series(series)?;
        info!(
            "event=series_delete module=service status=ok series={series} occurrences_deleted={deleted}"
        );
        Ok(deleted)
    }
}
