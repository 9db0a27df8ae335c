//! Occurrence repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for materialized occurrences.
//! - Own the conflict-guarded insert that makes materialization idempotent
//!   under concurrent callers.
//! - Serve window queries joined with minimal series metadata.
//!
//! # Invariants
//! - `(series_uuid, start_at)` is unique across active and tombstoned rows;
//!   an insert conflict means "already materialized" and is not an error.
//! - Window queries only ever return active rows.

use crate::model::occurrence::{DateWindow, OccurrenceId, OccurrenceInstance};
use crate::model::template::{OwnerId, RecurrenceKind, SeriesId};
use crate::repo::template_repo::{
    bool_to_int, parse_bool_column, parse_kind, parse_uuid_column, RepoError, RepoResult,
};
use chrono::{NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, Row};

const OCCURRENCE_SELECT_SQL: &str = "SELECT
    uuid,
    series_uuid,
    start_at,
    end_at,
    location_ref,
    is_deleted
FROM occurrences";

/// Read model for occurrence window queries, joined with the series
/// metadata callers need for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceView {
    pub occurrence_uuid: OccurrenceId,
    pub series_uuid: SeriesId,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub location_ref: Option<String>,
    pub kind: RecurrenceKind,
}

/// Ownership context for deletion authorization checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceOwnership {
    pub series_uuid: SeriesId,
    pub owner_uuid: OwnerId,
    pub is_deleted: bool,
}

/// Repository interface for the occurrence store.
pub trait OccurrenceRepository {
    /// Inserts the occurrence unless its `(series, start)` slot is already
    /// taken, by an active or a tombstoned row alike.
    ///
    /// Returns `true` when a row was inserted. A constraint conflict is a
    /// no-op success, which makes this the single write primitive both for
    /// idempotent re-materialization and for the concurrent-caller race.
    fn insert_if_absent(&self, occurrence: &OccurrenceInstance) -> RepoResult<bool>;
    /// Gets one occurrence by id.
    fn get_occurrence(
        &self,
        id: OccurrenceId,
        include_deleted: bool,
    ) -> RepoResult<Option<OccurrenceInstance>>;
    /// Resolves the owning series and owner for one occurrence, tombstoned
    /// rows included.
    fn get_ownership(&self, id: OccurrenceId) -> RepoResult<Option<OccurrenceOwnership>>;
    /// Lists all active occurrences of one series, chronologically.
    fn list_active_for_series(&self, series: SeriesId) -> RepoResult<Vec<OccurrenceInstance>>;
    /// Lists all active occurrences owned (via series) by one provider whose
    /// start falls inside the inclusive window, chronologically, joined with
    /// series metadata.
    fn list_for_owner_in_window(
        &self,
        owner: OwnerId,
        window: DateWindow,
    ) -> RepoResult<Vec<OccurrenceView>>;
    /// Tombstones exactly one occurrence. Idempotent; siblings and the
    /// owning template are untouched.
    fn soft_delete_occurrence(&self, id: OccurrenceId) -> RepoResult<()>;
}

/// SQLite-backed occurrence repository.
pub struct SqliteOccurrenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOccurrenceRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl OccurrenceRepository for SqliteOccurrenceRepository<'_> {
    fn insert_if_absent(&self, occurrence: &OccurrenceInstance) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT INTO occurrences (
                uuid,
                series_uuid,
                start_at,
                end_at,
                location_ref,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (series_uuid, start_at) DO NOTHING;",
            params![
                occurrence.uuid.to_string(),
                occurrence.series_uuid.to_string(),
                occurrence.start_at,
                occurrence.end_at,
                occurrence.location_ref.as_deref(),
                bool_to_int(occurrence.is_deleted),
            ],
        )?;

        Ok(changed == 1)
    }

    fn get_occurrence(
        &self,
        id: OccurrenceId,
        include_deleted: bool,
    ) -> RepoResult<Option<OccurrenceInstance>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OCCURRENCE_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_occurrence_row(row)?));
        }

        Ok(None)
    }

    fn get_ownership(&self, id: OccurrenceId) -> RepoResult<Option<OccurrenceOwnership>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                o.series_uuid,
                t.owner_uuid,
                o.is_deleted
             FROM occurrences o
             JOIN templates t ON t.uuid = o.series_uuid
             WHERE o.uuid = ?1;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(OccurrenceOwnership {
                series_uuid: parse_uuid_column(row, "series_uuid")?,
                owner_uuid: parse_uuid_column(row, "owner_uuid")?,
                is_deleted: parse_bool_column(row, "is_deleted")?,
            }));
        }

        Ok(None)
    }

    fn list_active_for_series(&self, series: SeriesId) -> RepoResult<Vec<OccurrenceInstance>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OCCURRENCE_SELECT_SQL}
             WHERE series_uuid = ?1
               AND is_deleted = 0
             ORDER BY start_at ASC;"
        ))?;

        let mut rows = stmt.query([series.to_string()])?;
        let mut occurrences = Vec::new();
        while let Some(row) = rows.next()? {
            occurrences.push(parse_occurrence_row(row)?);
        }

        Ok(occurrences)
    }

    fn list_for_owner_in_window(
        &self,
        owner: OwnerId,
        window: DateWindow,
    ) -> RepoResult<Vec<OccurrenceView>> {
        if window.is_empty() {
            return Ok(Vec::new());
        }
        let (lower, upper) = window_bounds(window);

        let mut stmt = self.conn.prepare(
            "SELECT
                o.uuid,
                o.series_uuid,
                o.start_at,
                o.end_at,
                o.location_ref,
                t.kind
             FROM occurrences o
             JOIN templates t ON t.uuid = o.series_uuid
             WHERE t.owner_uuid = ?1
               AND o.is_deleted = 0
               AND o.start_at >= ?2
               AND o.start_at < ?3
             ORDER BY o.start_at ASC, o.uuid ASC;",
        )?;

        let mut rows = stmt.query(params![owner.to_string(), lower, upper])?;
        let mut views = Vec::new();
        while let Some(row) = rows.next()? {
            let kind_text: String = row.get("kind")?;
            let kind = parse_kind(&kind_text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid kind `{kind_text}` in templates.kind"))
            })?;
            views.push(OccurrenceView {
                occurrence_uuid: parse_uuid_column(row, "uuid")?,
                series_uuid: parse_uuid_column(row, "series_uuid")?,
                start_at: row.get("start_at")?,
                end_at: row.get("end_at")?,
                location_ref: row.get("location_ref")?,
                kind,
            });
        }

        Ok(views)
    }

    fn soft_delete_occurrence(&self, id: OccurrenceId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE occurrences
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_occurrence_row(row: &Row<'_>) -> RepoResult<OccurrenceInstance> {
    Ok(OccurrenceInstance {
        uuid: parse_uuid_column(row, "uuid")?,
        series_uuid: parse_uuid_column(row, "series_uuid")?,
        start_at: row.get("start_at")?,
        end_at: row.get("end_at")?,
        location_ref: row.get("location_ref")?,
        is_deleted: parse_bool_column(row, "is_deleted")?,
    })
}

/// Converts an inclusive date window into `[lower, upper)` datetime bounds.
fn window_bounds(window: DateWindow) -> (NaiveDateTime, NaiveDateTime) {
    let lower = window.start.and_time(NaiveTime::MIN);
    let upper = match window.end.succ_opt() {
        Some(next_day) => next_day.and_time(NaiveTime::MIN),
        None => NaiveDateTime::MAX,
    };
    (lower, upper)
}
