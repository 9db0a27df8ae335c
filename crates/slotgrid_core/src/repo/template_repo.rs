//! Template (series) repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for recurrence templates.
//! - Own the whole-series tombstone cascade (template + occurrences) with
//!   atomic semantics.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `RecurrenceTemplate::validate()` before SQL
//!   mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - `soft_delete_series` tombstones the template and all its active
//!   occurrences in a single transaction.

use crate::db::DbError;
use crate::model::template::{
    OwnerId, RecurrenceKind, RecurrenceTemplate, SeriesId, TemplateValidationError, WeekdaySet,
};
use chrono::{NaiveDate, NaiveTime, Weekday};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TEMPLATE_SELECT_SQL: &str = "SELECT
    uuid,
    owner_uuid,
    kind,
    weekdays,
    time_start,
    time_end,
    effective_start,
    effective_end,
    location_ref,
    is_deleted
FROM templates";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for scheduling persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TemplateValidationError),
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TemplateValidationError> for RepoError {
    fn from(value: TemplateValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the template (series) store.
pub trait TemplateRepository {
    /// Persists a validated template and returns its series id.
    fn create_template(&self, template: &RecurrenceTemplate) -> RepoResult<SeriesId>;
    /// Gets one template by series id.
    fn get_template(
        &self,
        id: SeriesId,
        include_deleted: bool,
    ) -> RepoResult<Option<RecurrenceTemplate>>;
    /// Lists all active templates owned by one provider.
    fn list_active_for_owner(&self, owner: OwnerId) -> RepoResult<Vec<RecurrenceTemplate>>;
    /// Tombstones the template and every active occurrence under it.
    ///
    /// Returns the number of occurrences tombstoned. Idempotent: repeating
    /// the call finds nothing left to deactivate and returns zero.
    fn soft_delete_series(&self, id: SeriesId) -> RepoResult<u64>;
}

/// SQLite-backed template repository.
pub struct SqliteTemplateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTemplateRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TemplateRepository for SqliteTemplateRepository<'_> {
    fn create_template(&self, template: &RecurrenceTemplate) -> RepoResult<SeriesId> {
        template.validate()?;

        self.conn.execute(
            "INSERT INTO templates (
                uuid,
                owner_uuid,
                kind,
                weekdays,
                time_start,
                time_end,
                effective_start,
                effective_end,
                location_ref,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                template.uuid.to_string(),
                template.owner_uuid.to_string(),
                kind_to_db(template.kind),
                weekday_set_to_db(template.weekdays),
                template.time_start,
                template.time_end,
                template.effective_start,
                template.effective_end,
                template.location_ref.as_deref(),
                bool_to_int(template.is_deleted),
            ],
        )?;

        Ok(template.uuid)
    }

    fn get_template(
        &self,
        id: SeriesId,
        include_deleted: bool,
    ) -> RepoResult<Option<RecurrenceTemplate>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TEMPLATE_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_template_row(row)?));
        }

        Ok(None)
    }

    fn list_active_for_owner(&self, owner: OwnerId) -> RepoResult<Vec<RecurrenceTemplate>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TEMPLATE_SELECT_SQL}
             WHERE owner_uuid = ?1
               AND is_deleted = 0
             ORDER BY effective_start ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([owner.to_string()])?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(parse_template_row(row)?);
        }

        Ok(templates)
    }

    fn soft_delete_series(&self, id: SeriesId) -> RepoResult<u64> {
        // One connection per caller here; the transaction only guards
        // against partial cascades, not cross-thread sharing.
        let tx = self.conn.unchecked_transaction()?;

        let template_changed = tx.execute(
            "UPDATE templates
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if template_changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        let occurrences_changed = tx.execute(
            "UPDATE occurrences
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE series_uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;

        tx.commit()?;

        Ok(occurrences_changed as u64)
    }
}

fn parse_template_row(row: &Row<'_>) -> RepoResult<RecurrenceTemplate> {
    let uuid = parse_uuid_column(row, "uuid")?;
    let owner_uuid = parse_uuid_column(row, "owner_uuid")?;

    let kind_text: String = row.get("kind")?;
    let kind = parse_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind `{kind_text}` in templates.kind"))
    })?;

    let weekdays = match row.get::<_, Option<String>>("weekdays")? {
        Some(value) => parse_weekday_set(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid weekday set `{value}` in templates.weekdays"
            ))
        })?,
        None => WeekdaySet::empty(),
    };

    let is_deleted = parse_bool_column(row, "is_deleted")?;

    let template = RecurrenceTemplate {
        uuid,
        owner_uuid,
        kind,
        weekdays,
        time_start: row.get::<_, NaiveTime>("time_start")?,
        time_end: row.get::<_, NaiveTime>("time_end")?,
        effective_start: row.get::<_, NaiveDate>("effective_start")?,
        effective_end: row.get::<_, Option<NaiveDate>>("effective_end")?,
        location_ref: row.get("location_ref")?,
        is_deleted,
    };
    template.validate()?;
    Ok(template)
}

pub(crate) fn parse_uuid_column(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {column}")))
}

pub(crate) fn parse_bool_column(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn kind_to_db(kind: RecurrenceKind) -> &'static str {
    match kind {
        RecurrenceKind::Daily => "daily",
        RecurrenceKind::Weekly => "weekly",
    }
}

pub(crate) fn parse_kind(value: &str) -> Option<RecurrenceKind> {
    match value {
        "daily" => Some(RecurrenceKind::Daily),
        "weekly" => Some(RecurrenceKind::Weekly),
        _ => None,
    }
}

/// Serializes a weekday set as comma-separated codes, Monday first.
/// Empty sets map to NULL (daily templates carry no weekday constraint).
fn weekday_set_to_db(set: WeekdaySet) -> Option<String> {
    if set.is_empty() {
        return None;
    }
    let codes: Vec<&str> = set.iter().map(weekday_to_db).collect();
    Some(codes.join(","))
}

fn parse_weekday_set(value: &str) -> Option<WeekdaySet> {
    let mut set = WeekdaySet::empty();
    for code in value.split(',') {
        set.insert(parse_weekday(code)?);
    }
    Some(set)
}

fn weekday_to_db(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

fn parse_weekday(value: &str) -> Option<Weekday> {
    match value {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
