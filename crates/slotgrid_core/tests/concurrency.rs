use chrono::{NaiveDate, NaiveTime};
use slotgrid_core::db::open_db;
use slotgrid_core::{
    DateWindow, Materializer, RecurrenceKind, RecurrenceTemplate, SqliteOccurrenceRepository,
    SqliteTemplateRepository, TemplateRepository, WeekdaySet,
};
use std::thread;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}

/// Two connections materializing overlapping windows for the same series
/// must never produce more than one row per candidate start; the store's
/// unique constraint is the backstop, and conflicts count as already
/// materialized.
#[test]
fn concurrent_materialization_never_duplicates_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slotgrid.db");

    let series = {
        let conn = open_db(&path).unwrap();
        let templates = SqliteTemplateRepository::new(&conn);
        templates
            .create_template(&RecurrenceTemplate::new(
                Uuid::new_v4(),
                RecurrenceKind::Daily,
                WeekdaySet::empty(),
                time(9, 0),
                time(10, 0),
                date(2025, 1, 1),
                None,
                None,
            ))
            .unwrap()
    };

    let windows = [
        DateWindow::new(date(2025, 1, 1), date(2025, 1, 31)),
        DateWindow::new(date(2025, 1, 15), date(2025, 2, 14)),
    ];

    let handles: Vec<_> = windows
        .into_iter()
        .map(|window| {
            let path = path.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let templates = SqliteTemplateRepository::new(&conn);
                let occurrences = SqliteOccurrenceRepository::new(&conn);
                let materializer = Materializer::new(&templates, &occurrences);
                materializer.materialize(series, window).unwrap()
            })
        })
        .collect();

    let inserted_total: u32 = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .sum();

    // 2025-01-01 through 2025-02-14 is 45 candidate dates; the overlap
    // (Jan 15..31) must have been inserted by exactly one of the callers.
    assert_eq!(inserted_total, 45);

    let conn = open_db(&path).unwrap();
    let total: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM occurrences WHERE series_uuid = ?1;",
            [series.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(total, 45);

    let duplicated_starts: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM (
                SELECT start_at FROM occurrences
                WHERE series_uuid = ?1
                GROUP BY start_at
                HAVING COUNT(*) > 1
            );",
            [series.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(duplicated_starts, 0);
}
