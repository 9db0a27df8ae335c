use chrono::{NaiveDate, NaiveTime, Weekday};
use slotgrid_core::db::open_db_in_memory;
use slotgrid_core::{
    CreateTemplateRequest, RecurrenceKind, RecurrenceTemplate, RepoError, SqliteTemplateRepository,
    TemplateRepository, TemplateService, TemplateValidationError, WeekdaySet,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}

fn saturday_request(owner: Uuid) -> CreateTemplateRequest {
    CreateTemplateRequest {
        owner_uuid: owner,
        kind: RecurrenceKind::Weekly,
        weekdays: WeekdaySet::from_weekdays(&[Weekday::Sat]),
        time_start: time(9, 0),
        time_end: time(17, 0),
        effective_start: date(2025, 12, 23),
        effective_end: None,
        location_ref: Some("loc-42".to_string()),
    }
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTemplateRepository::new(&conn);
    let service = TemplateService::new(&repo);

    let owner = Uuid::new_v4();
    let series = service.create_template(&saturday_request(owner)).unwrap();

    let loaded = repo.get_template(series, false).unwrap().unwrap();
    assert_eq!(loaded.uuid, series);
    assert_eq!(loaded.owner_uuid, owner);
    assert_eq!(loaded.kind, RecurrenceKind::Weekly);
    assert!(loaded.weekdays.contains(Weekday::Sat));
    assert!(!loaded.weekdays.contains(Weekday::Mon));
    assert_eq!(loaded.time_start, time(9, 0));
    assert_eq!(loaded.time_end, time(17, 0));
    assert_eq!(loaded.effective_start, date(2025, 12, 23));
    assert_eq!(loaded.effective_end, None);
    assert_eq!(loaded.location_ref.as_deref(), Some("loc-42"));
    assert!(loaded.is_active());
}

#[test]
fn bounded_effective_range_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTemplateRepository::new(&conn);

    let template = RecurrenceTemplate::new(
        Uuid::new_v4(),
        RecurrenceKind::Daily,
        WeekdaySet::empty(),
        time(8, 0),
        time(12, 0),
        date(2025, 1, 1),
        Some(date(2025, 1, 3)),
        None,
    );
    let series = repo.create_template(&template).unwrap();

    let loaded = repo.get_template(series, false).unwrap().unwrap();
    assert_eq!(loaded.effective_end, Some(date(2025, 1, 3)));
    assert_eq!(loaded.location_ref, None);
}

#[test]
fn weekly_with_empty_weekday_set_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTemplateRepository::new(&conn);
    let service = TemplateService::new(&repo);

    let mut request = saturday_request(Uuid::new_v4());
    request.weekdays = WeekdaySet::empty();

    let err = service.create_template(&request).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TemplateValidationError::EmptyWeekdaySet)
    ));
}

#[test]
fn non_positive_time_range_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTemplateRepository::new(&conn);
    let service = TemplateService::new(&repo);

    let mut request = saturday_request(Uuid::new_v4());
    request.time_end = request.time_start;

    let err = service.create_template(&request).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TemplateValidationError::NonPositiveTimeRange { .. })
    ));
}

#[test]
fn inverted_effective_range_is_rejected_and_nothing_is_persisted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTemplateRepository::new(&conn);
    let service = TemplateService::new(&repo);

    let owner = Uuid::new_v4();
    let mut request = saturday_request(owner);
    request.effective_end = Some(date(2025, 12, 1));

    let err = service.create_template(&request).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TemplateValidationError::InvertedEffectiveRange { .. })
    ));
    assert!(repo.list_active_for_owner(owner).unwrap().is_empty());
}

#[test]
fn list_active_is_owner_scoped_and_excludes_deleted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTemplateRepository::new(&conn);
    let service = TemplateService::new(&repo);

    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();
    let kept = service.create_template(&saturday_request(owner_a)).unwrap();
    let dropped = service.create_template(&saturday_request(owner_a)).unwrap();
    service.create_template(&saturday_request(owner_b)).unwrap();

    repo.soft_delete_series(dropped).unwrap();

    let listed = repo.list_active_for_owner(owner_a).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].uuid, kept);
}

#[test]
fn get_template_hides_deleted_unless_asked() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTemplateRepository::new(&conn);

    let template = RecurrenceTemplate::new(
        Uuid::new_v4(),
        RecurrenceKind::Daily,
        WeekdaySet::empty(),
        time(9, 0),
        time(10, 0),
        date(2025, 5, 1),
        None,
        None,
    );
    let series = repo.create_template(&template).unwrap();
    repo.soft_delete_series(series).unwrap();

    assert!(repo.get_template(series, false).unwrap().is_none());
    let tombstoned = repo.get_template(series, true).unwrap().unwrap();
    assert!(!tombstoned.is_active());
}

#[test]
fn deleting_missing_series_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTemplateRepository::new(&conn);

    let missing = Uuid::new_v4();
    let err = repo.soft_delete_series(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn template_serializes_with_snake_case_kind() {
    let template = RecurrenceTemplate::new(
        Uuid::new_v4(),
        RecurrenceKind::Weekly,
        WeekdaySet::from_weekdays(&[Weekday::Sat, Weekday::Sun]),
        time(9, 0),
        time(17, 0),
        date(2025, 12, 23),
        None,
        None,
    );

    let json = serde_json::to_value(&template).unwrap();
    assert_eq!(json["kind"], "weekly");

    let back: RecurrenceTemplate = serde_json::from_value(json).unwrap();
    assert_eq!(back, template);
}
