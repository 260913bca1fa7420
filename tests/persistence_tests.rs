use std::fs;

use tempfile::tempdir;
use timetable_tool::{
    Cell, ConfigStore, DayCode, JsonFileStore, PeriodIndex, ScheduleConfig, Session, StorageError,
    ValidationError,
};

fn p(n: u8) -> PeriodIndex {
    PeriodIndex::new(n).unwrap()
}

#[test]
fn save_then_load_round_trips_the_record() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("schedule_config.json"));

    let mut config = ScheduleConfig::defaults();
    config.load_example_data();
    config.set_teacher("Luca Bianchi");
    config.set_active_periods([p(1), p(3), p(4)]).unwrap();
    config.set_period_time_str(p(3), "10:20", "11:10").unwrap();
    config.set_include_rest_day(true);

    assert!(!store.exists());
    store.save(&config).unwrap();
    assert!(store.exists());

    let loaded = store.load().unwrap().expect("saved configuration");
    assert_eq!(loaded, config);
}

#[test]
fn file_uses_camel_case_keys_and_text_period_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schedule_config.json");
    let store = JsonFileStore::new(&path);

    let mut config = ScheduleConfig::defaults();
    config.set_cell(DayCode::Mon, p(2), Cell::new("2E", "MB", "PT", "A15"));
    store.save(&config).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["schoolYear"], "2025/2026");
    assert_eq!(raw["restDay"], "SUN");
    assert_eq!(raw["includeRestDay"], false);
    assert_eq!(raw["activePeriods"][0], 1);
    assert_eq!(raw["periodTimes"]["1"]["start"], "08:15");
    assert_eq!(raw["cells"]["MON"]["2"]["className"], "2E");
    assert_eq!(raw["cells"]["MON"]["2"]["room"], "A15");
}

#[test]
fn missing_file_loads_as_none() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn malformed_file_is_a_serialization_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = JsonFileStore::new(&path).load().unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[test]
fn partial_file_gets_defaults_and_period_times() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.json");
    fs::write(&path, r#"{"teacher": "Anna Verdi", "activePeriods": [1, 2], "periodTimes": {}}"#)
        .unwrap();

    let config = JsonFileStore::new(&path).load().unwrap().unwrap();
    assert_eq!(config.teacher, "Anna Verdi");
    assert_eq!(config.weekdays.len(), 6);
    assert_eq!(config.period_times.len(), 2);
    assert_eq!(config.period_time(p(2)).label(), "09:15-10:15");
}

#[test]
fn session_falls_back_to_defaults_on_malformed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "[]").unwrap();

    let (session, err) = Session::open(JsonFileStore::new(&path));
    assert!(matches!(err, Some(StorageError::Serialization(_))));
    assert_eq!(session.config(), &ScheduleConfig::defaults());
}

#[test]
fn reload_without_saved_file_reports_not_found() {
    let dir = tempdir().unwrap();
    let (mut session, err) = Session::open(JsonFileStore::new(dir.path().join("none.json")));
    assert!(err.is_none());

    session.config_mut().set_teacher("Kept");
    let err = session.reload().unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
    assert!(err.to_string().contains("no configuration found"));
    assert_eq!(session.config().teacher, "Kept");
}

#[test]
fn reload_discards_unsaved_edits() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schedule_config.json");
    let (mut session, _) = Session::open(JsonFileStore::new(&path));

    session.config_mut().set_teacher("Saved Name");
    session.save().unwrap();
    session.config_mut().set_teacher("Unsaved Name");
    session.reload().unwrap();

    assert_eq!(session.config().teacher, "Saved Name");
    assert!(session.status().saved);
    assert!(session.summary().config_saved);
}

#[test]
fn duplicate_weekdays_are_collapsed_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("days.json");
    fs::write(&path, r#"{"weekdays": ["MON", "TUE", "MON"]}"#).unwrap();

    let config = JsonFileStore::new(&path).load().unwrap().unwrap();
    assert_eq!(config.weekdays, vec![DayCode::Mon, DayCode::Tue]);
    let view = timetable_tool::render_table(&config, true, timetable_tool::Density::Standard);
    assert_eq!(view.rows.len(), 2);
    assert!(view.to_text().is_ok());
}

#[test]
fn repeated_active_periods_are_collapsed_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("periods.json");
    fs::write(&path, r#"{"activePeriods": [2, 2, 4]}"#).unwrap();

    let config = JsonFileStore::new(&path).load().unwrap().unwrap();
    assert_eq!(config.active_periods, vec![p(2), p(4)]);
}

#[test]
fn more_than_six_active_periods_are_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("periods.json");
    fs::write(&path, r#"{"activePeriods": [1, 1, 2, 3, 4, 5, 6, 6]}"#).unwrap();

    let err = JsonFileStore::new(&path).load().unwrap_err();
    assert!(matches!(
        err,
        StorageError::Invalid(ValidationError::TooManyPeriods(8))
    ));
}

#[test]
fn inverted_period_time_is_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("times.json");
    fs::write(
        &path,
        r#"{"periodTimes": {"1": {"start": "11:00", "end": "10:00"}}}"#,
    )
    .unwrap();

    let err = JsonFileStore::new(&path).load().unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[test]
fn session_with_broken_invariants_falls_back_and_still_renders() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(
        &path,
        r#"{"weekdays":["MON","MON"],"activePeriods":[1,1,2,3,4,5,6,6],"periodTimes":{"1":{"start":"11:00","end":"10:00"}}}"#,
    )
    .unwrap();

    let (session, err) = Session::open(JsonFileStore::new(&path));
    assert!(err.is_some());
    assert_eq!(session.config(), &ScheduleConfig::defaults());
    let text = session
        .table(false, timetable_tool::Density::Standard)
        .to_text()
        .unwrap();
    assert!(text.contains("| Day | 1st"));
}

#[test]
fn replace_config_normalizes_or_keeps_current_record() {
    let dir = tempdir().unwrap();
    let (mut session, _) = Session::open(JsonFileStore::new(dir.path().join("c.json")));

    let mut incoming = ScheduleConfig::defaults();
    incoming.weekdays = vec![DayCode::Wed, DayCode::Wed];
    incoming.active_periods = vec![p(1), p(1)];
    session.replace_config(incoming).unwrap();
    assert_eq!(session.config().weekdays, vec![DayCode::Wed]);
    assert_eq!(session.config().active_periods, vec![p(1)]);

    let mut incoming = ScheduleConfig::defaults();
    incoming.active_periods = [1, 2, 3, 4, 5, 6, 6].map(p).to_vec();
    let err = session.replace_config(incoming).unwrap_err();
    assert_eq!(err, ValidationError::TooManyPeriods(7));
    assert_eq!(session.config().weekdays, vec![DayCode::Wed]);
}
