use timetable_tool::{
    Cell, DayCode, Density, PeriodIndex, SENTINEL_FREE_PERIOD, SENTINEL_UNAVAILABLE,
    ScheduleConfig, render_table,
};

fn p(n: u8) -> PeriodIndex {
    PeriodIndex::new(n).unwrap()
}

fn config_with_lesson() -> ScheduleConfig {
    let mut config = ScheduleConfig::defaults();
    config.set_cell(DayCode::Mon, p(3), Cell::new("2E", "MB", "PT", "A15"));
    config
}

#[test]
fn empty_schedule_renders_blank_rows_for_visible_days() {
    let mut config = ScheduleConfig::defaults();
    config.initialize_empty_schedule();

    let view = render_table(&config, true, Density::Standard);
    assert_eq!(view.rows.len(), config.visible_days().len());
    assert_eq!(view.header[0], "Day");
    assert_eq!(&view.header[1..], ["1st", "2nd", "3rd", "4th", "5th", "6th"]);
    for row in &view.rows {
        assert_eq!(row.cells.len(), 6);
        assert!(row.cells.iter().all(String::is_empty));
    }
}

#[test]
fn lesson_markup_per_density() {
    let config = config_with_lesson();
    let cell = |density| render_table(&config, false, density).rows[0].cells[2].clone();

    assert_eq!(cell(Density::Standard), "**10:15-11:15**\n2E\nMB PT A15");
    assert_eq!(cell(Density::Compact), "**10:15-11:15** 2E 📍MB PT A15");
    assert_eq!(cell(Density::Pocket), "10:15-11:15 2E MB PT A15");
}

#[test]
fn lesson_without_location_has_no_location_suffix() {
    let mut config = ScheduleConfig::defaults();
    config.set_cell(DayCode::Tue, p(1), Cell::class_only("4B"));
    let view = render_table(&config, false, Density::Compact);
    let tue = view.rows.iter().find(|row| row.day == DayCode::Tue).unwrap();
    assert_eq!(tue.cells[0], "**08:15-09:15** 4B");
}

#[test]
fn sentinels_ignore_show_empty_and_location() {
    let mut config = ScheduleConfig::defaults();
    config.set_cell(DayCode::Mon, p(1), Cell::new(SENTINEL_UNAVAILABLE, "MB", "PT", "A1"));
    config.set_cell(DayCode::Mon, p(2), Cell::class_only(SENTINEL_FREE_PERIOD));

    for density in Density::ALL {
        for show_empty in [false, true] {
            let view = render_table(&config, show_empty, density);
            assert_eq!(view.rows[0].cells[0], SENTINEL_UNAVAILABLE);
            assert_eq!(view.rows[0].cells[1], SENTINEL_FREE_PERIOD);
        }
    }
}

#[test]
fn rest_day_shown_only_when_included() {
    let mut config = config_with_lesson();
    config.set_weekdays(DayCode::ALL);

    let days = |config: &ScheduleConfig| -> Vec<DayCode> {
        render_table(config, false, Density::Standard)
            .rows
            .iter()
            .map(|row| row.day)
            .collect()
    };
    assert!(!days(&config).contains(&DayCode::Sun));

    config.set_include_rest_day(true);
    assert_eq!(days(&config), DayCode::ALL.to_vec());
}

#[test]
fn columns_follow_active_periods() {
    let mut config = config_with_lesson();
    config.set_active_periods([p(3), p(5)]).unwrap();
    config.set_period_time_str(p(3), "10:20", "11:10").unwrap();

    let view = render_table(&config, false, Density::Pocket);
    assert_eq!(view.header, ["Day", "3rd", "5th"]);
    assert_eq!(view.rows[0].cells, ["10:20-11:10 2E MB PT A15", ""]);
}

#[test]
fn csv_export_keeps_header_and_rows() {
    let config = config_with_lesson();
    let view = render_table(&config, false, Density::Pocket);

    let mut buffer = Vec::new();
    view.write_csv(&mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Day,1st,2nd,3rd,4th,5th,6th"));
    assert_eq!(lines.next(), Some("MON,,,10:15-11:15 2E MB PT A15,,,"));
    assert_eq!(text.lines().count(), 1 + config.visible_days().len());
}

#[test]
fn markdown_replaces_line_breaks() {
    let config = config_with_lesson();
    let markdown = render_table(&config, false, Density::Standard).to_markdown();
    assert!(markdown.starts_with("| Day | 1st |"));
    assert!(markdown.contains("| **10:15-11:15**<br/>2E<br/>MB PT A15 |"));
}

#[test]
fn dataframe_has_one_column_per_header() {
    let config = config_with_lesson();
    let df = render_table(&config, false, Density::Standard)
        .to_dataframe()
        .unwrap();
    assert_eq!(df.width(), 7);
    assert_eq!(df.height(), 6);
}
