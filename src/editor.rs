use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{
    Cell, DEFAULT_INSTITUTION, DEFAULT_SUBJECTS, DEFAULT_TEACHER, SENTINEL_FREE_PERIOD,
    SENTINEL_UNAVAILABLE, ScheduleConfig,
};
use crate::day::{DayCode, UnknownDay};
use crate::period::{MAX_PERIODS, PeriodIndex, PeriodTime};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid time '{0}' (expected HH:MM)")]
    InvalidTime(String),
    #[error("period start {start} must be before end {end}")]
    StartNotBeforeEnd { start: String, end: String },
    #[error("invalid period '{0}'")]
    InvalidPeriod(String),
    #[error("period {0} is out of range (1-{max})", max = MAX_PERIODS)]
    PeriodOutOfRange(u8),
    #[error("at most {max} active periods are allowed (got {0})", max = MAX_PERIODS)]
    TooManyPeriods(usize),
    #[error(transparent)]
    UnknownDay(#[from] UnknownDay),
}

/// Caps the raw selection at six entries, then drops repeats.
fn checked_periods(
    periods: impl IntoIterator<Item = PeriodIndex>,
) -> Result<Vec<PeriodIndex>, ValidationError> {
    let periods: Vec<PeriodIndex> = periods.into_iter().collect();
    if periods.len() > usize::from(MAX_PERIODS) {
        return Err(ValidationError::TooManyPeriods(periods.len()));
    }
    Ok(dedup_in_order(periods))
}

fn dedup_in_order<T: PartialEq + Copy>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::new();
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

impl ScheduleConfig {
    pub fn set_teacher(&mut self, teacher: impl Into<String>) {
        self.teacher = teacher.into();
    }

    pub fn set_subjects(&mut self, subjects: impl Into<String>) {
        self.subjects = subjects.into();
    }

    pub fn set_institution(&mut self, institution: impl Into<String>) {
        self.institution = institution.into();
    }

    pub fn set_school_year(&mut self, school_year: impl Into<String>) {
        self.school_year = school_year.into();
    }

    pub fn set_weekdays(&mut self, days: impl IntoIterator<Item = DayCode>) {
        self.weekdays = dedup_in_order(days);
    }

    pub fn set_rest_day(&mut self, day: DayCode) {
        self.rest_day = day;
    }

    pub fn set_include_rest_day(&mut self, include: bool) {
        self.include_rest_day = include;
    }

    /// Replaces the active periods. Newly active periods without a stored
    /// time get the canonical one; stored times are never overwritten.
    pub fn set_active_periods(
        &mut self,
        periods: impl IntoIterator<Item = PeriodIndex>,
    ) -> Result<(), ValidationError> {
        self.active_periods = checked_periods(periods)?;
        let installed = self.ensure_period_times();
        if !installed.is_empty() {
            debug!(?installed, "installed default period times");
        }
        Ok(())
    }

    /// Re-establishes the record invariants on a deserialized record:
    /// unique weekdays, at most six unique active periods, a time entry per
    /// active period. Returns the periods that received a default time.
    pub fn normalize(&mut self) -> Result<Vec<PeriodIndex>, ValidationError> {
        let periods = checked_periods(self.active_periods.iter().copied())?;
        self.active_periods = periods;
        self.weekdays = dedup_in_order(self.weekdays.iter().copied());
        Ok(self.ensure_period_times())
    }

    pub fn set_period_time(&mut self, period: PeriodIndex, time: PeriodTime) {
        self.period_times.insert(period, time);
    }

    /// Parses and validates `start`/`end` before touching the record.
    pub fn set_period_time_str(
        &mut self,
        period: PeriodIndex,
        start: &str,
        end: &str,
    ) -> Result<PeriodTime, ValidationError> {
        let time = PeriodTime::parse(start, end)?;
        self.set_period_time(period, time);
        Ok(time)
    }

    /// Stored cell or an empty one; stored content always wins.
    pub fn cell(&self, day: DayCode, period: PeriodIndex) -> Cell {
        self.stored_cell(day, period).cloned().unwrap_or_default()
    }

    /// Materializes an empty entry on first access.
    pub fn cell_mut(&mut self, day: DayCode, period: PeriodIndex) -> &mut Cell {
        self.cells.entry(day).or_default().entry(period).or_default()
    }

    pub fn set_cell(&mut self, day: DayCode, period: PeriodIndex, cell: Cell) {
        *self.cell_mut(day, period) = cell;
    }

    pub fn clear_cell(&mut self, day: DayCode, period: PeriodIndex) {
        *self.cell_mut(day, period) = Cell::default();
    }

    /// Rebuilds every weekday x active period slot as an explicit empty cell.
    pub fn initialize_empty_schedule(&mut self) {
        self.cells = self
            .weekdays
            .iter()
            .map(|&day| {
                let slots = self
                    .active_periods
                    .iter()
                    .map(|&period| (period, Cell::default()))
                    .collect();
                (day, slots)
            })
            .collect();
    }

    /// Fills profile labels and a six-day illustrative timetable.
    pub fn load_example_data(&mut self) {
        self.teacher = DEFAULT_TEACHER.to_string();
        self.subjects = DEFAULT_SUBJECTS.to_string();
        self.institution = DEFAULT_INSTITUTION.to_string();
        self.cells = example_cells();
    }
}

fn example_cells() -> BTreeMap<DayCode, BTreeMap<PeriodIndex, Cell>> {
    let on_call = || Cell::class_only(SENTINEL_UNAVAILABLE);
    let empty = Cell::default;
    let lesson = Cell::new;

    let week: [(DayCode, [Cell; 6]); 6] = [
        (
            DayCode::Mon,
            [
                empty(),
                empty(),
                lesson("2Esa", "MB", "PT", "A15"),
                lesson("1Dsa", "MA", "PT", "A1"),
                empty(),
                empty(),
            ],
        ),
        (
            DayCode::Tue,
            [on_call(), on_call(), on_call(), on_call(), on_call(), on_call()],
        ),
        (
            DayCode::Wed,
            [
                lesson("1Asp", "C", "1P", "A43"),
                lesson("1Asp", "C", "1P", "A43"),
                on_call(),
                empty(),
                empty(),
                empty(),
            ],
        ),
        (
            DayCode::Thu,
            [
                lesson("1Bsa", "MB", "PT", "A16"),
                Cell::class_only(SENTINEL_FREE_PERIOD),
                lesson("1Asp", "C", "1P", "A43"),
                lesson("1Asp", "C", "1P", "A43"),
                lesson("1Asa", "MA", "2P", "A20"),
                empty(),
            ],
        ),
        (
            DayCode::Fri,
            [
                lesson("1Dsa", "MA", "PT", "A1"),
                on_call(),
                lesson("2Esa", "MB", "PT", "A15"),
                lesson("1Asp", "C", "1P", "A43"),
                lesson("1Asp", "C", "1P", "A43"),
                empty(),
            ],
        ),
        (
            DayCode::Sat,
            [
                lesson("1Asp", "C", "1P", "A43"),
                on_call(),
                lesson("1Bsa", "MB", "PT", "A13"),
                lesson("1Asa", "MA", "2P", "A20"),
                empty(),
                empty(),
            ],
        ),
    ];

    week.into_iter()
        .map(|(day, slots)| (day, PeriodIndex::all().zip(slots).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: u8) -> PeriodIndex {
        PeriodIndex::new(n).unwrap()
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        assert_eq!(dedup_in_order([3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn selection_of_more_than_six_is_rejected_before_dedup() {
        let mut config = ScheduleConfig::defaults();
        let before = config.active_periods.clone();
        let err = config
            .set_active_periods([1, 2, 3, 4, 5, 6, 1].map(p))
            .unwrap_err();
        assert_eq!(err, ValidationError::TooManyPeriods(7));
        assert_eq!(config.active_periods, before);
    }

    #[test]
    fn normalize_dedups_days_and_fills_times() {
        let mut config = ScheduleConfig::defaults();
        config.weekdays = vec![DayCode::Mon, DayCode::Tue, DayCode::Mon];
        config.active_periods = vec![p(2), p(2), p(4)];
        config.period_times.clear();

        let installed = config.normalize().unwrap();
        assert_eq!(config.weekdays, vec![DayCode::Mon, DayCode::Tue]);
        assert_eq!(config.active_periods, vec![p(2), p(4)]);
        assert_eq!(installed, vec![p(2), p(4)]);
    }

    #[test]
    fn example_covers_six_days() {
        let cells = example_cells();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[&DayCode::Mon][&p(3)].class_name, "2Esa");
        assert_eq!(cells[&DayCode::Thu][&p(2)].class_name, SENTINEL_FREE_PERIOD);
        assert!(cells.values().all(|slots| slots.len() == 6));
    }
}
