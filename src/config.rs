use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::day::DayCode;
use crate::period::{MAX_PERIODS, PeriodIndex, PeriodTime};

/// Class value marking a period the teacher is on call.
pub const SENTINEL_UNAVAILABLE: &str = "DISP.";
/// Class value marking a free period.
pub const SENTINEL_FREE_PERIOD: &str = "—";

pub const SENTINELS: [&str; 2] = [SENTINEL_UNAVAILABLE, SENTINEL_FREE_PERIOD];

pub const DEFAULT_TEACHER: &str = "Maria Rossi";
pub const DEFAULT_SUBJECTS: &str = "Mathematics and Physics";
pub const DEFAULT_INSTITUTION: &str = "Liceo Scientifico \"E. Fermi\"";
pub const DEFAULT_SCHOOL_YEAR: &str = "2025/2026";

/// Content of one (day, period) slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cell {
    pub class_name: String,
    pub building: String,
    pub floor: String,
    pub room: String,
}

impl Cell {
    pub fn new(
        class_name: impl Into<String>,
        building: impl Into<String>,
        floor: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            building: building.into(),
            floor: floor.into(),
            room: room.into(),
        }
    }

    pub fn class_only(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    pub fn is_sentinel(&self) -> bool {
        SENTINELS.contains(&self.class_name.as_str())
    }

    /// True when the class holds something other than blank or a sentinel.
    pub fn has_lesson(&self) -> bool {
        !self.class_name.is_empty() && !self.is_sentinel()
    }

    /// Building, floor and room joined by spaces, blanks dropped.
    pub fn location(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.building, &self.floor, &self.room]
            .into_iter()
            .map(String::as_str)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

pub type DaySchedule = BTreeMap<PeriodIndex, Cell>;

/// The whole persisted timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleConfig {
    pub teacher: String,
    pub subjects: String,
    pub institution: String,
    pub school_year: String,
    pub weekdays: Vec<DayCode>,
    pub rest_day: DayCode,
    pub include_rest_day: bool,
    pub daily_periods: u8,
    pub active_periods: Vec<PeriodIndex>,
    pub period_times: BTreeMap<PeriodIndex, PeriodTime>,
    pub cells: BTreeMap<DayCode, DaySchedule>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ScheduleConfig {
    /// Monday to Saturday, Sunday off, six periods from 08:15, no cells.
    pub fn defaults() -> Self {
        let active_periods: Vec<PeriodIndex> = PeriodIndex::all().collect();
        let period_times = active_periods
            .iter()
            .map(|&period| (period, PeriodTime::default_for(period)))
            .collect();
        Self {
            teacher: DEFAULT_TEACHER.to_string(),
            subjects: DEFAULT_SUBJECTS.to_string(),
            institution: DEFAULT_INSTITUTION.to_string(),
            school_year: DEFAULT_SCHOOL_YEAR.to_string(),
            weekdays: DayCode::ALL[..6].to_vec(),
            rest_day: DayCode::Sun,
            include_rest_day: false,
            daily_periods: MAX_PERIODS,
            active_periods,
            period_times,
            cells: BTreeMap::new(),
        }
    }

    /// Weekdays in display order, minus the rest day unless it is included.
    pub fn visible_days(&self) -> Vec<DayCode> {
        self.weekdays
            .iter()
            .copied()
            .filter(|&day| self.include_rest_day || day != self.rest_day)
            .collect()
    }

    /// Stored time for `period`, or its canonical default.
    pub fn period_time(&self, period: PeriodIndex) -> PeriodTime {
        self.period_times
            .get(&period)
            .copied()
            .unwrap_or_else(|| PeriodTime::default_for(period))
    }

    pub fn stored_cell(&self, day: DayCode, period: PeriodIndex) -> Option<&Cell> {
        self.cells.get(&day).and_then(|slots| slots.get(&period))
    }

    /// True when any visible (day, active period) slot holds a real lesson.
    pub fn has_lessons(&self) -> bool {
        self.visible_days().into_iter().any(|day| {
            self.active_periods.iter().any(|&period| {
                self.stored_cell(day, period)
                    .is_some_and(Cell::has_lesson)
            })
        })
    }

    /// Installs the canonical time for every active period that lacks one.
    /// Returns the periods that received a default.
    pub fn ensure_period_times(&mut self) -> Vec<PeriodIndex> {
        let mut installed = Vec::new();
        for &period in &self.active_periods {
            if !self.period_times.contains_key(&period) {
                self.period_times
                    .insert(period, PeriodTime::default_for(period));
                installed.push(period);
            }
        }
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_drops_blank_parts() {
        assert_eq!(
            Cell::new("2E", "MB", "", "A15").location().as_deref(),
            Some("MB A15")
        );
        assert_eq!(Cell::class_only("2E").location(), None);
    }

    #[test]
    fn sentinels_are_not_lessons() {
        assert!(!Cell::class_only(SENTINEL_UNAVAILABLE).has_lesson());
        assert!(!Cell::class_only(SENTINEL_FREE_PERIOD).has_lesson());
        assert!(!Cell::default().has_lesson());
        assert!(Cell::class_only("1A").has_lesson());
    }

    #[test]
    fn defaults_hide_sunday() {
        let config = ScheduleConfig::defaults();
        assert_eq!(config.visible_days().len(), 6);
        assert!(!config.visible_days().contains(&DayCode::Sun));
        assert_eq!(config.period_times.len(), 6);
    }

    #[test]
    fn period_keys_serialize_as_text() {
        let config = ScheduleConfig::defaults();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["periodTimes"]["1"]["start"], "08:15");
        assert_eq!(value["restDay"], "SUN");
        assert_eq!(value["activePeriods"][0], 1);
    }
}
