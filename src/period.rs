use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::editor::ValidationError;

pub const MAX_PERIODS: u8 = 6;

const TIME_FORMAT: &str = "%H:%M";

/// Canonical start/end ladder for periods 1..=6, as `(hour, minute)` pairs.
const DEFAULT_LADDER: [((u32, u32), (u32, u32)); 6] = [
    ((8, 15), (9, 15)),
    ((9, 15), (10, 15)),
    ((10, 15), (11, 15)),
    ((11, 15), (12, 15)),
    ((12, 15), (13, 15)),
    ((13, 15), (14, 15)),
];

const FALLBACK_SLOT: ((u32, u32), (u32, u32)) = ((8, 15), (9, 15));

/// One numbered teaching slot of the day, always within `1..=MAX_PERIODS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PeriodIndex(u8);

impl PeriodIndex {
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (1..=MAX_PERIODS).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::PeriodOutOfRange(value))
        }
    }

    pub fn all() -> impl Iterator<Item = PeriodIndex> {
        (1..=MAX_PERIODS).map(PeriodIndex)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// `1st`, `2nd`, `3rd`, `4th`...
    pub fn ordinal(self) -> String {
        let n = self.0;
        let suffix = match (n % 10, n % 100) {
            (_, 11..=13) => "th",
            (1, _) => "st",
            (2, _) => "nd",
            (3, _) => "rd",
            _ => "th",
        };
        format!("{n}{suffix}")
    }

    /// Parses a comma separated list such as `1,2,4`.
    pub fn parse_list(input: &str) -> Result<Vec<PeriodIndex>, ValidationError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(PeriodIndex::from_str)
            .collect()
    }
}

impl TryFrom<u8> for PeriodIndex {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PeriodIndex> for u8 {
    fn from(value: PeriodIndex) -> Self {
        value.0
    }
}

impl FromStr for PeriodIndex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u8>()
            .map_err(|_| ValidationError::InvalidPeriod(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for PeriodIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Start and end of a period. Serialized as `{"start": "HH:MM", "end": "HH:MM"}`;
/// deserializing goes through [`PeriodTime::new`], so `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriodTime")]
pub struct PeriodTime {
    #[serde(with = "hh_mm")]
    pub start: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end: NaiveTime,
}

#[derive(Deserialize)]
struct RawPeriodTime {
    #[serde(with = "hh_mm")]
    start: NaiveTime,
    #[serde(with = "hh_mm")]
    end: NaiveTime,
}

impl TryFrom<RawPeriodTime> for PeriodTime {
    type Error = ValidationError;

    fn try_from(raw: RawPeriodTime) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl PeriodTime {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::StartNotBeforeEnd {
                start: start.format(TIME_FORMAT).to_string(),
                end: end.format(TIME_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    /// Canonical range for `period`; indices past the ladder get the fallback slot.
    pub fn default_for(period: PeriodIndex) -> Self {
        let ((sh, sm), (eh, em)) = DEFAULT_LADDER
            .get(usize::from(period.get()) - 1)
            .copied()
            .unwrap_or(FALLBACK_SLOT);
        Self {
            start: hm(sh, sm),
            end: hm(eh, em),
        }
    }

    /// `10:15-11:15`
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

pub fn parse_time(input: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidTime(input.to_string()))
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(super::TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), super::TIME_FORMAT)
            .map_err(|err| de::Error::custom(format!("invalid time '{raw}': {err}")))
    }
}
