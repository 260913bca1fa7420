use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day of the teaching week, stored and displayed as a three-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayCode {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayCode {
    pub const ALL: [DayCode; 7] = [
        DayCode::Mon,
        DayCode::Tue,
        DayCode::Wed,
        DayCode::Thu,
        DayCode::Fri,
        DayCode::Sat,
        DayCode::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayCode::Mon => "MON",
            DayCode::Tue => "TUE",
            DayCode::Wed => "WED",
            DayCode::Thu => "THU",
            DayCode::Fri => "FRI",
            DayCode::Sat => "SAT",
            DayCode::Sun => "SUN",
        }
    }

    /// Parses a comma separated list such as `MON,TUE,WED`.
    pub fn parse_list(input: &str) -> Result<Vec<DayCode>, UnknownDay> {
        input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(DayCode::from_str)
            .collect()
    }
}

impl fmt::Display for DayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day '{0}' (expected one of MON, TUE, WED, THU, FRI, SAT, SUN)")]
pub struct UnknownDay(pub String);

impl FromStr for DayCode {
    type Err = UnknownDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        DayCode::ALL
            .into_iter()
            .find(|day| day.as_str() == upper)
            .ok_or_else(|| UnknownDay(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("mon".parse::<DayCode>().unwrap(), DayCode::Mon);
        assert_eq!(" SUN ".parse::<DayCode>().unwrap(), DayCode::Sun);
        assert!("Monday".parse::<DayCode>().is_err());
    }

    #[test]
    fn parse_list_keeps_order() {
        let days = DayCode::parse_list("FRI, mon,WED").unwrap();
        assert_eq!(days, vec![DayCode::Fri, DayCode::Mon, DayCode::Wed]);
    }

    #[test]
    fn serializes_as_upper_case_code() {
        assert_eq!(serde_json::to_string(&DayCode::Thu).unwrap(), "\"THU\"");
    }
}
