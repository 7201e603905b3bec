use crate::error::RatesError;
use std::fmt::Display;
use std::str::FromStr;

/// Query granularity for historical rate lookups.
///
/// - `Day`: the full series, unfiltered.
/// - `Month`: snapshots sharing the reference date's day-of-month.
/// - `Year`: snapshots sharing the reference date's month and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day,
    Month,
    Year,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Period::Day => "day",
                Period::Month => "month",
                Period::Year => "year",
            }
        )
    }
}

impl FromStr for Period {
    type Err = RatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(RatesError::UnknownPeriod(s.to_string())),
        }
    }
}
