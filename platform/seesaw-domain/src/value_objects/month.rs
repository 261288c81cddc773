use crate::errors::{BacktestError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(BacktestError::InvalidData(format!(
                "month must be 1..=12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: &Month) -> i64 {
        let from = self.year as i64 * 12 + (self.month as i64 - 1);
        let to = other.year as i64 * 12 + (other.month as i64 - 1);
        to - from
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = BacktestError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| BacktestError::Parse(format!("invalid month label: {trimmed}")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| BacktestError::Parse(format!("invalid month label: {trimmed}")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| BacktestError::Parse(format!("invalid month label: {trimmed}")))?;
        Month::new(year, month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Month;
    use chrono::NaiveDate;

    #[test]
    fn next_rolls_over_year_end() {
        let dec = Month::new(2023, 12).expect("month");
        assert_eq!(dec.next(), Month::new(2024, 1).expect("month"));
        assert_eq!(dec.months_until(&dec.next().next()), 2);
    }

    #[test]
    fn parses_and_displays_labels() {
        let month: Month = "2024-03".parse().expect("parse");
        assert_eq!(month.to_string(), "2024-03");
        assert_eq!(
            Month::from_date(NaiveDate::from_ymd_opt(2024, 3, 28).expect("date")),
            month
        );
        assert!("2024-13".parse::<Month>().is_err());
        assert!("March".parse::<Month>().is_err());
    }

    #[test]
    fn serde_uses_label_form() {
        let month = Month::new(2021, 7).expect("month");
        let json = serde_json::to_string(&month).expect("serialize");
        assert_eq!(json, "\"2021-07\"");
        let back: Month = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, month);
    }
}
