//! Ledger dates (`YYYYMMDD`) and month keys (`YYYY-MM`).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A validated ledger date. The wire form is always the 8-character `YYYYMMDD` string, which also
/// sorts chronologically.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LedgerDate(NaiveDate);

impl LedgerDate {
    /// Parses an 8-character `YYYYMMDD` string. Anything else, including padded strings and
    /// impossible calendar dates, is `None`: such dates are treated as absent rather than as errors.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(s, "%Y%m%d").ok().map(Self)
    }

    /// Parses an optional raw date string, treating blanks and malformed values as absent.
    pub fn parse_opt(s: Option<&str>) -> Option<Self> {
        s.and_then(Self::parse)
    }

    pub fn month(&self) -> MonthKey {
        MonthKey {
            year: self.0.year(),
            month: self.0.month(),
        }
    }

    /// Formats as `dd/mm/yyyy`, the form used in exported reports.
    pub fn display_br(&self) -> String {
        self.0.format("%d/%m/%Y").to_string()
    }
}

impl Display for LedgerDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl Serialize for LedgerDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A calendar month used by the month filter, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .filter(|(y, m)| y.len() == 4 && m.len() == 2)
            .ok_or_else(|| anyhow::anyhow!("Invalid month '{s}', expected YYYY-MM"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid year in month '{s}'"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid month number in month '{s}'"))?;
        MonthKey::new(year, month).ok_or_else(|| anyhow::anyhow!("Month out of range in '{s}'"))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MonthKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let d = LedgerDate::parse("20240315").unwrap();
        assert_eq!(d.to_string(), "20240315");
        assert_eq!(d.month().to_string(), "2024-03");
        assert_eq!(d.display_br(), "15/03/2024");
    }

    #[test]
    fn test_parse_rejects_wrong_length_and_garbage() {
        assert!(LedgerDate::parse("").is_none());
        assert!(LedgerDate::parse("2024031").is_none());
        assert!(LedgerDate::parse("2024-03-15").is_none());
        assert!(LedgerDate::parse("2024ab15").is_none());
        assert!(LedgerDate::parse("20240231").is_none());
        assert!(LedgerDate::parse(" 20240101 ").is_none());
        assert!(LedgerDate::parse("20240101 ").is_none());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a = LedgerDate::parse("20231231").unwrap();
        let b = LedgerDate::parse("20240101").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_month_key_parse() {
        assert_eq!(MonthKey::from_str("2024-07").unwrap(), MonthKey::new(2024, 7).unwrap());
        assert!(MonthKey::from_str("2024-13").is_err());
        assert!(MonthKey::from_str("2024-7").is_err());
        assert!(MonthKey::from_str("202407").is_err());
    }
}
