//! Calendar-day arithmetic.
//!
//! Everything here works on `NaiveDate`, which carries no time of day and no
//! zone, so adding days or diffing two dates can never shift across midnight.

use crate::error::{Result, TileError};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed number of calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// `date` shifted by `days` (negative moves backwards). Saturates at the
/// representable range instead of panicking.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| TileError::InvalidDate(s.to_string()))
}

/// Sunday-based column index (Sun = 0 .. Sat = 6).
pub fn weekday_column(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Single-letter weekday, as printed above timeline columns.
pub fn weekday_letter(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Sun | Weekday::Sat => "S",
        Weekday::Mon => "M",
        Weekday::Tue | Weekday::Thu => "T",
        Weekday::Wed => "W",
        Weekday::Fri => "F",
    }
}

// ---------------------------------------------------------------------------
// YearMonth
// ---------------------------------------------------------------------------

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar month. `month` is always 1..=12. Serializes as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(TileError::InvalidDate(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    pub fn days_in_month(self) -> u32 {
        self.last_day().day()
    }

    pub fn next(self) -> Self {
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

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Day `day` of this month, if it exists.
    pub fn day(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// "February 2025"
    pub fn label(self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TileError::InvalidDate(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).map_err(|_| invalid())
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> String {
        ym.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = TileError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(d("2025-01-31"), d("2025-02-02")), 2);
        assert_eq!(days_between(d("2025-02-02"), d("2025-01-31")), -2);
        assert_eq!(days_between(d("2025-03-09"), d("2025-03-09")), 0);
    }

    #[test]
    fn days_between_ignores_dst_changes() {
        // US DST starts 2025-03-09; a timestamp-based diff would see 23h.
        assert_eq!(days_between(d("2025-03-08"), d("2025-03-10")), 2);
        assert_eq!(days_between(d("2025-11-01"), d("2025-11-03")), 2);
    }

    #[test]
    fn add_days_crosses_month_and_year() {
        assert_eq!(add_days(d("2025-01-31"), 1), d("2025-02-01"));
        assert_eq!(add_days(d("2024-12-31"), 1), d("2025-01-01"));
        assert_eq!(add_days(d("2025-03-01"), -1), d("2025-02-28"));
        assert_eq!(add_days(d("2024-03-01"), -1), d("2024-02-29"));
    }

    #[test]
    fn leap_year_month_lengths() {
        assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2025, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2000, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(1900, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2025, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn month_navigation_wraps_years() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2025, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
        assert_eq!(YearMonth::new(2025, 1).unwrap().prev(), dec);
    }

    #[test]
    fn year_month_parse_and_display() {
        let ym: YearMonth = "2025-02".parse().unwrap();
        assert_eq!(ym, YearMonth { year: 2025, month: 2 });
        assert_eq!(ym.to_string(), "2025-02");
        assert_eq!(ym.label(), "February 2025");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("2025".parse::<YearMonth>().is_err());
        assert!("feb-2025".parse::<YearMonth>().is_err());
    }

    #[test]
    fn year_month_serializes_as_string() {
        let ym = YearMonth::new(2025, 3).unwrap();
        assert_eq!(serde_json::to_string(&ym).unwrap(), "\"2025-03\"");
        let back: YearMonth = serde_json::from_str("\"2025-03\"").unwrap();
        assert_eq!(back, ym);
    }

    #[test]
    fn weekday_helpers() {
        // 2025-02-01 is a Saturday.
        assert_eq!(weekday_column(d("2025-02-01")), 6);
        assert_eq!(weekday_column(d("2025-02-02")), 0);
        assert!(is_weekend(d("2025-02-01")));
        assert!(!is_weekend(d("2025-02-03")));
        assert_eq!(weekday_letter(d("2025-02-05")), "W");
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("02/03/2025").is_err());
        assert_eq!(parse_date(" 2025-02-03 ").unwrap(), d("2025-02-03"));
    }
}
