//! Calendar date range type.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inclusive calendar date range.
///
/// The invariant `start <= end` is enforced at construction; both bounds
/// are inclusive. The canonical text form of each bound is `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeRange {
    /// Create a range. Returns `None` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Create a single-day range.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Create the range covering an entire calendar month.
    pub fn full_month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Self::new(start, next - Duration::days(1))
    }

    /// Create the range covering an entire calendar year.
    pub fn full_year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Self::new(start, end)
    }

    /// Create the range covering a calendar quarter (1-4).
    pub fn quarter(year: i32, quarter: u32) -> Option<Self> {
        let start_month = match quarter {
            1 => 1,
            2 => 4,
            3 => 7,
            4 => 10,
            _ => return None,
        };
        let start = NaiveDate::from_ymd_opt(year, start_month, 1)?;
        let end = Self::full_month(year, start_month + 2)?.end;
        Self::new(start, end)
    }

    /// Inclusive start date.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Inclusive end date.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both endpoints.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Human-readable label, e.g. `2025-01-01 to 2025-01-31`.
    ///
    /// The label round-trips through the resolver's ISO range strategy.
    pub fn label(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }

    /// Year of the start date.
    pub fn start_year(&self) -> i32 {
        self.start.year()
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        assert!(TimeRange::new(date(2025, 2, 1), date(2025, 1, 1)).is_none());
        assert!(TimeRange::new(date(2025, 1, 1), date(2025, 1, 1)).is_some());
    }

    #[test]
    fn test_full_month() {
        let range = TimeRange::full_month(2024, 2).unwrap();
        assert_eq!(range.start(), date(2024, 2, 1));
        assert_eq!(range.end(), date(2024, 2, 29)); // leap year
        assert_eq!(range.len_days(), 29);

        let december = TimeRange::full_month(2025, 12).unwrap();
        assert_eq!(december.end(), date(2025, 12, 31));
    }

    #[test]
    fn test_quarter() {
        let q1 = TimeRange::quarter(2025, 1).unwrap();
        assert_eq!(q1.start(), date(2025, 1, 1));
        assert_eq!(q1.end(), date(2025, 3, 31));

        let q4 = TimeRange::quarter(2025, 4).unwrap();
        assert_eq!(q4.end(), date(2025, 12, 31));

        assert!(TimeRange::quarter(2025, 5).is_none());
    }

    #[test]
    fn test_label() {
        let range = TimeRange::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap();
        assert_eq!(range.label(), "2025-01-01 to 2025-01-31");
    }
}
