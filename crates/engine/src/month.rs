//! Calendar month arithmetic.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Months, NaiveDate};

use crate::EngineError;

/// A calendar month, always representable as a `NaiveDate` range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The following month. Stays put at the end of the representable range.
    pub fn next(self) -> Self {
        self.first_day()
            .checked_add_months(Months::new(1))
            .map(Self::of)
            .unwrap_or(self)
    }

    /// The preceding month. Stays put at the start of the representable range.
    pub fn previous(self) -> Self {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .map(Self::of)
            .unwrap_or(self)
    }

    pub fn name(self) -> &'static str {
        match self.month {
            1 => "January",
            2 => "February",
            3 => "March",
            4 => "April",
            5 => "May",
            6 => "June",
            7 => "July",
            8 => "August",
            9 => "September",
            10 => "October",
            11 => "November",
            12 => "December",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year)
    }
}

/// Parses `YYYY-MM`.
impl FromStr for YearMonth {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::Validation(format!("invalid month: {value}"));
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn navigation_crosses_year_boundaries() {
        let december = YearMonth::new(2024, 12).unwrap();
        assert_eq!(december.next(), YearMonth::new(2025, 1).unwrap());
        assert_eq!(december.next().previous(), december);
        assert_eq!(
            YearMonth::new(2025, 1).unwrap().previous(),
            YearMonth::new(2024, 12).unwrap()
        );
    }

    #[test]
    fn last_day_handles_leap_years() {
        assert_eq!(YearMonth::new(2024, 2).unwrap().last_day(), date(2024, 2, 29));
        assert_eq!(YearMonth::new(2025, 2).unwrap().last_day(), date(2025, 2, 28));
        assert_eq!(YearMonth::new(2025, 6).unwrap().last_day(), date(2025, 6, 30));
    }

    #[test]
    fn parses_and_displays() {
        let june: YearMonth = "2025-06".parse().unwrap();
        assert_eq!(june, YearMonth::of(date(2025, 6, 17)));
        assert_eq!(june.to_string(), "June 2025");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("june".parse::<YearMonth>().is_err());
    }

    #[test]
    fn contains_only_its_own_days() {
        let june = YearMonth::new(2025, 6).unwrap();
        assert!(june.contains(date(2025, 6, 1)));
        assert!(june.contains(date(2025, 6, 30)));
        assert!(!june.contains(date(2025, 7, 1)));
        assert!(!june.contains(date(2024, 6, 15)));
    }
}
