//! Ambiguous date parsing and birth/expiry classification
//!
//! Customer files carry dates in whatever order the exporting system chose.
//! Three mutually exclusive anchored patterns decide the ordering from the
//! original text; only then are separators and any trailing time stripped and
//! the leading eight digits decoded with the matching format.

use crate::constants::dates::{
    BIRTH_MAX_AGE_YEARS, BIRTH_MIN_AGE_YEARS, CANONICAL_FORMAT, DAY_MONTH_YEAR,
    EXPIRY_MIN_DAYS_AHEAD, MONTH_DAY_YEAR, NEVER_EXPIRES, YEAR_MONTH_DAY,
};
use crate::app::models::DateRole;
use crate::{Error, Result};
use chrono::{Days, Local, Months, NaiveDate};
use regex::Regex;
use std::fmt;
use tracing::trace;

/// A successfully parsed date value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalDate {
    /// Calendar date, written as `YYYYMMDD`
    Date(NaiveDate),
    /// The `NEVER` sentinel: no expiry
    Never,
}

impl CanonicalDate {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CanonicalDate::Date(date) => Some(*date),
            CanonicalDate::Never => None,
        }
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalDate::Date(date) => write!(f, "{}", date.format(CANONICAL_FORMAT)),
            CanonicalDate::Never => f.write_str(NEVER_EXPIRES),
        }
    }
}

/// Component ordering implied by whichever anchor matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateOrder {
    YearMonthDay,
    DayMonthYear,
    MonthDayYear,
}

impl DateOrder {
    fn format(&self) -> &'static str {
        match self {
            DateOrder::YearMonthDay => "%Y%m%d",
            DateOrder::DayMonthYear => "%d%m%Y",
            DateOrder::MonthDayYear => "%m%d%Y",
        }
    }
}

/// Parses and classifies dates relative to a fixed reference day
#[derive(Debug, Clone)]
pub struct DateClassifier {
    today: NaiveDate,
    year_month_day: Regex,
    day_month_year: Regex,
    month_day_year: Regex,
}

impl DateClassifier {
    /// Create a classifier evaluated against the local calendar date
    pub fn new() -> Result<Self> {
        Self::with_today(Local::now().date_naive())
    }

    /// Create a classifier evaluated against a fixed reference date
    pub fn with_today(today: NaiveDate) -> Result<Self> {
        Ok(Self {
            today,
            year_month_day: Regex::new(YEAR_MONTH_DAY)
                .map_err(|e| Error::pattern("date (year-month-day)", e))?,
            day_month_year: Regex::new(DAY_MONTH_YEAR)
                .map_err(|e| Error::pattern("date (day-month-year)", e))?,
            month_day_year: Regex::new(MONTH_DAY_YEAR)
                .map_err(|e| Error::pattern("date (month-day-year)", e))?,
        })
    }

    /// Reference date used for classification
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Parse a raw value into a canonical date
    ///
    /// Returns `Ok(None)` for a blank value (not supplied), which callers must
    /// keep distinct from `Err(InvalidDate)` (supplied but malformed).
    pub fn parse_canonical(&self, raw: &str) -> Result<Option<CanonicalDate>> {
        let value = raw.trim();
        if value.is_empty() {
            return Ok(None);
        }
        if value == NEVER_EXPIRES {
            return Ok(Some(CanonicalDate::Never));
        }

        let order = self
            .match_order(value)
            .ok_or_else(|| Error::invalid_date(value))?;

        let digits: String = value
            .chars()
            .filter(|c| *c != '-' && *c != '/')
            .take(8)
            .collect();

        let date = NaiveDate::parse_from_str(&digits, order.format())
            .map_err(|_| Error::invalid_date(value))?;
        trace!("Parsed '{}' as {:?} -> {}", value, order, date);

        Ok(Some(CanonicalDate::Date(date)))
    }

    /// Whether the value is a plausible birth date (2 to 100 years ago, inclusive)
    pub fn is_birth_date(&self, raw: &str) -> bool {
        let Some(date) = self.parse_date(raw) else {
            return false;
        };
        let oldest = self
            .today
            .checked_sub_months(Months::new(12 * BIRTH_MAX_AGE_YEARS));
        let youngest = self
            .today
            .checked_sub_months(Months::new(12 * BIRTH_MIN_AGE_YEARS));

        match (oldest, youngest) {
            (Some(oldest), Some(youngest)) => oldest <= date && date <= youngest,
            _ => false,
        }
    }

    /// Whether the value is an expiry date strictly after tomorrow
    ///
    /// `NEVER` is not a date and so never satisfies this check.
    pub fn is_expiry_date(&self, raw: &str) -> bool {
        let Some(date) = self.parse_date(raw) else {
            return false;
        };
        self.today
            .checked_add_days(Days::new(EXPIRY_MIN_DAYS_AHEAD))
            .is_some_and(|tomorrow| date > tomorrow)
    }

    /// Dispatch to the classifier for a date role
    pub fn matches_role(&self, raw: &str, role: DateRole) -> bool {
        match role {
            DateRole::Birth => self.is_birth_date(raw),
            DateRole::Expiry => self.is_expiry_date(raw),
        }
    }

    fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        self.parse_canonical(raw)
            .ok()
            .flatten()
            .and_then(|parsed| parsed.as_date())
    }

    fn match_order(&self, value: &str) -> Option<DateOrder> {
        if self.year_month_day.is_match(value) {
            Some(DateOrder::YearMonthDay)
        } else if self.day_month_year.is_match(value) {
            Some(DateOrder::DayMonthYear)
        } else if self.month_day_year.is_match(value) {
            Some(DateOrder::MonthDayYear)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DateClassifier {
        DateClassifier::with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()).unwrap()
    }

    fn canonical(classifier: &DateClassifier, raw: &str) -> String {
        classifier
            .parse_canonical(raw)
            .unwrap()
            .expect("value should be present")
            .to_string()
    }

    #[test]
    fn test_accepted_orderings_and_separators() {
        let c = classifier();
        assert_eq!(canonical(&c, "1999-08-22"), "19990822");
        assert_eq!(canonical(&c, "1999/08/22"), "19990822");
        assert_eq!(canonical(&c, "19990822"), "19990822");
        assert_eq!(canonical(&c, "08/22/1999"), "19990822");
        assert_eq!(canonical(&c, "08-22-1999"), "19990822");
        assert_eq!(canonical(&c, "22/08/1999"), "19990822");
        assert_eq!(canonical(&c, "22081999"), "19990822");
    }

    #[test]
    fn test_unambiguous_day_month_orderings_agree() {
        let c = classifier();
        for (mdy, dmy, expected) in [
            ("12/31/2023", "31/12/2023", "20231231"),
            ("02/13/1987", "13/02/1987", "19870213"),
            ("07/28/2001", "28/07/2001", "20010728"),
        ] {
            assert_eq!(canonical(&c, mdy), expected);
            assert_eq!(canonical(&c, dmy), expected);
        }
    }

    #[test]
    fn test_ambiguous_day_month_reads_month_first() {
        let c = classifier();
        assert_eq!(canonical(&c, "03/04/2020"), "20200304");
    }

    #[test]
    fn test_trailing_time_is_ignored() {
        let c = classifier();
        assert_eq!(canonical(&c, "1999-08-22 13:45:00"), "19990822");
        assert_eq!(canonical(&c, "1999-08-22T13:45:00Z"), "19990822");
        assert_eq!(canonical(&c, "12/31/2023 11:59 PM"), "20231231");
    }

    #[test]
    fn test_blank_is_absent_not_invalid() {
        let c = classifier();
        assert_eq!(c.parse_canonical("").unwrap(), None);
        assert_eq!(c.parse_canonical("   ").unwrap(), None);
    }

    #[test]
    fn test_invalid_dates_fail() {
        let c = classifier();
        for raw in ["02/30/2020", "2020-13-01", "Harold", "1234-567 Ave", "99/99/9999", "1899-01-01"] {
            let result = c.parse_canonical(raw);
            assert!(
                matches!(result, Err(Error::InvalidDate { .. })),
                "expected invalid date for {raw}: {result:?}"
            );
        }
    }

    #[test]
    fn test_never_sentinel() {
        let c = classifier();
        assert_eq!(c.parse_canonical("NEVER").unwrap(), Some(CanonicalDate::Never));
        assert_eq!(canonical(&c, "NEVER"), "NEVER");
        assert!(c.parse_canonical("never").is_err());
        assert!(!c.is_expiry_date("NEVER"));
        assert!(!c.is_birth_date("NEVER"));
    }

    #[test]
    fn test_birth_date_window() {
        let c = classifier();
        assert!(c.is_birth_date("1974-06-15"));
        assert!(c.is_birth_date("1999-08-22"));
        assert!(!c.is_birth_date("1920-01-01"));
        assert!(!c.is_birth_date("2023-12-31"));
        assert!(!c.is_birth_date("2030-01-01"));
        assert!(!c.is_birth_date(""));
    }

    #[test]
    fn test_birth_date_window_edges_are_inclusive() {
        let c = classifier();
        assert!(c.is_birth_date("1924-06-15"));
        assert!(c.is_birth_date("2022-06-15"));
        assert!(!c.is_birth_date("1924-06-14"));
        assert!(!c.is_birth_date("2022-06-16"));
    }

    #[test]
    fn test_birth_date_fifty_years_before_now() {
        let c = DateClassifier::new().unwrap();
        let fifty_years_ago = c.today().checked_sub_months(Months::new(600)).unwrap();
        assert!(c.is_birth_date(&fifty_years_ago.format("%Y-%m-%d").to_string()));

        let last_year = c.today().checked_sub_months(Months::new(12)).unwrap();
        assert!(!c.is_birth_date(&last_year.format("%Y-%m-%d").to_string()));
    }

    #[test]
    fn test_expiry_must_be_after_tomorrow() {
        let c = classifier();
        assert!(!c.is_expiry_date("2024-06-15"));
        assert!(!c.is_expiry_date("2024-06-16"));
        assert!(c.is_expiry_date("2024-06-17"));
        assert!(c.is_expiry_date("12/31/2027"));
        assert!(!c.is_expiry_date("1999-08-22"));
    }

    #[test]
    fn test_matches_role_dispatch() {
        let c = classifier();
        assert!(c.matches_role("1980-01-01", DateRole::Birth));
        assert!(!c.matches_role("1980-01-01", DateRole::Expiry));
        assert!(c.matches_role("2030-01-01", DateRole::Expiry));
    }
}
