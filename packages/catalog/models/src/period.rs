//! Year-month period codes.
//!
//! Every series in the dashboard is indexed by a [`Period`], stored in the
//! catalog as a single integer `YYYY * 100 + MM` (e.g. `202401`).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A calendar month encoded as `YYYYMM`.
///
/// Ordering follows the encoded integer, which is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Period(u32);

impl Period {
    /// Creates a period from a year (1-9999) and a month (1-12).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPeriodError`] if either component is out of range.
    pub fn new(year: u32, month: u32) -> Result<Self, InvalidPeriodError> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(InvalidPeriodError {
                value: format!("{year:04}-{month:02}"),
            });
        }
        Ok(Self(year * 100 + month))
    }

    /// Creates a period from its `YYYYMM` integer code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPeriodError`] if the month part is not 1-12 or the
    /// year part is not 1-9999.
    pub fn from_code(code: u32) -> Result<Self, InvalidPeriodError> {
        Self::new(code / 100, code % 100).map_err(|_| InvalidPeriodError {
            value: code.to_string(),
        })
    }

    /// Returns the `YYYYMM` integer code.
    #[must_use]
    pub const fn code(self) -> u32 {
        self.0
    }

    /// Returns the year component.
    #[must_use]
    pub const fn year(self) -> u32 {
        self.0 / 100
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub const fn month(self) -> u32 {
        self.0 % 100
    }

    /// Returns the first day of the month.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn to_date(self) -> NaiveDate {
        // Year and month are validated on construction, so this is always `Some`.
        NaiveDate::from_ymd_opt(self.year() as i32, self.month(), 1).unwrap_or_default()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl TryFrom<u32> for Period {
    type Error = InvalidPeriodError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<Period> for u32 {
    fn from(period: Period) -> Self {
        period.0
    }
}

impl From<Period> for i64 {
    fn from(period: Period) -> Self {
        Self::from(period.0)
    }
}

impl FromStr for Period {
    type Err = InvalidPeriodError;

    /// Parses either `YYYYMM` or `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidPeriodError {
            value: s.to_string(),
        };
        let trimmed = s.trim();

        if let Some((year, month)) = trimmed.split_once('-') {
            let year: u32 = year.parse().map_err(|_| invalid())?;
            let month: u32 = month.parse().map_err(|_| invalid())?;
            return Self::new(year, month).map_err(|_| invalid());
        }

        if trimmed.len() != 6 {
            return Err(invalid());
        }
        let code: u32 = trimmed.parse().map_err(|_| invalid())?;
        Self::from_code(code).map_err(|_| invalid())
    }
}

/// Error returned when a value cannot be interpreted as a [`Period`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPeriodError {
    /// The rejected input, as text.
    pub value: String,
}

impl fmt::Display for InvalidPeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid period '{}': expected YYYYMM with a month from 01 to 12",
            self.value
        )
    }
}

impl std::error::Error for InvalidPeriodError {}
