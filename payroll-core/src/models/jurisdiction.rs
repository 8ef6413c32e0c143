//! Jurisdiction keys: country, regime and fiscal-year arithmetic.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::FilingStatusCode;

/// Countries with a tax table layout understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Country {
    India,
    UnitedStates,
}

impl Country {
    /// ISO 3166-1 alpha-2 code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::India => "IN",
            Self::UnitedStates => "US",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" | "IND" | "INDIA" => Some(Self::India),
            "US" | "USA" => Some(Self::UnitedStates),
            _ => None,
        }
    }

    /// Month (1-12) on which the fiscal year starts.
    pub fn fiscal_year_start_month(&self) -> u32 {
        match self {
            Self::India => 4,
            Self::UnitedStates => 1,
        }
    }

    /// Fiscal year that contains `date`, labelled by the calendar year in
    /// which that fiscal year starts. India's FY 2025 runs 2025-04-01 to
    /// 2026-03-31; the US tax year is the calendar year.
    pub fn fiscal_year_containing(
        &self,
        date: NaiveDate,
    ) -> i32 {
        if date.month() < self.fiscal_year_start_month() {
            date.year() - 1
        } else {
            date.year()
        }
    }
}

impl fmt::Display for Country {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tax regime selecting one table among several published for the same
/// country and year.
///
/// India publishes a `New` (default) and an `Old` regime; the US publishes
/// one schedule per filing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Regime {
    New,
    Old,
    Filing(FilingStatusCode),
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Old => "old",
            Self::Filing(status) => status.as_str(),
        }
    }

    /// Accepts `new`, `old` (any case) or a filing status code (`S`, `MFJ`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "old" => Some(Self::Old),
            _ => FilingStatusCode::parse(&s.to_ascii_uppercase()).map(Self::Filing),
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key of a published tax table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableKey {
    pub country: Country,
    pub fiscal_year: i32,
    pub regime: Regime,
}

impl TableKey {
    pub fn new(
        country: Country,
        fiscal_year: i32,
        regime: Regime,
    ) -> Self {
        Self {
            country,
            fiscal_year,
            regime,
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}/{}/{}", self.country, self.fiscal_year, self.regime)
    }
}
