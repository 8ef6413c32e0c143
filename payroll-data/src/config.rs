//! TOML run configuration for a payroll preview.
//!
//! ```toml
//! country = "IN"
//! fiscal_year = 2025            # or: effective_date = "2025-06-01"
//! regime = "new"                # India: new/old; US: S, MFJ, MFS, HOH, QSS
//! state = "KA"                  # optional; selects India professional tax
//! annual_ctc = 1200000
//! structure = "structure.csv"   # relative to this file
//! tables_dir = "tables"         # optional; bundled tables when absent
//!
//! [contributions]
//! ESI = false
//!
//! [year_to_date]
//! SS = 150000
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use payroll_core::calculations::{ContributionFlags, YearToDate};
use payroll_core::{Country, FilingStatusCode, PayrollRequest, Regime, SalaryComponent, TableKey};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid run configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown country '{0}'")]
    InvalidCountry(String),

    #[error("regime '{regime}' does not apply to {country}")]
    InvalidRegime { country: Country, regime: String },

    #[error("either fiscal_year or effective_date is required")]
    MissingFiscalYear,

    #[error(
        "effective_date {effective_date} falls in fiscal year {derived}, not {fiscal_year}"
    )]
    ConflictingFiscalYear {
        fiscal_year: i32,
        effective_date: NaiveDate,
        derived: i32,
    },
}

/// One payroll preview run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PayrollRunConfig {
    pub country: String,
    pub fiscal_year: Option<i32>,
    pub effective_date: Option<NaiveDate>,
    pub regime: Option<String>,
    pub state: Option<String>,
    pub annual_ctc: Decimal,
    pub structure: PathBuf,
    pub tables_dir: Option<PathBuf>,
    #[serde(default)]
    pub contributions: ContributionFlags,
    #[serde(default)]
    pub year_to_date: YearToDate,
}

impl PayrollRunConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, RunConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read a config file. Relative `structure` and `tables_dir` paths are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, RunConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RunConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        Ok(match path.parent() {
            Some(base) => config.relative_to(base),
            None => config,
        })
    }

    fn relative_to(
        mut self,
        base: &Path,
    ) -> Self {
        if self.structure.is_relative() {
            self.structure = base.join(&self.structure);
        }
        if let Some(dir) = self.tables_dir.as_mut().filter(|dir| dir.is_relative()) {
            *dir = base.join(&*dir);
        }
        self
    }

    pub fn country(&self) -> Result<Country, RunConfigError> {
        Country::parse(&self.country)
            .ok_or_else(|| RunConfigError::InvalidCountry(self.country.clone()))
    }

    /// The configured regime, defaulting to India's new regime and US single
    /// filers.
    pub fn regime(&self) -> Result<Regime, RunConfigError> {
        let country = self.country()?;
        let Some(text) = self.regime.as_deref() else {
            return Ok(match country {
                Country::India => Regime::New,
                Country::UnitedStates => Regime::Filing(FilingStatusCode::Single),
            });
        };

        match (country, Regime::parse(text)) {
            (Country::India, Some(regime @ (Regime::New | Regime::Old)))
            | (Country::UnitedStates, Some(regime @ Regime::Filing(_))) => Ok(regime),
            _ => Err(RunConfigError::InvalidRegime {
                country,
                regime: text.to_string(),
            }),
        }
    }

    /// Fiscal year from `fiscal_year`, or from `effective_date` when only the
    /// date is given. Both must agree when both are set.
    pub fn fiscal_year(&self) -> Result<i32, RunConfigError> {
        let country = self.country()?;
        match (self.fiscal_year, self.effective_date) {
            (Some(fiscal_year), Some(effective_date)) => {
                let derived = country.fiscal_year_containing(effective_date);
                if derived == fiscal_year {
                    Ok(fiscal_year)
                } else {
                    Err(RunConfigError::ConflictingFiscalYear {
                        fiscal_year,
                        effective_date,
                        derived,
                    })
                }
            }
            (Some(fiscal_year), None) => Ok(fiscal_year),
            (None, Some(effective_date)) => Ok(country.fiscal_year_containing(effective_date)),
            (None, None) => Err(RunConfigError::MissingFiscalYear),
        }
    }

    pub fn table_key(&self) -> Result<TableKey, RunConfigError> {
        Ok(TableKey::new(
            self.country()?,
            self.fiscal_year()?,
            self.regime()?,
        ))
    }

    /// Payroll request for `components` under this configuration.
    pub fn request(
        &self,
        components: Vec<SalaryComponent>,
    ) -> Result<PayrollRequest, RunConfigError> {
        let request = PayrollRequest::new(components, self.annual_ctc, self.table_key()?)
            .with_flags(self.contributions.clone())
            .with_year_to_date(self.year_to_date.clone());
        Ok(match &self.state {
            Some(state) => request.with_state(state.clone()),
            None => request,
        })
    }
}
