//! Statutory contribution calculations.
//!
//! Applies each [`StatutoryContribution`] of a table to the resolved basic
//! salary or total earnings, clamping the basis to the contribution's wage
//! ceiling, and emits an employee deduction line plus an employer
//! contribution line.
//!
//! # Ceilings
//!
//! | Period | Monthly basis | Annual figure |
//! |--------|---------------|---------------|
//! | none | basis | monthly × 12 |
//! | monthly | `min(basis, ceiling)` | monthly × 12 |
//! | annual | `min(basis, ceiling − year-to-date basis)` | `min(basis × 12, ceiling) × rate` |
//!
//! Year-to-date bases are supplied by the caller through [`YearToDate`]; this
//! module never tracks them.
//!
//! India professional tax is levied by state. When the request names a state
//! whose schedule the table carries, the slab reached by total monthly
//! earnings adds a `Professional Tax` deduction; a zero slab adds no line.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::calculations::compute_statutory;
//! # use payroll_core::{Ceiling, ContributionBasis, Country, JurisdictionRules,
//! #     JurisdictionTaxTable, Regime, StatutoryContribution, TableKey, TaxBracket,
//! #     TaxTableDefinition};
//! # let table = JurisdictionTaxTable::new(TaxTableDefinition {
//! #     key: TableKey::new(Country::India, 2025, Regime::New),
//! #     standard_deduction: dec!(75000),
//! #     brackets: vec![TaxBracket::new(dec!(0), None, dec!(0))],
//! #     rules: JurisdictionRules::India {
//! #         rebate: None,
//! #         surcharge: vec![],
//! #         cess_rate: dec!(0.04),
//! #         professional_tax: vec![],
//! #     },
//! #     statutory_contributions: vec![StatutoryContribution {
//! #         code: "PF".to_string(),
//! #         name: "Provident Fund".to_string(),
//! #         employee_rate: dec!(0.12),
//! #         employer_rate: dec!(0.12),
//! #         basis: ContributionBasis::Basic,
//! #         ceiling: Some(Ceiling::monthly(dec!(15000))),
//! #         eligibility_max: None,
//! #     }],
//! # }).unwrap();
//!
//! // Basic of 50,000 is clamped to the 15,000 PF wage ceiling.
//! let result = compute_statutory(dec!(50000), dec!(80000), &table);
//!
//! assert_eq!(result.deductions[0].monthly_amount, dec!(1800.00));
//! assert_eq!(result.employer_contributions[0].monthly_amount, dec!(1800.00));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{max, round_half_up};
use crate::models::{
    CeilingPeriod, ContributionBasis, JurisdictionTaxTable, Line, MONTHS_PER_YEAR,
    StatutoryContribution,
};

/// Contribution code used to switch India professional tax on or off.
pub const PROFESSIONAL_TAX_CODE: &str = "PT";

const PROFESSIONAL_TAX_NAME: &str = "Professional Tax";

/// Per-request on/off switches keyed by contribution code.
///
/// Codes without an entry are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributionFlags(BTreeMap<String, bool>);

impl ContributionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        code: impl Into<String>,
        enabled: bool,
    ) -> &mut Self {
        self.0.insert(code.into(), enabled);
        self
    }

    pub fn disable(
        mut self,
        code: impl Into<String>,
    ) -> Self {
        self.set(code, false);
        self
    }

    pub fn is_enabled(
        &self,
        code: &str,
    ) -> bool {
        self.0.get(code).copied().unwrap_or(true)
    }
}

/// Basis already subjected to each contribution earlier in the fiscal year,
/// keyed by contribution code. Only annually capped contributions read it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearToDate(BTreeMap<String, Decimal>);

impl YearToDate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basis(
        mut self,
        code: impl Into<String>,
        basis: Decimal,
    ) -> Self {
        self.0.insert(code.into(), basis);
        self
    }

    pub fn basis(
        &self,
        code: &str,
    ) -> Decimal {
        self.0.get(code).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(code, basis)| (code.as_str(), *basis))
    }
}

/// Caller-supplied context for a statutory calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryOptions {
    #[serde(default)]
    pub flags: ContributionFlags,
    #[serde(default)]
    pub year_to_date: YearToDate,
    /// Employee's state, for state-levied professional tax.
    #[serde(default)]
    pub state: Option<String>,
}

/// Employee deductions and employer contributions produced by a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryResult {
    pub deductions: Vec<Line>,
    pub employer_contributions: Vec<Line>,
}

/// Clamped bases for one contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContributionBases {
    monthly: Decimal,
    /// `Some` only for annually capped contributions.
    annual_cap: Option<Decimal>,
}

/// Calculator for the statutory contributions of one tax table.
#[derive(Debug, Clone)]
pub struct StatutoryCalculator<'a> {
    table: &'a JurisdictionTaxTable,
}

impl<'a> StatutoryCalculator<'a> {
    pub fn new(table: &'a JurisdictionTaxTable) -> Self {
        Self { table }
    }

    /// Computes every enabled, eligible contribution of the table.
    ///
    /// Contributions whose `eligibility_max` is exceeded by `total_earnings`,
    /// or whose code is switched off in `options.flags`, emit no lines at all.
    pub fn calculate(
        &self,
        basic: Decimal,
        total_earnings: Decimal,
        options: &StatutoryOptions,
    ) -> StatutoryResult {
        let mut result = StatutoryResult::default();

        for contribution in self.table.statutory_contributions() {
            if !options.flags.is_enabled(&contribution.code) {
                debug!(code = %contribution.code, "contribution disabled for this request");
                continue;
            }
            if let Some(limit) = contribution.eligibility_max {
                if total_earnings > limit {
                    debug!(
                        code = %contribution.code,
                        total_earnings = %total_earnings,
                        limit = %limit,
                        "earnings above eligibility limit; contribution skipped"
                    );
                    continue;
                }
            }

            let basis = match contribution.basis {
                ContributionBasis::Basic => basic,
                ContributionBasis::Gross => total_earnings,
            };
            let bases = self.clamp_basis(contribution, basis, &options.year_to_date);

            result.deductions.push(contribution_line(
                &contribution.name,
                bases,
                contribution.employee_rate,
            ));
            result.employer_contributions.push(contribution_line(
                &contribution.name,
                bases,
                contribution.employer_rate,
            ));
        }

        if let Some(line) = self.professional_tax(total_earnings, options) {
            result.deductions.push(line);
        }

        result
    }

    fn professional_tax(
        &self,
        total_earnings: Decimal,
        options: &StatutoryOptions,
    ) -> Option<Line> {
        let state = options.state.as_deref()?;
        if !options.flags.is_enabled(PROFESSIONAL_TAX_CODE) {
            debug!(state, "professional tax disabled for this request");
            return None;
        }
        let Some(schedule) = self.table.professional_tax(state) else {
            debug!(state, table = %self.table.key(), "state levies no professional tax");
            return None;
        };

        let amount = round_half_up(schedule.monthly_amount(total_earnings));
        (!amount.is_zero()).then(|| Line::monthly(PROFESSIONAL_TAX_NAME, amount))
    }

    /// Applies the contribution's ceiling to `basis`.
    fn clamp_basis(
        &self,
        contribution: &StatutoryContribution,
        basis: Decimal,
        year_to_date: &YearToDate,
    ) -> ContributionBases {
        if basis < Decimal::ZERO {
            warn!(
                code = %contribution.code,
                basis = %basis,
                "negative contribution basis treated as zero"
            );
        }
        let basis = max(basis, Decimal::ZERO);

        match contribution.ceiling {
            None => ContributionBases {
                monthly: basis,
                annual_cap: None,
            },
            Some(ceiling) => match ceiling.period {
                CeilingPeriod::Monthly => ContributionBases {
                    monthly: basis.min(ceiling.amount),
                    annual_cap: None,
                },
                CeilingPeriod::Annual => {
                    let consumed = year_to_date.basis(&contribution.code);
                    let remaining = max(ceiling.amount - consumed, Decimal::ZERO);
                    if remaining.is_zero() {
                        debug!(
                            code = %contribution.code,
                            year_to_date = %consumed,
                            ceiling = %ceiling.amount,
                            "annual wage ceiling reached"
                        );
                    }
                    ContributionBases {
                        monthly: basis.min(remaining),
                        annual_cap: Some((basis * MONTHS_PER_YEAR).min(ceiling.amount)),
                    }
                }
            },
        }
    }
}

fn contribution_line(
    name: &str,
    bases: ContributionBases,
    rate: Decimal,
) -> Line {
    let monthly = round_half_up(bases.monthly * rate);
    match bases.annual_cap {
        Some(annual_basis) => Line::with_annual(name, monthly, round_half_up(annual_basis * rate)),
        None => Line::monthly(name, monthly),
    }
}

/// Computes statutory contributions with every contribution enabled and no
/// year-to-date history.
pub fn compute_statutory(
    basic: Decimal,
    total_earnings: Decimal,
    table: &JurisdictionTaxTable,
) -> StatutoryResult {
    StatutoryCalculator::new(table).calculate(basic, total_earnings, &StatutoryOptions::default())
}
