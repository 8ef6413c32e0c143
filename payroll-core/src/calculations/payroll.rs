//! End-to-end payroll computation.
//!
//! Wires the calculators together for one employee and one pay month:
//!
//! 1. Look up the tax table for `(country, fiscal year, regime)`.
//! 2. Monthly gross = annual CTC / 12.
//! 3. Resolve salary components.
//! 4. Compute statutory contributions on basic / total earnings.
//! 5. Compute income tax on twelve months of taxable earnings.
//! 6. Aggregate into a [`PayrollBreakdown`].
//!
//! Requests are range-checked before any arithmetic: currency amounts may not
//! exceed [`MAX_AMOUNT`] in magnitude and percentages may not exceed
//! [`MAX_PERCENTAGE`]. Within those limits no intermediate value can overflow
//! `Decimal`. Negative values stay accepted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::{
    ContributionFlags, PayrollBreakdown, ProgressiveTaxCalculator, StatutoryCalculator,
    StatutoryOptions, YearToDate, aggregate, resolve_components,
};
use crate::models::{
    CalculationType, Country, JurisdictionTaxTable, MONTHS_PER_YEAR, Regime, SalaryComponent,
    TableKey,
};
use crate::tables::{RegistryError, TaxTableSource};

/// Largest magnitude accepted for a currency amount on a request (10^15).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Largest magnitude accepted for a component percentage (10,000%).
pub const MAX_PERCENTAGE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Errors surfaced to the caller of a payroll computation.
///
/// A failed computation never yields a partial breakdown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayrollError {
    /// Table lookup failed (no table for the requested key).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A request amount is too large to compute with.
    #[error("{field} of {value} exceeds the supported magnitude {limit}")]
    AmountOutOfRange {
        field: String,
        value: Decimal,
        limit: Decimal,
    },
}

fn check_range(
    field: impl FnOnce() -> String,
    value: Decimal,
    limit: Decimal,
) -> Result<(), PayrollError> {
    if value.abs() > limit {
        return Err(PayrollError::AmountOutOfRange {
            field: field(),
            value,
            limit,
        });
    }
    Ok(())
}

/// Inputs for one employee's monthly payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRequest {
    pub components: Vec<SalaryComponent>,
    /// Annual cost to company; monthly gross target is one twelfth of it.
    pub annual_ctc: Decimal,
    pub country: Country,
    pub fiscal_year: i32,
    pub regime: Regime,
    #[serde(default)]
    pub statutory: StatutoryOptions,
}

impl PayrollRequest {
    pub fn new(
        components: Vec<SalaryComponent>,
        annual_ctc: Decimal,
        key: TableKey,
    ) -> Self {
        Self {
            components,
            annual_ctc,
            country: key.country,
            fiscal_year: key.fiscal_year,
            regime: key.regime,
            statutory: StatutoryOptions::default(),
        }
    }

    /// A request for the fiscal year that contains `effective_date`.
    pub fn effective_on(
        components: Vec<SalaryComponent>,
        annual_ctc: Decimal,
        country: Country,
        effective_date: NaiveDate,
        regime: Regime,
    ) -> Self {
        let fiscal_year = country.fiscal_year_containing(effective_date);
        Self::new(
            components,
            annual_ctc,
            TableKey::new(country, fiscal_year, regime),
        )
    }

    pub fn with_flags(
        mut self,
        flags: ContributionFlags,
    ) -> Self {
        self.statutory.flags = flags;
        self
    }

    pub fn with_year_to_date(
        mut self,
        year_to_date: YearToDate,
    ) -> Self {
        self.statutory.year_to_date = year_to_date;
        self
    }

    /// Employee's state, selecting the professional tax schedule.
    pub fn with_state(
        mut self,
        state: impl Into<String>,
    ) -> Self {
        self.statutory.state = Some(state.into());
        self
    }

    /// Checks every amount against [`MAX_AMOUNT`] and [`MAX_PERCENTAGE`].
    pub fn validate(&self) -> Result<(), PayrollError> {
        check_range(|| "annual_ctc".to_string(), self.annual_ctc, MAX_AMOUNT)?;
        for component in &self.components {
            let limit = match component.calculation_type {
                CalculationType::Fixed => MAX_AMOUNT,
                CalculationType::PercentageOfGross | CalculationType::PercentageOfBasic => {
                    MAX_PERCENTAGE
                }
            };
            check_range(|| format!("component '{}'", component.name), component.value, limit)?;
        }
        for (code, basis) in self.statutory.year_to_date.iter() {
            check_range(|| format!("year-to-date basis for {code}"), basis, MAX_AMOUNT)?;
        }
        Ok(())
    }

    pub fn table_key(&self) -> TableKey {
        TableKey::new(self.country, self.fiscal_year, self.regime)
    }

    pub fn monthly_gross(&self) -> Decimal {
        self.annual_ctc / MONTHS_PER_YEAR
    }
}

/// Runs payroll computations against a [`TaxTableSource`].
///
/// Holds only a shared reference, so one calculator can serve any number of
/// threads.
#[derive(Debug)]
pub struct PayrollCalculator<'a, S: TaxTableSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: TaxTableSource + ?Sized> PayrollCalculator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Computes the monthly payroll breakdown for `request`.
    ///
    /// # Errors
    ///
    /// * [`PayrollError::AmountOutOfRange`] when the request fails
    ///   [`PayrollRequest::validate`].
    /// * [`PayrollError::Registry`] when no table is published for the
    ///   request's country, fiscal year and regime.
    pub fn calculate(
        &self,
        request: &PayrollRequest,
    ) -> Result<PayrollBreakdown, PayrollError> {
        request.validate()?;
        let key = request.table_key();
        let table = self.source.table(&key)?;
        info!(table = %key, annual_ctc = %request.annual_ctc, "computing payroll");
        Ok(compute_payroll(request, &table))
    }
}

/// Computes the payroll breakdown for `request` against an already-selected
/// table.
///
/// # Panics
///
/// Amounts outside the range [`PayrollRequest::validate`] accepts can
/// overflow `Decimal`; [`PayrollCalculator::calculate`] rejects them first.
pub fn compute_payroll(
    request: &PayrollRequest,
    table: &JurisdictionTaxTable,
) -> PayrollBreakdown {
    let resolved = resolve_components(&request.components, request.monthly_gross());

    let statutory = StatutoryCalculator::new(table).calculate(
        resolved.basic,
        resolved.total_earnings,
        &request.statutory,
    );

    let annual_taxable_income = resolved.taxable_earnings * MONTHS_PER_YEAR;
    let income_tax = ProgressiveTaxCalculator::new(table).calculate(annual_taxable_income);

    let breakdown = aggregate(
        resolved.earnings,
        resolved.deductions,
        statutory.deductions,
        statutory.employer_contributions,
        income_tax,
    );

    debug!(
        total_earnings = %breakdown.total_earnings,
        total_deductions = %breakdown.total_deductions,
        net_pay = %breakdown.net_pay,
        "payroll computed"
    );

    breakdown
}
