//! Payroll calculations.
//!
//! Each stage is a pure function of its inputs and a
//! [`JurisdictionTaxTable`](crate::models::JurisdictionTaxTable):
//!
//! - [`resolver`]: salary structure to monthly earning and deduction lines
//! - [`statutory`]: wage-ceiling-aware statutory contributions
//! - [`progressive_tax`]: bracketed income tax with rebate, surcharge and cess
//! - [`aggregator`]: totals and net pay
//! - [`payroll`]: the end-to-end pipeline over a table source

pub mod aggregator;
pub mod common;
pub mod payroll;
pub mod progressive_tax;
pub mod resolver;
pub mod statutory;

pub use aggregator::{INCOME_TAX_LINE, PayrollBreakdown, aggregate};
pub use payroll::{
    MAX_AMOUNT, MAX_PERCENTAGE, PayrollCalculator, PayrollError, PayrollRequest, compute_payroll,
};
pub use progressive_tax::{ProgressiveTaxCalculator, TaxComputation, compute_tax};
pub use resolver::{ResolvedComponents, resolve_components};
pub use statutory::{
    ContributionFlags, PROFESSIONAL_TAX_CODE, StatutoryCalculator, StatutoryOptions,
    StatutoryResult, YearToDate, compute_statutory,
};
