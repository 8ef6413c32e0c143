//! Payroll aggregation: totals and net pay.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::TaxComputation;
use crate::models::{Line, MONTHS_PER_YEAR, annual_total, monthly_total};

/// Display name of the income tax line.
pub const INCOME_TAX_LINE: &str = "Income Tax";

/// Complete payroll result for one employee and one pay month.
///
/// `net_pay = total_earnings - total_deductions`, where deductions cover
/// component deductions, statutory employee deductions and income tax.
/// Employer contributions are informational and never reduce net pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    pub earnings: Vec<Line>,
    pub component_deductions: Vec<Line>,
    pub statutory_deductions: Vec<Line>,
    pub employer_contributions: Vec<Line>,
    pub income_tax: TaxComputation,

    pub total_earnings: Decimal,
    pub total_deductions: Decimal,
    pub net_pay: Decimal,

    pub annual_total_earnings: Decimal,
    pub annual_total_deductions: Decimal,
    pub annual_net_pay: Decimal,

    /// Monthly employer-side cost on top of earnings.
    pub total_employer_contributions: Decimal,
}

impl PayrollBreakdown {
    /// Income tax as a breakdown line.
    pub fn income_tax_line(&self) -> Line {
        Line::monthly(INCOME_TAX_LINE, self.income_tax.monthly_tax)
    }

    /// Every line that reduces net pay, income tax last.
    pub fn deduction_lines(&self) -> Vec<Line> {
        self.component_deductions
            .iter()
            .chain(&self.statutory_deductions)
            .cloned()
            .chain(std::iter::once(self.income_tax_line()))
            .collect()
    }

    /// Monthly cost to the employer: earnings plus employer contributions.
    pub fn employer_cost(&self) -> Decimal {
        self.total_earnings + self.total_employer_contributions
    }
}

/// Sums resolved lines and tax into a [`PayrollBreakdown`].
///
/// Pure reporting: a negative net pay is logged but neither clamped nor
/// rejected.
pub fn aggregate(
    earnings: Vec<Line>,
    component_deductions: Vec<Line>,
    statutory_deductions: Vec<Line>,
    employer_contributions: Vec<Line>,
    income_tax: TaxComputation,
) -> PayrollBreakdown {
    let total_earnings = monthly_total(&earnings);
    let total_deductions = monthly_total(&component_deductions)
        + monthly_total(&statutory_deductions)
        + income_tax.monthly_tax;
    let net_pay = total_earnings - total_deductions;

    let annual_total_earnings = annual_total(&earnings);
    let annual_total_deductions = annual_total(&component_deductions)
        + annual_total(&statutory_deductions)
        + income_tax.monthly_tax * MONTHS_PER_YEAR;
    let annual_net_pay = annual_total_earnings - annual_total_deductions;

    if net_pay < Decimal::ZERO {
        warn!(
            total_earnings = %total_earnings,
            total_deductions = %total_deductions,
            net_pay = %net_pay,
            "deductions exceed earnings; net pay is negative"
        );
    }

    PayrollBreakdown {
        total_employer_contributions: monthly_total(&employer_contributions),
        earnings,
        component_deductions,
        statutory_deductions,
        employer_contributions,
        income_tax,
        total_earnings,
        total_deductions,
        net_pay,
        annual_total_earnings,
        annual_total_deductions,
        annual_net_pay,
    }
}
