//! Rendering of a [`PayrollBreakdown`] for the preview binary.

use std::fmt::Write;

use payroll_core::{Line, PayrollBreakdown, TableKey};
use rust_decimal::Decimal;
use serde::Serialize;

const LABEL_WIDTH: usize = 32;
const AMOUNT_WIDTH: usize = 14;

/// JSON document printed by `--format json`.
#[derive(Debug, Serialize)]
pub struct PayrollReport<'a> {
    pub table: TableKey,
    #[serde(flatten)]
    pub breakdown: &'a PayrollBreakdown,
}

pub fn render_json(
    table: TableKey,
    breakdown: &PayrollBreakdown,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&PayrollReport { table, breakdown })
}

fn amount(value: Decimal) -> String {
    format!("{value:.2}")
}

fn row(
    out: &mut String,
    label: &str,
    monthly: Decimal,
    annual: Decimal,
) {
    let _ = writeln!(
        out,
        "  {label:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}{:>AMOUNT_WIDTH$}",
        amount(monthly),
        amount(annual),
    );
}

fn section(
    out: &mut String,
    title: &str,
    lines: &[Line],
) {
    let _ = writeln!(out, "{title}");
    for line in lines {
        row(out, &line.name, line.monthly_amount, line.annual_amount);
    }
}

/// Plain-text payroll table with monthly and annual columns.
pub fn render_text(
    table: TableKey,
    breakdown: &PayrollBreakdown,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Payroll preview for {table}");
    let _ = writeln!(
        out,
        "  {:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}{:>AMOUNT_WIDTH$}",
        "", "Monthly", "Annual"
    );

    section(&mut out, "Earnings", &breakdown.earnings);
    row(
        &mut out,
        "Total earnings",
        breakdown.total_earnings,
        breakdown.annual_total_earnings,
    );

    section(&mut out, "Deductions", &breakdown.deduction_lines());
    row(
        &mut out,
        "Total deductions",
        breakdown.total_deductions,
        breakdown.annual_total_deductions,
    );

    let _ = writeln!(out);
    row(
        &mut out,
        "Net pay",
        breakdown.net_pay,
        breakdown.annual_net_pay,
    );

    if !breakdown.employer_contributions.is_empty() {
        let _ = writeln!(out);
        section(
            &mut out,
            "Employer contributions",
            &breakdown.employer_contributions,
        );
    }

    let tax = &breakdown.income_tax;
    let _ = writeln!(out);
    let _ = writeln!(out, "Income tax (annual)");
    for (label, value) in [
        ("Gross income", tax.gross_income),
        ("Standard deduction", tax.standard_deduction),
        ("Taxable income", tax.taxable_income),
        ("Bracket tax", tax.bracket_tax),
        ("Rebate", tax.rebate),
        ("Surcharge", tax.surcharge),
        ("Cess", tax.cess),
        ("Annual tax", tax.annual_tax),
    ] {
        let _ = writeln!(out, "  {label:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}", amount(value));
    }

    out
}
