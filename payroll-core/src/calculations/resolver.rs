//! Salary component resolution.
//!
//! Turns a salary structure into monthly amounts in two fixed passes:
//!
//! | Pass | Resolves | Against |
//! |------|----------|---------|
//! | 1 | `Fixed` and `PercentageOfGross` earnings | target monthly gross |
//! | 2 | `PercentageOfBasic` earnings | basic salary found in pass 1 |
//! | 3 | every deduction | basic, or resolved total earnings |
//!
//! The basic salary is the first pass-1 earning whose name contains "basic"
//! (case-insensitive). When no such component exists basic is zero and every
//! basic-relative amount resolves to zero.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::{CalculationType, SalaryComponent};
//! use payroll_core::calculations::resolve_components;
//!
//! let structure = vec![
//!     SalaryComponent::earning("HRA", CalculationType::PercentageOfBasic, dec!(40)),
//!     SalaryComponent::earning("Basic", CalculationType::PercentageOfGross, dec!(50)),
//! ];
//!
//! let resolved = resolve_components(&structure, dec!(100000));
//!
//! assert_eq!(resolved.basic, dec!(50000.00));
//! assert_eq!(resolved.earnings[0].monthly_amount, dec!(20000.00));
//! assert_eq!(resolved.total_earnings, dec!(70000.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{percent_of, round_half_up};
use crate::models::{CalculationType, ComponentType, Line, SalaryComponent};

/// Monthly amounts for every component of a salary structure.
///
/// `earnings` and `deductions` keep the input order of their components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedComponents {
    /// Resolved basic salary; zero when no basic component exists.
    pub basic: Decimal,

    /// Name of the component that supplied `basic`, if any.
    pub basic_component: Option<String>,

    pub earnings: Vec<Line>,

    pub deductions: Vec<Line>,

    /// Sum of all resolved earnings.
    pub total_earnings: Decimal,

    /// Sum of resolved earnings flagged `is_taxable`.
    pub taxable_earnings: Decimal,
}

/// Resolves `components` into monthly earning and deduction lines.
///
/// `monthly_gross` is the externally supplied target (e.g. annual CTC / 12)
/// that `PercentageOfGross` earnings are measured against. Negative values are
/// not rejected; they propagate as negative lines. Magnitudes beyond
/// [`MAX_AMOUNT`](crate::calculations::MAX_AMOUNT) and
/// [`MAX_PERCENTAGE`](crate::calculations::MAX_PERCENTAGE) can overflow.
pub fn resolve_components(
    components: &[SalaryComponent],
    monthly_gross: Decimal,
) -> ResolvedComponents {
    let mut amounts: Vec<Option<Decimal>> = vec![None; components.len()];

    // Pass 1: amounts that depend only on the target gross.
    let mut basic: Option<(usize, Decimal)> = None;
    for (index, component) in earnings(components) {
        let amount = match component.calculation_type {
            CalculationType::Fixed => component.value,
            CalculationType::PercentageOfGross => percent_of(monthly_gross, component.value),
            CalculationType::PercentageOfBasic => continue,
        };
        let amount = round_half_up(amount);
        amounts[index] = Some(amount);

        if basic.is_none() && component.is_basic() {
            basic = Some((index, amount));
        }
    }

    let basic_component = basic.map(|(index, _)| components[index].name.clone());
    let basic = match basic {
        Some((_, amount)) => amount,
        None => {
            if components
                .iter()
                .any(|c| c.calculation_type == CalculationType::PercentageOfBasic)
            {
                warn!("no basic component found; percentage-of-basic amounts resolve to zero");
            }
            Decimal::ZERO
        }
    };

    // Pass 2: earnings relative to basic.
    for (index, component) in earnings(components) {
        if component.calculation_type == CalculationType::PercentageOfBasic {
            amounts[index] = Some(round_half_up(percent_of(basic, component.value)));
        }
    }

    let mut earning_lines = Vec::new();
    let mut total_earnings = Decimal::ZERO;
    let mut taxable_earnings = Decimal::ZERO;
    for (index, component) in earnings(components) {
        let amount = amounts[index].unwrap_or_default();
        total_earnings += amount;
        if component.is_taxable {
            taxable_earnings += amount;
        }
        earning_lines.push(resolved_line(component, amount));
    }

    // Deductions: percentage of gross means resolved earnings here.
    let deduction_lines = components
        .iter()
        .filter(|c| c.component_type == ComponentType::Deduction)
        .map(|component| {
            let amount = match component.calculation_type {
                CalculationType::Fixed => component.value,
                CalculationType::PercentageOfBasic => percent_of(basic, component.value),
                CalculationType::PercentageOfGross => percent_of(total_earnings, component.value),
            };
            resolved_line(component, round_half_up(amount))
        })
        .collect();

    debug!(
        basic = %basic,
        total_earnings = %total_earnings,
        components = components.len(),
        "resolved salary structure"
    );

    ResolvedComponents {
        basic,
        basic_component,
        earnings: earning_lines,
        deductions: deduction_lines,
        total_earnings,
        taxable_earnings,
    }
}

fn earnings(components: &[SalaryComponent]) -> impl Iterator<Item = (usize, &SalaryComponent)> {
    components
        .iter()
        .enumerate()
        .filter(|(_, c)| c.component_type == ComponentType::Earning)
}

fn resolved_line(
    component: &SalaryComponent,
    amount: Decimal,
) -> Line {
    if amount < Decimal::ZERO {
        warn!(
            component = %component.name,
            amount = %amount,
            "component resolved to a negative amount"
        );
    }
    Line::monthly(component.name.clone(), amount)
}
