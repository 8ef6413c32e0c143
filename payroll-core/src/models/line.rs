use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Months in a fiscal year; the factor between monthly and annual figures.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// A named amount on a payroll breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub name: String,
    pub monthly_amount: Decimal,
    pub annual_amount: Decimal,
}

impl Line {
    /// A line whose annual figure is simply twelve months of `monthly_amount`.
    ///
    /// # Panics
    ///
    /// When twelve months of `monthly_amount` overflow `Decimal`.
    pub fn monthly(
        name: impl Into<String>,
        monthly_amount: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            monthly_amount,
            annual_amount: monthly_amount * MONTHS_PER_YEAR,
        }
    }

    /// A line whose annual figure is computed independently (annual caps).
    pub fn with_annual(
        name: impl Into<String>,
        monthly_amount: Decimal,
        annual_amount: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            monthly_amount,
            annual_amount,
        }
    }
}

/// Sum of `monthly_amount` over `lines`.
pub fn monthly_total(lines: &[Line]) -> Decimal {
    lines.iter().map(|line| line.monthly_amount).sum()
}

/// Sum of `annual_amount` over `lines`.
pub fn annual_total(lines: &[Line]) -> Decimal {
    lines.iter().map(|line| line.annual_amount).sum()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn months_per_year_is_twelve() {
        assert_eq!(MONTHS_PER_YEAR, dec!(12));
    }

    #[test]
    fn monthly_line_annualizes_by_twelve() {
        let line = Line::monthly("HRA", dec!(20000.00));

        assert_eq!(line.annual_amount, dec!(240000.00));
    }

    #[test]
    fn totals_sum_each_column() {
        let lines = vec![
            Line::monthly("Basic", dec!(50000.00)),
            Line::with_annual("Social Security", dec!(1240.00), dec!(10918.20)),
        ];

        assert_eq!(monthly_total(&lines), dec!(51240.00));
        assert_eq!(annual_total(&lines), dec!(610918.20));
    }
}
