use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One band of a progressive schedule: income in `(min_income, max_income]`
/// is taxed at `rate`. `max_income == None` marks the unbounded top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            rate,
        }
    }

    /// Portion of `taxable_income` that falls inside this bracket.
    pub fn income_in_bracket(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income <= self.min_income {
            return Decimal::ZERO;
        }
        let top = match self.max_income {
            Some(max) => taxable_income.min(max),
            None => taxable_income,
        };
        top - self.min_income
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn income_below_bracket_contributes_nothing() {
        let bracket = TaxBracket::new(dec!(11925), Some(dec!(48475)), dec!(0.12));

        assert_eq!(bracket.income_in_bracket(dec!(10000)), dec!(0));
        assert_eq!(bracket.income_in_bracket(dec!(11925)), dec!(0));
    }

    #[test]
    fn income_inside_bracket_is_partial() {
        let bracket = TaxBracket::new(dec!(11925), Some(dec!(48475)), dec!(0.12));

        assert_eq!(bracket.income_in_bracket(dec!(34250)), dec!(22325));
    }

    #[test]
    fn income_above_bracket_fills_it() {
        let bracket = TaxBracket::new(dec!(11925), Some(dec!(48475)), dec!(0.12));

        assert_eq!(bracket.income_in_bracket(dec!(90000)), dec!(36550));
    }

    #[test]
    fn unbounded_bracket_takes_everything_above_min() {
        let bracket = TaxBracket::new(dec!(626350), None, dec!(0.37));

        assert_eq!(bracket.income_in_bracket(dec!(1000000)), dec!(373650));
    }
}
