//! Progressive income tax calculations.
//!
//! Evaluates annual income against a table's bracket schedule:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1 | Taxable income: income − standard deduction (minimum 0) |
//! | 2 | Bracket tax: Σ (min(taxable, max) − min) × rate over reached brackets |
//! | 3 | Rebate: if taxable ≤ rebate threshold, subtract min(bracket tax, max rebate) |
//! | 4 | Surcharge: tax after rebate × rate of the highest slab exceeded, with marginal relief |
//! | 5 | Cess: (tax after rebate + surcharge) × cess rate |
//! | 6 | Annual tax: step 3 + step 4 + step 5 |
//! | 7 | Monthly withholding: annual tax / 12, rounded half-up to cents |
//!
//! Step 7 is the only rounding point; bracket, surcharge and cess arithmetic
//! stay exact. The rebate is a cliff: one unit of taxable income above the
//! threshold forfeits it completely.
//!
//! Marginal relief caps the surcharge so that tax plus surcharge never exceeds
//! the liability at the slab threshold by more than the income earned above
//! that threshold.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::calculations::ProgressiveTaxCalculator;
//! # use payroll_core::{Country, FilingStatusCode, JurisdictionRules, JurisdictionTaxTable,
//! #     Regime, TableKey, TaxBracket, TaxTableDefinition};
//! # let table = JurisdictionTaxTable::new(TaxTableDefinition {
//! #     key: TableKey::new(Country::UnitedStates, 2025, Regime::Filing(FilingStatusCode::Single)),
//! #     standard_deduction: dec!(15750),
//! #     brackets: vec![
//! #         TaxBracket::new(dec!(0), Some(dec!(11925)), dec!(0.10)),
//! #         TaxBracket::new(dec!(11925), Some(dec!(48475)), dec!(0.12)),
//! #         TaxBracket::new(dec!(48475), None, dec!(0.22)),
//! #     ],
//! #     rules: JurisdictionRules::UnitedStates { filing_status: FilingStatusCode::Single },
//! #     statutory_contributions: vec![],
//! # }).unwrap();
//!
//! let tax = ProgressiveTaxCalculator::new(&table).calculate(dec!(50000));
//!
//! assert_eq!(tax.taxable_income, dec!(34250));
//! assert_eq!(tax.bracket_tax, dec!(3871.50));
//! assert_eq!(tax.monthly_tax, dec!(322.63));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{max, round_half_up};
use crate::models::{JurisdictionTaxTable, MONTHS_PER_YEAR};

/// Result of a progressive tax calculation, with every intermediate value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputation {
    /// Annual income the calculation started from.
    pub gross_income: Decimal,

    /// Standard deduction taken from the table.
    pub standard_deduction: Decimal,

    /// Income after the standard deduction, never negative.
    pub taxable_income: Decimal,

    /// Tax from the bracket schedule before any rebate.
    pub bracket_tax: Decimal,

    /// Rebate granted; zero when the taxpayer is not eligible.
    pub rebate: Decimal,

    /// `bracket_tax - rebate`.
    pub tax_after_rebate: Decimal,

    /// Surcharge after marginal relief; zero below the first slab.
    pub surcharge: Decimal,

    /// Cess on `tax_after_rebate + surcharge`.
    pub cess: Decimal,

    /// Annual liability, unrounded.
    pub annual_tax: Decimal,

    /// Monthly withholding: `annual_tax / 12` rounded half-up to cents.
    pub monthly_tax: Decimal,
}

/// Calculator for progressive income tax against one tax table.
#[derive(Debug, Clone)]
pub struct ProgressiveTaxCalculator<'a> {
    table: &'a JurisdictionTaxTable,
}

impl<'a> ProgressiveTaxCalculator<'a> {
    pub fn new(table: &'a JurisdictionTaxTable) -> Self {
        Self { table }
    }

    /// Calculates annual and monthly tax on `annual_income`.
    pub fn calculate(
        &self,
        annual_income: Decimal,
    ) -> TaxComputation {
        let standard_deduction = self.table.standard_deduction();
        let taxable_income = self.taxable_income(annual_income, standard_deduction);
        let bracket_tax = self.bracket_tax(taxable_income);
        let rebate = self.rebate(taxable_income, bracket_tax);
        let tax_after_rebate = bracket_tax - rebate;
        let surcharge = self.surcharge(taxable_income, tax_after_rebate);
        let cess = (tax_after_rebate + surcharge) * self.table.cess_rate();
        let annual_tax = tax_after_rebate + surcharge + cess;
        let monthly_tax = round_half_up(annual_tax / MONTHS_PER_YEAR);

        debug!(
            table = %self.table.key(),
            taxable_income = %taxable_income,
            bracket_tax = %bracket_tax,
            rebate = %rebate,
            surcharge = %surcharge,
            monthly_tax = %monthly_tax,
            "computed income tax"
        );

        TaxComputation {
            gross_income: annual_income,
            standard_deduction,
            taxable_income,
            bracket_tax,
            rebate,
            tax_after_rebate,
            surcharge,
            cess,
            annual_tax,
            monthly_tax,
        }
    }

    fn tax_after_rebate(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        let bracket_tax = self.bracket_tax(taxable_income);
        bracket_tax - self.rebate(taxable_income, bracket_tax)
    }

    fn taxable_income(
        &self,
        annual_income: Decimal,
        standard_deduction: Decimal,
    ) -> Decimal {
        max(annual_income - standard_deduction, Decimal::ZERO)
    }

    /// Cumulative marginal tax across every bracket `taxable_income` reaches.
    fn bracket_tax(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        self.table
            .brackets()
            .iter()
            .take_while(|bracket| taxable_income > bracket.min_income)
            .map(|bracket| bracket.income_in_bracket(taxable_income) * bracket.rate)
            .sum()
    }

    fn rebate(
        &self,
        taxable_income: Decimal,
        bracket_tax: Decimal,
    ) -> Decimal {
        match self.table.rebate() {
            Some(rebate) if taxable_income <= rebate.max_income => {
                bracket_tax.min(rebate.max_rebate)
            }
            _ => Decimal::ZERO,
        }
    }

    fn surcharge(
        &self,
        taxable_income: Decimal,
        tax_after_rebate: Decimal,
    ) -> Decimal {
        let slabs = self.table.surcharge_slabs();
        let Some(index) = slabs
            .iter()
            .rposition(|slab| taxable_income > slab.above)
        else {
            return Decimal::ZERO;
        };

        let slab = slabs[index];
        let full = tax_after_rebate * slab.rate;

        // Liability at the threshold, surcharged at the rate that applies there.
        let rate_at_threshold = index
            .checked_sub(1)
            .map_or(Decimal::ZERO, |below| slabs[below].rate);
        let at_threshold = self.tax_after_rebate(slab.above) * (Decimal::ONE + rate_at_threshold);
        let limit = at_threshold + (taxable_income - slab.above) - tax_after_rebate;
        let surcharge = full.min(max(limit, Decimal::ZERO));

        if surcharge < full {
            debug!(
                threshold = %slab.above,
                full = %full,
                relieved = %surcharge,
                "marginal relief applied to surcharge"
            );
        }
        surcharge
    }
}

/// Monthly tax withholding on `annual_taxable_income` under `table`.
pub fn compute_tax(
    annual_taxable_income: Decimal,
    table: &JurisdictionTaxTable,
) -> Decimal {
    ProgressiveTaxCalculator::new(table)
        .calculate(annual_taxable_income)
        .monthly_tax
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{
        Country, FilingStatusCode, JurisdictionRules, Rebate, Regime, SurchargeSlab, TableKey,
        TaxBracket, TaxTableDefinition,
    };

    fn us_single_2025() -> JurisdictionTaxTable {
        JurisdictionTaxTable::new(TaxTableDefinition {
            key: TableKey::new(
                Country::UnitedStates,
                2025,
                Regime::Filing(FilingStatusCode::Single),
            ),
            standard_deduction: dec!(15750),
            brackets: vec![
                TaxBracket::new(dec!(0), Some(dec!(11925)), dec!(0.10)),
                TaxBracket::new(dec!(11925), Some(dec!(48475)), dec!(0.12)),
                TaxBracket::new(dec!(48475), Some(dec!(103350)), dec!(0.22)),
                TaxBracket::new(dec!(103350), Some(dec!(197300)), dec!(0.24)),
                TaxBracket::new(dec!(197300), Some(dec!(250525)), dec!(0.32)),
                TaxBracket::new(dec!(250525), Some(dec!(626350)), dec!(0.35)),
                TaxBracket::new(dec!(626350), None, dec!(0.37)),
            ],
            rules: JurisdictionRules::UnitedStates {
                filing_status: FilingStatusCode::Single,
            },
            statutory_contributions: vec![],
        })
        .unwrap()
    }

    fn india_new_2025() -> JurisdictionTaxTable {
        JurisdictionTaxTable::new(TaxTableDefinition {
            key: TableKey::new(Country::India, 2025, Regime::New),
            standard_deduction: dec!(75000),
            brackets: vec![
                TaxBracket::new(dec!(0), Some(dec!(400000)), dec!(0)),
                TaxBracket::new(dec!(400000), Some(dec!(800000)), dec!(0.05)),
                TaxBracket::new(dec!(800000), Some(dec!(1200000)), dec!(0.10)),
                TaxBracket::new(dec!(1200000), Some(dec!(1600000)), dec!(0.15)),
                TaxBracket::new(dec!(1600000), Some(dec!(2000000)), dec!(0.20)),
                TaxBracket::new(dec!(2000000), Some(dec!(2400000)), dec!(0.25)),
                TaxBracket::new(dec!(2400000), None, dec!(0.30)),
            ],
            rules: JurisdictionRules::India {
                rebate: Some(Rebate {
                    max_income: dec!(1200000),
                    max_rebate: dec!(60000),
                }),
                surcharge: vec![
                    SurchargeSlab {
                        above: dec!(5000000),
                        rate: dec!(0.10),
                    },
                    SurchargeSlab {
                        above: dec!(10000000),
                        rate: dec!(0.15),
                    },
                    SurchargeSlab {
                        above: dec!(20000000),
                        rate: dec!(0.25),
                    },
                ],
                cess_rate: dec!(0.04),
                professional_tax: vec![],
            },
            statutory_contributions: vec![],
        })
        .unwrap()
    }

    /// A schedule whose rebate threshold sits well above the point where
    /// bracket tax exceeds the maximum rebate.
    fn partial_rebate_table() -> JurisdictionTaxTable {
        JurisdictionTaxTable::new(TaxTableDefinition {
            key: TableKey::new(Country::India, 2025, Regime::Old),
            standard_deduction: dec!(0),
            brackets: vec![
                TaxBracket::new(dec!(0), Some(dec!(100000)), dec!(0)),
                TaxBracket::new(dec!(100000), None, dec!(0.10)),
            ],
            rules: JurisdictionRules::India {
                rebate: Some(Rebate {
                    max_income: dec!(500000),
                    max_rebate: dec!(25000),
                }),
                surcharge: vec![],
                cess_rate: dec!(0),
                professional_tax: vec![],
            },
            statutory_contributions: vec![],
        })
        .unwrap()
    }

    /// Initializes tracing subscriber for tests that exercise debug output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    #[test]
    fn calculate_with_debug_logging_enabled() {
        let _guard = init_test_tracing();

        let tax = ProgressiveTaxCalculator::new(&us_single_2025()).calculate(dec!(50000));

        assert_eq!(tax.monthly_tax, dec!(322.63));
    }

    #[test]
    fn us_single_spans_two_brackets() {
        let tax = ProgressiveTaxCalculator::new(&us_single_2025()).calculate(dec!(50000));

        assert_eq!(
            tax,
            TaxComputation {
                gross_income: dec!(50000),
                standard_deduction: dec!(15750),
                taxable_income: dec!(34250),
                bracket_tax: dec!(3871.50),
                rebate: dec!(0),
                tax_after_rebate: dec!(3871.50),
                surcharge: dec!(0),
                cess: dec!(0),
                annual_tax: dec!(3871.50),
                monthly_tax: dec!(322.63),
            }
        );
    }

    #[test]
    fn us_top_bracket_accumulates_every_band() {
        let tax = ProgressiveTaxCalculator::new(&us_single_2025()).calculate(dec!(1015750));

        // 188,769.75 through the 35% band, then 37% on 373,650.
        assert_eq!(tax.bracket_tax, dec!(327020.25));
    }

    #[test]
    fn income_below_standard_deduction_owes_nothing() {
        let tax = ProgressiveTaxCalculator::new(&us_single_2025()).calculate(dec!(12000));

        assert_eq!(tax.taxable_income, dec!(0));
        assert_eq!(tax.monthly_tax, dec!(0));
    }

    #[test]
    fn negative_income_owes_nothing() {
        assert_eq!(compute_tax(dec!(-5000), &us_single_2025()), dec!(0));
    }

    #[test]
    fn india_rebate_zeroes_tax_at_threshold() {
        // 1,275,000 − 75,000 standard deduction = 1,200,000 taxable.
        let tax = ProgressiveTaxCalculator::new(&india_new_2025()).calculate(dec!(1275000));

        assert_eq!(tax.taxable_income, dec!(1200000));
        assert_eq!(tax.bracket_tax, dec!(60000));
        assert_eq!(tax.rebate, dec!(60000));
        assert_eq!(tax.monthly_tax, dec!(0));
    }

    #[test]
    fn india_rebate_is_forfeited_one_unit_above_threshold() {
        let tax = ProgressiveTaxCalculator::new(&india_new_2025()).calculate(dec!(1275001));

        assert_eq!(tax.rebate, dec!(0));
        assert_eq!(tax.bracket_tax, dec!(60000.15));
        assert_eq!(tax.cess, dec!(2400.006));
        assert_eq!(tax.monthly_tax, dec!(5200.01));
    }

    #[test]
    fn above_threshold_tax_matches_unrebated_schedule() {
        let just_below = ProgressiveTaxCalculator::new(&india_new_2025()).calculate(dec!(1275000));
        let just_above = ProgressiveTaxCalculator::new(&india_new_2025()).calculate(dec!(1275001));

        // The only jump across the cliff is the forfeited rebate plus one
        // unit taxed at the marginal rate.
        assert_eq!(
            just_above.bracket_tax - just_below.bracket_tax,
            dec!(0.15)
        );
        assert_eq!(just_above.rebate, dec!(0));
    }

    #[test]
    fn india_cess_is_applied_after_brackets() {
        let tax = ProgressiveTaxCalculator::new(&india_new_2025()).calculate(dec!(2075000));

        assert_eq!(tax.bracket_tax, dec!(200000));
        assert_eq!(tax.cess, dec!(8000));
        assert_eq!(tax.annual_tax, dec!(208000));
        assert_eq!(tax.monthly_tax, dec!(17333.33));
    }

    #[test]
    fn income_at_surcharge_threshold_pays_none() {
        // 5,075,000 − 75,000 = 5,000,000 taxable, not above the first slab.
        let tax = ProgressiveTaxCalculator::new(&india_new_2025()).calculate(dec!(5075000));

        assert_eq!(tax.bracket_tax, dec!(1080000));
        assert_eq!(tax.surcharge, dec!(0));
    }

    #[test]
    fn one_crore_earner_pays_ten_percent_surcharge_before_cess() {
        let tax = ProgressiveTaxCalculator::new(&india_new_2025()).calculate(dec!(10075000));

        assert_eq!(tax.taxable_income, dec!(10000000));
        assert_eq!(tax.bracket_tax, dec!(2580000));
        assert_eq!(tax.surcharge, dec!(258000));
        assert_eq!(tax.cess, dec!(113520));
        assert_eq!(tax.annual_tax, dec!(2951520));
        assert_eq!(tax.monthly_tax, dec!(245960.00));
    }

    #[test]
    fn highest_slab_reached_sets_the_rate() {
        // 30,000,000 taxable: 300,000 + 27,600,000 × 30% = 8,580,000.
        let tax = ProgressiveTaxCalculator::new(&india_new_2025()).calculate(dec!(30075000));

        assert_eq!(tax.bracket_tax, dec!(8580000));
        assert_eq!(tax.surcharge, dec!(2145000));
    }

    #[test]
    fn marginal_relief_caps_surcharge_just_above_threshold() {
        // 10,000 above the 5,000,000 threshold: full surcharge would be
        // 108,300, but tax may only grow by the 10,000 earned above it.
        let tax = ProgressiveTaxCalculator::new(&india_new_2025()).calculate(dec!(5085000));

        assert_eq!(tax.bracket_tax, dec!(1083000));
        assert_eq!(tax.surcharge, dec!(7000));
        assert_eq!(tax.cess, dec!(43600));
        assert_eq!(tax.monthly_tax, dec!(94466.67));
    }

    #[test]
    fn marginal_relief_uses_lower_slab_rate_at_higher_threshold() {
        // 10,000 above 10,000,000: tax at the threshold is 2,580,000 plus its
        // 10% surcharge.
        let tax = ProgressiveTaxCalculator::new(&india_new_2025()).calculate(dec!(10085000));

        assert_eq!(tax.bracket_tax, dec!(2583000));
        assert_eq!(tax.surcharge, dec!(265000));
    }

    #[test]
    fn tax_is_monotonic_across_surcharge_thresholds() {
        let table = india_new_2025();

        for threshold in [dec!(5075000), dec!(10075000), dec!(20075000)] {
            let mut previous = compute_tax(threshold - dec!(50000), &table);
            for step in -9..=40 {
                let income = threshold + Decimal::from(step * 5000);
                let tax = compute_tax(income, &table);
                assert!(
                    tax >= previous,
                    "tax fell from {previous} to {tax} at income {income}"
                );
                previous = tax;
            }
        }
    }

    #[test]
    fn rebate_is_capped_at_max_rebate() {
        let tax = ProgressiveTaxCalculator::new(&partial_rebate_table()).calculate(dec!(450000));

        assert_eq!(tax.bracket_tax, dec!(35000));
        assert_eq!(tax.rebate, dec!(25000));
        assert_eq!(tax.annual_tax, dec!(10000));
    }

    #[test]
    fn rebate_never_exceeds_bracket_tax() {
        let tax = ProgressiveTaxCalculator::new(&partial_rebate_table()).calculate(dec!(150000));

        assert_eq!(tax.bracket_tax, dec!(5000));
        assert_eq!(tax.rebate, dec!(5000));
        assert_eq!(tax.annual_tax, dec!(0));
    }

    #[test]
    fn us_tax_is_monotonic_in_income() {
        let table = us_single_2025();
        let mut previous = Decimal::ZERO;

        for step in 0..=400 {
            let income = Decimal::from(step * 2500);
            let tax = compute_tax(income, &table);
            assert!(
                tax >= previous,
                "tax fell from {previous} to {tax} at income {income}"
            );
            previous = tax;
        }
    }

    #[test]
    fn india_tax_is_monotonic_on_each_side_of_rebate_cliff() {
        let table = india_new_2025();
        let threshold = dec!(1275000);

        let mut previous = Decimal::ZERO;
        for step in 0..=51 {
            let income = Decimal::from(step * 25000);
            let tax = compute_tax(income, &table);
            assert_eq!(tax, dec!(0), "rebate should cover income {income}");
            previous = tax;
        }

        for step in 1..=200 {
            let income = threshold + Decimal::from(step * 10000);
            let tax = compute_tax(income, &table);
            assert!(
                tax >= previous,
                "tax fell from {previous} to {tax} at income {income}"
            );
            previous = tax;
        }
    }

    #[test]
    fn compute_tax_returns_monthly_figure() {
        assert_eq!(compute_tax(dec!(50000), &us_single_2025()), dec!(322.63));
    }
}
