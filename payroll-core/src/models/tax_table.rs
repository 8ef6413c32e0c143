//! Versioned, validated jurisdiction tax tables.
//!
//! A [`JurisdictionTaxTable`] can only be built from a [`TaxTableDefinition`]
//! through [`JurisdictionTaxTable::new`], which checks the bracket schedule,
//! the statutory contributions and the country rules once. Calculators that
//! receive a table therefore never re-validate it. Fields are private, so a
//! published table cannot be altered; a new fiscal year is a new table.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Country, FilingStatusCode, Regime, TableKey, TaxBracket};

/// Structural problems in a bracket schedule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table is empty")]
    Empty,

    #[error("first bracket starts at {0}, expected 0")]
    DoesNotStartAtZero(Decimal),

    #[error("bracket {index} has max {max} not above its min {min}")]
    InvertedBounds {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("gap before bracket {index}: expected min {expected}, found {found}")]
    Gap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} overlaps its predecessor: expected min {expected}, found {found}")]
    Overlap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("unbounded bracket {index} is not the last bracket")]
    UnboundedNotLast { index: usize },

    #[error("last bracket is bounded at {0}; the schedule must cover all income")]
    LastBracketBounded(Decimal),

    #[error("bracket {index} has rate {rate} outside [0, 1]")]
    RateOutOfRange { index: usize, rate: Decimal },
}

/// Errors raised while building a [`JurisdictionTaxTable`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxTableError {
    #[error("invalid bracket table for {key}: {source}")]
    InvalidBracketTable {
        key: TableKey,
        #[source]
        source: BracketTableError,
    },

    #[error("invalid statutory contribution '{code}' in {key}: {reason}")]
    InvalidContribution {
        key: TableKey,
        code: String,
        reason: String,
    },

    #[error("invalid rules for {key}: {reason}")]
    InvalidRules { key: TableKey, reason: String },
}

/// Which resolved amount a statutory contribution is levied on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionBasis {
    /// The resolved basic salary.
    Basic,
    /// Resolved total monthly earnings.
    Gross,
}

impl ContributionBasis {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "gross" => Some(Self::Gross),
            _ => None,
        }
    }
}

/// Period a wage ceiling is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingPeriod {
    /// Caps every pay period's basis (e.g. India PF wage ceiling).
    Monthly,
    /// Caps the fiscal-year total basis (e.g. US social security wage base).
    Annual,
}

impl CeilingPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Some(Self::Monthly),
            "annual" | "yearly" | "year" => Some(Self::Annual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ceiling {
    pub amount: Decimal,
    pub period: CeilingPeriod,
}

impl Ceiling {
    pub fn monthly(amount: Decimal) -> Self {
        Self {
            amount,
            period: CeilingPeriod::Monthly,
        }
    }

    pub fn annual(amount: Decimal) -> Self {
        Self {
            amount,
            period: CeilingPeriod::Annual,
        }
    }
}

/// A government-mandated contribution with split employee/employer rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryContribution {
    /// Short identifier used for feature flags and year-to-date lookups
    /// (e.g. `PF`, `ESI`, `SS`, `MEDICARE`).
    pub code: String,
    /// Display name used on breakdown lines.
    pub name: String,
    pub employee_rate: Decimal,
    pub employer_rate: Decimal,
    pub basis: ContributionBasis,
    pub ceiling: Option<Ceiling>,
    /// The contribution applies only while monthly total earnings are at or
    /// below this amount (e.g. India ESI).
    pub eligibility_max: Option<Decimal>,
}

/// Cliff rebate: when taxable income is at or below `max_income`, up to
/// `max_rebate` of bracket tax is forgiven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebate {
    pub max_income: Decimal,
    pub max_rebate: Decimal,
}

/// Surcharge on tax after rebate, levied once taxable income exceeds `above`.
///
/// Only the highest slab reached applies; slabs do not stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeSlab {
    pub above: Decimal,
    pub rate: Decimal,
}

/// Monthly professional tax owed once monthly earnings reach
/// `min_monthly_earnings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalTaxSlab {
    pub min_monthly_earnings: Decimal,
    pub monthly_amount: Decimal,
}

/// Professional tax slabs levied by one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalTaxSchedule {
    /// State code as used on requests (e.g. `MH`, `KA`), matched
    /// case-insensitively.
    pub state: String,
    pub slabs: Vec<ProfessionalTaxSlab>,
}

impl ProfessionalTaxSchedule {
    /// Amount of the highest slab `monthly_earnings` reaches; zero below the
    /// first slab.
    pub fn monthly_amount(
        &self,
        monthly_earnings: Decimal,
    ) -> Decimal {
        self.slabs
            .iter()
            .rev()
            .find(|slab| monthly_earnings >= slab.min_monthly_earnings)
            .map_or(Decimal::ZERO, |slab| slab.monthly_amount)
    }

    fn applies_to(
        &self,
        state: &str,
    ) -> bool {
        self.state.trim().eq_ignore_ascii_case(state.trim())
    }
}

/// Country-specific rules carried alongside the common schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "country", rename_all = "snake_case")]
pub enum JurisdictionRules {
    India {
        rebate: Option<Rebate>,
        /// Surcharge slabs, ascending by threshold.
        #[serde(default)]
        surcharge: Vec<SurchargeSlab>,
        /// Health & education cess as a fraction (0.04 for 4%), levied on tax
        /// plus surcharge.
        cess_rate: Decimal,
        /// Professional tax schedules by state.
        #[serde(default)]
        professional_tax: Vec<ProfessionalTaxSchedule>,
    },
    UnitedStates {
        filing_status: FilingStatusCode,
    },
}

impl JurisdictionRules {
    pub fn country(&self) -> Country {
        match self {
            Self::India { .. } => Country::India,
            Self::UnitedStates { .. } => Country::UnitedStates,
        }
    }
}

/// Unvalidated table contents, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTableDefinition {
    pub key: TableKey,
    pub standard_deduction: Decimal,
    pub brackets: Vec<TaxBracket>,
    pub rules: JurisdictionRules,
    pub statutory_contributions: Vec<StatutoryContribution>,
}

/// A published, validated tax table for one `(country, fiscal year, regime)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxTableDefinition", into = "TaxTableDefinition")]
pub struct JurisdictionTaxTable {
    key: TableKey,
    standard_deduction: Decimal,
    brackets: Vec<TaxBracket>,
    rules: JurisdictionRules,
    statutory_contributions: Vec<StatutoryContribution>,
}

impl JurisdictionTaxTable {
    /// Validates `definition` and freezes it into a table.
    ///
    /// # Errors
    ///
    /// * [`TaxTableError::InvalidBracketTable`] when brackets are empty,
    ///   unsorted, overlapping, gapped, or do not cover `[0, ∞)`.
    /// * [`TaxTableError::InvalidContribution`] for rates outside `[0, 1]`,
    ///   non-positive ceilings, or duplicate codes.
    /// * [`TaxTableError::InvalidRules`] when the rules do not belong to the
    ///   key's country/regime or carry negative amounts.
    pub fn new(definition: TaxTableDefinition) -> Result<Self, TaxTableError> {
        let key = definition.key;

        validate_brackets(&definition.brackets)
            .map_err(|source| TaxTableError::InvalidBracketTable { key, source })?;
        validate_contributions(key, &definition.statutory_contributions)?;
        validate_rules(key, &definition.rules, definition.standard_deduction)?;

        Ok(Self {
            key,
            standard_deduction: definition.standard_deduction,
            brackets: definition.brackets,
            rules: definition.rules,
            statutory_contributions: definition.statutory_contributions,
        })
    }

    pub fn key(&self) -> TableKey {
        self.key
    }

    pub fn standard_deduction(&self) -> Decimal {
        self.standard_deduction
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn rules(&self) -> &JurisdictionRules {
        &self.rules
    }

    pub fn statutory_contributions(&self) -> &[StatutoryContribution] {
        &self.statutory_contributions
    }

    pub fn rebate(&self) -> Option<&Rebate> {
        match &self.rules {
            JurisdictionRules::India { rebate, .. } => rebate.as_ref(),
            JurisdictionRules::UnitedStates { .. } => None,
        }
    }

    /// Multiplicative add-on applied after rebate; zero where none exists.
    pub fn cess_rate(&self) -> Decimal {
        match &self.rules {
            JurisdictionRules::India { cess_rate, .. } => *cess_rate,
            JurisdictionRules::UnitedStates { .. } => Decimal::ZERO,
        }
    }

    /// Surcharge slabs, ascending by threshold; empty where none exist.
    pub fn surcharge_slabs(&self) -> &[SurchargeSlab] {
        match &self.rules {
            JurisdictionRules::India { surcharge, .. } => surcharge,
            JurisdictionRules::UnitedStates { .. } => &[],
        }
    }

    /// Professional tax schedule of `state`, if the state levies one.
    pub fn professional_tax(
        &self,
        state: &str,
    ) -> Option<&ProfessionalTaxSchedule> {
        match &self.rules {
            JurisdictionRules::India {
                professional_tax, ..
            } => professional_tax
                .iter()
                .find(|schedule| schedule.applies_to(state)),
            JurisdictionRules::UnitedStates { .. } => None,
        }
    }
}

impl TryFrom<TaxTableDefinition> for JurisdictionTaxTable {
    type Error = TaxTableError;

    fn try_from(definition: TaxTableDefinition) -> Result<Self, Self::Error> {
        Self::new(definition)
    }
}

impl From<JurisdictionTaxTable> for TaxTableDefinition {
    fn from(table: JurisdictionTaxTable) -> Self {
        Self {
            key: table.key,
            standard_deduction: table.standard_deduction,
            brackets: table.brackets,
            rules: table.rules,
            statutory_contributions: table.statutory_contributions,
        }
    }
}

fn is_rate(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

fn validate_brackets(brackets: &[TaxBracket]) -> Result<(), BracketTableError> {
    let first = brackets.first().ok_or(BracketTableError::Empty)?;
    if first.min_income != Decimal::ZERO {
        return Err(BracketTableError::DoesNotStartAtZero(first.min_income));
    }

    let last_index = brackets.len() - 1;
    for (index, bracket) in brackets.iter().enumerate() {
        if !is_rate(bracket.rate) {
            return Err(BracketTableError::RateOutOfRange {
                index,
                rate: bracket.rate,
            });
        }

        match bracket.max_income {
            Some(max) if max <= bracket.min_income => {
                return Err(BracketTableError::InvertedBounds {
                    index,
                    min: bracket.min_income,
                    max,
                });
            }
            Some(max) if index == last_index => {
                return Err(BracketTableError::LastBracketBounded(max));
            }
            None if index != last_index => {
                return Err(BracketTableError::UnboundedNotLast { index });
            }
            _ => {}
        }

        if index > 0 {
            // Every bracket before the last is bounded (checked above).
            let expected = brackets[index - 1].max_income.unwrap_or(Decimal::MAX);
            let found = bracket.min_income;
            if found > expected {
                return Err(BracketTableError::Gap {
                    index,
                    expected,
                    found,
                });
            }
            if found < expected {
                return Err(BracketTableError::Overlap {
                    index,
                    expected,
                    found,
                });
            }
        }
    }

    Ok(())
}

fn validate_contributions(
    key: TableKey,
    contributions: &[StatutoryContribution],
) -> Result<(), TaxTableError> {
    let mut seen = HashSet::new();

    for contribution in contributions {
        let invalid = |reason: String| TaxTableError::InvalidContribution {
            key,
            code: contribution.code.clone(),
            reason,
        };

        if !seen.insert(contribution.code.as_str()) {
            return Err(invalid("duplicate contribution code".to_string()));
        }
        if !is_rate(contribution.employee_rate) {
            return Err(invalid(format!(
                "employee rate {} outside [0, 1]",
                contribution.employee_rate
            )));
        }
        if !is_rate(contribution.employer_rate) {
            return Err(invalid(format!(
                "employer rate {} outside [0, 1]",
                contribution.employer_rate
            )));
        }
        if let Some(ceiling) = contribution.ceiling {
            if ceiling.amount <= Decimal::ZERO {
                return Err(invalid(format!(
                    "ceiling {} must be positive",
                    ceiling.amount
                )));
            }
        }
        if let Some(limit) = contribution.eligibility_max {
            if limit < Decimal::ZERO {
                return Err(invalid(format!(
                    "eligibility limit {limit} must be non-negative"
                )));
            }
        }
    }

    Ok(())
}

fn validate_rules(
    key: TableKey,
    rules: &JurisdictionRules,
    standard_deduction: Decimal,
) -> Result<(), TaxTableError> {
    let invalid = |reason: String| TaxTableError::InvalidRules { key, reason };

    if rules.country() != key.country {
        return Err(invalid(format!(
            "rules are for {} but the table is keyed to {}",
            rules.country(),
            key.country
        )));
    }
    if standard_deduction < Decimal::ZERO {
        return Err(invalid(format!(
            "standard deduction {standard_deduction} must be non-negative"
        )));
    }

    match rules {
        JurisdictionRules::India {
            rebate,
            surcharge,
            cess_rate,
            professional_tax,
        } => {
            if !matches!(key.regime, Regime::New | Regime::Old) {
                return Err(invalid(format!(
                    "India tables use the new or old regime, not {}",
                    key.regime
                )));
            }
            if *cess_rate < Decimal::ZERO {
                return Err(invalid(format!("cess rate {cess_rate} must be non-negative")));
            }
            if let Some(rebate) = rebate {
                if rebate.max_income < Decimal::ZERO || rebate.max_rebate < Decimal::ZERO {
                    return Err(invalid("rebate amounts must be non-negative".to_string()));
                }
            }
            validate_surcharge(surcharge).map_err(invalid)?;
            validate_professional_tax(professional_tax).map_err(invalid)?;
        }
        JurisdictionRules::UnitedStates { filing_status } => {
            if key.regime != Regime::Filing(*filing_status) {
                return Err(invalid(format!(
                    "filing status {} does not match regime {}",
                    filing_status.as_str(),
                    key.regime
                )));
            }
        }
    }

    Ok(())
}

fn validate_surcharge(slabs: &[SurchargeSlab]) -> Result<(), String> {
    for (index, slab) in slabs.iter().enumerate() {
        if slab.above < Decimal::ZERO {
            return Err(format!("surcharge threshold {} must be non-negative", slab.above));
        }
        if !is_rate(slab.rate) {
            return Err(format!("surcharge rate {} outside [0, 1]", slab.rate));
        }
        if index > 0 && slab.above <= slabs[index - 1].above {
            return Err(format!(
                "surcharge threshold {} does not ascend from {}",
                slab.above,
                slabs[index - 1].above
            ));
        }
    }
    Ok(())
}

fn validate_professional_tax(schedules: &[ProfessionalTaxSchedule]) -> Result<(), String> {
    let mut seen = HashSet::new();

    for schedule in schedules {
        let state = schedule.state.trim().to_ascii_uppercase();
        if state.is_empty() {
            return Err("professional tax schedule without a state".to_string());
        }
        if schedule.slabs.is_empty() {
            return Err(format!("professional tax for {state} has no slabs"));
        }
        for (index, slab) in schedule.slabs.iter().enumerate() {
            if slab.min_monthly_earnings < Decimal::ZERO || slab.monthly_amount < Decimal::ZERO {
                return Err(format!("professional tax for {state} has a negative slab"));
            }
            let previous = index.checked_sub(1).map(|i| schedule.slabs[i].min_monthly_earnings);
            if previous.is_some_and(|previous| slab.min_monthly_earnings <= previous) {
                return Err(format!(
                    "professional tax slabs for {state} do not ascend at {}",
                    slab.min_monthly_earnings
                ));
            }
        }
        if !seen.insert(state.clone()) {
            return Err(format!("duplicate professional tax schedule for {state}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn us_key() -> TableKey {
        TableKey::new(
            Country::UnitedStates,
            2025,
            Regime::Filing(FilingStatusCode::Single),
        )
    }

    fn valid_brackets() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(11925)), dec!(0.10)),
            TaxBracket::new(dec!(11925), Some(dec!(48475)), dec!(0.12)),
            TaxBracket::new(dec!(48475), None, dec!(0.22)),
        ]
    }

    fn definition(brackets: Vec<TaxBracket>) -> TaxTableDefinition {
        TaxTableDefinition {
            key: us_key(),
            standard_deduction: dec!(15750),
            brackets,
            rules: JurisdictionRules::UnitedStates {
                filing_status: FilingStatusCode::Single,
            },
            statutory_contributions: vec![StatutoryContribution {
                code: "SS".to_string(),
                name: "Social Security".to_string(),
                employee_rate: dec!(0.062),
                employer_rate: dec!(0.062),
                basis: ContributionBasis::Gross,
                ceiling: Some(Ceiling::annual(dec!(176100))),
                eligibility_max: None,
            }],
        }
    }

    fn bracket_error(brackets: Vec<TaxBracket>) -> BracketTableError {
        match JurisdictionTaxTable::new(definition(brackets)) {
            Err(TaxTableError::InvalidBracketTable { source, .. }) => source,
            other => panic!("expected InvalidBracketTable, got {other:?}"),
        }
    }

    #[test]
    fn accepts_contiguous_schedule() {
        let table = JurisdictionTaxTable::new(definition(valid_brackets())).unwrap();

        assert_eq!(table.key(), us_key());
        assert_eq!(table.brackets().len(), 3);
        assert_eq!(table.cess_rate(), dec!(0));
        assert_eq!(table.rebate(), None);
    }

    #[test]
    fn rejects_empty_schedule() {
        assert_eq!(bracket_error(vec![]), BracketTableError::Empty);
    }

    #[test]
    fn rejects_schedule_not_starting_at_zero() {
        let mut brackets = valid_brackets();
        brackets[0].min_income = dec!(100);

        assert_eq!(
            bracket_error(brackets),
            BracketTableError::DoesNotStartAtZero(dec!(100))
        );
    }

    #[test]
    fn rejects_gap_between_brackets() {
        let mut brackets = valid_brackets();
        brackets[1].min_income = dec!(12000);

        assert_eq!(
            bracket_error(brackets),
            BracketTableError::Gap {
                index: 1,
                expected: dec!(11925),
                found: dec!(12000),
            }
        );
    }

    #[test]
    fn rejects_overlapping_brackets() {
        let mut brackets = valid_brackets();
        brackets[2].min_income = dec!(40000);

        assert_eq!(
            bracket_error(brackets),
            BracketTableError::Overlap {
                index: 2,
                expected: dec!(48475),
                found: dec!(40000),
            }
        );
    }

    #[test]
    fn rejects_unsorted_brackets() {
        let mut brackets = valid_brackets();
        brackets.swap(0, 1);

        assert_eq!(
            bracket_error(brackets),
            BracketTableError::DoesNotStartAtZero(dec!(11925))
        );
    }

    #[test]
    fn rejects_inverted_bounds() {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(0)), dec!(0.10)),
            TaxBracket::new(dec!(0), None, dec!(0.12)),
        ];

        assert_eq!(
            bracket_error(brackets),
            BracketTableError::InvertedBounds {
                index: 0,
                min: dec!(0),
                max: dec!(0),
            }
        );
    }

    #[test]
    fn rejects_unbounded_bracket_in_the_middle() {
        let mut brackets = valid_brackets();
        brackets[1].max_income = None;

        assert_eq!(
            bracket_error(brackets),
            BracketTableError::UnboundedNotLast { index: 1 }
        );
    }

    #[test]
    fn rejects_bounded_top_bracket() {
        let mut brackets = valid_brackets();
        brackets[2].max_income = Some(dec!(100000));

        assert_eq!(
            bracket_error(brackets),
            BracketTableError::LastBracketBounded(dec!(100000))
        );
    }

    #[test]
    fn rejects_rate_above_one() {
        let mut brackets = valid_brackets();
        brackets[1].rate = dec!(12);

        assert_eq!(
            bracket_error(brackets),
            BracketTableError::RateOutOfRange {
                index: 1,
                rate: dec!(12),
            }
        );
    }

    #[test]
    fn rejects_duplicate_contribution_codes() {
        let mut def = definition(valid_brackets());
        let duplicate = def.statutory_contributions[0].clone();
        def.statutory_contributions.push(duplicate);

        let err = JurisdictionTaxTable::new(def).unwrap_err();

        assert!(matches!(
            err,
            TaxTableError::InvalidContribution { ref code, .. } if code == "SS"
        ));
    }

    #[test]
    fn rejects_non_positive_ceiling() {
        let mut def = definition(valid_brackets());
        def.statutory_contributions[0].ceiling = Some(Ceiling::annual(dec!(0)));

        let err = JurisdictionTaxTable::new(def).unwrap_err();

        assert!(matches!(err, TaxTableError::InvalidContribution { .. }));
    }

    #[test]
    fn rejects_rules_for_another_country() {
        let mut def = definition(valid_brackets());
        def.rules = JurisdictionRules::India {
            rebate: None,
            surcharge: vec![],
            cess_rate: dec!(0.04),
            professional_tax: vec![],
        };

        let err = JurisdictionTaxTable::new(def).unwrap_err();

        assert!(matches!(err, TaxTableError::InvalidRules { .. }));
    }

    #[test]
    fn rejects_filing_status_that_disagrees_with_regime() {
        let mut def = definition(valid_brackets());
        def.rules = JurisdictionRules::UnitedStates {
            filing_status: FilingStatusCode::HeadOfHousehold,
        };

        let err = JurisdictionTaxTable::new(def).unwrap_err();

        assert!(matches!(err, TaxTableError::InvalidRules { .. }));
    }

    #[test]
    fn deserializing_validates_the_table() {
        let mut def = definition(valid_brackets());
        def.brackets[1].min_income = dec!(20000);
        let json = serde_json::to_string(&def).unwrap();

        let result = serde_json::from_str::<JurisdictionTaxTable>(&json);

        assert!(result.is_err());
    }

    fn india_definition(rules: JurisdictionRules) -> TaxTableDefinition {
        TaxTableDefinition {
            key: TableKey::new(Country::India, 2025, Regime::New),
            standard_deduction: dec!(75000),
            brackets: vec![
                TaxBracket::new(dec!(0), Some(dec!(400000)), dec!(0)),
                TaxBracket::new(dec!(400000), None, dec!(0.05)),
            ],
            rules,
            statutory_contributions: vec![],
        }
    }

    fn maharashtra() -> ProfessionalTaxSchedule {
        ProfessionalTaxSchedule {
            state: "MH".to_string(),
            slabs: vec![
                ProfessionalTaxSlab {
                    min_monthly_earnings: dec!(0),
                    monthly_amount: dec!(0),
                },
                ProfessionalTaxSlab {
                    min_monthly_earnings: dec!(7501),
                    monthly_amount: dec!(175),
                },
                ProfessionalTaxSlab {
                    min_monthly_earnings: dec!(10001),
                    monthly_amount: dec!(200),
                },
            ],
        }
    }

    fn india_rules(
        surcharge: Vec<SurchargeSlab>,
        professional_tax: Vec<ProfessionalTaxSchedule>,
    ) -> JurisdictionRules {
        JurisdictionRules::India {
            rebate: Some(Rebate {
                max_income: dec!(1200000),
                max_rebate: dec!(60000),
            }),
            surcharge,
            cess_rate: dec!(0.04),
            professional_tax,
        }
    }

    fn rules_error(rules: JurisdictionRules) -> String {
        match JurisdictionTaxTable::new(india_definition(rules)) {
            Err(TaxTableError::InvalidRules { reason, .. }) => reason,
            other => panic!("expected InvalidRules, got {other:?}"),
        }
    }

    #[test]
    fn india_rules_expose_rebate_surcharge_and_cess() {
        let surcharge = vec![
            SurchargeSlab {
                above: dec!(5000000),
                rate: dec!(0.10),
            },
            SurchargeSlab {
                above: dec!(10000000),
                rate: dec!(0.15),
            },
        ];

        let table =
            JurisdictionTaxTable::new(india_definition(india_rules(surcharge.clone(), vec![])))
                .unwrap();

        assert_eq!(table.cess_rate(), dec!(0.04));
        assert_eq!(table.surcharge_slabs(), surcharge.as_slice());
        assert_eq!(
            table.rebate(),
            Some(&Rebate {
                max_income: dec!(1200000),
                max_rebate: dec!(60000),
            })
        );
    }

    #[test]
    fn professional_tax_is_looked_up_by_state() {
        let table =
            JurisdictionTaxTable::new(india_definition(india_rules(vec![], vec![maharashtra()])))
                .unwrap();

        let schedule = table.professional_tax(" mh ").unwrap();

        assert_eq!(schedule.state, "MH");
        assert_eq!(table.professional_tax("DL"), None);
        assert_eq!(schedule.monthly_amount(dec!(7500)), dec!(0));
        assert_eq!(schedule.monthly_amount(dec!(7501)), dec!(175));
        assert_eq!(schedule.monthly_amount(dec!(10000)), dec!(175));
        assert_eq!(schedule.monthly_amount(dec!(80000)), dec!(200));
        assert_eq!(schedule.monthly_amount(dec!(-1)), dec!(0));
    }

    #[test]
    fn us_tables_have_no_surcharge_or_professional_tax() {
        let table = JurisdictionTaxTable::new(definition(valid_brackets())).unwrap();

        assert!(table.surcharge_slabs().is_empty());
        assert_eq!(table.professional_tax("MH"), None);
    }

    #[test]
    fn rejects_descending_surcharge_thresholds() {
        let surcharge = vec![
            SurchargeSlab {
                above: dec!(10000000),
                rate: dec!(0.15),
            },
            SurchargeSlab {
                above: dec!(5000000),
                rate: dec!(0.10),
            },
        ];

        let reason = rules_error(india_rules(surcharge, vec![]));

        assert!(reason.contains("does not ascend"), "{reason}");
    }

    #[test]
    fn rejects_surcharge_rate_above_one() {
        let surcharge = vec![SurchargeSlab {
            above: dec!(5000000),
            rate: dec!(10),
        }];

        let reason = rules_error(india_rules(surcharge, vec![]));

        assert!(reason.contains("surcharge rate"), "{reason}");
    }

    #[test]
    fn rejects_duplicate_professional_tax_state() {
        let mut lowercase = maharashtra();
        lowercase.state = "mh".to_string();

        let reason = rules_error(india_rules(vec![], vec![maharashtra(), lowercase]));

        assert!(reason.contains("duplicate"), "{reason}");
    }

    #[test]
    fn rejects_unsorted_professional_tax_slabs() {
        let mut schedule = maharashtra();
        schedule.slabs.swap(1, 2);

        let reason = rules_error(india_rules(vec![], vec![schedule]));

        assert!(reason.contains("do not ascend"), "{reason}");
    }

    #[test]
    fn rejects_professional_tax_without_slabs() {
        let mut schedule = maharashtra();
        schedule.slabs.clear();

        let reason = rules_error(india_rules(vec![], vec![schedule]));

        assert!(reason.contains("no slabs"), "{reason}");
    }
}
