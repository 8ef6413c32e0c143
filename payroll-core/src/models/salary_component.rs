use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A component whose `type` or `calculation_type` text is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComponentError {
    #[error("unrecognised component type '{0}' (expected EARNING or DEDUCTION)")]
    UnknownType(String),

    #[error(
        "unrecognised calculation type '{0}' \
         (expected FIXED, PERCENTAGE_OF_BASIC or PERCENTAGE_OF_GROSS)"
    )]
    UnknownCalculationType(String),
}

/// Upper-cases and folds `-` and spaces to `_` so `percentage-of-basic`
/// and `Percentage of Basic` both read as `PERCENTAGE_OF_BASIC`.
fn normalize_enum_text(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum ComponentType {
    Earning,
    Deduction,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earning => "EARNING",
            Self::Deduction => "DEDUCTION",
        }
    }
}

impl FromStr for ComponentType {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_enum_text(s).as_str() {
            "EARNING" => Ok(Self::Earning),
            "DEDUCTION" => Ok(Self::Deduction),
            _ => Err(ComponentError::UnknownType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ComponentType {
    type Error = ComponentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How a component's `value` turns into a monthly amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum CalculationType {
    /// `value` is a monthly currency amount.
    Fixed,
    /// `value` is a percentage of the resolved basic salary.
    PercentageOfBasic,
    /// `value` is a percentage of gross: the target monthly gross for
    /// earnings, resolved total earnings for deductions.
    PercentageOfGross,
}

impl CalculationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "FIXED",
            Self::PercentageOfBasic => "PERCENTAGE_OF_BASIC",
            Self::PercentageOfGross => "PERCENTAGE_OF_GROSS",
        }
    }
}

impl FromStr for CalculationType {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_enum_text(s).as_str() {
            "FIXED" => Ok(Self::Fixed),
            "PERCENTAGE_OF_BASIC" => Ok(Self::PercentageOfBasic),
            "PERCENTAGE_OF_GROSS" => Ok(Self::PercentageOfGross),
            _ => Err(ComponentError::UnknownCalculationType(s.to_string())),
        }
    }
}

impl TryFrom<String> for CalculationType {
    type Error = ComponentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One line of a salary structure definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponent {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub calculation_type: CalculationType,
    /// Currency units for `Fixed`, a percentage (e.g. `40` for 40%) otherwise.
    pub value: Decimal,
    pub is_taxable: bool,
}

impl SalaryComponent {
    pub fn earning(
        name: impl Into<String>,
        calculation_type: CalculationType,
        value: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            component_type: ComponentType::Earning,
            calculation_type,
            value,
            is_taxable: true,
        }
    }

    pub fn deduction(
        name: impl Into<String>,
        calculation_type: CalculationType,
        value: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            component_type: ComponentType::Deduction,
            calculation_type,
            value,
            is_taxable: false,
        }
    }

    pub fn with_taxable(
        mut self,
        is_taxable: bool,
    ) -> Self {
        self.is_taxable = is_taxable;
        self
    }

    /// Whether this component's name marks it as the basic salary.
    ///
    /// Case-insensitive substring match on "basic", so "Basic Pay" and
    /// "BASIC_SALARY" both qualify.
    pub fn is_basic(&self) -> bool {
        self.name.to_lowercase().contains("basic")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn component_type_parses_case_insensitively() {
        assert_eq!("earning".parse(), Ok(ComponentType::Earning));
        assert_eq!(" DEDUCTION ".parse(), Ok(ComponentType::Deduction));
    }

    #[test]
    fn component_type_rejects_unknown_text() {
        assert_eq!(
            "BONUS".parse::<ComponentType>(),
            Err(ComponentError::UnknownType("BONUS".to_string()))
        );
    }

    #[test]
    fn calculation_type_accepts_separator_variants() {
        assert_eq!(
            "percentage-of-basic".parse(),
            Ok(CalculationType::PercentageOfBasic)
        );
        assert_eq!(
            "Percentage of Gross".parse(),
            Ok(CalculationType::PercentageOfGross)
        );
        assert_eq!("fixed".parse(), Ok(CalculationType::Fixed));
    }

    #[test]
    fn calculation_type_rejects_unknown_text() {
        assert_eq!(
            "PERCENTAGE_OF_CTC".parse::<CalculationType>(),
            Err(ComponentError::UnknownCalculationType(
                "PERCENTAGE_OF_CTC".to_string()
            ))
        );
    }

    #[test]
    fn deserializing_unknown_calculation_type_fails() {
        let json = r#"{
            "name": "Bonus",
            "type": "EARNING",
            "calculation_type": "PERCENTAGE_OF_PROFIT",
            "value": "10",
            "is_taxable": true
        }"#;

        let err = serde_json::from_str::<SalaryComponent>(json).unwrap_err();

        assert!(err.to_string().contains("PERCENTAGE_OF_PROFIT"), "{err}");
    }

    #[test]
    fn deserializes_well_formed_component() {
        let json = r#"{
            "name": "HRA",
            "type": "earning",
            "calculation_type": "percentage_of_basic",
            "value": "40",
            "is_taxable": true
        }"#;

        let component: SalaryComponent = serde_json::from_str(json).unwrap();

        assert_eq!(
            component,
            SalaryComponent::earning("HRA", CalculationType::PercentageOfBasic, dec!(40))
        );
    }

    #[test]
    fn is_basic_matches_substring_in_any_case() {
        let basic = SalaryComponent::earning("Basic Pay", CalculationType::Fixed, dec!(1));
        let shouting = SalaryComponent::earning("BASIC_SALARY", CalculationType::Fixed, dec!(1));
        let hra = SalaryComponent::earning("HRA", CalculationType::Fixed, dec!(1));

        assert!(basic.is_basic());
        assert!(shouting.is_basic());
        assert!(!hra.is_basic());
    }
}
