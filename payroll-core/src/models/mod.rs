mod filing_status;
mod jurisdiction;
mod line;
mod salary_component;
mod tax_bracket;
mod tax_table;

pub use filing_status::FilingStatusCode;
pub use jurisdiction::{Country, Regime, TableKey};
pub use line::{Line, MONTHS_PER_YEAR, annual_total, monthly_total};
pub use salary_component::{CalculationType, ComponentError, ComponentType, SalaryComponent};
pub use tax_bracket::TaxBracket;
pub use tax_table::{
    BracketTableError, Ceiling, CeilingPeriod, ContributionBasis, JurisdictionRules,
    JurisdictionTaxTable, ProfessionalTaxSchedule, ProfessionalTaxSlab, Rebate,
    StatutoryContribution, SurchargeSlab, TaxTableDefinition, TaxTableError,
};
