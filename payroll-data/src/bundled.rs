//! Tax tables shipped with the crate.
//!
//! | Country | Fiscal years | Regimes |
//! |---------|--------------|---------|
//! | India | 2024, 2025 | new, old |
//! | United States | 2024, 2025 | S, MFJ, MFS, HOH, QSS |
//!
//! India tables carry the income surcharge slabs and professional tax for
//! Karnataka (`KA`) and Maharashtra (`MH`).

use payroll_core::TaxTableRegistry;

use crate::loader::{TaxTableLoader, TaxTableLoaderError, TaxTableRecords};

pub const TABLES_CSV: &str = include_str!("../data/tax_tables.csv");
pub const BRACKETS_CSV: &str = include_str!("../data/tax_brackets.csv");
pub const CONTRIBUTIONS_CSV: &str = include_str!("../data/statutory_contributions.csv");
pub const SURCHARGES_CSV: &str = include_str!("../data/surcharges.csv");
pub const PROFESSIONAL_TAX_CSV: &str = include_str!("../data/professional_tax.csv");

/// Registry of the bundled tables.
pub fn load_bundled() -> Result<TaxTableRegistry, TaxTableLoaderError> {
    let records = TaxTableRecords::parse(
        TABLES_CSV.as_bytes(),
        BRACKETS_CSV.as_bytes(),
        CONTRIBUTIONS_CSV.as_bytes(),
    )?
    .with_surcharges(SURCHARGES_CSV.as_bytes())?
    .with_professional_tax(PROFESSIONAL_TAX_CSV.as_bytes())?;

    TaxTableLoader::publish(&records)
}
