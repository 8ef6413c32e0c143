use std::sync::Arc;

use thiserror::Error;

use crate::models::{Country, JurisdictionTaxTable, TableKey};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No active table for the requested key. The engine never falls back to
    /// another year or regime.
    #[error("no tax table published for {0}")]
    ConfigurationMissing(TableKey),

    /// Tables are immutable once published; a key can only be published once.
    #[error("a tax table is already published for {0}")]
    DuplicateTable(TableKey),
}

/// Read-only access to published tax tables.
///
/// Implementations must be safe to share across threads: tables are
/// immutable, so concurrent payroll runs read them without locking.
pub trait TaxTableSource: Send + Sync {
    /// The table published for `key`.
    fn table(
        &self,
        key: &TableKey,
    ) -> Result<Arc<JurisdictionTaxTable>, RegistryError>;

    /// Every published key, sorted.
    fn keys(&self) -> Vec<TableKey>;

    /// Fiscal years with at least one table for `country`, ascending.
    fn fiscal_years(
        &self,
        country: Country,
    ) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .keys()
            .into_iter()
            .filter(|key| key.country == country)
            .map(|key| key.fiscal_year)
            .collect();
        years.dedup();
        years
    }
}
