use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::source::{RegistryError, TaxTableSource};
use crate::models::{JurisdictionTaxTable, TableKey};

/// In-memory registry of published [`JurisdictionTaxTable`]s, keyed by
/// `(country, fiscal year, regime)`.
///
/// Typical lifetime:
/// 1. Create with `TaxTableRegistry::new()`.
/// 2. Call `publish` once per validated table (at seed/startup time).
/// 3. Wrap in an `Arc` and share it with every payroll run.
///
/// Tables are handed out as `Arc`s, so callers may hold on to them as a
/// process-wide cache.
#[derive(Debug, Clone, Default)]
pub struct TaxTableRegistry {
    tables: BTreeMap<TableKey, Arc<JurisdictionTaxTable>>,
}

impl TaxTableRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a table under its own key.
    ///
    /// # Errors
    /// * [`RegistryError::DuplicateTable`]: a table is already published for
    ///   the key. Published tables are never replaced.
    pub fn publish(
        &mut self,
        table: JurisdictionTaxTable,
    ) -> Result<(), RegistryError> {
        let key = table.key();
        if self.tables.contains_key(&key) {
            return Err(RegistryError::DuplicateTable(key));
        }
        debug!(table = %key, "published tax table");
        self.tables.insert(key, Arc::new(table));
        Ok(())
    }

    /// Publish every table in `tables`, stopping at the first duplicate.
    pub fn publish_all(
        &mut self,
        tables: impl IntoIterator<Item = JurisdictionTaxTable>,
    ) -> Result<(), RegistryError> {
        tables.into_iter().try_for_each(|table| self.publish(table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TaxTableSource for TaxTableRegistry {
    fn table(
        &self,
        key: &TableKey,
    ) -> Result<Arc<JurisdictionTaxTable>, RegistryError> {
        self.tables
            .get(key)
            .cloned()
            .ok_or(RegistryError::ConfigurationMissing(*key))
    }

    fn keys(&self) -> Vec<TableKey> {
        self.tables.keys().copied().collect()
    }
}
