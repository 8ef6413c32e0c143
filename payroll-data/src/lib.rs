pub mod bundled;
pub mod config;
pub mod loader;
pub mod logging;
pub mod report;
pub mod structure;

pub use bundled::load_bundled;
pub use config::{PayrollRunConfig, RunConfigError};
pub use loader::{
    ProfessionalTaxRecord, StatutoryContributionRecord, SurchargeRecord, TaxBracketRecord,
    TaxTableLoader, TaxTableLoaderError, TaxTableRecord, TaxTableRecords,
};
pub use structure::StructureLoadError;
