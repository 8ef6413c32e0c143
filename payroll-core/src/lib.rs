pub mod calculations;
pub mod models;
pub mod tables;

pub use calculations::{PayrollBreakdown, PayrollCalculator, PayrollError, PayrollRequest};
pub use models::*;
pub use tables::{RegistryError, TaxTableRegistry, TaxTableSource};
