pub mod registry;
pub mod source;

pub use registry::TaxTableRegistry;
pub use source::{RegistryError, TaxTableSource};
