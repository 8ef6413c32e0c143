//! CSV loader for salary structures.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column | Required | Type | Notes |
//! |--------------------|----------|---------|-------------------------------------------------|
//! | `name` | yes | string | A name containing "basic" marks the basic salary |
//! | `type` | yes | string | `EARNING` or `DEDUCTION` |
//! | `calculation_type` | yes | string | `FIXED`, `PERCENTAGE_OF_BASIC`, `PERCENTAGE_OF_GROSS` |
//! | `value` | yes | decimal | Monthly amount for `FIXED`, a percentage otherwise |
//! | `is_taxable` | no | bool | `true`/`false`/`yes`/`no`/`1`/`0`; empty picks the default |
//!
//! When `is_taxable` is empty or the column is absent, earnings are taxable
//! and deductions are not.
//!
//! ### Example
//!
//! ```csv
//! name,type,calculation_type,value,is_taxable
//! Basic,EARNING,PERCENTAGE_OF_GROSS,50,
//! HRA,EARNING,PERCENTAGE_OF_BASIC,40,
//! Meal Card,EARNING,FIXED,2200,false
//! Canteen,DEDUCTION,FIXED,500,
//! ```

use std::path::{Path, PathBuf};

use payroll_core::{CalculationType, ComponentError, ComponentType, SalaryComponent};
use rust_decimal::Decimal;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    #[serde(rename = "type")]
    component_type: String,
    calculation_type: String,
    value: Decimal,
    #[serde(default)]
    is_taxable: Option<String>,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a salary structure.
#[derive(Debug, thiserror::Error)]
pub enum StructureLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad structure, missing required column or a non-numeric value.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A `type` or `calculation_type` cell was not recognised. `row` is
    /// 1-based, excluding the header.
    #[error("row {row}: {source}")]
    MalformedComponent {
        row: usize,
        #[source]
        source: ComponentError,
    },

    #[error("row {row}: '{value}' is not a valid is_taxable flag")]
    InvalidTaxableFlag { row: usize, value: String },

    #[error("salary structure has no components")]
    Empty,
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Convert a single CSV row into a SalaryComponent.
///
/// row_number is 1-based (for error messages).
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<SalaryComponent, StructureLoadError> {
    let malformed = |source| StructureLoadError::MalformedComponent {
        row: row_number,
        source,
    };
    let component_type: ComponentType = row.component_type.parse().map_err(malformed)?;
    let calculation_type: CalculationType = row.calculation_type.parse().map_err(malformed)?;

    let is_taxable = match row.is_taxable.as_deref().map(str::trim) {
        None | Some("") => component_type == ComponentType::Earning,
        Some(flag) => parse_flag(flag).ok_or_else(|| StructureLoadError::InvalidTaxableFlag {
            row: row_number,
            value: flag.to_string(),
        })?,
    };

    Ok(SalaryComponent {
        name: row.name,
        component_type,
        calculation_type,
        value: row.value,
        is_taxable,
    })
}

/// Parse CSV text and return the components in file order.
///
/// # Errors
///
/// * [StructureLoadError::Parse] – structurally invalid CSV or a value that
///   is not a decimal.
/// * [StructureLoadError::MalformedComponent] – unrecognised `type` or
///   `calculation_type`.
/// * [StructureLoadError::InvalidTaxableFlag] – unrecognised `is_taxable`.
/// * [StructureLoadError::Empty] – no data rows.
pub fn load_from_str(input: &str) -> Result<Vec<SalaryComponent>, StructureLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    let components = reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if components.is_empty() {
        return Err(StructureLoadError::Empty);
    }
    Ok(components)
}

/// Read a file from disk and delegate to [load_from_str].
pub fn load_from_file(path: &Path) -> Result<Vec<SalaryComponent>, StructureLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| StructureLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
