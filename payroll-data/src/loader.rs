//! Tax table loader.
//!
//! A table set is spread over CSV files joined on `(country, fiscal_year,
//! regime)` or `(country, fiscal_year)`:
//!
//! | File | One row per | Required |
//! |------|-------------|----------|
//! | `tax_tables.csv` | table: standard deduction, rebate, cess | yes |
//! | `tax_brackets.csv` | bracket of a table | yes |
//! | `statutory_contributions.csv` | contribution shared by every table of a country and year | yes |
//! | `surcharges.csv` | surcharge slab of an India table | no |
//! | `professional_tax.csv` | state professional tax slab, shared by every India table of a year | no |
//!
//! Bracket, surcharge and professional tax rows are kept in file order, so an
//! unsorted schedule is rejected when the table is validated.
//!
//! India rows use the regimes `new` and `old`. United States rows use the IRS
//! schedule codes, which fan out to filing statuses:
//!
//! - Schedule X → Single (S)
//! - Schedule Y-1 → Married Filing Jointly (MFJ) and Qualifying Surviving Spouse (QSS)
//! - Schedule Y-2 → Married Filing Separately (MFS)
//! - Schedule Z → Head of Household (HOH)
//!
//! A bare filing status code (`MFJ`, `HOH`, ...) is accepted in place of a
//! schedule code.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use payroll_core::{
    Ceiling, CeilingPeriod, ContributionBasis, Country, FilingStatusCode, JurisdictionRules,
    JurisdictionTaxTable, ProfessionalTaxSchedule, ProfessionalTaxSlab, Rebate, Regime,
    RegistryError, StatutoryContribution, SurchargeSlab, TableKey, TaxBracket,
    TaxTableDefinition, TaxTableError, TaxTableRegistry,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const TABLES_FILE: &str = "tax_tables.csv";
pub const BRACKETS_FILE: &str = "tax_brackets.csv";
pub const CONTRIBUTIONS_FILE: &str = "statutory_contributions.csv";
pub const SURCHARGES_FILE: &str = "surcharges.csv";
pub const PROFESSIONAL_TAX_FILE: &str = "professional_tax.csv";

/// Errors that can occur when loading tax table data.
#[derive(Debug, Error)]
pub enum TaxTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid country: {0}")]
    InvalidCountry(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid regime '{regime}' for {country}")]
    InvalidRegime { country: Country, regime: String },

    #[error("contribution {code}: invalid basis '{value}'")]
    InvalidBasis { code: String, value: String },

    #[error("contribution {code}: invalid ceiling period '{value}'")]
    InvalidCeilingPeriod { code: String, value: String },

    #[error("contribution {code}: ceiling and ceiling_period must be given together")]
    IncompleteCeiling { code: String },

    #[error("{country}/{fiscal_year}/{regime}: rebate_max_income and rebate_max_amount must be given together")]
    IncompleteRebate {
        country: Country,
        fiscal_year: i32,
        regime: String,
    },

    #[error("{country}/{fiscal_year}/{regime}: no brackets")]
    MissingBrackets {
        country: Country,
        fiscal_year: i32,
        regime: String,
    },

    #[error("{country}/{fiscal_year}/{regime}: brackets without a table row")]
    OrphanBrackets {
        country: Country,
        fiscal_year: i32,
        regime: String,
    },

    #[error("{country}/{fiscal_year}/{regime}: surcharge slabs without a table row")]
    OrphanSurcharges {
        country: Country,
        fiscal_year: i32,
        regime: String,
    },

    #[error(transparent)]
    InvalidTable(#[from] TaxTableError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl From<csv::Error> for TaxTableLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxTableLoaderError::CsvParse(err.to_string())
    }
}

/// Maps a regime column value to the regimes it publishes for `country`.
fn regimes_for(
    country: Country,
    code: &str,
) -> Result<Vec<Regime>, TaxTableLoaderError> {
    let code = code.trim();
    match country {
        Country::UnitedStates => {
            let statuses = match code {
                "X" => vec![FilingStatusCode::Single],
                "Y-1" => vec![
                    FilingStatusCode::MarriedFilingJointly,
                    FilingStatusCode::QualifyingSurvivingSpouse,
                ],
                "Y-2" => vec![FilingStatusCode::MarriedFilingSeparately],
                "Z" => vec![FilingStatusCode::HeadOfHousehold],
                other => match FilingStatusCode::parse(other) {
                    Some(status) => vec![status],
                    None => return Err(TaxTableLoaderError::InvalidSchedule(other.to_string())),
                },
            };
            Ok(statuses.into_iter().map(Regime::Filing).collect())
        }
        Country::India => match Regime::parse(code) {
            Some(regime @ (Regime::New | Regime::Old)) => Ok(vec![regime]),
            _ => Err(TaxTableLoaderError::InvalidRegime {
                country,
                regime: code.to_string(),
            }),
        },
    }
}

fn parse_country(value: &str) -> Result<Country, TaxTableLoaderError> {
    Country::parse(value).ok_or_else(|| TaxTableLoaderError::InvalidCountry(value.to_string()))
}

/// Join key shared by table and bracket rows.
type GroupKey = (Country, i32, String);

fn group_key(
    country: &str,
    fiscal_year: i32,
    regime: &str,
) -> Result<GroupKey, TaxTableLoaderError> {
    Ok((
        parse_country(country)?,
        fiscal_year,
        regime.trim().to_ascii_uppercase(),
    ))
}

/// A record from `tax_tables.csv`.
///
/// - `standard_deduction`: annual amount subtracted before brackets apply
/// - `rebate_max_income` / `rebate_max_amount`: India cliff rebate (empty for none)
/// - `cess_rate`: India cess as a decimal (e.g. 0.04)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxTableRecord {
    pub country: String,
    pub fiscal_year: i32,
    pub regime: String,
    pub standard_deduction: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub rebate_max_income: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub rebate_max_amount: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub cess_rate: Option<Decimal>,
}

/// A record from `tax_brackets.csv`.
///
/// - `max_income`: upper bound of the bracket (empty for unlimited)
/// - `rate`: marginal rate as a decimal (e.g. 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub country: String,
    pub fiscal_year: i32,
    pub regime: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// A record from `surcharges.csv`.
///
/// - `above`: taxable income the slab starts after
/// - `rate`: surcharge on tax after rebate as a decimal (e.g. 0.10)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SurchargeRecord {
    pub country: String,
    pub fiscal_year: i32,
    pub regime: String,
    pub above: Decimal,
    pub rate: Decimal,
}

/// A record from `professional_tax.csv`.
///
/// - `state`: state code the slab belongs to (e.g. `MH`)
/// - `min_monthly_earnings`: monthly earnings from which `monthly_amount` is owed
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProfessionalTaxRecord {
    pub country: String,
    pub fiscal_year: i32,
    pub state: String,
    pub min_monthly_earnings: Decimal,
    pub monthly_amount: Decimal,
}

/// A record from `statutory_contributions.csv`.
///
/// - `basis`: `basic` or `gross`
/// - `ceiling` / `ceiling_period`: wage ceiling and `monthly` or `annual` (both empty for none)
/// - `eligibility_max`: monthly earnings above which the contribution does not apply
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StatutoryContributionRecord {
    pub country: String,
    pub fiscal_year: i32,
    pub code: String,
    pub name: String,
    pub employee_rate: Decimal,
    pub employer_rate: Decimal,
    pub basis: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub ceiling: Option<Decimal>,
    pub ceiling_period: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub eligibility_max: Option<Decimal>,
}

impl StatutoryContributionRecord {
    fn to_contribution(&self) -> Result<StatutoryContribution, TaxTableLoaderError> {
        let code = self.code.trim().to_string();
        let basis = ContributionBasis::parse(&self.basis).ok_or_else(|| {
            TaxTableLoaderError::InvalidBasis {
                code: code.clone(),
                value: self.basis.clone(),
            }
        })?;

        let period = self
            .ceiling_period
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        let ceiling = match (self.ceiling, period) {
            (None, None) => None,
            (Some(amount), Some(period)) => {
                let period = CeilingPeriod::parse(period).ok_or_else(|| {
                    TaxTableLoaderError::InvalidCeilingPeriod {
                        code: code.clone(),
                        value: period.to_string(),
                    }
                })?;
                Some(Ceiling { amount, period })
            }
            _ => return Err(TaxTableLoaderError::IncompleteCeiling { code }),
        };

        Ok(StatutoryContribution {
            name: self.name.trim().to_string(),
            code,
            employee_rate: self.employee_rate,
            employer_rate: self.employer_rate,
            basis,
            ceiling,
            eligibility_max: self.eligibility_max,
        })
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_records<R, T>(reader: R) -> Result<Vec<T>, TaxTableLoaderError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let record: T = result?;
        records.push(record);
    }

    Ok(records)
}

fn open(path: &Path) -> Result<File, TaxTableLoaderError> {
    File::open(path).map_err(|source| TaxTableLoaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Opens `path` when it exists.
fn open_optional(path: &Path) -> Result<Option<File>, TaxTableLoaderError> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "optional table file absent");
            Ok(None)
        }
        Err(source) => Err(TaxTableLoaderError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parsed rows of every table file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxTableRecords {
    pub tables: Vec<TaxTableRecord>,
    pub brackets: Vec<TaxBracketRecord>,
    pub contributions: Vec<StatutoryContributionRecord>,
    pub surcharges: Vec<SurchargeRecord>,
    pub professional_tax: Vec<ProfessionalTaxRecord>,
}

impl TaxTableRecords {
    /// Parse the three required sources.
    pub fn parse<T: Read, B: Read, C: Read>(
        tables: T,
        brackets: B,
        contributions: C,
    ) -> Result<Self, TaxTableLoaderError> {
        Ok(Self {
            tables: TaxTableLoader::parse_tables(tables)?,
            brackets: TaxTableLoader::parse_brackets(brackets)?,
            contributions: TaxTableLoader::parse_contributions(contributions)?,
            ..Self::default()
        })
    }

    /// Add rows from a `surcharges.csv` source.
    pub fn with_surcharges<R: Read>(
        mut self,
        reader: R,
    ) -> Result<Self, TaxTableLoaderError> {
        self.surcharges.extend(parse_records::<_, SurchargeRecord>(reader)?);
        Ok(self)
    }

    /// Add rows from a `professional_tax.csv` source.
    pub fn with_professional_tax<R: Read>(
        mut self,
        reader: R,
    ) -> Result<Self, TaxTableLoaderError> {
        self.professional_tax
            .extend(parse_records::<_, ProfessionalTaxRecord>(reader)?);
        Ok(self)
    }
}

/// Groups professional tax rows into one schedule per state, in file order.
fn professional_tax_schedules(
    records: &[ProfessionalTaxRecord]
) -> Result<BTreeMap<(Country, i32), Vec<ProfessionalTaxSchedule>>, TaxTableLoaderError> {
    let mut by_year: BTreeMap<(Country, i32), Vec<ProfessionalTaxSchedule>> = BTreeMap::new();

    for record in records {
        let schedules = by_year
            .entry((parse_country(&record.country)?, record.fiscal_year))
            .or_default();
        let state = record.state.trim().to_ascii_uppercase();
        let slab = ProfessionalTaxSlab {
            min_monthly_earnings: record.min_monthly_earnings,
            monthly_amount: record.monthly_amount,
        };
        match schedules.iter_mut().find(|schedule| schedule.state == state) {
            Some(schedule) => schedule.slabs.push(slab),
            None => schedules.push(ProfessionalTaxSchedule {
                state,
                slabs: vec![slab],
            }),
        }
    }

    Ok(by_year)
}

/// Surcharge and professional tax rows joined to one table row.
struct IndiaExtras {
    surcharge: Vec<SurchargeSlab>,
    professional_tax: Vec<ProfessionalTaxSchedule>,
}

/// Loader for tax tables from CSV files.
///
/// Parsing and building are separate steps so callers can inspect or patch
/// records before the tables are validated.
pub struct TaxTableLoader;

impl TaxTableLoader {
    /// Parse `tax_tables.csv` records from any reader.
    pub fn parse_tables<R: Read>(reader: R) -> Result<Vec<TaxTableRecord>, TaxTableLoaderError> {
        parse_records(reader)
    }

    /// Parse `tax_brackets.csv` records from any reader.
    pub fn parse_brackets<R: Read>(
        reader: R
    ) -> Result<Vec<TaxBracketRecord>, TaxTableLoaderError> {
        parse_records(reader)
    }

    /// Parse `statutory_contributions.csv` records from any reader.
    pub fn parse_contributions<R: Read>(
        reader: R
    ) -> Result<Vec<StatutoryContributionRecord>, TaxTableLoaderError> {
        parse_records(reader)
    }

    /// Parse `surcharges.csv` records from any reader.
    pub fn parse_surcharges<R: Read>(
        reader: R
    ) -> Result<Vec<SurchargeRecord>, TaxTableLoaderError> {
        parse_records(reader)
    }

    /// Parse `professional_tax.csv` records from any reader.
    pub fn parse_professional_tax<R: Read>(
        reader: R
    ) -> Result<Vec<ProfessionalTaxRecord>, TaxTableLoaderError> {
        parse_records(reader)
    }

    /// Join parsed records into validated tables.
    ///
    /// Every table row needs at least one bracket, and every bracket or
    /// surcharge slab must belong to a table row. Contributions and
    /// professional tax of a `(country, fiscal_year)` are attached to every
    /// table of that year. Schedule Y-1 publishes the same figures for both
    /// MFJ and QSS.
    pub fn build(
        records: &TaxTableRecords
    ) -> Result<Vec<JurisdictionTaxTable>, TaxTableLoaderError> {
        let mut brackets_by_table: BTreeMap<GroupKey, Vec<TaxBracket>> = BTreeMap::new();
        for record in &records.brackets {
            brackets_by_table
                .entry(group_key(&record.country, record.fiscal_year, &record.regime)?)
                .or_default()
                .push(TaxBracket::new(
                    record.min_income,
                    record.max_income,
                    record.rate,
                ));
        }

        let mut surcharges_by_table: BTreeMap<GroupKey, Vec<SurchargeSlab>> = BTreeMap::new();
        for record in &records.surcharges {
            surcharges_by_table
                .entry(group_key(&record.country, record.fiscal_year, &record.regime)?)
                .or_default()
                .push(SurchargeSlab {
                    above: record.above,
                    rate: record.rate,
                });
        }

        let mut contributions_by_year: BTreeMap<(Country, i32), Vec<StatutoryContribution>> =
            BTreeMap::new();
        for record in &records.contributions {
            contributions_by_year
                .entry((parse_country(&record.country)?, record.fiscal_year))
                .or_default()
                .push(record.to_contribution()?);
        }

        let professional_tax_by_year = professional_tax_schedules(&records.professional_tax)?;

        let mut used = BTreeSet::new();
        let mut built = Vec::new();

        for record in &records.tables {
            let group = group_key(&record.country, record.fiscal_year, &record.regime)?;
            let (country, fiscal_year, regime_code) = group.clone();

            let table_brackets = brackets_by_table.get(&group).cloned().ok_or_else(|| {
                TaxTableLoaderError::MissingBrackets {
                    country,
                    fiscal_year,
                    regime: regime_code.clone(),
                }
            })?;
            let extras = IndiaExtras {
                surcharge: surcharges_by_table.get(&group).cloned().unwrap_or_default(),
                professional_tax: professional_tax_by_year
                    .get(&(country, fiscal_year))
                    .cloned()
                    .unwrap_or_default(),
            };
            used.insert(group);

            let table_contributions = contributions_by_year
                .get(&(country, fiscal_year))
                .cloned()
                .unwrap_or_default();

            for regime in regimes_for(country, &regime_code)? {
                let rules = Self::rules(record, &extras, country, fiscal_year, regime)?;
                let table = JurisdictionTaxTable::new(TaxTableDefinition {
                    key: TableKey::new(country, fiscal_year, regime),
                    standard_deduction: record.standard_deduction,
                    brackets: table_brackets.clone(),
                    rules,
                    statutory_contributions: table_contributions.clone(),
                })?;
                debug!(table = %table.key(), brackets = table.brackets().len(), "built tax table");
                built.push(table);
            }
        }

        if let Some((country, fiscal_year, regime)) = brackets_by_table
            .into_keys()
            .find(|group| !used.contains(group))
        {
            return Err(TaxTableLoaderError::OrphanBrackets {
                country,
                fiscal_year,
                regime,
            });
        }
        if let Some((country, fiscal_year, regime)) = surcharges_by_table
            .into_keys()
            .find(|group| !used.contains(group))
        {
            return Err(TaxTableLoaderError::OrphanSurcharges {
                country,
                fiscal_year,
                regime,
            });
        }

        Ok(built)
    }

    fn rules(
        record: &TaxTableRecord,
        extras: &IndiaExtras,
        country: Country,
        fiscal_year: i32,
        regime: Regime,
    ) -> Result<JurisdictionRules, TaxTableLoaderError> {
        match (country, regime) {
            (Country::UnitedStates, Regime::Filing(filing_status)) => {
                if record.rebate_max_income.is_some()
                    || record.cess_rate.is_some()
                    || !extras.surcharge.is_empty()
                    || !extras.professional_tax.is_empty()
                {
                    warn!(
                        country = %country,
                        fiscal_year,
                        regime = %regime,
                        "India-only columns are ignored for United States tables"
                    );
                }
                Ok(JurisdictionRules::UnitedStates { filing_status })
            }
            _ => {
                let rebate = match (record.rebate_max_income, record.rebate_max_amount) {
                    (None, None) => None,
                    (Some(max_income), Some(max_rebate)) => Some(Rebate {
                        max_income,
                        max_rebate,
                    }),
                    _ => {
                        return Err(TaxTableLoaderError::IncompleteRebate {
                            country,
                            fiscal_year,
                            regime: regime.to_string(),
                        });
                    }
                };
                Ok(JurisdictionRules::India {
                    rebate,
                    surcharge: extras.surcharge.clone(),
                    cess_rate: record.cess_rate.unwrap_or(Decimal::ZERO),
                    professional_tax: extras.professional_tax.clone(),
                })
            }
        }
    }

    /// Build a registry from parsed records.
    pub fn publish(records: &TaxTableRecords) -> Result<TaxTableRegistry, TaxTableLoaderError> {
        let mut registry = TaxTableRegistry::new();
        registry.publish_all(Self::build(records)?)?;
        Ok(registry)
    }

    /// Build a registry from the three required CSV sources.
    pub fn load<T: Read, B: Read, C: Read>(
        tables: T,
        brackets: B,
        contributions: C,
    ) -> Result<TaxTableRegistry, TaxTableLoaderError> {
        Self::publish(&TaxTableRecords::parse(tables, brackets, contributions)?)
    }

    /// Build a registry from the table files in `dir`. `surcharges.csv` and
    /// `professional_tax.csv` may be absent.
    pub fn load_dir(dir: &Path) -> Result<TaxTableRegistry, TaxTableLoaderError> {
        info!(dir = %dir.display(), "loading tax tables");
        let mut records = TaxTableRecords::parse(
            open(&dir.join(TABLES_FILE))?,
            open(&dir.join(BRACKETS_FILE))?,
            open(&dir.join(CONTRIBUTIONS_FILE))?,
        )?;
        if let Some(file) = open_optional(&dir.join(SURCHARGES_FILE))? {
            records = records.with_surcharges(file)?;
        }
        if let Some(file) = open_optional(&dir.join(PROFESSIONAL_TAX_FILE))? {
            records = records.with_professional_tax(file)?;
        }
        Self::publish(&records)
    }
}
