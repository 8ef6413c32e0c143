use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use payroll_core::{PayrollCalculator, TaxTableRegistry, TaxTableSource};
use payroll_data::{PayrollRunConfig, TaxTableLoader, load_bundled, logging, report, structure};
use rust_decimal::Decimal;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Preview one employee's monthly payroll.
///
/// Settings come from a TOML run configuration (`--config`); every flag
/// below overrides the matching configuration value. Without a
/// configuration, `--country`, `--ctc`, `--structure` and one of
/// `--fiscal-year` / `--date` are required.
#[derive(Parser, Debug)]
#[command(name = "payroll-preview")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Country code (IN or US)
    #[arg(long)]
    country: Option<String>,

    /// Fiscal year, labelled by the calendar year it starts in
    #[arg(short = 'y', long)]
    fiscal_year: Option<i32>,

    /// Effective date (YYYY-MM-DD) used to pick the fiscal year
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Regime: new/old for India, a filing status (S, MFJ, MFS, HOH, QSS) for the US
    #[arg(short, long)]
    regime: Option<String>,

    /// Employee's state code, for India professional tax (e.g. KA, MH)
    #[arg(long)]
    state: Option<String>,

    /// Annual cost to company
    #[arg(long)]
    ctc: Option<Decimal>,

    /// Salary structure CSV
    #[arg(short, long)]
    structure: Option<PathBuf>,

    /// Directory holding tax_tables.csv, tax_brackets.csv and
    /// statutory_contributions.csv (bundled tables when omitted)
    #[arg(short, long)]
    tables: Option<PathBuf>,

    /// Switch off a statutory contribution by code (repeatable, e.g. --disable ESI)
    #[arg(long = "disable", value_name = "CODE")]
    disabled: Vec<String>,

    /// List the published tables and exit
    #[arg(long, default_value_t = false)]
    list_tables: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl Args {
    fn run_config(&self) -> Result<PayrollRunConfig> {
        let mut config = match &self.config {
            Some(path) => PayrollRunConfig::load(path)
                .with_context(|| format!("Failed to load run configuration: {}", path.display()))?,
            None => {
                let (Some(country), Some(ctc), Some(structure)) =
                    (&self.country, self.ctc, &self.structure)
                else {
                    bail!("--country, --ctc and --structure are required without --config");
                };
                PayrollRunConfig {
                    country: country.clone(),
                    fiscal_year: None,
                    effective_date: None,
                    regime: None,
                    state: None,
                    annual_ctc: ctc,
                    structure: structure.clone(),
                    tables_dir: None,
                    contributions: Default::default(),
                    year_to_date: Default::default(),
                }
            }
        };

        if let Some(country) = &self.country {
            config.country = country.clone();
        }
        if self.fiscal_year.is_some() || self.date.is_some() {
            config.fiscal_year = self.fiscal_year;
            config.effective_date = self.date;
        }
        if let Some(regime) = &self.regime {
            config.regime = Some(regime.clone());
        }
        if let Some(state) = &self.state {
            config.state = Some(state.clone());
        }
        if let Some(ctc) = self.ctc {
            config.annual_ctc = ctc;
        }
        if let Some(structure) = &self.structure {
            config.structure = structure.clone();
        }
        if let Some(tables) = &self.tables {
            config.tables_dir = Some(tables.clone());
        }
        for code in &self.disabled {
            config.contributions.set(code.as_str(), false);
        }

        Ok(config)
    }
}

fn load_registry(tables_dir: Option<&PathBuf>) -> Result<TaxTableRegistry> {
    match tables_dir {
        Some(dir) => TaxTableLoader::load_dir(dir)
            .with_context(|| format!("Failed to load tax tables from: {}", dir.display())),
        None => load_bundled().context("Bundled tax tables are invalid"),
    }
}

fn main() -> Result<()> {
    logging::init_tracing("info");
    let args = Args::parse();

    if args.list_tables {
        let registry = load_registry(args.tables.as_ref())?;
        for key in registry.keys() {
            println!("{key}");
        }
        return Ok(());
    }

    let config = args.run_config()?;
    let registry = load_registry(config.tables_dir.as_ref())?;
    info!(tables = registry.len(), "tax tables ready");

    let components = structure::load_from_file(&config.structure).with_context(|| {
        format!(
            "Failed to load salary structure: {}",
            config.structure.display()
        )
    })?;

    let request = config
        .request(components)
        .context("Invalid run configuration")?;
    let key = request.table_key();

    let breakdown = PayrollCalculator::new(&registry)
        .calculate(&request)
        .with_context(|| format!("Failed to compute payroll for {key}"))?;

    match args.format {
        OutputFormat::Text => print!("{}", report::render_text(key, &breakdown)),
        OutputFormat::Json => println!(
            "{}",
            report::render_json(key, &breakdown).context("Failed to serialize payroll")?
        ),
    }

    Ok(())
}
