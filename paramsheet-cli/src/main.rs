use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::{LevelFilter, debug};
use paramsheet::config::DEFAULT_CONFIG_FILE;
use paramsheet::{BatchParameters, ExtractorConfig, XlsxWorkbook, load_batch_parameters};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

mod formatter;

#[derive(Parser)]
#[command(name = "paramsheet")]
#[command(about = "Extract batch parameter sets from XLSX parameter tables", long_about = None)]
#[command(version)]
struct Cli {
    /// XLSX files to read
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Zero-based sheet index (overrides the configuration)
    #[arg(short, long, value_name = "INDEX")]
    sheet: Option<usize>,

    /// Only list the sheets of each file
    #[arg(short, long)]
    list_sheets: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

/// What was read from one file
pub enum Outcome {
    Sheets(Vec<String>),
    Batch(BatchParameters),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(sheet) = cli.sheet {
        config = config.with_sheet_index(sheet);
    }

    let results: Vec<(&PathBuf, Result<Outcome>)> = cli
        .files
        .par_iter()
        .map(|path| (path, process_file(path, &config, cli.list_sheets)))
        .collect();

    let mut failed = false;
    match cli.format {
        OutputFormat::Human => {
            for (path, result) in &results {
                match result {
                    Ok(outcome) => formatter::print_human(path, outcome),
                    Err(err) => {
                        failed = true;
                        formatter::print_error(path, err);
                    }
                }
            }
        }
        OutputFormat::Json => {
            failed = results.iter().any(|(_, result)| result.is_err());
            formatter::print_json(&results)?;
        }
    }

    std::process::exit(if failed { 1 } else { 0 });
}

/// `--config`, then `paramsheet.toml` in the working directory, then defaults
fn load_config(path: Option<&Path>) -> Result<ExtractorConfig> {
    if let Some(config_path) = path {
        return ExtractorConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    let default_config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if default_config_path.exists() {
        debug!("Using {}", default_config_path.display());
        ExtractorConfig::from_file(&default_config_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                default_config_path.display()
            )
        })
    } else {
        Ok(ExtractorConfig::default())
    }
}

fn process_file(path: &Path, config: &ExtractorConfig, list_sheets: bool) -> Result<Outcome> {
    if list_sheets {
        let workbook = XlsxWorkbook::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let names = workbook.sheet_names().into_iter().map(String::from).collect();
        return Ok(Outcome::Sheets(names));
    }

    let batch = load_batch_parameters(path, config)
        .with_context(|| format!("Failed to extract parameters from {}", path.display()))?;
    Ok(Outcome::Batch(batch))
}
