//! Output formatters for extraction results

use anyhow::Result;
use colored::*;
use paramsheet::{BatchParameters, CellValue};
use std::path::{Path, PathBuf};

use crate::Outcome;

pub fn print_human(file_path: &Path, outcome: &Outcome) {
    println!("{}", format!("File: {}", file_path.display()).bold());

    match outcome {
        Outcome::Sheets(names) => {
            for (index, name) in names.iter().enumerate() {
                println!("  {} {}", format!("#{}", index).bright_black(), name.cyan());
            }
        }
        Outcome::Batch(batch) => print_batch(batch),
    }
    println!();
}

fn print_batch(batch: &BatchParameters) {
    println!(
        "  {} {}",
        "Category codes:".bold(),
        join(&batch.row_category_codes)
    );

    if batch.parameter_sets.is_empty() {
        println!("  {}", "No parameter sets found".yellow());
        return;
    }

    for set in &batch.parameter_sets {
        println!();
        println!("  {} {}", "Parameter set:".bold(), set.name().cyan().bold());
        for (name, value) in &set.parameters {
            println!("    {} {}", format!("{}:", name).bright_black(), value);
        }
        for (label, values) in &set.columns {
            println!("    {} {}", format!("{}:", label).yellow(), join(values));
        }
    }

    println!();
    println!(
        "{} {} parameter sets, {} categories",
        "✓".green().bold(),
        batch.parameter_sets.len(),
        batch.row_category_codes.len()
    );
}

pub fn print_error(file_path: &Path, err: &anyhow::Error) {
    println!("{}", format!("File: {}", file_path.display()).bold());
    println!("  {} {:#}", "ERROR".red().bold(), err);
    println!();
}

/// Print every file's result as one JSON array
pub fn print_json(results: &[(&PathBuf, Result<Outcome>)]) -> Result<()> {
    let output: Vec<serde_json::Value> = results
        .iter()
        .map(|(path, result)| {
            let file = path.display().to_string();
            match result {
                Ok(Outcome::Sheets(names)) => serde_json::json!({
                    "file": file,
                    "sheets": names,
                }),
                Ok(Outcome::Batch(batch)) => serde_json::json!({
                    "file": file,
                    "batch": batch,
                }),
                Err(err) => serde_json::json!({
                    "file": file,
                    "error": format!("{:#}", err),
                }),
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn join(values: &[CellValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
