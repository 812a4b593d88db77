//! Schema snapshot commands

use anyhow::{bail, Context, Result};
use planning_lib::schema::compat::{check_compatibility, SchemaSnapshot};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use super::write_output;
use crate::output::{print_error, print_success, print_table, OutputFormat};

#[derive(Tabled, Serialize)]
struct ChangeRow {
    #[tabled(rename = "Breaking change")]
    change: String,
}

/// Write the current schema snapshot as JSON
pub fn dump(output: Option<&Path>) -> Result<()> {
    let snapshot = SchemaSnapshot::current();
    let mut json = serde_json::to_string_pretty(&snapshot)?;
    json.push('\n');
    write_output(output, json.as_bytes())?;

    if let Some(path) = output {
        print_success(&format!(
            "Wrote snapshot of {} messages to {}",
            snapshot.messages.len(),
            path.display()
        ));
    }
    Ok(())
}

/// Compare the current schema with a stored snapshot
pub fn check(path: &Path, format: OutputFormat) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let baseline: SchemaSnapshot =
        serde_json::from_str(&text).context("Failed to parse schema snapshot")?;

    let changes = check_compatibility(&baseline, &SchemaSnapshot::current());
    if changes.is_empty() {
        if format == OutputFormat::Json {
            println!("[]");
        }
        print_success("Schema is wire compatible with the baseline");
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&changes)?),
        OutputFormat::Table => {
            let rows: Vec<ChangeRow> = changes
                .iter()
                .map(|change| ChangeRow {
                    change: change.to_string(),
                })
                .collect();
            print_table(&rows, format);
        }
    }
    print_error(&format!("{} breaking change(s)", changes.len()));
    bail!("schema is not wire compatible with {}", path.display())
}
