//! Status and init command handlers

use anyhow::{Context, Result};
use serde_json::json;

use pwkeep_core::{Config, RecordStore};

use crate::output::{Output, OutputFormat};

/// Report where the database lives after opening (and so initializing) it
pub fn init(store: &RecordStore, output: &Output) -> Result<()> {
    let path = store
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string());

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                json!({
                    "database": path,
                    "records": store.count()?,
                })
            );
        }
        OutputFormat::Quiet => println!("{}", path),
        OutputFormat::Human => {
            output.success(&format!("Database ready: {}", path));
            output.message(&format!("{} record(s)", store.count()?));
        }
    }

    Ok(())
}

/// Show status information
pub fn show(store: &RecordStore, config: &Config, output: &Output) -> Result<()> {
    let path = store.path().map(|p| p.to_path_buf());
    let size = path
        .as_ref()
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);
    let count = store.count().context("Failed to count records")?;
    let version = store
        .schema_version()
        .context("Failed to read schema version")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                json!({
                    "database": path,
                    "database_size": size,
                    "schema_version": version,
                    "portable": config.portable,
                    "records": count,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", count);
        }
        OutputFormat::Human => {
            println!("pwkeep Status");
            println!("=============");
            println!();
            println!("Storage:");
            match path {
                Some(ref p) => println!("  Location: {}", p.display()),
                None => println!("  Location: (in memory)"),
            }
            println!("  Size:     {}", human_size(size));
            println!(
                "  Schema:   {}",
                version
                    .map(|v| format!("v{}", v))
                    .unwrap_or_else(|| "unknown".to_string())
            );
            println!("  Portable: {}", if config.portable { "yes" } else { "no" });
            println!();
            println!("Contents:");
            println!("  Records: {}", count);
        }
    }

    Ok(())
}

/// Format a byte count for humans
fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
