//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use pwkeep_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "database": config.database,
                    "portable": config.portable,
                    "notify_ms": config.notify_ms,
                    "log_file": config.log_file,
                    "resolved_database": config.sqlite_path(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.sqlite_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:  {}", config.data_dir.display());
            println!("  database:  {}", display_opt(config.database.as_ref()));
            println!("  portable:  {}", config.portable);
            println!("  notify_ms: {}", config.notify_ms);
            println!("  log_file:  {}", display_opt(config.log_file.as_ref()));
            println!();
            println!("Database file: {}", config.sqlite_path().display());
            println!("Config file:   {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);

    // Environment overrides are per-invocation and must not be persisted
    let mut config = Config::load_file_only(&path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;

    config
        .save_to_path(&path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "database" => {
            config.database = optional_path(value);
        }
        "portable" => {
            config.portable = value
                .parse()
                .context("Invalid value for portable. Use 'true' or 'false'.")?;
        }
        "notify_ms" => {
            config.notify_ms = value
                .parse()
                .context("Invalid value for notify_ms. Use a number of milliseconds.")?;
        }
        "log_file" => {
            config.log_file = optional_path(value);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, database, portable, notify_ms, log_file",
                key
            );
        }
    }
    Ok(())
}

/// Empty or "none" clears an optional path
fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.into())
    }
}

fn display_opt(path: Option<&PathBuf>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_setting() {
        let mut config = Config::default();

        apply_setting(&mut config, "database", "/tmp/vault.db").unwrap();
        assert_eq!(config.database, Some(PathBuf::from("/tmp/vault.db")));

        apply_setting(&mut config, "database", "none").unwrap();
        assert!(config.database.is_none());

        apply_setting(&mut config, "portable", "true").unwrap();
        assert!(config.portable);

        apply_setting(&mut config, "notify_ms", "1500").unwrap();
        assert_eq!(config.notify_ms, 1500);
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let mut config = Config::default();

        assert!(apply_setting(&mut config, "portable", "maybe").is_err());
        assert!(apply_setting(&mut config, "notify_ms", "soon").is_err());
        assert!(apply_setting(&mut config, "color", "blue").is_err());
    }

    #[test]
    fn test_set_writes_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set("notify_ms".to_string(), "750".to_string(), Some(&path), &output).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("notify_ms = 750"));
    }

    #[test]
    fn test_set_keeps_other_file_values() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "database = \"/srv/vault.db\"\n").unwrap();
        let output = Output::new(OutputFormat::Quiet);

        set("portable".to_string(), "true".to_string(), Some(&path), &output).unwrap();

        let config = Config::load_file_only(&path).unwrap();
        assert!(config.portable);
        assert_eq!(config.database, Some(PathBuf::from("/srv/vault.db")));
    }
}
