//! pwkeep CLI
//!
//! Command-line and terminal interface for pwkeep - a local keeper of
//! credential records.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pwkeep_core::{Config, Field, RecordStore};

mod clipboard;
mod commands;
mod logging;
mod output;
mod prompt;
mod tui;

use commands::record::FieldArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "pwkeep")]
#[command(about = "pwkeep - Local credential records with masked display and copy")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use a specific database file
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Create the database if needed and show where it lives
    Init,
    /// List all records (passwords masked)
    #[command(alias = "ls")]
    List {
        /// Show plaintext passwords
        #[arg(long)]
        reveal: bool,
    },
    /// Add a new record
    #[command(alias = "create")]
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show a single record
    Show {
        /// Record ID (full UUID or prefix)
        id: String,
        /// Show the plaintext password
        #[arg(long)]
        reveal: bool,
    },
    /// Print the plaintext password of a record
    Password {
        /// Record ID (full UUID or prefix)
        id: String,
    },
    /// Copy a field of a record to the clipboard
    #[command(alias = "cp")]
    Copy {
        /// Record ID (full UUID or prefix)
        id: String,
        /// Field to copy (name, login, password, description, url)
        #[arg(default_value = "password")]
        field: Field,
    },
    /// Edit a record (all fields are replaced)
    Edit {
        /// Record ID (full UUID or prefix)
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record ID (full UUID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (database location, record count)
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, database, portable, notify_ms, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Commands that don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        logging::init_cli_logging();
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let mut config =
        Config::load_with_cli_override(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(db) = cli.db {
        config.database = Some(db);
    }

    // Handle TUI (default when no command given)
    let Some(command) = cli.command else {
        return tui::run(&config);
    };
    if matches!(command, Commands::Tui) {
        return tui::run(&config);
    }

    logging::init_cli_logging();

    let mut store = RecordStore::open(&config).with_context(|| {
        format!(
            "Failed to open database at {}",
            config.sqlite_path().display()
        )
    })?;

    match command {
        Commands::Tui | Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Init => commands::status::init(&store, &output),
        Commands::List { reveal } => commands::record::list(&store, reveal, &output),
        Commands::Add { fields } => commands::record::add(&mut store, fields, &output),
        Commands::Show { id, reveal } => commands::record::show(&store, &id, reveal, &output),
        Commands::Password { id } => commands::record::password(&store, &id, &output),
        Commands::Copy { id, field } => commands::record::copy(&store, &id, field, &output),
        Commands::Edit { id, fields } => commands::record::edit(&mut store, &id, fields, &output),
        Commands::Delete { id, yes } => commands::record::delete(&mut store, &id, yes, &output),
        Commands::Status => commands::status::show(&store, &config, &output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
