//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! Passwords are masked unless the caller asks to reveal them.

use pwkeep_core::{Field, Record};
use serde_json::json;

/// Widest a column may get in the human-readable table
const MAX_COLUMN_WIDTH: usize = 28;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print a single record
    pub fn print_record(&self, record: &Record, reveal: bool) {
        match self.format {
            OutputFormat::Human => {
                println!("{:<12} {}", "ID:", record.id);
                for field in Field::ALL {
                    println!(
                        "{:<12} {}",
                        format!("{}:", field.label()),
                        shown_value(record, field, reveal)
                    );
                }
            }
            OutputFormat::Json => {
                println!("{}", pretty(&record_json(record, reveal)));
            }
            OutputFormat::Quiet => {
                println!("{}", record.id);
            }
        }
    }

    /// Print a table of records
    pub fn print_records(&self, records: &[Record], reveal: bool) {
        match self.format {
            OutputFormat::Human => {
                if records.is_empty() {
                    println!("No records found.");
                    return;
                }
                for line in render_table(records, reveal) {
                    println!("{}", line);
                }
                println!("\n{} record(s)", records.len());
            }
            OutputFormat::Json => {
                let rows: Vec<_> = records.iter().map(|r| record_json(r, reveal)).collect();
                println!("{}", pretty(&serde_json::Value::Array(rows)));
            }
            OutputFormat::Quiet => {
                for record in records {
                    println!("{}", record.id);
                }
            }
        }
    }

    /// Print a plaintext secret
    ///
    /// Quiet mode prints it too: that is how scripts read a password.
    pub fn print_secret(&self, secret: &str) {
        match self.format {
            OutputFormat::Json => println!("{}", json!({ "password": secret })),
            OutputFormat::Human | OutputFormat::Quiet => println!("{}", secret),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!("{}", json!({"status": "success", "message": message}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", json!({ "message": msg }));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn shown_value(record: &Record, field: Field, reveal: bool) -> String {
    if reveal {
        record.value(field).to_string()
    } else {
        record.display_value(field)
    }
}

/// JSON view of a record, password masked unless revealed
fn record_json(record: &Record, reveal: bool) -> serde_json::Value {
    json!({
        "id": record.id,
        "name": record.name,
        "login": record.login,
        "password": shown_value(record, Field::Password, reveal),
        "description": record.description,
        "url": record.url,
    })
}

/// Render records as an aligned text table
fn render_table(records: &[Record], reveal: bool) -> Vec<String> {
    let mut headers = vec!["ID".to_string()];
    headers.extend(Field::ALL.iter().map(|f| f.label().to_string()));

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let mut row = vec![record.short_id()];
            row.extend(
                Field::ALL
                    .iter()
                    .map(|f| truncate(&shown_value(record, *f, reveal), MAX_COLUMN_WIDTH)),
            );
            row
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(headers[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(headers.as_slice())];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
    lines
}

/// Pad a string with spaces to `width` characters
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(len)))
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
