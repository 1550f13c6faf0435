//! Clipboard access and field copy policy
//!
//! The value is piped into the platform clipboard tool, spawned with null
//! stdout/stderr so it does not disturb the TUI.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use tracing::debug;

use pwkeep_core::{CopySource, Field, Record, RecordStore};

/// Clipboard tools to try, in order
#[cfg(target_os = "macos")]
const CLIPBOARD_TOOLS: &[&[&str]] = &[&["pbcopy"]];

#[cfg(target_os = "windows")]
const CLIPBOARD_TOOLS: &[&[&str]] = &[&["clip"]];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CLIPBOARD_TOOLS: &[&[&str]] = &[
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
];

/// Resolve the plaintext value of a field following its copy policy
///
/// Maskable fields are never taken from the listed row; they are fetched
/// from the store by id.
pub fn field_value(store: &RecordStore, record: &Record, field: Field) -> Result<String> {
    match field.policy().source {
        CopySource::Listing => Ok(record.value(field).to_string()),
        CopySource::Store => store
            .get_password(&record.id)
            .with_context(|| format!("Failed to read {} of '{}'", field, record.name)),
    }
}

/// Copy text to the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    for tool in CLIPBOARD_TOOLS {
        match pipe_to(tool, text) {
            Ok(()) => {
                debug!(tool = tool[0], "Copied to clipboard");
                return Ok(());
            }
            Err(e) => debug!(tool = tool[0], error = %e, "Clipboard tool failed"),
        }
    }

    bail!(
        "No clipboard tool available. Install one of: {}",
        CLIPBOARD_TOOLS
            .iter()
            .map(|t| t[0])
            .collect::<Vec<_>>()
            .join(", ")
    )
}

fn pipe_to(tool: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(tool[0])
        .args(&tool[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to run {}", tool[0]))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            // Close the pipe and reap the child before reporting
            drop(stdin);
            let _ = child.wait();
            return Err(e).with_context(|| format!("Failed to write to {}", tool[0]));
        }
    }

    let status = child.wait()?;
    if !status.success() {
        bail!("{} exited with {}", tool[0], status);
    }
    Ok(())
}
