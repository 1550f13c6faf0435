//! Interactive prompts
//!
//! Line-based prompts on stdin for the add/edit/delete commands. Secret
//! fields are read from the terminal without echo.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let answer = read_line(&mut io::stdin().lock())?;
    Ok(is_yes(&answer))
}

/// Prompt for a required value
///
/// Fails on end of input so a closed stdin can't loop forever.
pub fn prompt_required(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = io::stdin().lock();
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("No input for {}", label);
    }
    Ok(trim_newline(&line).to_string())
}

/// Prompt with a default value, returns the default if the user just
/// presses Enter
pub fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        print!("{}: ", label);
    } else {
        print!("{} [{}]: ", label, default);
    }
    io::stdout().flush()?;

    let answer = read_line(&mut io::stdin().lock())?;
    Ok(or_default(answer, default))
}

/// Prompt for a secret value without echoing it
pub fn prompt_secret(label: &str) -> Result<String> {
    let answer = rpassword::prompt_password(format!("{}: ", label))
        .with_context(|| format!("Failed to read {}", label))?;
    Ok(trim_newline(&answer).to_string())
}

/// Secret prompt that keeps the current value on an empty answer. The
/// current value is never shown.
pub fn prompt_secret_with_default(label: &str, default: &str) -> Result<String> {
    let prompt = if default.is_empty() {
        format!("{}: ", label)
    } else {
        format!("{} [keep current]: ", label)
    };
    let answer = rpassword::prompt_password(prompt)
        .with_context(|| format!("Failed to read {}", label))?;
    Ok(or_default(trim_newline(&answer).to_string(), default))
}

fn or_default(answer: String, default: &str) -> String {
    if answer.is_empty() {
        default.to_string()
    } else {
        answer
    }
}

fn read_line(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(trim_newline(&line).to_string())
}

/// Strip the line terminator but keep other whitespace, which may be part
/// of a password
fn trim_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "y" || answer == "yes"
}
