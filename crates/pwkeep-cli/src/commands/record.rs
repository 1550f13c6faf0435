//! Record command handlers

use anyhow::{bail, Context, Result};
use clap::Args;
use pwkeep_core::{Field, RecordFields, RecordId, RecordStore};

use crate::clipboard::{copy_to_clipboard, field_value};
use crate::output::Output;
use crate::prompt::{
    confirm, prompt_required, prompt_secret, prompt_secret_with_default, prompt_with_default,
};

/// Field values given on the command line; missing ones are prompted
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Record name
    #[arg(short, long)]
    pub name: Option<String>,
    /// Login
    #[arg(short, long)]
    pub login: Option<String>,
    /// Password (prompted if omitted, keeps it out of shell history)
    #[arg(short, long)]
    pub password: Option<String>,
    /// Description
    #[arg(short, long)]
    pub description: Option<String>,
    /// URL
    #[arg(short, long)]
    pub url: Option<String>,
}

impl FieldArgs {
    fn get(&self, field: Field) -> Option<&String> {
        match field {
            Field::Name => self.name.as_ref(),
            Field::Login => self.login.as_ref(),
            Field::Password => self.password.as_ref(),
            Field::Description => self.description.as_ref(),
            Field::Url => self.url.as_ref(),
        }
    }

    fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Overlay the given values onto existing fields
    fn apply_to(&self, fields: &mut RecordFields) {
        for field in Field::ALL {
            if let Some(value) = self.get(field) {
                fields.set(field, value.clone());
            }
        }
    }
}

/// List all records
pub fn list(store: &RecordStore, reveal: bool, output: &Output) -> Result<()> {
    let records = store.list().context("Failed to list records")?;
    output.print_records(&records, reveal);
    Ok(())
}

/// Add a new record
pub fn add(store: &mut RecordStore, args: FieldArgs, output: &Output) -> Result<()> {
    let mut fields = RecordFields::default();
    args.apply_to(&mut fields);

    for field in Field::ALL {
        if args.get(field).is_none() {
            fields.set(field, prompt_until_filled(field)?);
        }
    }

    let id = store.create(&fields).context("Failed to create record")?;

    output.success(&format!("Created record: {}", id));
    if let Some(record) = store.get(&id)? {
        output.print_record(&record, false);
    }

    Ok(())
}

/// Show a single record
pub fn show(store: &RecordStore, id: &str, reveal: bool, output: &Output) -> Result<()> {
    let record_id = resolve_id(store, id)?;

    let record = store
        .get(&record_id)?
        .ok_or_else(|| anyhow::anyhow!("Record not found: {}", id))?;

    output.print_record(&record, reveal);
    Ok(())
}

/// Print the plaintext password
pub fn password(store: &RecordStore, id: &str, output: &Output) -> Result<()> {
    let record_id = resolve_id(store, id)?;
    let password = store
        .get_password(&record_id)
        .context("Failed to read password")?;

    output.print_secret(&password);
    Ok(())
}

/// Copy one field to the clipboard
pub fn copy(store: &RecordStore, id: &str, field: Field, output: &Output) -> Result<()> {
    let record_id = resolve_id(store, id)?;
    let record = store
        .get(&record_id)?
        .ok_or_else(|| anyhow::anyhow!("Record not found: {}", id))?;

    let value = field_value(store, &record, field)?;
    copy_to_clipboard(&value)?;

    output.success(&field.copied_message());
    Ok(())
}

/// Edit a record
///
/// Values given as flags replace the current ones; with no flags every
/// field is prompted with the current value as default.
pub fn edit(store: &mut RecordStore, id: &str, args: FieldArgs, output: &Output) -> Result<()> {
    let record_id = resolve_id(store, id)?;

    let record = store
        .get(&record_id)?
        .ok_or_else(|| anyhow::anyhow!("Record not found: {}", id))?;

    let mut fields = record.fields();

    if args.is_empty() {
        println!("Editing record: {}", record.id);
        println!("Press Enter to keep current value, or type new value.\n");

        for field in Field::ALL {
            let current = fields.get(field).to_string();
            let value = if field.policy().maskable {
                prompt_secret_with_default(field.label(), &current)?
            } else {
                prompt_with_default(field.label(), &current)?
            };
            fields.set(field, value);
        }
    } else {
        args.apply_to(&mut fields);
    }

    store
        .update(&record_id, &fields)
        .context("Failed to update record")?;

    output.success("Record updated");
    if let Some(updated) = store.get(&record_id)? {
        output.print_record(&updated, false);
    }

    Ok(())
}

/// Delete a record
pub fn delete(store: &mut RecordStore, id: &str, yes: bool, output: &Output) -> Result<()> {
    let record_id = resolve_id(store, id)?;

    let record = store
        .get(&record_id)?
        .ok_or_else(|| anyhow::anyhow!("Record not found: {}", id))?;

    if !yes && output.should_prompt() {
        if !confirm(&format!("Delete record '{}'?", record.name))? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(&record_id).context("Failed to delete record")?;

    output.success(&format!("Deleted record: {}", record.name));

    Ok(())
}

/// Resolve a record ID (exact ID or unique prefix)
pub fn resolve_id(store: &RecordStore, id: &str) -> Result<RecordId> {
    let exact = RecordId::from(id.trim());
    if store.get(&exact)?.is_some() {
        return Ok(exact);
    }

    let mut matches = store.find_by_prefix(id)?;

    match matches.len() {
        0 => bail!("No record found matching: {}", id),
        1 => Ok(matches.remove(0)),
        _ => {
            eprintln!("Multiple records match '{}':", id);
            for record_id in &matches {
                if let Some(record) = store.get(record_id)? {
                    eprintln!("  {} - {}", record.id, record.name);
                }
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Prompt for a field until a non-empty value is given
fn prompt_until_filled(field: Field) -> Result<String> {
    loop {
        let value = if field.policy().maskable {
            prompt_secret(field.label())?
        } else {
            prompt_required(field.label())?
        };
        if !value.is_empty() {
            return Ok(value);
        }
        eprintln!("{} must not be empty.", field.label());
    }
}
