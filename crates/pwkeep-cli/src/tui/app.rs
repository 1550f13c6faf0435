//! Application state and logic

use std::time::{Duration, Instant};

use pwkeep_core::{
    Field, Record, RecordFields, RecordId, RecordStore, StoreError, StoreResult,
};
use tracing::debug;

use crate::clipboard::{copy_to_clipboard, field_value};

/// What the keyboard is currently driving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Moving around the table
    Normal,
    /// Typing into the add/edit form
    Form,
    /// Waiting for y/n on a delete
    ConfirmDelete,
}

/// Whether the form creates a record or replaces one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Add,
    Edit(RecordId),
}

/// Add/edit form with one input per field
#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub values: RecordFields,
    /// Input that receives typed characters
    pub focus: Field,
    /// Validation message shown under the inputs
    pub error: Option<String>,
}

impl Form {
    fn add() -> Self {
        Self {
            kind: FormKind::Add,
            values: RecordFields::default(),
            focus: Field::Name,
            error: None,
        }
    }

    fn edit(record: &Record) -> Self {
        Self {
            kind: FormKind::Edit(record.id.clone()),
            values: record.fields(),
            focus: Field::Name,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Add => " Add record ",
            FormKind::Edit(_) => " Edit record ",
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let mut value = self.values.get(self.focus).to_string();
        value.push(c);
        self.values.set(self.focus, value);
    }

    pub fn delete_char(&mut self) {
        let mut value = self.values.get(self.focus).to_string();
        value.pop();
        self.values.set(self.focus, value);
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }
}

/// Transient message in the status bar
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    shown_at: Instant,
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub mode: Mode,
    /// All records, in store order
    pub records: Vec<Record>,
    /// Selected row
    pub row: usize,
    /// Selected column
    pub column: Field,
    /// Open add/edit form
    pub form: Option<Form>,
    /// Record awaiting delete confirmation (id, name)
    pub pending_delete: Option<(RecordId, String)>,
    /// Current notification, if any
    pub notification: Option<Notification>,
    /// How long a notification stays visible
    pub notify_for: Duration,
    /// Error shown in a modal until any key is pressed
    pub error_message: Option<String>,
    /// Whether help overlay is visible
    pub show_help: bool,
}

impl App {
    /// Create a new app with data from store
    pub fn new(store: &RecordStore, notify_for: Duration) -> StoreResult<Self> {
        Ok(Self {
            should_quit: false,
            mode: Mode::Normal,
            records: store.list()?,
            row: 0,
            column: Field::Name,
            form: None,
            pending_delete: None,
            notification: None,
            notify_for,
            error_message: None,
            show_help: false,
        })
    }

    /// Reload every record from the store, keeping the selection in bounds
    pub fn reload(&mut self, store: &RecordStore) -> StoreResult<()> {
        self.records = store.list()?;
        self.row = self.row.min(self.records.len().saturating_sub(1));
        debug!(count = self.records.len(), "Reloaded records");
        Ok(())
    }

    /// Get the currently selected record
    pub fn current_record(&self) -> Option<&Record> {
        self.records.get(self.row)
    }

    /// Show a notification for the configured duration
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    /// Drop the notification once it has been shown long enough
    pub fn expire_notification(&mut self, now: Instant) {
        if let Some(n) = &self.notification {
            if now.saturating_duration_since(n.shown_at) >= self.notify_for {
                self.notification = None;
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn move_up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.records.len() {
            self.row += 1;
        }
    }

    pub fn move_to_first(&mut self) {
        self.row = 0;
    }

    pub fn move_to_last(&mut self) {
        self.row = self.records.len().saturating_sub(1);
    }

    pub fn next_column(&mut self) {
        self.column = self.column.next();
    }

    pub fn prev_column(&mut self) {
        self.column = self.column.prev();
    }

    /// Copy the selected cell to the clipboard
    pub fn copy_selected(&mut self, store: &RecordStore) -> anyhow::Result<()> {
        let Some(record) = self.current_record() else {
            return Ok(());
        };

        let value = field_value(store, record, self.column)?;
        copy_to_clipboard(&value)?;
        self.notify(self.column.copied_message());
        Ok(())
    }

    /// Open the selected record's URL in the default browser
    pub fn open_selected_url(&mut self) {
        let Some(record) = self.current_record() else {
            return;
        };
        let url = record.url.clone();

        match open::that_detached(&url) {
            Ok(()) => self.notify(format!("Opened '{}'", url)),
            Err(e) => self.set_error(format!("Failed to open '{}': {}", url, e)),
        }
    }

    /// Open an empty form
    pub fn start_add(&mut self) {
        self.form = Some(Form::add());
        self.mode = Mode::Form;
    }

    /// Open the form prefilled from the store
    pub fn start_edit(&mut self, store: &RecordStore) -> StoreResult<()> {
        let Some(id) = self.current_record().map(|r| r.id.clone()) else {
            return Ok(());
        };

        let record = store
            .get(&id)?
            .ok_or(StoreError::NotFound { id })?;
        self.form = Some(Form::edit(&record));
        self.mode = Mode::Form;
        Ok(())
    }

    /// Close the form without saving
    pub fn cancel_form(&mut self) {
        self.form = None;
        self.mode = Mode::Normal;
    }

    /// Save the form
    ///
    /// An incomplete form stays open with its message set. The form also
    /// stays open when the store rejects the write, so nothing typed is lost.
    pub fn submit_form(&mut self, store: &mut RecordStore) -> StoreResult<()> {
        let Some(form) = self.form.as_mut() else {
            return Ok(());
        };

        if let Err(e) = form.values.validate() {
            form.focus = e.field();
            form.error = Some(e.to_string());
            return Ok(());
        }

        let added = match &form.kind {
            FormKind::Add => Some(store.create(&form.values)?),
            FormKind::Edit(id) => {
                store.update(id, &form.values)?;
                None
            }
        };

        self.cancel_form();
        self.reload(store)?;

        match added {
            Some(id) => {
                if let Some(pos) = self.records.iter().position(|r| r.id == id) {
                    self.row = pos;
                }
                self.notify("Record added");
            }
            None => self.notify("Record updated"),
        }
        Ok(())
    }

    /// Ask for confirmation before deleting the selected record
    pub fn request_delete(&mut self) {
        if let Some(record) = self.current_record() {
            self.pending_delete = Some((record.id.clone(), record.name.clone()));
            self.mode = Mode::ConfirmDelete;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.mode = Mode::Normal;
    }

    /// Delete the record awaiting confirmation
    pub fn confirm_delete(&mut self, store: &mut RecordStore) -> StoreResult<()> {
        let Some((id, name)) = self.pending_delete.take() else {
            self.mode = Mode::Normal;
            return Ok(());
        };
        self.mode = Mode::Normal;

        store.delete(&id)?;
        self.reload(store)?;
        self.notify(format!("Deleted '{}'", name));
        Ok(())
    }

    /// Text for the delete prompt
    pub fn delete_prompt(&self) -> Option<String> {
        self.pending_delete
            .as_ref()
            .map(|(_, name)| format!("Delete record '{}'? (y/n)", name))
    }
}
