//! pwkeep TUI
//!
//! Interactive table of credential records.
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down
//! - h/l or ←/→: Select column
//! - g/G: First/last record
//! - q: Quit
//!
//! ## Commands
//!
//! - Enter/y: Copy selected cell (passwords are read from the store)
//! - o: Open URL in browser
//! - a: Add record
//! - e: Edit record
//! - d: Delete record
//! - r: Reload

mod app;
mod ui;

use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::{info, warn};

use pwkeep_core::{Config, RecordStore, StoreError};

use app::{App, Mode};

use crate::logging;

/// Run the TUI application
pub fn run(config: &Config) -> Result<()> {
    logging::init_tui_logging(config);

    // Open the store before touching the terminal so errors print normally
    let mut store = RecordStore::open(config).with_context(|| {
        format!(
            "Failed to open database at {}",
            config.sqlite_path().display()
        )
    })?;
    info!(path = ?store.path(), "TUI started");

    let mut app = App::new(&store, config.notify_duration())?;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_app(&mut terminal, &mut app, &mut store);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &mut RecordStore,
) -> Result<()> {
    loop {
        app.expire_notification(Instant::now());

        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    handle_key(app, store, key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Route a key press to the handler for the current mode
fn handle_key(app: &mut App, store: &mut RecordStore, key: KeyEvent) {
    // If error modal is showing, any key dismisses it
    if app.has_error() {
        app.clear_error();
        return;
    }

    // If help is showing, any key dismisses it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, store, key),
        Mode::Form => handle_form_mode(app, store, key),
        Mode::ConfirmDelete => handle_confirm_mode(app, store, key.code),
    }
}

fn handle_normal_mode(app: &mut App, store: &mut RecordStore, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // Navigation
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => app.prev_column(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => app.next_column(),
        KeyCode::Char('g') | KeyCode::Home => app.move_to_first(),
        KeyCode::Char('G') | KeyCode::End => app.move_to_last(),

        // Copy selected cell
        KeyCode::Enter | KeyCode::Char('y') => {
            if let Err(e) = app.copy_selected(store) {
                warn!(error = %e, "Copy failed");
                app.set_error(format!("Copy failed: {:#}", e));
            }
        }

        KeyCode::Char('o') => app.open_selected_url(),

        KeyCode::Char('a') => app.start_add(),
        KeyCode::Char('e') => {
            if let Err(e) = app.start_edit(store) {
                report(app, store, "edit", e);
            }
        }
        KeyCode::Char('d') => app.request_delete(),

        KeyCode::Char('r') => match app.reload(store) {
            Ok(()) => app.notify("Reloaded"),
            Err(e) => report(app, store, "reload", e),
        },

        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

fn handle_form_mode(app: &mut App, store: &mut RecordStore, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.cancel_form(),

        KeyCode::Enter => {
            if let Err(e) = app.submit_form(store) {
                report(app, store, "save", e);
            }
        }

        KeyCode::Tab | KeyCode::Down => {
            if let Some(form) = app.form.as_mut() {
                form.next_field();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(form) = app.form.as_mut() {
                form.prev_field();
            }
        }

        // Text input; control and alt chords are not text
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            if let Some(form) = app.form.as_mut() {
                form.insert_char(c);
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = app.form.as_mut() {
                form.delete_char();
            }
        }

        _ => {}
    }
}

fn handle_confirm_mode(app: &mut App, store: &mut RecordStore, code: KeyCode) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Err(e) = app.confirm_delete(store) {
                report(app, store, "delete", e);
            }
        }
        _ => {
            app.cancel_delete();
            app.notify("Delete cancelled");
        }
    }
}

/// Show a failed store operation
///
/// A record that vanished underneath the table is a notification and a
/// reload. Anything else goes to the error modal.
fn report(app: &mut App, store: &RecordStore, action: &str, err: StoreError) {
    warn!(action, error = %err, "Store operation failed");

    if matches!(err, StoreError::NotFound { .. }) {
        if let Err(e) = app.reload(store) {
            warn!(error = %e, "Reload failed");
            app.set_error(format!("Record no longer exists. Failed to reload: {}", e));
            return;
        }
        app.notify("Record no longer exists");
        return;
    }

    let mut message = format!("Failed to {}: {}", action, err);
    if let StoreError::Storage(storage) = &err {
        if let Some(hint) = storage.recovery_suggestion() {
            message.push_str("\n\n");
            message.push_str(hint);
        }
    }
    app.set_error(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwkeep_core::{Field, RecordFields, RecordId};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut App, store: &mut RecordStore, codes: &[KeyCode]) {
        for code in codes {
            handle_key(app, store, key(*code));
        }
    }

    fn setup(names: &[&str]) -> (App, RecordStore) {
        let mut store = RecordStore::open_in_memory().unwrap();
        for name in names {
            store
                .create(&RecordFields::new(*name, "alice", "p@ss1", "personal", "example.com"))
                .unwrap();
        }
        let app = App::new(&store, Duration::from_millis(1000)).unwrap();
        (app, store)
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, mut store) = setup(&[]);
        press(&mut app, &mut store, &[KeyCode::Char('q')]);
        assert!(app.should_quit);

        let (mut app, mut store) = setup(&[]);
        handle_key(
            &mut app,
            &mut store,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_add_record_with_keys() {
        let (mut app, mut store) = setup(&[]);

        press(&mut app, &mut store, &[KeyCode::Char('a')]);
        for value in ["Mail", "alice", "p@ss1", "personal", "mail.example.com"] {
            let codes: Vec<_> = value.chars().map(KeyCode::Char).collect();
            press(&mut app, &mut store, &codes);
            press(&mut app, &mut store, &[KeyCode::Tab]);
        }
        press(&mut app, &mut store, &[KeyCode::Enter]);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(app.records[0].login, "alice");
    }

    #[test]
    fn test_typing_q_in_form_does_not_quit() {
        let (mut app, mut store) = setup(&[]);

        press(&mut app, &mut store, &[KeyCode::Char('a'), KeyCode::Char('q')]);

        assert!(!app.should_quit);
        assert_eq!(app.form.as_ref().unwrap().values.name, "q");
        press(&mut app, &mut store, &[KeyCode::Esc]);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_delete_needs_y() {
        let (mut app, mut store) = setup(&["Mail", "Bank"]);

        press(&mut app, &mut store, &[KeyCode::Char('d'), KeyCode::Char('n')]);
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(app.notification.as_ref().unwrap().message, "Delete cancelled");

        press(&mut app, &mut store, &[KeyCode::Char('d'), KeyCode::Char('y')]);
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(app.records[0].name, "Bank");
    }

    #[test]
    fn test_delete_of_vanished_record_reloads() {
        let (mut app, mut store) = setup(&["Mail"]);
        let id = app.records[0].id.clone();

        press(&mut app, &mut store, &[KeyCode::Char('d')]);
        store.delete(&id).unwrap();
        press(&mut app, &mut store, &[KeyCode::Char('y')]);

        assert!(!app.has_error());
        assert!(app.records.is_empty());
        assert_eq!(
            app.notification.as_ref().unwrap().message,
            "Record no longer exists"
        );
    }

    #[test]
    fn test_failed_reload_after_vanished_record_is_shown() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("pwkeep.db");
        let store = RecordStore::open_path(&path).unwrap();
        let mut app = App::new(&store, Duration::from_millis(1000)).unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("DROP TABLE passwords").unwrap();
        drop(conn);

        let gone = StoreError::NotFound {
            id: RecordId::from("gone"),
        };
        report(&mut app, &store, "delete", gone);

        assert!(app.notification.is_none());
        assert!(app
            .error_message
            .as_deref()
            .unwrap()
            .contains("Failed to reload"));
    }

    #[test]
    fn test_modified_chars_are_not_typed() {
        let (mut app, mut store) = setup(&[]);
        press(&mut app, &mut store, &[KeyCode::Char('a')]);

        for modifiers in [KeyModifiers::CONTROL, KeyModifiers::ALT] {
            handle_key(&mut app, &mut store, KeyEvent::new(KeyCode::Char('u'), modifiers));
        }
        handle_key(
            &mut app,
            &mut store,
            KeyEvent::new(KeyCode::Char('M'), KeyModifiers::SHIFT),
        );

        assert_eq!(app.mode, Mode::Form);
        assert_eq!(app.form.as_ref().unwrap().values.name, "M");
    }

    #[test]
    fn test_error_modal_swallows_next_key() {
        let (mut app, mut store) = setup(&["Mail"]);
        app.set_error("boom");

        press(&mut app, &mut store, &[KeyCode::Char('q')]);

        assert!(!app.has_error());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_column_keys() {
        let (mut app, mut store) = setup(&["Mail"]);

        press(&mut app, &mut store, &[KeyCode::Char('l'), KeyCode::Right]);
        assert_eq!(app.column, Field::Password);
        press(&mut app, &mut store, &[KeyCode::Char('h')]);
        assert_eq!(app.column, Field::Login);
    }

    #[test]
    fn test_help_overlay_toggle() {
        let (mut app, mut store) = setup(&[]);

        press(&mut app, &mut store, &[KeyCode::Char('?')]);
        assert!(app.show_help);
        press(&mut app, &mut store, &[KeyCode::Char('j')]);
        assert!(!app.show_help);
    }
}
