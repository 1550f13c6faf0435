//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use pwkeep_core::{mask, Field};

use super::app::{App, Form, Mode};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    draw_table(frame, app, chunks[0]);

    match app.mode {
        Mode::ConfirmDelete => draw_delete_prompt(frame, app, chunks[1]),
        Mode::Normal | Mode::Form => draw_status_bar(frame, app, chunks[1]),
    }

    if let Some(form) = &app.form {
        draw_form(frame, form);
    }

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(message) = &app.error_message {
        draw_error_modal(frame, message);
    }
}

/// Draw the records table
fn draw_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(Field::ALL.iter().map(|field| {
        let style = if *field == app.column {
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(field.label()).style(style)
    }));

    let rows = app.records.iter().enumerate().map(|(i, record)| {
        Row::new(Field::ALL.iter().map(|field| {
            let cell = Cell::from(record.display_value(*field));
            if i == app.row && *field == app.column {
                cell.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                cell
            }
        }))
    });

    let widths = [
        Constraint::Percentage(18),
        Constraint::Percentage(18),
        Constraint::Percentage(14),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
    ];

    let block = Block::default()
        .title(format!(" Records ({}) ", app.records.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    if !app.records.is_empty() {
        state.select(Some(app.row));
    }

    frame.render_stateful_widget(table, area, &mut state);

    if app.records.is_empty() {
        let hint = Paragraph::new(Span::styled(
            "No records yet. Press a to add one.",
            Style::default().add_modifier(Modifier::DIM),
        ));
        let inner = Rect::new(
            area.x + 2,
            area.y + 2,
            area.width.saturating_sub(4),
            1.min(area.height.saturating_sub(3)),
        );
        frame.render_widget(hint, inner);
    }
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = match &app.notification {
        Some(n) => n.message.clone(),
        None => {
            "Enter/y:copy  o:open  a:add  e:edit  d:del  r:reload  ?:help  q:quit".to_string()
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Draw the y/n delete prompt in place of the status bar
fn draw_delete_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let prompt = app.delete_prompt().unwrap_or_default();
    let paragraph = Paragraph::new(Span::styled(
        prompt,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(paragraph, area);
}

/// Draw the add/edit form as a centered popup
fn draw_form(frame: &mut Frame, form: &Form) {
    let popup_area = centered(frame.area(), 60, 13);
    frame.render_widget(Clear, popup_area);

    let mut lines = Vec::new();
    for field in Field::ALL {
        let value = form.values.get(field);
        let shown = if field.policy().maskable {
            mask(value)
        } else {
            value.to_string()
        };

        let label_style = if field == form.focus {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let cursor = if field == form.focus { "_" } else { "" };

        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", format!("{}:", field.label())), label_style),
            Span::raw(shown),
            Span::styled(cursor, Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab/Shift-Tab:move  Enter:save  Esc:cancel",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(form.title())
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup_area);
}

/// Draw an error modal; any key dismisses it
fn draw_error_modal(frame: &mut Frame, message: &str) {
    let popup_area = centered(frame.area(), 60, 7);
    frame.render_widget(Clear, popup_area);

    let text = vec![
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered(frame.area(), 50, 20);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  h/l, ←/→    Select column"),
        Line::from("  g/G         Jump to first/last record"),
        Line::from(""),
        Line::from("Commands:"),
        Line::from("  Enter, y    Copy selected cell"),
        Line::from("  o           Open URL"),
        Line::from("  a           Add record"),
        Line::from("  e           Edit record"),
        Line::from("  d           Delete record"),
        Line::from("  r           Reload"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

/// Centered popup area, clamped to the frame
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}
