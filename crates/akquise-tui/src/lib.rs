// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use akquise_app::{AppCommand, AppState, DetailsVisibility, Lead, LeadId, LeadStatus};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::io;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;

const CURSOR_MARK: &str = "▸";
const ELLIPSIS: char = '…';

/// External collaborator boundary. The view reads leads through it and
/// forwards requested status transitions to it; display authority for a
/// lead's status stays on the other side of this trait.
pub trait AppRuntime {
    fn load_leads(&mut self) -> Result<Vec<Lead>>;
    fn update_lead_status(&mut self, id: &LeadId, status: LeadStatus) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct StatusPickerUiState {
    visible: bool,
    cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    leads: Vec<Lead>,
    selected: usize,
    status_picker: StatusPickerUiState,
    help_visible: bool,
}

impl ViewData {
    fn selected_lead(&self) -> Option<&Lead> {
        self.leads.get(self.selected)
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    if let Err(error) = refresh_leads(runtime, &mut view_data) {
        state.dispatch(AppCommand::SetStatus(format!("Laden fehlgeschlagen: {error}")));
    }

    let mut result = Ok(());
    loop {
        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Returns true when the app should quit. All state changes happen
/// synchronously in here; there is no background work to wait on.
fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if state.status_line.is_some() {
        state.dispatch(AppCommand::ClearStatus);
    }

    if view_data.status_picker.visible {
        handle_status_picker_key(state, runtime, view_data, key);
        return false;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.details == DetailsVisibility::Expanded {
        // The close affordance is the only way out of the overlay.
        if key.code == KeyCode::Esc {
            state.dispatch(AppCommand::CloseDetails);
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Up | KeyCode::Char('k') => move_selection(view_data, -1),
        KeyCode::Down | KeyCode::Char('j') => move_selection(view_data, 1),
        KeyCode::Enter => {
            if view_data.selected_lead().is_some() {
                state.dispatch(AppCommand::OpenDetails);
            }
        }
        KeyCode::Char('s') => open_status_picker(view_data),
        KeyCode::Char('r') => {
            if let Err(error) = refresh_leads(runtime, view_data) {
                state.dispatch(AppCommand::SetStatus(format!(
                    "Laden fehlgeschlagen: {error}"
                )));
            }
        }
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
    false
}

fn handle_status_picker_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => view_data.status_picker.visible = false,
        KeyCode::Up | KeyCode::Char('k') => {
            let len = LeadStatus::ALL.len();
            view_data.status_picker.cursor = (view_data.status_picker.cursor + len - 1) % len;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.status_picker.cursor =
                (view_data.status_picker.cursor + 1) % LeadStatus::ALL.len();
        }
        KeyCode::Enter => {
            view_data.status_picker.visible = false;
            let chosen = LeadStatus::ALL[view_data.status_picker.cursor];
            let Some(lead) = view_data.selected_lead() else {
                return;
            };
            if lead.status == chosen {
                return;
            }
            let lead_id = lead.id.clone();
            if let Err(error) = runtime.update_lead_status(&lead_id, chosen) {
                state.dispatch(AppCommand::SetStatus(format!(
                    "Status nicht gespeichert: {error}"
                )));
                return;
            }
            // The store owns the status; re-read instead of patching the
            // local copy.
            match refresh_leads_keeping(runtime, view_data, &lead_id) {
                Ok(()) => {
                    state.dispatch(AppCommand::SetStatus(format!(
                        "Status gespeichert: {}",
                        chosen.label()
                    )));
                }
                Err(error) => {
                    state.dispatch(AppCommand::SetStatus(format!(
                        "Laden fehlgeschlagen: {error}"
                    )));
                }
            }
        }
        _ => {}
    }
}

fn open_status_picker(view_data: &mut ViewData) {
    let Some(lead) = view_data.selected_lead() else {
        return;
    };
    let current = lead.status;
    view_data.status_picker.visible = true;
    view_data.status_picker.cursor = LeadStatus::ALL
        .iter()
        .position(|status| *status == current)
        .unwrap_or(0);
}

fn move_selection(view_data: &mut ViewData, delta: isize) {
    if view_data.leads.is_empty() {
        view_data.selected = 0;
        return;
    }
    let last = view_data.leads.len() - 1;
    let next = view_data.selected as isize + delta;
    view_data.selected = next.clamp(0, last as isize) as usize;
}

fn refresh_leads<R: AppRuntime>(runtime: &mut R, view_data: &mut ViewData) -> Result<()> {
    view_data.leads = runtime.load_leads()?;
    if view_data.selected >= view_data.leads.len() {
        view_data.selected = view_data.leads.len().saturating_sub(1);
    }
    Ok(())
}

fn refresh_leads_keeping<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    lead_id: &LeadId,
) -> Result<()> {
    refresh_leads(runtime, view_data)?;
    if let Some(index) = view_data.leads.iter().position(|lead| lead.id == *lead_id) {
        view_data.selected = index;
    }
    Ok(())
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(format!("Interessenten: {}", view_data.leads.len()))
        .block(Block::default().title("akquise").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(1)])
        .split(layout[1]);

    let list = Paragraph::new(render_list_lines(view_data, body[0].width))
        .block(Block::default().title("Leads").borders(Borders::ALL));
    frame.render_widget(list, body[0]);

    let card_width = usize::from(body[1].width.saturating_sub(2));
    let card_text = match view_data.selected_lead() {
        Some(lead) => render_card_text(lead, card_width),
        None => "Keine Leads vorhanden.".to_owned(),
    };
    let card = Paragraph::new(card_text)
        .block(Block::default().title("Karte").borders(Borders::ALL));
    frame.render_widget(card, body[1]);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if state.details == DetailsVisibility::Expanded
        && let Some(lead) = view_data.selected_lead()
    {
        let area = centered_rect(62, 68, frame.area());
        frame.render_widget(Clear, area);
        let details = Paragraph::new(render_details_text(lead)).block(
            Block::default()
                .title("Details")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(details, area);
    }

    if view_data.status_picker.visible
        && let Some(lead) = view_data.selected_lead()
    {
        let area = centered_rect(36, 34, frame.area());
        frame.render_widget(Clear, area);
        let picker = Paragraph::new(render_status_picker_text(
            view_data.status_picker.cursor,
            lead.status,
        ))
        .block(Block::default().title("Status ändern").borders(Borders::ALL));
        frame.render_widget(picker, area);
    }

    if view_data.help_visible {
        let area = centered_rect(56, 52, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("Hilfe").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_list_lines(view_data: &ViewData, pane_width: u16) -> Vec<Line<'static>> {
    let inner_width = usize::from(pane_width.saturating_sub(2));
    view_data
        .leads
        .iter()
        .enumerate()
        .map(|(index, lead)| {
            let marker = if index == view_data.selected {
                CURSOR_MARK
            } else {
                " "
            };
            let label = lead.status.label();
            let name_width = inner_width.saturating_sub(label.len() + 5);
            let mut name_style = Style::default();
            if index == view_data.selected {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }
            Line::from(vec![
                Span::raw(format!("{marker} ")),
                Span::styled(truncate_line(&lead.name, name_width), name_style),
                Span::raw(" "),
                Span::styled(
                    format!("[{label}]"),
                    Style::default().fg(status_color(lead.status)),
                ),
            ])
        })
        .collect()
}

/// Compact card for the selected lead. Free-text fields are clipped to a
/// single line; truncation is presentational only.
fn render_card_text(lead: &Lead, width: usize) -> String {
    let mut lines = vec![
        truncate_line(&lead.name, width),
        String::new(),
        "Objekt Details".to_owned(),
        format!("  {}", truncate_line(&lead.property_type, width.saturating_sub(2))),
        format!("  {} Einheiten", lead.units),
    ];
    if let Some(budget) = lead.budget {
        lines.push(format!("  Budget: {} - {} €", budget.min, budget.max));
    }
    lines.push(format!(
        "  {}",
        truncate_line(&lead.location, width.saturating_sub(2))
    ));
    lines.push(String::new());
    lines.push("Kontakt Info".to_owned());
    lines.push(format!(
        "  {}",
        truncate_line(&lead.company, width.saturating_sub(2))
    ));
    lines.push(format!(
        "  {}",
        truncate_line(&format!("Grund: {}", lead.reason), width.saturating_sub(2))
    ));
    lines.push(String::new());
    lines.push("Details".to_owned());
    lines.push(format!(
        "  Letzte Änderung: {}",
        format_date_de(lead.updated_at)
    ));
    lines.push(String::new());
    lines.push(format!("Status: {}", lead.status.label()));
    lines.join("\n")
}

/// Full record for the modal overlay. Nothing is truncated here.
fn render_details_text(lead: &Lead) -> String {
    let mut lines = vec![
        lead.name.clone(),
        String::new(),
        "Objekt Details".to_owned(),
        format!("  {}", lead.property_type),
        format!("  {} Einheiten", lead.units),
    ];
    if let Some(budget) = lead.budget {
        lines.push(format!("  Budget: {} - {} €", budget.min, budget.max));
    }
    lines.push(format!("  {}", lead.location));
    lines.push(String::new());
    lines.push("Kontakt Info".to_owned());
    lines.push(format!("  {}", lead.company));
    lines.push(format!("  Grund: {}", lead.reason));
    lines.push(String::new());
    lines.push("Details".to_owned());
    lines.push(format!(
        "  Letzte Änderung: {}",
        format_date_de(lead.updated_at)
    ));
    lines.push(String::new());
    lines.push("Esc: Schließen".to_owned());
    lines.join("\n")
}

fn render_status_picker_text(cursor: usize, current: LeadStatus) -> String {
    let mut lines = Vec::with_capacity(LeadStatus::ALL.len() + 2);
    for (index, status) in LeadStatus::ALL.iter().enumerate() {
        let marker = if index == cursor { CURSOR_MARK } else { " " };
        let suffix = if *status == current { " (aktuell)" } else { "" };
        lines.push(format!("{marker} {}{suffix}", status.label()));
    }
    lines.push(String::new());
    lines.push("Enter: Übernehmen, Esc: Abbrechen".to_owned());
    lines.join("\n")
}

fn help_overlay_text() -> String {
    [
        "↑/↓  Lead auswählen",
        "Enter  Details öffnen",
        "Esc  Details schließen",
        "s  Status ändern",
        "r  Neu laden",
        "?  Hilfe",
        "q  Beenden",
    ]
    .join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if let Some(line) = &state.status_line {
        return line.clone();
    }
    if !state.show_key_hints {
        return String::new();
    }
    if view_data.status_picker.visible {
        return "↑/↓ wählen, Enter übernehmen, Esc abbrechen".to_owned();
    }
    if state.details == DetailsVisibility::Expanded {
        return "Esc schließen".to_owned();
    }
    "Enter Details | s Status | ? Hilfe | q Beenden".to_owned()
}

const fn status_color(status: LeadStatus) -> Color {
    match status {
        LeadStatus::New => Color::Blue,
        LeadStatus::Contacted => Color::Yellow,
        LeadStatus::Interested => Color::Green,
        LeadStatus::NotInterested => Color::DarkGray,
    }
}

/// Fixed-locale calendar date: two-digit day, two-digit month, numeric
/// year, dot separated.
fn format_date_de(value: OffsetDateTime) -> String {
    value
        .format(&format_description!("[day].[month].[year]"))
        .unwrap_or_else(|_| "01.01.1970".to_owned())
}

fn truncate_line(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count <= width {
        return value.to_owned();
    }
    if width == 0 {
        return String::new();
    }
    let mut clipped = value
        .chars()
        .take(width.saturating_sub(1))
        .collect::<String>();
    clipped.push(ELLIPSIS);
    clipped
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
