mod components;
mod renderfns;
mod views;

use crate::app::{App, Mode};
use crate::commands::Screen;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], app.title(), app.tenant(), app.phase());

  let state = app.state();
  let loading = app.is_loading();
  match app.screen() {
    Screen::Dashboard => views::dashboard::draw_dashboard(frame, chunks[1], state, app.phase()),
    Screen::Tickets => views::records::draw_records(
      frame,
      chunks[1],
      Screen::Tickets.title(),
      &views::records::rows(state.tickets.iter().map(|t| (t.id.as_str(), &t.fields))),
      app.selected(),
      loading,
    ),
    Screen::Events => views::records::draw_records(
      frame,
      chunks[1],
      Screen::Events.title(),
      &views::records::rows(state.events.iter().map(|e| (e.id.as_str(), &e.fields))),
      app.selected(),
      loading,
    ),
    Screen::Forms => {
      let bundle = app.resources().forms().and_then(|l| l.data());
      views::records::draw_forms(frame, chunks[1], bundle, app.selected(), loading);
    }
    Screen::Inventory => {
      let bundle = app.resources().inventory().and_then(|l| l.data());
      views::records::draw_inventory(frame, chunks[1], bundle, app.selected(), loading);
    }
    Screen::Admin => views::members::draw_members(
      frame,
      chunks[1],
      &state.members,
      state.is_admin(),
      app.selected(),
      loading,
    ),
  }

  draw_status_bar(frame, chunks[2], app);

  if app.mode() == Mode::Command {
    components::draw_command_overlay(
      frame,
      chunks[1],
      app.command_input(),
      &app.autocomplete_suggestions(),
      app.selected_suggestion(),
    );
  }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.mode() {
    Mode::Normal => {
      let mut hint = String::from(" :command  j/k:nav  q:back  Ctrl-C:quit");
      if app.is_local_mode() {
        hint.push_str("  [local mode: no credential]");
      }
      (hint, Style::default().fg(Color::DarkGray))
    }
    Mode::Command => (
      format!(":{}", app.command_input()),
      Style::default().fg(Color::Yellow),
    ),
  };

  frame.render_widget(Paragraph::new(content).style(style), area);
}
