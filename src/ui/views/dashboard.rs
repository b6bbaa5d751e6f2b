use crate::ui::renderfns::{phase_label, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use schooldash::api::types::record_label;
use schooldash::sync::{BootstrapPhase, DashboardState};

/// Overview painted from the bootstrap projection: who is signed in, the
/// latest tickets, and upcoming events.
pub fn draw_dashboard(
  frame: &mut Frame,
  area: Rect,
  state: &DashboardState,
  phase: BootstrapPhase,
) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(4), Constraint::Min(1)])
    .split(area);

  let who = match state.user.as_deref() {
    Some(user) => format!(
      "{} <{}>  {:?}  teams: {}",
      user.name,
      user.email,
      user.role,
      user.team_ids.len()
    ),
    None if phase.is_settled() => "Not signed in".to_string(),
    None => "Loading...".to_string(),
  };
  let org = state
    .org
    .as_deref()
    .map(|org| match &org.timezone {
      Some(tz) => format!("{} ({})", org.name, tz),
      None => org.name.clone(),
    })
    .unwrap_or_default();

  let summary = Paragraph::new(vec![
    Line::from(Span::styled(who, Style::default().fg(Color::White))),
    Line::from(Span::styled(org, Style::default().fg(Color::DarkGray))),
  ])
  .block(
    Block::default()
      .title(format!(" Overview [{}] ", phase_label(phase)))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue)),
  );
  frame.render_widget(summary, chunks[0]);

  let columns = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(chunks[1]);

  let tickets: Vec<ListItem> = state
    .tickets
    .iter()
    .map(|t| ListItem::new(truncate(record_label(&t.fields).unwrap_or(t.id.as_str()), 50)))
    .collect();
  let events: Vec<ListItem> = state
    .events
    .iter()
    .map(|e| ListItem::new(truncate(record_label(&e.fields).unwrap_or(e.id.as_str()), 50)))
    .collect();

  frame.render_widget(panel(tickets, format!(" Tickets ({}) ", state.tickets.len())), columns[0]);
  frame.render_widget(panel(events, format!(" Events ({}) ", state.events.len())), columns[1]);
}

fn panel(items: Vec<ListItem<'static>>, title: String) -> List<'static> {
  List::new(items).block(
    Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue)),
  )
}
