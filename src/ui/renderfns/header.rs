use super::phase_label;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use schooldash::sync::BootstrapPhase;

/// Draw the header bar with title, tenant, and sync status
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  tenant: &str,
  phase: BootstrapPhase,
) {
  let status_style = match phase {
    BootstrapPhase::Settled => Style::default().fg(Color::Green),
    BootstrapPhase::SettledEmpty => Style::default().fg(Color::DarkGray),
    _ => Style::default().fg(Color::Yellow),
  };

  let header = Line::from(vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", tenant), Style::default().fg(Color::Yellow).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", phase_label(phase)), status_style),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
