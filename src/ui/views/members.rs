use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use schooldash::api::types::UserSummary;

pub fn draw_members(
  frame: &mut Frame,
  area: Rect,
  members: &[UserSummary],
  is_admin: Option<bool>,
  selected: usize,
  loading: bool,
) {
  let title = if loading {
    " Members (loading...) ".to_string()
  } else {
    format!(" Members ({}) ", members.len())
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if is_admin == Some(false) || members.is_empty() {
    let content = match is_admin {
      Some(false) => "The member directory is only available to admins.",
      _ if loading => "",
      _ => "No members loaded.",
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = members
    .iter()
    .map(|member| {
      ListItem::new(Line::from(vec![
        Span::styled(
          format!("{:<24}", truncate(&member.name, 24)),
          Style::default().fg(Color::Cyan),
        ),
        Span::raw(" "),
        Span::styled(
          format!("{:<8}", format!("{:?}", member.role).to_lowercase()),
          Style::default().fg(Color::Yellow),
        ),
        Span::raw(" "),
        Span::raw(truncate(&member.email, 40)),
      ]))
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(selected));
  frame.render_stateful_widget(list, area, &mut state);
}
