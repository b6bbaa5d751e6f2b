//! List screens for the opaque record types.

use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use schooldash::api::types::{record_label, FormsBundle, InventoryBundle};
use serde_json::{Map, Value};

/// One rendered line: record id and best-effort label
pub struct Row {
  pub id: String,
  pub label: String,
  pub detail: Option<String>,
}

pub fn rows<'a>(records: impl Iterator<Item = (&'a str, &'a Map<String, Value>)>) -> Vec<Row> {
  records
    .map(|(id, fields)| Row {
      id: id.to_string(),
      label: record_label(fields).unwrap_or("(untitled)").to_string(),
      detail: None,
    })
    .collect()
}

pub fn draw_records(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  rows: &[Row],
  selected: usize,
  loading: bool,
) {
  let title = if loading {
    format!(" {} (loading...) ", title)
  } else {
    format!(" {} ({}) ", title, rows.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if rows.is_empty() {
    let content = if loading { "" } else { "Nothing here yet." };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = rows
    .iter()
    .map(|row| {
      let mut spans = vec![
        Span::styled(format!("{:<14}", truncate(&row.id, 14)), Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::raw(truncate(&row.label, 60)),
      ];
      if let Some(detail) = &row.detail {
        spans.push(Span::styled(format!("  {}", detail), Style::default().fg(Color::DarkGray)));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(selected));
  frame.render_stateful_widget(list, area, &mut state);
}

pub fn draw_forms(
  frame: &mut Frame,
  area: Rect,
  bundle: Option<&FormsBundle>,
  selected: usize,
  loading: bool,
) {
  let rows = bundle.map(form_rows).unwrap_or_default();
  draw_records(frame, area, "Forms", &rows, selected, loading);
}

pub fn draw_inventory(
  frame: &mut Frame,
  area: Rect,
  bundle: Option<&InventoryBundle>,
  selected: usize,
  loading: bool,
) {
  let rows = bundle.map(inventory_rows).unwrap_or_default();
  draw_records(frame, area, "Inventory", &rows, selected, loading);
}

fn form_rows(bundle: &FormsBundle) -> Vec<Row> {
  let mut rows = rows(bundle.forms.iter().map(|f| (f.id.as_str(), &f.fields)));
  for row in &mut rows {
    let count = bundle
      .submissions
      .iter()
      .filter(|s| s.fields.get("formId").and_then(Value::as_str) == Some(row.id.as_str()))
      .count();
    row.detail = Some(format!("{} submissions", count));
  }
  rows
}

fn inventory_rows(bundle: &InventoryBundle) -> Vec<Row> {
  let mut rows = rows(bundle.items.iter().map(|i| (i.id.as_str(), &i.fields)));
  for row in &mut rows {
    let quantity = bundle
      .stock
      .iter()
      .filter(|s| s.fields.get("itemId").and_then(Value::as_str) == Some(row.id.as_str()))
      .filter_map(|s| s.fields.get("quantity").and_then(Value::as_i64))
      .sum::<i64>();
    row.detail = Some(format!("qty {}", quantity));
  }
  rows
}
