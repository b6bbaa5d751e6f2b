//! Domain records as seen by the sync layer.
//!
//! Tickets, events, forms and inventory rows are opaque: only their `id` is
//! ever inspected. Remaining fields ride along in `fields` so they survive a
//! cache round-trip untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treat an explicit `null` like a missing field. Pair with `#[serde(default)]`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Role of the signed-in user within the school
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Staff,
  #[default]
  #[serde(other)]
  Member,
}

/// Subset of the server's user record needed by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
  pub id: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub email: String,
  #[serde(rename = "teamIds", default, deserialize_with = "null_as_default")]
  pub team_ids: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub role: Role,
}

impl UserSummary {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

/// Support ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
  pub id: String,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

/// Calendar event summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
  pub id: String,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

/// Form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
  pub id: String,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

/// A submitted response to a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
  pub id: String,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

/// Inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
  pub id: String,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

/// Stock level for an inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
  pub id: String,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

/// Organization (school) settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgSettings {
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(default)]
  pub timezone: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Combined initial payload used to paint the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSnapshot {
  pub user: Option<UserSummary>,
  #[serde(default)]
  pub tickets: Vec<Ticket>,
  #[serde(default)]
  pub events: Vec<EventSummary>,
  pub org: Option<OrgSettings>,
  #[serde(rename = "capturedAt")]
  pub captured_at: DateTime<Utc>,
}

/// Forms together with their submissions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormsBundle {
  pub forms: Vec<FormDefinition>,
  pub submissions: Vec<FormSubmission>,
}

/// Inventory items together with their stock levels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryBundle {
  pub items: Vec<InventoryItem>,
  pub stock: Vec<StockLevel>,
}

/// Best-effort human label for an opaque record.
pub fn record_label(fields: &Map<String, Value>) -> Option<&str> {
  ["title", "name", "subject", "summary"]
    .iter()
    .find_map(|key| fields.get(*key).and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_unknown_role_maps_to_member() {
    let user: UserSummary =
      serde_json::from_value(json!({"id": "u1", "role": "superintendent"})).unwrap();
    assert_eq!(user.role, Role::Member);
    assert!(!user.is_admin());
  }

  #[test]
  fn test_ticket_keeps_extra_fields() {
    let ticket: Ticket =
      serde_json::from_value(json!({"id": "t1", "title": "Projector broken", "priority": 2}))
        .unwrap();
    assert_eq!(ticket.id, "t1");
    assert_eq!(record_label(&ticket.fields), Some("Projector broken"));

    let back = serde_json::to_value(&ticket).unwrap();
    assert_eq!(back["priority"], json!(2));
  }

  #[test]
  fn test_snapshot_missing_lists_default_to_empty() {
    let snapshot: BootstrapSnapshot = serde_json::from_value(json!({
      "user": null,
      "org": null,
      "capturedAt": "2026-01-01T00:00:00Z"
    }))
    .unwrap();
    assert!(snapshot.tickets.is_empty());
    assert!(snapshot.events.is_empty());
  }
}
