//! Serde-deserializable types matching dashboard API responses.
//!
//! These types are separate from domain types to allow lenient
//! deserialization while keeping domain types focused on what the dashboard
//! needs.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{
  null_as_default, BootstrapSnapshot, EventSummary, OrgSettings, Role, Ticket, UserSummary,
};

/// Full user record as returned by the server
#[derive(Debug, Deserialize)]
pub struct ApiUser {
  pub id: String,
  #[serde(default, alias = "displayName", deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub email: String,
  #[serde(default, rename = "teamIds", deserialize_with = "null_as_default")]
  pub team_ids: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub role: Role,
}

impl ApiUser {
  pub fn into_summary(self) -> UserSummary {
    UserSummary {
      id: self.id,
      name: self.name,
      email: self.email,
      team_ids: self.team_ids,
      role: self.role,
    }
  }
}

/// Body of a `200` response from `GET /bootstrap`
#[derive(Debug, Default, Deserialize)]
pub struct ApiBootstrapResponse {
  pub user: Option<ApiUser>,
  #[serde(default)]
  pub tickets: Vec<Ticket>,
  #[serde(default)]
  pub events: Vec<EventSummary>,
  pub org: Option<OrgSettings>,
}

impl ApiBootstrapResponse {
  pub fn into_snapshot(self, captured_at: DateTime<Utc>) -> BootstrapSnapshot {
    BootstrapSnapshot {
      user: self.user.map(ApiUser::into_summary),
      tickets: self.tickets,
      events: self.events,
      org: self.org,
      captured_at,
    }
  }
}
