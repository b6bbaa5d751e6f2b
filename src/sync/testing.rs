//! In-process stand-in for the dashboard API.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::types::{
  BootstrapSnapshot, EventSummary, FormDefinition, FormSubmission, InventoryItem, Role,
  StockLevel, Ticket, UserSummary,
};
use crate::api::{ApiError, BootstrapFetch, DashboardApi};

pub fn ticket(id: &str) -> Ticket {
  serde_json::from_value(json!({ "id": id, "title": format!("ticket {}", id) })).unwrap()
}

pub fn snapshot_with_tickets(ids: &[&str]) -> BootstrapSnapshot {
  BootstrapSnapshot {
    user: Some(UserSummary {
      id: "u1".into(),
      name: "Ada".into(),
      email: "ada@example.org".into(),
      team_ids: vec!["team-a".into()],
      role: Role::Admin,
    }),
    tickets: ids.iter().map(|id| ticket(id)).collect(),
    events: Vec::new(),
    org: None,
    captured_at: Utc::now(),
  }
}

/// Records every call by endpoint path and answers from canned data.
#[derive(Default)]
pub struct FakeApi {
  delay: Duration,
  tickets: Vec<String>,
  fail_lists: bool,
  crash_bootstrap: bool,
  bootstrap: Mutex<VecDeque<BootstrapFetch>>,
  tokens: Mutex<Vec<Option<String>>>,
  calls: Mutex<HashMap<String, usize>>,
}

impl FakeApi {
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  pub fn with_tickets(mut self, ids: &[&str]) -> Self {
    self.tickets = ids.iter().map(|id| id.to_string()).collect();
    self
  }

  /// Every list endpoint answers 500.
  pub fn failing_lists(mut self) -> Self {
    self.fail_lists = true;
    self
  }

  /// The bootstrap handler panics, so its task ends without an answer.
  pub fn crashing_bootstrap(mut self) -> Self {
    self.crash_bootstrap = true;
    self
  }

  /// Queue a bootstrap answer. Once the queue is empty the server is down.
  pub fn with_bootstrap(self, fetch: BootstrapFetch) -> Self {
    self.bootstrap.lock().unwrap().push_back(fetch);
    self
  }

  pub fn calls(&self, path: &str) -> usize {
    self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
  }

  pub fn total_calls(&self) -> usize {
    self.calls.lock().unwrap().values().sum()
  }

  /// Freshness tokens received by each bootstrap call, in order.
  pub fn bootstrap_tokens(&self) -> Vec<Option<String>> {
    self.tokens.lock().unwrap().clone()
  }

  async fn hit(&self, path: &str) {
    *self.calls.lock().unwrap().entry(path.to_string()).or_default() += 1;
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
  }

  async fn list<T>(&self, path: &str, rows: impl FnOnce() -> Vec<T>) -> Result<Vec<T>, ApiError> {
    self.hit(path).await;
    if self.fail_lists {
      Err(ApiError::Status(500))
    } else {
      Ok(rows())
    }
  }
}

#[async_trait]
impl DashboardApi for FakeApi {
  async fn fetch_bootstrap(&self, freshness_token: Option<&str>) -> BootstrapFetch {
    self.tokens.lock().unwrap().push(freshness_token.map(str::to_string));
    self.hit("bootstrap").await;
    if self.crash_bootstrap {
      panic!("bootstrap handler crashed");
    }
    let next = self.bootstrap.lock().unwrap().pop_front();
    next.unwrap_or(BootstrapFetch::Failed(ApiError::Status(503)))
  }

  async fn tickets(&self) -> Result<Vec<Ticket>, ApiError> {
    self
      .list("tickets", || self.tickets.iter().map(|id| ticket(id)).collect())
      .await
  }

  async fn events(&self) -> Result<Vec<EventSummary>, ApiError> {
    self.list("events", Vec::new).await
  }

  async fn forms(&self) -> Result<Vec<FormDefinition>, ApiError> {
    self.list("forms", Vec::new).await
  }

  async fn form_submissions(&self) -> Result<Vec<FormSubmission>, ApiError> {
    self.list("forms/submissions", Vec::new).await
  }

  async fn inventory(&self) -> Result<Vec<InventoryItem>, ApiError> {
    self.list("inventory", Vec::new).await
  }

  async fn stock_levels(&self) -> Result<Vec<StockLevel>, ApiError> {
    self.list("inventory/stock", Vec::new).await
  }

  async fn admin_users(&self) -> Result<Vec<UserSummary>, ApiError> {
    self.list("admin/users", Vec::new).await
  }
}
