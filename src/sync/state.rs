//! Shared UI projections written by bootstrap and resource loads.

use std::sync::Arc;

use crate::api::types::{BootstrapSnapshot, EventSummary, OrgSettings, Ticket, UserSummary};
use crate::cache::{reconcile_list, replace_if_different, upsert_by_id};

/// Live dashboard data as rendered by the host.
///
/// Every field is behind an `Arc`; a write that would not change what is
/// shown leaves the existing `Arc` in place, so consumers can skip redraws
/// with a pointer comparison.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
  pub user: Option<Arc<UserSummary>>,
  pub org: Option<Arc<OrgSettings>>,
  pub tickets: Arc<Vec<Ticket>>,
  pub events: Arc<Vec<EventSummary>>,
  /// Member directory, loaded only for admins
  pub members: Arc<Vec<UserSummary>>,
}

impl DashboardState {
  /// Apply a bootstrap snapshot field by field. Returns whether anything
  /// observable changed.
  pub fn apply_snapshot(&mut self, snapshot: BootstrapSnapshot) -> bool {
    let user = replace_if_different(self.user.clone(), snapshot.user);
    let org = replace_if_different(self.org.clone(), snapshot.org);
    let changed = !same_option(&self.user, &user) || !same_option(&self.org, &org);
    self.user = user;
    self.org = org;

    let tickets = self.apply_tickets(snapshot.tickets);
    let events = self.apply_events(snapshot.events);
    let members = self.refresh_self_in_members();
    changed || tickets || events || members
  }

  pub fn apply_tickets(&mut self, tickets: Vec<Ticket>) -> bool {
    let next = reconcile_list(self.tickets.clone(), Arc::new(tickets));
    replace_arc(&mut self.tickets, next)
  }

  pub fn apply_events(&mut self, events: Vec<EventSummary>) -> bool {
    let next = reconcile_list(self.events.clone(), Arc::new(events));
    replace_arc(&mut self.events, next)
  }

  pub fn apply_members(&mut self, members: Vec<UserSummary>) -> bool {
    let next = reconcile_list(self.members.clone(), Arc::new(members));
    let changed = replace_arc(&mut self.members, next);
    self.refresh_self_in_members() || changed
  }

  /// Whether the signed-in user is an admin. `None` until a user is known.
  pub fn is_admin(&self) -> Option<bool> {
    self.user.as_ref().map(|user| user.is_admin())
  }

  /// Keep the signed-in user's own directory entry in step with the
  /// bootstrap record. Only touches a directory that has been loaded.
  fn refresh_self_in_members(&mut self) -> bool {
    let Some(user) = self.user.as_ref() else {
      return false;
    };
    if self.members.is_empty() {
      return false;
    }
    let next = upsert_by_id(self.members.clone(), user.as_ref());
    replace_arc(&mut self.members, next)
  }
}

fn replace_arc<T>(slot: &mut Arc<T>, next: Arc<T>) -> bool {
  if Arc::ptr_eq(slot, &next) {
    false
  } else {
    *slot = next;
    true
  }
}

fn same_option<T>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
  match (a, b) {
    (Some(a), Some(b)) => Arc::ptr_eq(a, b),
    (None, None) => true,
    _ => false,
  }
}
