//! The dashboard's lazily loaded datasets and the conditions that trigger
//! them.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::api::types::{EventSummary, FormsBundle, InventoryBundle, Ticket, UserSummary};
use crate::api::{ApiError, DashboardApi};

use super::auth::AuthGate;
use super::bootstrap::BootstrapPhase;
use super::resource::{ResourceKind, ResourceLoader, DEFAULT_DEADLINE};
use super::state::DashboardState;

/// One optional loader per dataset. A slot is filled when its view mounts
/// and emptied when the view is torn down.
pub struct DashboardResources {
  api: Arc<dyn DashboardApi>,
  gate: AuthGate,
  deadline: Duration,
  tickets: Option<ResourceLoader<Vec<Ticket>>>,
  events: Option<ResourceLoader<Vec<EventSummary>>>,
  forms: Option<ResourceLoader<FormsBundle>>,
  inventory: Option<ResourceLoader<InventoryBundle>>,
  members: Option<ResourceLoader<Vec<UserSummary>>>,
}

impl DashboardResources {
  pub fn new(api: Arc<dyn DashboardApi>, gate: AuthGate) -> Self {
    Self {
      api,
      gate,
      deadline: DEFAULT_DEADLINE,
      tickets: None,
      events: None,
      forms: None,
      inventory: None,
      members: None,
    }
  }

  pub fn with_deadline(mut self, deadline: Duration) -> Self {
    self.deadline = deadline;
    self
  }

  /// Create a fresh `Unloaded` loader for `kind` unless one is mounted.
  pub fn mount(&mut self, kind: ResourceKind) {
    if self.is_mounted(kind) {
      return;
    }
    debug!(resource = %kind, "mounting resource");
    let api = self.api.clone();
    let deadline = self.deadline;
    match kind {
      ResourceKind::Tickets => {
        self.tickets = Some(
          ResourceLoader::new(kind, move || {
            let api = api.clone();
            async move { api.tickets().await }
          })
          .with_deadline(deadline),
        )
      }
      ResourceKind::Events => {
        self.events = Some(
          ResourceLoader::new(kind, move || {
            let api = api.clone();
            async move { api.events().await }
          })
          .with_deadline(deadline),
        )
      }
      ResourceKind::Forms => {
        self.forms = Some(
          ResourceLoader::new(kind, move || {
            let api = api.clone();
            async move {
              let (forms, submissions) = futures::try_join!(api.forms(), api.form_submissions())?;
              Ok::<_, ApiError>(FormsBundle { forms, submissions })
            }
          })
          .with_deadline(deadline),
        )
      }
      ResourceKind::Inventory => {
        self.inventory = Some(
          ResourceLoader::new(kind, move || {
            let api = api.clone();
            async move {
              let (items, stock) = futures::try_join!(api.inventory(), api.stock_levels())?;
              Ok::<_, ApiError>(InventoryBundle { items, stock })
            }
          })
          .with_deadline(deadline),
        )
      }
      ResourceKind::Members => {
        self.members = Some(
          ResourceLoader::new(kind, move || {
            let api = api.clone();
            async move { api.admin_users().await }
          })
          .with_deadline(deadline),
        )
      }
    }
  }

  /// Tear down the loader for `kind`, cancelling any load in flight. The
  /// next mount starts over and may retry a previously failed load.
  pub fn unmount(&mut self, kind: ResourceKind) {
    debug!(resource = %kind, "unmounting resource");
    match kind {
      ResourceKind::Tickets => self.tickets = None,
      ResourceKind::Events => self.events = None,
      ResourceKind::Forms => self.forms = None,
      ResourceKind::Inventory => self.inventory = None,
      ResourceKind::Members => self.members = None,
    }
  }

  pub fn is_mounted(&self, kind: ResourceKind) -> bool {
    match kind {
      ResourceKind::Tickets => self.tickets.is_some(),
      ResourceKind::Events => self.events.is_some(),
      ResourceKind::Forms => self.forms.is_some(),
      ResourceKind::Inventory => self.inventory.is_some(),
      ResourceKind::Members => self.members.is_some(),
    }
  }

  /// Mount `kind` and trigger its load; the navigation entry point.
  pub fn navigate(&mut self, kind: ResourceKind, phase: BootstrapPhase, state: &DashboardState) {
    self.mount(kind);
    self.ensure_loaded(kind, phase, state);
  }

  /// Trigger the load for `kind` if it is mounted and its condition holds.
  ///
  /// With the gate closed the resource settles empty on the spot. The member
  /// directory additionally waits for bootstrap to settle and then only
  /// loads for admins. Safe to call on every tick.
  pub fn ensure_loaded(
    &mut self,
    kind: ResourceKind,
    phase: BootstrapPhase,
    state: &DashboardState,
  ) -> bool {
    let remote = self.gate.allows_remote();
    let trigger = match kind {
      ResourceKind::Members => remote && phase.is_settled() && state.is_admin() == Some(true),
      _ => remote,
    };

    match kind {
      ResourceKind::Tickets => drive(&mut self.tickets, remote, trigger),
      ResourceKind::Events => drive(&mut self.events, remote, trigger),
      ResourceKind::Forms => drive(&mut self.forms, remote, trigger),
      ResourceKind::Inventory => drive(&mut self.inventory, remote, trigger),
      ResourceKind::Members => drive(&mut self.members, remote, trigger),
    }
  }

  /// Mount every resource and settle it empty. Demo/local mode.
  pub fn settle_all_empty(&mut self) {
    for kind in ResourceKind::ALL {
      self.mount(kind);
    }
    drive(&mut self.tickets, false, false);
    drive(&mut self.events, false, false);
    drive(&mut self.forms, false, false);
    drive(&mut self.inventory, false, false);
    drive(&mut self.members, false, false);
  }

  /// Collect finished loads. Successful loads of lists shared with the
  /// bootstrap projection are merged into `state` through the reconciler; a
  /// failed load leaves the projection alone. Returns whether anything
  /// changed.
  pub fn poll(&mut self, state: &mut DashboardState) -> bool {
    let mut changed = false;

    if let Some(loader) = self.tickets.as_mut() {
      if loader.poll() {
        changed = true;
        if let Some(tickets) = loader.fetched() {
          state.apply_tickets(tickets.clone());
        }
      }
    }
    if let Some(loader) = self.events.as_mut() {
      if loader.poll() {
        changed = true;
        if let Some(events) = loader.fetched() {
          state.apply_events(events.clone());
        }
      }
    }
    if let Some(loader) = self.members.as_mut() {
      if loader.poll() {
        changed = true;
        if let Some(members) = loader.fetched() {
          state.apply_members(members.clone());
        }
      }
    }
    if let Some(loader) = self.forms.as_mut() {
      changed |= loader.poll();
    }
    if let Some(loader) = self.inventory.as_mut() {
      changed |= loader.poll();
    }

    changed
  }

  pub fn tickets(&self) -> Option<&ResourceLoader<Vec<Ticket>>> {
    self.tickets.as_ref()
  }

  pub fn events(&self) -> Option<&ResourceLoader<Vec<EventSummary>>> {
    self.events.as_ref()
  }

  pub fn forms(&self) -> Option<&ResourceLoader<FormsBundle>> {
    self.forms.as_ref()
  }

  pub fn inventory(&self) -> Option<&ResourceLoader<InventoryBundle>> {
    self.inventory.as_ref()
  }

  pub fn members(&self) -> Option<&ResourceLoader<Vec<UserSummary>>> {
    self.members.as_ref()
  }

  /// Whether `kind` is mounted and still waiting on its request.
  pub fn is_loading(&self, kind: ResourceKind) -> bool {
    match kind {
      ResourceKind::Tickets => self.tickets.as_ref().is_some_and(|l| l.state().is_loading()),
      ResourceKind::Events => self.events.as_ref().is_some_and(|l| l.state().is_loading()),
      ResourceKind::Forms => self.forms.as_ref().is_some_and(|l| l.state().is_loading()),
      ResourceKind::Inventory => self.inventory.as_ref().is_some_and(|l| l.state().is_loading()),
      ResourceKind::Members => self.members.as_ref().is_some_and(|l| l.state().is_loading()),
    }
  }
}

/// Settle empty when remote sync is off, otherwise load if `trigger` holds.
fn drive<T: Default + Send + 'static>(
  slot: &mut Option<ResourceLoader<T>>,
  remote: bool,
  trigger: bool,
) -> bool {
  match slot.as_mut() {
    Some(loader) if !remote => loader.settle_empty(),
    Some(loader) => loader.ensure_loaded(trigger),
    None => false,
  }
}
