//! Bootstrap synchronization: instant hydration from the persisted snapshot
//! followed by one conditional revalidation against the server.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::api::{ApiError, BootstrapFetch, DashboardApi};
use crate::cache::BootstrapCache;

use super::auth::AuthGate;
use super::resource::DEFAULT_DEADLINE;
use super::session::SyncSession;
use super::state::DashboardState;

/// Where the bootstrap run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
  NotStarted,
  /// Reading the persisted snapshot
  HydratingFromCache,
  /// Waiting on the server. `hydrated` means cached data is already shown,
  /// which counts as provisionally settled.
  Revalidating { hydrated: bool },
  /// Showing cached or server data
  Settled,
  /// Showing empty defaults: no credential, or nothing cached and the
  /// server unreachable
  SettledEmpty,
}

impl BootstrapPhase {
  /// Whether the dashboard has something final enough to render.
  pub fn is_settled(self) -> bool {
    matches!(
      self,
      BootstrapPhase::Settled
        | BootstrapPhase::SettledEmpty
        | BootstrapPhase::Revalidating { hydrated: true }
    )
  }
}

/// Runs bootstrap at most once per process.
///
/// The orchestrator is the only writer of the bootstrap cache.
pub struct BootstrapSync {
  api: Arc<dyn DashboardApi>,
  cache: BootstrapCache,
  gate: AuthGate,
  phase: BootstrapPhase,
  session: SyncSession,
  receiver: Option<oneshot::Receiver<BootstrapFetch>>,
  deadline: Duration,
}

impl BootstrapSync {
  pub fn new(api: Arc<dyn DashboardApi>, cache: BootstrapCache, gate: AuthGate) -> Self {
    Self {
      api,
      cache,
      gate,
      phase: BootstrapPhase::NotStarted,
      session: SyncSession::new(),
      receiver: None,
      deadline: DEFAULT_DEADLINE,
    }
  }

  /// Bound the revalidation request; expiry counts as a failed request.
  pub fn with_deadline(mut self, deadline: Duration) -> Self {
    self.deadline = deadline;
    self
  }

  pub fn phase(&self) -> BootstrapPhase {
    self.phase
  }

  /// Begin the run. Hydration from cache happens synchronously, before the
  /// revalidation request is even issued. Returns whether `state` changed.
  ///
  /// No-op unless the run has not started yet.
  pub fn start(&mut self, state: &mut DashboardState) -> bool {
    if self.phase != BootstrapPhase::NotStarted {
      return false;
    }

    if !self.gate.allows_remote() {
      info!("no credential, running in local mode");
      self.phase = BootstrapPhase::SettledEmpty;
      return false;
    }

    self.phase = BootstrapPhase::HydratingFromCache;
    let cached = self.cache.read();
    let hydrated = cached.is_some();
    let changed = match cached {
      Some(snapshot) => {
        info!(captured_at = %snapshot.captured_at, "hydrated dashboard from cache");
        state.apply_snapshot(snapshot)
      }
      None => false,
    };

    // A token without the snapshot it describes would let a 304 leave us
    // with nothing to show, so only send it alongside hydrated data.
    let token = if hydrated {
      self.cache.read_freshness_token()
    } else {
      None
    };

    self.phase = BootstrapPhase::Revalidating { hydrated };
    self.spawn_revalidation(token);
    changed
  }

  fn spawn_revalidation(&mut self, token: Option<String>) {
    let (tx, rx) = oneshot::channel();
    self.receiver = Some(rx);

    let api = self.api.clone();
    let session = self.session.clone();
    let deadline = self.deadline;
    debug!(conditional = token.is_some(), "revalidating bootstrap");
    tokio::spawn(async move {
      let request = tokio::time::timeout(deadline, api.fetch_bootstrap(token.as_deref()));
      let Some(result) = session.run(request).await else {
        debug!("bootstrap revalidation cancelled");
        return;
      };
      let fetch = result.unwrap_or(BootstrapFetch::Failed(ApiError::Timeout(deadline)));
      // Ignore send errors - the orchestrator may have been dropped
      let _ = tx.send(fetch);
    });
  }

  /// Apply the revalidation result if it has arrived. Returns whether
  /// `state` changed. Call this in the event loop tick.
  pub fn poll(&mut self, state: &mut DashboardState) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(fetch) => self.complete(fetch, state),
      Err(oneshot::error::TryRecvError::Empty) => false,
      Err(oneshot::error::TryRecvError::Closed) => {
        self.complete(BootstrapFetch::Failed(ApiError::TaskEnded), state)
      }
    }
  }

  /// Wait for the revalidation, if in flight, and apply it.
  pub async fn settle(&mut self, state: &mut DashboardState) -> BootstrapPhase {
    if let Some(receiver) = self.receiver.as_mut() {
      let fetch = receiver
        .await
        .unwrap_or(BootstrapFetch::Failed(ApiError::TaskEnded));
      self.complete(fetch, state);
    }
    self.phase
  }

  /// Tear down: the in-flight revalidation, if any, is never applied.
  pub fn cancel(&mut self) {
    self.session.cancel();
    self.receiver = None;
  }

  fn complete(&mut self, fetch: BootstrapFetch, state: &mut DashboardState) -> bool {
    self.receiver = None;
    if self.session.is_cancelled() {
      return false;
    }

    let hydrated = matches!(self.phase, BootstrapPhase::Revalidating { hydrated: true });
    match fetch {
      BootstrapFetch::NotModified => {
        debug!("bootstrap not modified");
        self.phase = if hydrated {
          BootstrapPhase::Settled
        } else {
          BootstrapPhase::SettledEmpty
        };
        false
      }
      BootstrapFetch::Fresh { snapshot, token } => {
        // Persist exactly what the server sent, then merge into live state.
        self.cache.commit(&snapshot, &token);
        let changed = state.apply_snapshot(snapshot);
        info!(changed, "bootstrap revalidated with fresh data");
        self.phase = BootstrapPhase::Settled;
        changed
      }
      BootstrapFetch::Failed(e) => {
        if hydrated {
          warn!(error = %e, "bootstrap revalidation failed, keeping cached data");
          self.phase = BootstrapPhase::Settled;
        } else {
          warn!(error = %e, "bootstrap failed with nothing cached, settling empty");
          self.phase = BootstrapPhase::SettledEmpty;
        }
        false
      }
    }
  }
}

impl Drop for BootstrapSync {
  fn drop(&mut self) {
    self.session.cancel();
  }
}
