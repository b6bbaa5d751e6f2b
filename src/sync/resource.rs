//! Lazily loaded, per-view datasets.
//!
//! A `ResourceLoader<T>` wraps a fetcher closure and guarantees at most one
//! load attempt per mount:
//!
//! ```ignore
//! let api = api.clone();
//! let mut forms = ResourceLoader::new(ResourceKind::Forms, move || {
//!     let api = api.clone();
//!     async move { api.forms().await }
//! });
//!
//! // On navigation, and on every tick after
//! forms.ensure_loaded(true);
//!
//! // In event loop tick
//! if forms.poll() {
//!     // Loaded, trigger re-render
//! }
//! ```
//!
//! Failures settle to `T::default()`; the loader never retries on its own.
//! Dropping the loader (unmounting the view) cancels whatever is in flight,
//! and the next mount starts from `Unloaded` again.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::api::ApiError;

use super::session::SyncSession;

/// Default deadline applied to every resource request.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Which dataset a loader fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
  Tickets,
  Events,
  Forms,
  Inventory,
  Members,
}

impl ResourceKind {
  pub const ALL: [ResourceKind; 5] = [
    ResourceKind::Tickets,
    ResourceKind::Events,
    ResourceKind::Forms,
    ResourceKind::Inventory,
    ResourceKind::Members,
  ];

  pub fn label(self) -> &'static str {
    match self {
      ResourceKind::Tickets => "tickets",
      ResourceKind::Events => "events",
      ResourceKind::Forms => "forms",
      ResourceKind::Inventory => "inventory",
      ResourceKind::Members => "members",
    }
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Load state of one resource. Moves only forward:
/// `Unloaded -> Loading -> Loaded`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState<T> {
  Unloaded,
  Loading,
  /// Terminal for this mount, whether the load succeeded or not
  Loaded(T),
}

impl<T> ResourceState<T> {
  pub fn is_unloaded(&self) -> bool {
    matches!(self, ResourceState::Unloaded)
  }

  pub fn is_loading(&self) -> bool {
    matches!(self, ResourceState::Loading)
  }

  pub fn is_loaded(&self) -> bool {
    matches!(self, ResourceState::Loaded(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      ResourceState::Loaded(data) => Some(data),
      _ => None,
    }
  }
}

/// A boxed future that returns a Result<T, ApiError>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// `None` means the load failed and the default payload applies.
type Outcome<T> = Option<T>;

pub struct ResourceLoader<T> {
  kind: ResourceKind,
  state: ResourceState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<oneshot::Receiver<Outcome<T>>>,
  session: SyncSession,
  deadline: Duration,
  /// Set when `Loaded` holds data from a successful request
  fetched: bool,
}

impl<T: Default + Send + 'static> ResourceLoader<T> {
  /// Create an `Unloaded` loader. The fetcher runs at most once per loader.
  pub fn new<F, Fut>(kind: ResourceKind, fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    Self {
      kind,
      state: ResourceState::Unloaded,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
      session: SyncSession::new(),
      deadline: DEFAULT_DEADLINE,
      fetched: false,
    }
  }

  /// Bound the request; expiry settles the resource like a network error.
  pub fn with_deadline(mut self, deadline: Duration) -> Self {
    self.deadline = deadline;
    self
  }

  pub fn kind(&self) -> ResourceKind {
    self.kind
  }

  pub fn state(&self) -> &ResourceState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_loaded(&self) -> bool {
    self.state.is_loaded()
  }

  /// Loaded data, but only when it came from a successful request rather
  /// than the empty fallback.
  pub fn fetched(&self) -> Option<&T> {
    if self.fetched {
      self.state.data()
    } else {
      None
    }
  }

  /// Start the one load this mount gets, if `trigger` holds and nothing
  /// has been started yet. Returns whether a request was issued.
  pub fn ensure_loaded(&mut self, trigger: bool) -> bool {
    if !self.state.is_unloaded() || !trigger {
      return false;
    }

    let (tx, rx) = oneshot::channel();
    self.receiver = Some(rx);
    self.state = ResourceState::Loading;
    debug!(resource = %self.kind, "resource loading");

    let future = (self.fetcher)();
    let session = self.session.clone();
    let deadline = self.deadline;
    let kind = self.kind;
    tokio::spawn(async move {
      let Some(result) = session.run(tokio::time::timeout(deadline, future)).await else {
        debug!(resource = %kind, "resource load cancelled");
        return;
      };
      let outcome = match result {
        Ok(Ok(data)) => Some(data),
        Ok(Err(e)) => {
          warn!(resource = %kind, error = %e, "resource load failed, settling empty");
          None
        }
        Err(_) => {
          let error = ApiError::Timeout(deadline);
          warn!(resource = %kind, error = %error, "resource load timed out, settling empty");
          None
        }
      };
      // Ignore send errors - the loader may have been dropped
      let _ = tx.send(outcome);
    });

    true
  }

  /// Settle straight to the default payload without any request. Used when
  /// remote sync is disabled.
  pub fn settle_empty(&mut self) -> bool {
    if !self.state.is_unloaded() {
      return false;
    }
    self.state = ResourceState::Loaded(T::default());
    true
  }

  /// Poll for the result of an in-flight load.
  ///
  /// Returns `true` if the state changed. Call this in the event loop tick.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(outcome) => self.complete(Some(outcome)),
      Err(oneshot::error::TryRecvError::Empty) => false,
      Err(oneshot::error::TryRecvError::Closed) => self.complete(None),
    }
  }

  /// Wait for the in-flight load, if any, and apply it.
  pub async fn settled(&mut self) -> &ResourceState<T> {
    if let Some(receiver) = self.receiver.as_mut() {
      let received = receiver.await.ok();
      self.complete(received);
    }
    &self.state
  }

  /// Cancel the in-flight load. Its result will never be applied.
  pub fn cancel(&mut self) {
    self.session.cancel();
    self.receiver = None;
  }

  /// `received` is `None` when the task ended without reporting.
  fn complete(&mut self, received: Option<Outcome<T>>) -> bool {
    self.receiver = None;
    if self.session.is_cancelled() {
      return false;
    }
    let data = match received {
      Some(Some(data)) => {
        self.fetched = true;
        data
      }
      Some(None) => T::default(),
      None => {
        warn!(resource = %self.kind, "resource task ended without a result, settling empty");
        T::default()
      }
    };
    self.state = ResourceState::Loaded(data);
    debug!(resource = %self.kind, "resource loaded");
    true
  }
}

impl<T> Drop for ResourceLoader<T> {
  fn drop(&mut self) {
    self.session.cancel();
  }
}

impl<T: fmt::Debug> fmt::Debug for ResourceLoader<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResourceLoader")
      .field("kind", &self.kind)
      .field("state", &self.state)
      .field("deadline", &self.deadline)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  fn counting_loader(
    calls: Arc<AtomicUsize>,
    delay: Duration,
    result: Result<Vec<u32>, u16>,
  ) -> ResourceLoader<Vec<u32>> {
    ResourceLoader::new(ResourceKind::Forms, move || {
      calls.fetch_add(1, Ordering::SeqCst);
      let result = result.clone();
      async move {
        tokio::time::sleep(delay).await;
        result.map_err(ApiError::Status)
      }
    })
  }

  #[tokio::test]
  async fn test_load_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut loader = counting_loader(calls.clone(), Duration::ZERO, Ok(vec![1, 2]));

    assert!(loader.state().is_unloaded());
    assert!(loader.ensure_loaded(true));
    assert!(loader.state().is_loading());

    assert_eq!(loader.settled().await, &ResourceState::Loaded(vec![1, 2]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_poll_picks_up_result() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut loader = counting_loader(calls, Duration::ZERO, Ok(vec![3]));

    loader.ensure_loaded(true);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(loader.poll());
    assert_eq!(loader.data(), Some(&vec![3]));
    assert_eq!(loader.fetched(), Some(&vec![3]));
    assert!(!loader.poll());
  }

  #[tokio::test]
  async fn test_rapid_double_trigger_issues_one_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut loader = counting_loader(calls.clone(), Duration::from_millis(30), Ok(vec![1]));

    assert!(loader.ensure_loaded(true));
    assert!(!loader.ensure_loaded(true));
    loader.settled().await;
    assert!(!loader.ensure_loaded(true));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_false_trigger_is_noop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut loader = counting_loader(calls.clone(), Duration::ZERO, Ok(vec![1]));

    assert!(!loader.ensure_loaded(false));
    assert!(loader.state().is_unloaded());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_failure_settles_to_default_without_retry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut loader = counting_loader(calls.clone(), Duration::ZERO, Err(503));

    loader.ensure_loaded(true);
    assert_eq!(loader.settled().await, &ResourceState::Loaded(Vec::new()));
    assert_eq!(loader.fetched(), None);

    assert!(!loader.ensure_loaded(true));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_deadline_settles_to_default() {
    let mut loader: ResourceLoader<Vec<u32>> =
      ResourceLoader::new(ResourceKind::Inventory, || std::future::pending())
        .with_deadline(Duration::from_millis(20));

    loader.ensure_loaded(true);
    assert_eq!(loader.settled().await, &ResourceState::Loaded(Vec::new()));
  }

  #[tokio::test]
  async fn test_settle_empty_makes_no_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut loader = counting_loader(calls.clone(), Duration::ZERO, Ok(vec![1]));

    assert!(loader.settle_empty());
    assert!(loader.is_loaded());
    assert!(!loader.ensure_loaded(true));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_cancelled_load_is_never_applied() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut loader = counting_loader(calls, Duration::from_millis(20), Ok(vec![9]));

    loader.ensure_loaded(true);
    loader.cancel();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!loader.poll());
    assert!(loader.state().is_loading());
  }

  #[tokio::test]
  async fn test_fresh_loader_after_remount_retries() {
    let calls = Arc::new(AtomicUsize::new(0));

    let mut first = counting_loader(calls.clone(), Duration::ZERO, Err(500));
    first.ensure_loaded(true);
    first.settled().await;
    drop(first);

    let mut second = counting_loader(calls.clone(), Duration::ZERO, Ok(vec![4]));
    second.ensure_loaded(true);
    assert_eq!(second.settled().await, &ResourceState::Loaded(vec![4]));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }
}
