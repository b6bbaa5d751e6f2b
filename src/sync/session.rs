//! Cancellation scope for asynchronous loads.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Token tying an asynchronous operation to the view or run that started it.
///
/// Cancelled when the owner is torn down or superseded. In-flight work races
/// against cancellation, and completions check [`SyncSession::is_cancelled`]
/// before committing any state.
#[derive(Debug, Clone, Default)]
pub struct SyncSession {
  token: CancellationToken,
}

impl SyncSession {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.token.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.token.is_cancelled()
  }

  /// Drive `future` to completion unless the session is cancelled first.
  pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
    tokio::select! {
      _ = self.token.cancelled() => None,
      output = future => Some(output),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn test_run_completes() {
    let session = SyncSession::new();
    assert_eq!(session.run(async { 7 }).await, Some(7));
  }

  #[tokio::test]
  async fn test_run_is_cut_short_by_cancel() {
    let session = SyncSession::new();
    let handle = {
      let session = session.clone();
      tokio::spawn(async move { session.run(std::future::pending::<()>()).await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    session.cancel();

    assert_eq!(handle.await.unwrap(), None);
    assert!(session.is_cancelled());
  }
}
