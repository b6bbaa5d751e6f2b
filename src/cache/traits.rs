//! Core traits for reconciliation and caching.

/// Records that carry a stable identity.
///
/// Reconciliation compares collections by the sequence of these ids only;
/// field contents are never inspected.
pub trait Identified {
  fn id(&self) -> &str;
}
