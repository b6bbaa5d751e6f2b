//! Identity implementations for dashboard records.

use crate::cache::Identified;

use super::types::{
  EventSummary, FormDefinition, FormSubmission, InventoryItem, StockLevel, Ticket, UserSummary,
};

impl Identified for Ticket {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Identified for EventSummary {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Identified for UserSummary {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Identified for FormDefinition {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Identified for FormSubmission {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Identified for InventoryItem {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Identified for StockLevel {
  fn id(&self) -> &str {
    &self.id
  }
}
