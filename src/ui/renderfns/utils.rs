use schooldash::sync::BootstrapPhase;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

pub fn phase_label(phase: BootstrapPhase) -> &'static str {
  match phase {
    BootstrapPhase::NotStarted => "starting",
    BootstrapPhase::HydratingFromCache => "reading cache",
    BootstrapPhase::Revalidating { hydrated: true } => "cached, refreshing",
    BootstrapPhase::Revalidating { hydrated: false } => "loading",
    BootstrapPhase::Settled => "up to date",
    BootstrapPhase::SettledEmpty => "offline",
  }
}
