//! `:` commands and their autocomplete.

use schooldash::sync::ResourceKind;

/// Root screens reachable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Dashboard,
  Tickets,
  Events,
  Forms,
  Inventory,
  Admin,
}

impl Screen {
  /// Dataset the screen mounts; the dashboard renders bootstrap data only.
  pub fn resource(self) -> Option<ResourceKind> {
    match self {
      Screen::Dashboard => None,
      Screen::Tickets => Some(ResourceKind::Tickets),
      Screen::Events => Some(ResourceKind::Events),
      Screen::Forms => Some(ResourceKind::Forms),
      Screen::Inventory => Some(ResourceKind::Inventory),
      Screen::Admin => Some(ResourceKind::Members),
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Screen::Dashboard => "Dashboard",
      Screen::Tickets => "Tickets",
      Screen::Events => "Events",
      Screen::Forms => "Forms",
      Screen::Inventory => "Inventory",
      Screen::Admin => "Members",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Open(Screen),
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub action: Action,
}

pub const COMMANDS: &[Command] = &[
  Command {
    name: "dashboard",
    aliases: &["d", "home"],
    description: "Overview from the bootstrap snapshot",
    action: Action::Open(Screen::Dashboard),
  },
  Command {
    name: "tickets",
    aliases: &["t", "ticket"],
    description: "Support tickets",
    action: Action::Open(Screen::Tickets),
  },
  Command {
    name: "events",
    aliases: &["e", "calendar"],
    description: "Upcoming events",
    action: Action::Open(Screen::Events),
  },
  Command {
    name: "forms",
    aliases: &["f", "form"],
    description: "Forms and submissions",
    action: Action::Open(Screen::Forms),
  },
  Command {
    name: "inventory",
    aliases: &["i", "stock"],
    description: "Inventory items and stock levels",
    action: Action::Open(Screen::Inventory),
  },
  Command {
    name: "admin",
    aliases: &["a", "members", "users"],
    description: "Member directory (admins only)",
    action: Action::Open(Screen::Admin),
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit schooldash",
    action: Action::Quit,
  },
];

/// How well `cmd` matches `input`; lower ranks first.
fn rank(cmd: &Command, input: &str) -> Option<u8> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&'static Command, u8)> = COMMANDS
    .iter()
    .filter_map(|cmd| rank(cmd, &input).map(|r| (cmd, r)))
    .collect();
  // Stable sort keeps declaration order within a rank
  matches.sort_by_key(|(_, r)| *r);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Resolve typed input, preferring the highlighted suggestion.
pub fn resolve(input: &str, selected: usize) -> Option<Action> {
  get_suggestions(input).get(selected).map(|cmd| cmd.action)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    assert_eq!(get_suggestions("").len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_alias_beats_prefix() {
    // "i" is inventory's alias and a prefix of nothing else ranked higher
    assert_eq!(get_suggestions("i")[0].name, "inventory");
    assert_eq!(get_suggestions("members")[0].name, "admin");
  }

  #[test]
  fn test_prefix_match() {
    assert_eq!(get_suggestions("tick")[0].name, "tickets");
  }

  #[test]
  fn test_fuzzy_match() {
    assert_eq!(get_suggestions("vent")[0].name, "events");
  }

  #[test]
  fn test_resolve() {
    assert_eq!(resolve("forms", 0), Some(Action::Open(Screen::Forms)));
    assert_eq!(resolve("q", 0), Some(Action::Quit));
    assert_eq!(resolve("zzz", 0), None);
  }

  #[test]
  fn test_admin_screen_mounts_member_directory() {
    assert_eq!(Screen::Admin.resource(), Some(ResourceKind::Members));
    assert_eq!(Screen::Dashboard.resource(), None);
  }
}
