use crate::commands::{self, Action, Command, Screen};
use crate::event::{Event, EventHandler};
use crate::ui;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use schooldash::api::{DashboardApi, TenantContext};
use schooldash::cache::BootstrapCache;
use schooldash::config::Config;
use schooldash::sync::{
  AuthGate, BootstrapPhase, BootstrapSync, DashboardResources, DashboardState, ResourceKind,
};
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
}

pub struct App {
  config: Config,
  context: TenantContext,

  /// Live projection shared by every screen
  state: DashboardState,
  bootstrap: BootstrapSync,
  resources: DashboardResources,

  screen: Screen,
  selected: usize,
  mode: Mode,
  command_input: String,
  selected_suggestion: usize,
  should_quit: bool,
}

impl App {
  pub fn new(
    config: Config,
    context: TenantContext,
    api: Arc<dyn DashboardApi>,
    cache: BootstrapCache,
  ) -> Self {
    let gate = AuthGate::from_context(&context);
    let deadline = config.request_timeout();
    Self {
      bootstrap: BootstrapSync::new(api.clone(), cache, gate).with_deadline(deadline),
      resources: DashboardResources::new(api, gate).with_deadline(deadline),
      state: DashboardState::default(),
      config,
      context,
      screen: Screen::Dashboard,
      selected: 0,
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(100));

    self.start();

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    self.bootstrap.cancel();

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  /// Hydrate from cache before the first frame. In local mode every
  /// dataset settles empty right away.
  fn start(&mut self) {
    self.bootstrap.start(&mut self.state);
    if self.is_local_mode() {
      self.resources.settle_all_empty();
    }
    info!(tenant = %self.context.tenant(), phase = ?self.bootstrap.phase(), "dashboard started");
  }

  /// Apply finished work and re-evaluate load triggers for the open screen.
  fn tick(&mut self) {
    self.bootstrap.poll(&mut self.state);
    let phase = self.bootstrap.phase();
    if let Some(kind) = self.screen.resource() {
      self.resources.ensure_loaded(kind, phase, &self.state);
    }
    self.resources.poll(&mut self.state);
    self.clamp_selection();
  }

  fn open(&mut self, screen: Screen) {
    if screen == self.screen {
      return;
    }
    if let Some(kind) = self.screen.resource() {
      self.resources.unmount(kind);
    }
    self.screen = screen;
    self.selected = 0;
    if let Some(kind) = screen.resource() {
      self
        .resources
        .navigate(kind, self.bootstrap.phase(), &self.state);
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') => {
        if self.screen == Screen::Dashboard {
          self.should_quit = true;
        } else {
          self.open(Screen::Dashboard);
        }
      }
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }
      KeyCode::Esc => self.open(Screen::Dashboard),
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      _ => {}
    }
  }

  fn handle_command_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        let count = commands::get_suggestions(&self.command_input).len();
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + 1) % count;
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        let count = commands::get_suggestions(&self.command_input).len();
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + count - 1) % count;
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0;
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0;
      }
      _ => {}
    }
  }

  fn execute_command(&mut self) {
    match commands::resolve(&self.command_input, self.selected_suggestion) {
      Some(Action::Open(screen)) => self.open(screen),
      Some(Action::Quit) => self.should_quit = true,
      None => {}
    }
    self.command_input.clear();
  }

  fn row_count(&self) -> usize {
    match self.screen {
      Screen::Dashboard => 0,
      Screen::Tickets => self.state.tickets.len(),
      Screen::Events => self.state.events.len(),
      Screen::Forms => self
        .resources
        .forms()
        .and_then(|l| l.data())
        .map_or(0, |bundle| bundle.forms.len()),
      Screen::Inventory => self
        .resources
        .inventory()
        .and_then(|l| l.data())
        .map_or(0, |bundle| bundle.items.len()),
      Screen::Admin => self.state.members.len(),
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.row_count();
    if len > 0 {
      self.selected = (self.selected as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  fn clamp_selection(&mut self) {
    let len = self.row_count();
    if self.selected >= len {
      self.selected = len.saturating_sub(1);
    }
  }

  // Accessors for UI rendering
  pub fn screen(&self) -> Screen {
    self.screen
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn state(&self) -> &DashboardState {
    &self.state
  }

  pub fn resources(&self) -> &DashboardResources {
    &self.resources
  }

  pub fn phase(&self) -> BootstrapPhase {
    self.bootstrap.phase()
  }

  pub fn is_local_mode(&self) -> bool {
    !self.context.has_credential()
  }

  /// Whether the open screen is still waiting on data
  pub fn is_loading(&self) -> bool {
    match self.screen.resource() {
      Some(ResourceKind::Members) => {
        !self.phase().is_settled() || self.resources.is_loading(ResourceKind::Members)
      }
      Some(kind) => self.resources.is_loading(kind),
      None => !self.phase().is_settled(),
    }
  }

  pub fn title(&self) -> &str {
    if let Some(title) = self.config.title.as_deref() {
      return title;
    }
    self
      .state
      .org
      .as_ref()
      .map(|org| org.name.as_str())
      .filter(|name| !name.is_empty())
      .unwrap_or("schooldash")
  }

  pub fn tenant(&self) -> &str {
    self.context.tenant().as_str()
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }
}
