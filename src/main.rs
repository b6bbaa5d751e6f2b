mod app;
mod commands;
mod event;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use schooldash::api::{DashboardApi, DashboardClient, TenantContext};
use schooldash::cache::{BootstrapCache, CacheStorage, NoopStorage, SqliteStorage};
use schooldash::config::{CacheConfig, Config};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "schooldash")]
#[command(about = "A terminal dashboard for school operations")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/schooldash/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Tenant (school) to open, overriding the config file
  #[arg(short, long)]
  tenant: Option<String>,

  /// Write logs here instead of $XDG_DATA_HOME/schooldash/schooldash.log
  #[arg(long)]
  log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  // The terminal belongs to the UI, so logs only ever go to a file
  let _guard = setup_tracing(args.log_file.as_deref())?;

  let config = Config::load(args.config.as_deref())?;
  let config = match args.tenant {
    Some(tenant) => Config { tenant, ..config },
    None => config,
  };

  let tenant = config.tenant_id();
  if tenant.as_str().is_empty() {
    return Err(eyre!("tenant must not be empty"));
  }
  let context = TenantContext::new(tenant.clone(), Config::get_credential());

  let client = DashboardClient::new(&config.server.url, context.clone(), config.request_timeout())?;
  let api: Arc<dyn DashboardApi> = Arc::new(client);
  let cache = BootstrapCache::new(open_storage(&config.cache), &tenant);

  let mut app = app::App::new(config, context, api, cache);
  app.run().await?;

  Ok(())
}

/// Storage is best-effort: a cache that cannot be opened just means every
/// start is a cold start.
fn open_storage(config: &CacheConfig) -> Arc<dyn CacheStorage> {
  if !config.enabled {
    return Arc::new(NoopStorage);
  }
  let opened = match &config.path {
    Some(path) => SqliteStorage::open_at(path),
    None => SqliteStorage::open(),
  };
  match opened {
    Ok(storage) => Arc::new(storage),
    Err(e) => {
      warn!(error = %e, "bootstrap cache unavailable, continuing without it");
      Arc::new(NoopStorage)
    }
  }
}

fn setup_tracing(log_file: Option<&Path>) -> Result<WorkerGuard> {
  let path = match log_file {
    Some(path) => path.to_path_buf(),
    None => dirs::data_dir()
      .ok_or_else(|| eyre!("Could not determine data directory"))?
      .join("schooldash")
      .join("schooldash.log"),
  };
  let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;
  std::fs::create_dir_all(dir)?;

  let (writer, guard) =
    tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("schooldash=info"));

  tracing_subscriber::registry()
    .with(filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true),
    )
    .init();

  Ok(guard)
}
