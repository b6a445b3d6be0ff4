//! census-server binary.
//!
//! Loads `.env`, then `census.toml` (or the path given with `--config`) and
//! `CENSUS_*` environment variables, opens the configured store and serves
//! the person API over HTTP.
//!
//! ```text
//! census-server            # same as `census-server serve`
//! census-server migrate    # create the database if needed, apply migrations, exit
//! census-server migrate --down   # revert every migration, exit
//! ```

use std::{future::IntoFuture as _, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use census_core::store::PersonStore;
use census_enrich::HttpEnricher;
use census_server::{
  Settings, app, init_tracing,
  settings::Backend,
};
use census_service::{PersonService, ServiceConfig};
use census_store_postgres::PgStore;
use census_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tokio::{net::TcpListener, signal, sync::oneshot};

#[derive(Parser)]
#[command(author, version, about = "Census person registry")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "census.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Command {
  /// Serve the HTTP API (default).
  #[default]
  Serve,
  /// Create the database if missing, apply migrations and exit.
  Migrate {
    /// Revert every applied migration instead.
    #[arg(long)]
    down: bool,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // A missing .env is fine.
  dotenvy::dotenv().ok();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  init_tracing(&settings.log);

  match cli.command.unwrap_or_default() {
    Command::Serve => serve(settings).await,
    Command::Migrate { down: false } => migrate(settings).await,
    Command::Migrate { down: true } => rollback(settings).await,
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn migrate(settings: Settings) -> anyhow::Result<()> {
  match settings.storage.backend {
    Backend::Postgres => {
      let created = PgStore::ensure_database(&settings.database)
        .await
        .context("failed to ensure database exists")?;
      if !created {
        tracing::info!(database = %settings.database.name, "database already exists");
      }
      let store = PgStore::connect(&settings.database)
        .await
        .context("failed to connect to postgres")?;
      store.migrate().await.context("failed to apply migrations")?;
    }
    Backend::Sqlite => {
      let path = settings.sqlite_path();
      SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
    }
  }
  tracing::info!("migrations complete");
  Ok(())
}

async fn rollback(settings: Settings) -> anyhow::Result<()> {
  match settings.storage.backend {
    Backend::Postgres => {
      let store = PgStore::connect(&settings.database)
        .await
        .context("failed to connect to postgres")?;
      store.rollback().await.context("failed to roll back migrations")?;
    }
    Backend::Sqlite => {
      let path = settings.sqlite_path();
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      store.rollback().await.context("failed to roll back migrations")?;
    }
  }
  tracing::info!("rollback complete");
  Ok(())
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
  match settings.storage.backend {
    Backend::Postgres => {
      let store = PgStore::connect(&settings.database)
        .await
        .context("failed to connect to postgres")?;
      store.migrate().await.context("failed to apply migrations")?;
      run(store, settings).await
    }
    Backend::Sqlite => {
      let path = settings.sqlite_path();
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      run(store, settings).await
    }
  }
}

async fn run<S>(store: S, settings: Settings) -> anyhow::Result<()>
where
  S: PersonStore + 'static,
{
  let enricher =
    HttpEnricher::new(settings.enrichment.clone()).context("failed to build enrichment client")?;
  let service = PersonService::new(store, enricher, ServiceConfig {
    lookup_timeout: Duration::from_secs(settings.enrichment.timeout_secs),
  });
  let router = app(Arc::new(service), &settings.server);

  let address = format!("{}:{}", settings.server.host, settings.server.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  let (stop_tx, stop_rx) = oneshot::channel::<()>();
  let mut server = tokio::spawn(
    axum::serve(listener, router)
      .with_graceful_shutdown(async move {
        stop_rx.await.ok();
      })
      .into_future(),
  );

  tokio::select! {
    result = &mut server => {
      result.context("server task failed")?.context("HTTP server failed")?;
      return Ok(());
    }
    () = shutdown_signal() => {}
  }

  stop_tx.send(()).ok();
  let grace = Duration::from_secs(settings.server.shutdown_grace_secs);
  match tokio::time::timeout(grace, &mut server).await {
    Ok(result) => result.context("server task failed")?.context("HTTP server failed")?,
    Err(_) => {
      tracing::warn!(?grace, "grace period elapsed, abandoning in-flight requests");
      server.abort();
    }
  }

  tracing::info!("shut down");
  Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to install SIGTERM handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
    () = terminate => tracing::info!("received SIGTERM, shutting down"),
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser as _;

  use super::{Cli, Command};

  fn command(args: &[&str]) -> Command {
    let cli = Cli::try_parse_from(std::iter::once("census-server").chain(args.iter().copied()))
      .unwrap();
    cli.command.unwrap_or_default()
  }

  #[test]
  fn serve_is_the_default_command() {
    assert!(matches!(command(&[]), Command::Serve));
  }

  #[test]
  fn migrate_runs_forward_unless_down_is_given() {
    assert!(matches!(command(&["migrate"]), Command::Migrate { down: false }));
    assert!(matches!(command(&["migrate", "--down"]), Command::Migrate { down: true }));
  }
}
