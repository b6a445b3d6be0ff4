//! Layered runtime configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `CENSUS_`-prefixed environment variables with `__` between
//! section and key (`CENSUS_DATABASE__HOST`).

use std::path::{Path, PathBuf};

use census_enrich::EnrichmentConfig;
use census_store_postgres::PgConfig;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub server:     ServerSettings,
  pub storage:    StorageSettings,
  pub database:   PgConfig,
  pub enrichment: EnrichmentConfig,
  pub log:        LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
  pub host:                 String,
  pub port:                 u16,
  pub request_timeout_secs: u64,
  pub shutdown_grace_secs:  u64,
}

impl Default for ServerSettings {
  fn default() -> Self {
    Self {
      host:                 "0.0.0.0".to_string(),
      port:                 8080,
      request_timeout_secs: 15,
      shutdown_grace_secs:  10,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Postgres,
  Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
  pub backend:     Backend,
  pub sqlite_path: PathBuf,
}

impl Default for StorageSettings {
  fn default() -> Self {
    Self { backend: Backend::default(), sqlite_path: PathBuf::from("census.db") }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  #[default]
  Text,
  Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
  /// Default filter directive; `RUST_LOG` takes precedence.
  pub level:  String,
  pub format: LogFormat,
}

impl Default for LogSettings {
  fn default() -> Self { Self { level: "info".to_string(), format: LogFormat::default() } }
}

impl Settings {
  /// Read `path` (if it exists) and the process environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(environment()),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder.build()?.try_deserialize()
  }

  /// The SQLite path with a leading `~` expanded.
  pub fn sqlite_path(&self) -> PathBuf { expand_tilde(&self.storage.sqlite_path) }
}

fn environment() -> Environment {
  Environment::with_prefix("CENSUS")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
