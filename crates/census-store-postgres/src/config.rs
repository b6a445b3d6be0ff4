//! Connection settings for the PostgreSQL backend.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::{Error, Result};

/// Database the bootstrap connects to when creating the target database.
const ADMIN_DATABASE: &str = "postgres";

/// Discrete connection settings, as read from configuration.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct PgConfig {
  pub host:            String,
  pub port:            u16,
  pub user:            String,
  pub password:        String,
  pub name:            String,
  /// One of libpq's `sslmode` values (`disable`, `prefer`, `require`, ...).
  pub sslmode:         String,
  pub max_connections: u32,
}

impl Default for PgConfig {
  fn default() -> Self {
    Self {
      host:            "localhost".to_string(),
      port:            5432,
      user:            "postgres".to_string(),
      password:        String::new(),
      name:            "census".to_string(),
      sslmode:         "disable".to_string(),
      max_connections: 5,
    }
  }
}

impl fmt::Debug for PgConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PgConfig")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("user", &self.user)
      .field("password", &"<redacted>")
      .field("name", &self.name)
      .field("sslmode", &self.sslmode)
      .field("max_connections", &self.max_connections)
      .finish()
  }
}

impl PgConfig {
  /// Options for the configured database.
  pub fn connect_options(&self) -> Result<PgConnectOptions> {
    let ssl_mode =
      PgSslMode::from_str(&self.sslmode).map_err(|_| Error::SslMode(self.sslmode.clone()))?;

    Ok(
      PgConnectOptions::new()
        .host(&self.host)
        .port(self.port)
        .username(&self.user)
        .password(&self.password)
        .database(&self.name)
        .ssl_mode(ssl_mode),
    )
  }

  /// Options for the maintenance database on the same server.
  pub(crate) fn admin_options(&self) -> Result<PgConnectOptions> {
    Ok(self.connect_options()?.database(ADMIN_DATABASE))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn connect_options_carry_every_setting() {
    let config = PgConfig {
      host: "db.internal".into(),
      port: 6543,
      name: "people".into(),
      sslmode: "require".into(),
      ..Default::default()
    };
    let opts = config.connect_options().unwrap();
    assert_eq!(opts.get_host(), "db.internal");
    assert_eq!(opts.get_port(), 6543);
    assert_eq!(opts.get_username(), "postgres");
    assert_eq!(opts.get_database(), Some("people"));

    let admin = config.admin_options().unwrap();
    assert_eq!(admin.get_database(), Some("postgres"));
  }

  #[test]
  fn unknown_sslmode_is_rejected() {
    let config = PgConfig { sslmode: "sometimes".into(), ..Default::default() };
    assert!(matches!(config.connect_options(), Err(Error::SslMode(mode)) if mode == "sometimes"));
  }

  #[test]
  fn debug_output_hides_the_password() {
    let config = PgConfig { password: "hunter2".into(), ..Default::default() };
    assert!(!format!("{config:?}").contains("hunter2"));
  }
}
