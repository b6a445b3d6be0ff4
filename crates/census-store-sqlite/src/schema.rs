//! Versioned schema migrations for the Census SQLite store.
//!
//! Migrations are applied in order inside one transaction at connection
//! startup and reverted newest-first on rollback. The applied version is
//! mirrored to `PRAGMA user_version`.

/// Connection-level settings; cannot run inside a transaction.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

#[derive(Debug, Clone, Copy)]
pub struct Migration {
  pub version: u32,
  pub up:      &'static str,
  pub down:    &'static str,
}

/// Must stay strictly increasing by `version`.
pub const MIGRATIONS: &[Migration] = &[Migration {
  version: 1,
  up:      include_str!("../migrations/0001_create_persons.sql"),
  down:    include_str!("../migrations/0001_create_persons.down.sql"),
}];

/// The latest schema version known by this binary.
pub fn latest_version() -> u32 { MIGRATIONS.last().map_or(0, |m| m.version) }
