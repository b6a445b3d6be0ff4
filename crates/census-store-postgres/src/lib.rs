//! PostgreSQL backend for the Census person store.
//!
//! Built on a [`sqlx::PgPool`]. The schema is embedded with
//! [`sqlx::migrate!`] and applied by [`PgStore::migrate`].

mod config;
mod query;
mod row;
mod store;

pub mod error;

pub use config::PgConfig;
pub use error::{Error, Result};
pub use store::PgStore;
