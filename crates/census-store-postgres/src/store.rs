//! PostgreSQL implementation of [`PersonStore`].

use census_core::{
  filter::{FilterSet, Page},
  person::{Person, UpdatePersonRequest, timestamp_now},
  store::{PersonStore, StoreError},
};
use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::{
  Error, PgConfig, Result, query,
  row::{PERSON_COLUMNS, PersonRow, encode_age},
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// A Census person store backed by a PostgreSQL connection pool.
///
/// Clones share the underlying [`PgPool`].
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  /// Open a pool against the configured database. Does not migrate.
  pub async fn connect(config: &PgConfig) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(config.max_connections)
      .connect_with(config.connect_options()?)
      .await?;
    tracing::info!(host = %config.host, port = config.port, database = %config.name, "connected to postgres");
    Ok(Self { pool })
  }

  /// Apply every embedded migration not yet recorded in `_sqlx_migrations`.
  pub async fn migrate(&self) -> Result<()> {
    MIGRATOR.run(&self.pool).await?;
    tracing::info!(available = MIGRATOR.iter().count(), "postgres schema up to date");
    Ok(())
  }

  /// Revert every applied migration, newest first. Drops all stored
  /// persons.
  pub async fn rollback(&self) -> Result<()> {
    MIGRATOR.undo(&self.pool, 0).await?;
    tracing::info!("postgres schema rolled back");
    Ok(())
  }

  /// Create the configured database if it is missing. Returns `true` when
  /// it was created.
  pub async fn ensure_database(config: &PgConfig) -> Result<bool> {
    let admin = PgPoolOptions::new()
      .max_connections(1)
      .connect_with(config.admin_options()?)
      .await?;

    let exists: bool =
      sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&config.name)
        .fetch_one(&admin)
        .await?;

    if !exists {
      sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&config.name)))
        .execute(&admin)
        .await?;
      tracing::info!(database = %config.name, "created database");
    }

    admin.close().await;
    Ok(!exists)
  }

  async fn insert_row(&self, person: &Person) -> Result<()> {
    let result = sqlx::query(
      "INSERT INTO persons (
         id, name, surname, patronymic, age, gender, nationality,
         created_at, updated_at
       ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(person.id)
    .bind(&person.name)
    .bind(&person.surname)
    .bind(&person.patronymic)
    .bind(encode_age(person.age)?)
    .bind(&person.gender)
    .bind(&person.nationality)
    .bind(person.created_at)
    .bind(person.updated_at)
    .execute(&self.pool)
    .await;

    match result {
      Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Conflict(person.id)),
      other => {
        other?;
        Ok(())
      }
    }
  }

  async fn exists(&self, id: Uuid) -> Result<bool> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM persons WHERE id = $1)")
      .bind(id)
      .fetch_one(&self.pool)
      .await?;
    Ok(found)
  }

  async fn update_row(&self, id: Uuid, update: &UpdatePersonRequest) -> Result<()> {
    let Some(mut qb) = query::update(id, update, timestamp_now()) else {
      // Nothing to write; still report a missing row.
      return if self.exists(id).await? { Ok(()) } else { Err(Error::NotFound(id)) };
    };

    let affected = qb.build().execute(&self.pool).await?.rows_affected();
    if affected == 0 {
      return Err(Error::NotFound(id));
    }
    Ok(())
  }

  async fn delete_row(&self, id: Uuid) -> Result<()> {
    let affected = sqlx::query("DELETE FROM persons WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?
      .rows_affected();

    if affected == 0 {
      return Err(Error::NotFound(id));
    }
    Ok(())
  }

  async fn get_row(&self, id: Uuid) -> Result<Person> {
    let row: Option<PersonRow> =
      sqlx::query_as(&format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = $1"))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

    row.ok_or(Error::NotFound(id))?.into_person()
  }

  async fn list_rows(&self, page: Page, filters: &FilterSet) -> Result<Vec<Person>> {
    let mut qb = query::list(page, filters);
    let rows: Vec<PersonRow> = qb.build_query_as().fetch_all(&self.pool).await?;
    rows.into_iter().map(PersonRow::into_person).collect()
  }
}

/// Quote `name` as an SQL identifier.
fn quote_ident(name: &str) -> String { format!("\"{}\"", name.replace('"', "\"\"")) }

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for PgStore {
  async fn insert(&self, person: Person) -> Result<Person, StoreError> {
    self.insert_row(&person).await?;
    Ok(person)
  }

  async fn update_fields(
    &self,
    id:     Uuid,
    update: &UpdatePersonRequest,
  ) -> Result<(), StoreError> {
    Ok(self.update_row(id, update).await?)
  }

  async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
    Ok(self.delete_row(id).await?)
  }

  async fn get_by_id(&self, id: Uuid) -> Result<Person, StoreError> {
    Ok(self.get_row(id).await?)
  }

  async fn list(&self, page: Page, filters: &FilterSet) -> Result<Vec<Person>, StoreError> {
    Ok(self.list_rows(page, filters).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::quote_ident;

  #[test]
  fn identifiers_are_double_quoted_and_escaped() {
    assert_eq!(quote_ident("census"), "\"census\"");
    assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
  }
}
