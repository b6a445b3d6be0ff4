//! SQLite implementation of [`PersonStore`].

use std::path::Path;

use census_core::{
  filter::{FilterSet, Page},
  person::{Person, UpdatePersonRequest, timestamp_now},
  store::{PersonStore, StoreError},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{PERSON_COLUMNS, RawPerson, encode_dt, encode_uuid},
  query,
  schema::{MIGRATIONS, PRAGMAS, latest_version},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Census person store backed by a single SQLite file.
///
/// Clones share one background connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and apply pending migrations.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.migrate().await?;
    Ok(store)
  }

  /// Open a private in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.migrate().await?;
    Ok(store)
  }

  /// Configure the connection and bring the schema up to
  /// [`latest_version`]. Refuses databases written by a newer binary.
  async fn migrate(&self) -> Result<()> {
    let current: u32 = self
      .conn
      .call(|conn| {
        query::register_functions(conn)?;
        conn.execute_batch(PRAGMAS)?;
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
      })
      .await?;

    let latest = latest_version();
    if current > latest {
      return Err(Error::UnsupportedSchemaVersion {
        db_version:       current,
        latest_supported: latest,
      });
    }
    if current == latest {
      return Ok(());
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
          tx.execute_batch(migration.up)?;
          tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(from = current, to = latest, "migrated sqlite schema");
    Ok(())
  }

  /// Revert every applied migration, newest first, in one transaction.
  /// Drops all stored persons.
  pub async fn rollback(&self) -> Result<()> {
    let from = self
      .conn
      .call(|conn| {
        let current: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        let tx = conn.transaction()?;
        for migration in MIGRATIONS.iter().rev().filter(|m| m.version <= current) {
          tx.execute_batch(migration.down)?;
        }
        tx.execute_batch("PRAGMA user_version = 0;")?;
        tx.commit()?;
        Ok(current)
      })
      .await?;

    tracing::info!(from, to = 0, "rolled back sqlite schema");
    Ok(())
  }

  async fn insert_row(&self, person: &Person) -> Result<()> {
    let id_str      = encode_uuid(person.id);
    let name        = person.name.clone();
    let surname     = person.surname.clone();
    let patronymic  = person.patronymic.clone();
    let age         = i64::from(person.age);
    let gender      = person.gender.clone();
    let nationality = person.nationality.clone();
    let created_str = encode_dt(person.created_at);
    let updated_str = encode_dt(person.updated_at);

    let result = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             id, name, surname, patronymic, age, gender, nationality,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            name,
            surname,
            patronymic,
            age,
            gender,
            nationality,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await;

    match result {
      Err(e) if is_primary_key_violation(&e) => Err(Error::Conflict(person.id)),
      other => Ok(other?),
    }
  }

  async fn exists(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let found = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM persons WHERE id = ?1",
            rusqlite::params![id_str],
            |_| Ok(()),
          )
          .optional()?)
      })
      .await?;
    Ok(found.is_some())
  }

  async fn update_row(&self, id: Uuid, update: &UpdatePersonRequest) -> Result<()> {
    let Some(stmt) = query::update(encode_uuid(id), update, encode_dt(timestamp_now()))
    else {
      // Nothing to write; still report a missing row.
      return if self.exists(id).await? { Ok(()) } else { Err(Error::NotFound(id)) };
    };

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&stmt.sql, rusqlite::params_from_iter(stmt.params.iter()))?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::NotFound(id));
    }
    Ok(())
  }

  async fn delete_row(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM persons WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::NotFound(id));
    }
    Ok(())
  }

  async fn get_row(&self, id: Uuid) -> Result<Person> {
    let id_str = encode_uuid(id);
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
            rusqlite::params![id_str],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.ok_or(Error::NotFound(id))?.into_person()
  }

  async fn list_rows(&self, page: Page, filters: &FilterSet) -> Result<Vec<Person>> {
    let stmt = query::list(page, filters);

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut prepared = conn.prepare(&stmt.sql)?;
        let rows = prepared
          .query_map(rusqlite::params_from_iter(stmt.params.iter()), RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }
}

fn is_primary_key_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, _))
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
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
