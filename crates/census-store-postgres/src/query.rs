//! Dynamic statement construction with [`sqlx::QueryBuilder`].
//!
//! Only fixed SQL fragments are pushed as text; every caller-supplied value
//! goes through `push_bind` and reaches the server as a `$N` parameter.

use chrono::{DateTime, Utc};
use census_core::{
  filter::{FilterSet, Page, PersonFilter, substring_pattern},
  person::UpdatePersonRequest,
};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::row::PERSON_COLUMNS;

/// `SELECT` for one page of persons matching every filter.
pub fn list(page: Page, filters: &FilterSet) -> QueryBuilder<'static, Postgres> {
  let mut qb = QueryBuilder::new(format!("SELECT {PERSON_COLUMNS} FROM persons"));

  for (i, filter) in filters.iter().enumerate() {
    qb.push(if i == 0 { " WHERE " } else { " AND " });
    match filter {
      PersonFilter::NameContains(v) => {
        qb.push("name ILIKE ").push_bind(substring_pattern(v)).push(" ESCAPE '\\'");
      }
      PersonFilter::SurnameContains(v) => {
        qb.push("surname ILIKE ").push_bind(substring_pattern(v)).push(" ESCAPE '\\'");
      }
      PersonFilter::Gender(v) => {
        qb.push("gender = ").push_bind(v.clone());
      }
      PersonFilter::Nationality(v) => {
        qb.push("nationality = ").push_bind(v.clone());
      }
      PersonFilter::AgeEquals(v) => {
        qb.push("age = ").push_bind(*v);
      }
      PersonFilter::AgeGreaterThan(v) => {
        qb.push("age > ").push_bind(*v);
      }
      PersonFilter::AgeLessThan(v) => {
        qb.push("age < ").push_bind(*v);
      }
    }
  }

  qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
    .push_bind(page.limit())
    .push(" OFFSET ")
    .push_bind(page.offset());
  qb
}

/// `UPDATE` for the present fields of `update`, or `None` when there is
/// nothing to write.
pub fn update(
  id: Uuid,
  update: &UpdatePersonRequest,
  updated_at: DateTime<Utc>,
) -> Option<QueryBuilder<'static, Postgres>> {
  if update.is_empty() {
    return None;
  }

  let mut qb = QueryBuilder::new("UPDATE persons SET ");
  let mut sets = qb.separated(", ");
  if let Some(name) = &update.name {
    sets.push("name = ").push_bind_unseparated(name.clone());
  }
  if let Some(surname) = &update.surname {
    sets.push("surname = ").push_bind_unseparated(surname.clone());
  }
  if let Some(patronymic) = update.patronymic.as_write() {
    sets.push("patronymic = ").push_bind_unseparated(patronymic.cloned());
  }
  // Never earlier than created_at, even if the clock stepped back.
  sets
    .push("updated_at = GREATEST(created_at, ")
    .push_bind_unseparated(updated_at)
    .push_unseparated(")");

  qb.push(" WHERE id = ").push_bind(id);
  Some(qb)
}
