//! Dynamic statement construction for listing and partial updates.
//!
//! Statements are assembled from fixed fragments with numbered `?N`
//! placeholders; every caller-supplied value travels in the parameter list.

use census_core::{
  filter::{FilterSet, Page, PersonFilter, substring_pattern},
  person::UpdatePersonRequest,
};
use rusqlite::{Connection, functions::FunctionFlags, types::Value};

use crate::encode::PERSON_COLUMNS;

/// Name of the Unicode lower-casing SQL function used by substring filters.
/// SQLite's own `LIKE` only folds ASCII.
pub const CASEFOLD: &str = "casefold";

/// Register the scalar functions that statements from this module rely on.
/// Must run on every new connection.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    CASEFOLD,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
  )
}

/// A statement and its positional parameters.
#[derive(Debug)]
pub struct Statement {
  pub sql:    String,
  pub params: Vec<Value>,
}

impl Statement {
  fn bind(&mut self, value: Value) -> usize {
    self.params.push(value);
    self.params.len()
  }
}

/// `SELECT` for one page of persons matching every filter.
pub fn list(page: Page, filters: &FilterSet) -> Statement {
  let mut stmt = Statement { sql: String::new(), params: Vec::new() };
  let mut conds = Vec::new();

  for filter in filters {
    let cond = match filter {
      PersonFilter::NameContains(v) => {
        let n = stmt.bind(Value::Text(substring_pattern(v)));
        format!("{CASEFOLD}(name) LIKE {CASEFOLD}(?{n}) ESCAPE '\\'")
      }
      PersonFilter::SurnameContains(v) => {
        let n = stmt.bind(Value::Text(substring_pattern(v)));
        format!("{CASEFOLD}(surname) LIKE {CASEFOLD}(?{n}) ESCAPE '\\'")
      }
      PersonFilter::Gender(v) => {
        let n = stmt.bind(Value::Text(v.clone()));
        format!("gender = ?{n}")
      }
      PersonFilter::Nationality(v) => {
        let n = stmt.bind(Value::Text(v.clone()));
        format!("nationality = ?{n}")
      }
      PersonFilter::AgeEquals(v) => format!("age = ?{}", stmt.bind(Value::Integer(*v))),
      PersonFilter::AgeGreaterThan(v) => format!("age > ?{}", stmt.bind(Value::Integer(*v))),
      PersonFilter::AgeLessThan(v) => format!("age < ?{}", stmt.bind(Value::Integer(*v))),
    };
    conds.push(cond);
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!(" WHERE {}", conds.join(" AND "))
  };

  let limit = stmt.bind(Value::Integer(page.limit()));
  let offset = stmt.bind(Value::Integer(page.offset()));

  stmt.sql = format!(
    "SELECT {PERSON_COLUMNS} FROM persons{where_clause} \
     ORDER BY created_at DESC, id DESC LIMIT ?{limit} OFFSET ?{offset}"
  );
  stmt
}

/// `UPDATE` for the present fields of `update`, or `None` when there is
/// nothing to write.
pub fn update(
  id: String,
  update: &UpdatePersonRequest,
  updated_at: String,
) -> Option<Statement> {
  if update.is_empty() {
    return None;
  }

  let mut stmt = Statement { sql: String::new(), params: Vec::new() };
  let mut sets = Vec::with_capacity(4);

  if let Some(name) = &update.name {
    sets.push(format!("name = ?{}", stmt.bind(Value::Text(name.clone()))));
  }
  if let Some(surname) = &update.surname {
    sets.push(format!("surname = ?{}", stmt.bind(Value::Text(surname.clone()))));
  }
  if let Some(patronymic) = update.patronymic.as_write() {
    let value = patronymic.map_or(Value::Null, |p| Value::Text(p.clone()));
    sets.push(format!("patronymic = ?{}", stmt.bind(value)));
  }
  // Never earlier than created_at, even if the clock stepped back.
  sets.push(format!("updated_at = max(created_at, ?{})", stmt.bind(Value::Text(updated_at))));

  let id = stmt.bind(Value::Text(id));
  stmt.sql = format!("UPDATE persons SET {} WHERE id = ?{id}", sets.join(", "));
  Some(stmt)
}
