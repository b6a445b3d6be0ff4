//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings with microsecond
//! precision, so lexical order equals chronological order. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use census_core::person::Person;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that produces a [`RawPerson`].
pub const PERSON_COLUMNS: &str =
  "id, name, surname, patronymic, age, gender, nationality, created_at, updated_at";

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub id:          String,
  pub name:        String,
  pub surname:     String,
  pub patronymic:  Option<String>,
  pub age:         i64,
  pub gender:      String,
  pub nationality: String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawPerson {
  /// Read a row selected with [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      surname:     row.get(2)?,
      patronymic:  row.get(3)?,
      age:         row.get(4)?,
      gender:      row.get(5)?,
      nationality: row.get(6)?,
      created_at:  row.get(7)?,
      updated_at:  row.get(8)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:          decode_uuid(&self.id)?,
      name:        self.name,
      surname:     self.surname,
      patronymic:  self.patronymic,
      age:         u32::try_from(self.age).map_err(|_| Error::AgeOutOfRange(self.age))?,
      gender:      self.gender,
      nationality: self.nationality,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_round_trip() {
    let whole = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let encoded = encode_dt(whole);
    assert_eq!(encoded, "2024-03-01T12:00:00.000000Z");
    assert_eq!(decode_dt(&encoded).unwrap(), whole);
  }
}
