//! Row mapping between `persons` and [`Person`].

use chrono::{DateTime, Utc};
use census_core::person::Person;
use uuid::Uuid;

use crate::{Error, Result};

/// Column list shared by every `SELECT` that produces a [`PersonRow`].
pub const PERSON_COLUMNS: &str =
  "id, name, surname, patronymic, age, gender, nationality, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub struct PersonRow {
  pub id:          Uuid,
  pub name:        String,
  pub surname:     String,
  pub patronymic:  Option<String>,
  pub age:         i32,
  pub gender:      String,
  pub nationality: String,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl PersonRow {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:          self.id,
      name:        self.name,
      surname:     self.surname,
      patronymic:  self.patronymic,
      age:         u32::try_from(self.age).map_err(|_| Error::AgeOutOfRange(self.age.into()))?,
      gender:      self.gender,
      nationality: self.nationality,
      created_at:  self.created_at,
      updated_at:  self.updated_at,
    })
  }
}

/// The `INTEGER` column value for `age`.
pub fn encode_age(age: u32) -> Result<i32> {
  i32::try_from(age).map_err(|_| Error::AgeOutOfRange(age.into()))
}
