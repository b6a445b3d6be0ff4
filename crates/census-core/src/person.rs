//! The person record and the request types that create and mutate it.
//!
//! A person's age, gender and nationality are derived by enrichment at
//! creation time and are never accepted from callers. Only the name fields
//! are user-editable afterwards.

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{Error, Result, enrich::Enrichment};

// ─── Person ──────────────────────────────────────────────────────────────────

/// A fully enriched, persisted person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Person {
  /// Assigned once by the orchestrator; never changes.
  pub id:          Uuid,
  pub name:        String,
  pub surname:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub patronymic:  Option<String>,
  pub age:         u32,
  pub gender:      String,
  pub nationality: String,
  pub created_at:  DateTime<Utc>,
  /// Always `>= created_at`.
  pub updated_at:  DateTime<Utc>,
}

impl Person {
  /// Assemble a new person from a validated request and a complete set of
  /// enrichment facts. Both timestamps are set to the same instant.
  pub fn assemble(request: CreatePersonRequest, enrichment: Enrichment) -> Self {
    let now = timestamp_now();
    Self {
      id:          Uuid::new_v4(),
      name:        request.name,
      surname:     request.surname,
      patronymic:  request.patronymic,
      age:         enrichment.age,
      gender:      enrichment.gender,
      nationality: enrichment.nationality,
      created_at:  now,
      updated_at:  now,
    }
  }
}

/// The current time truncated to microseconds, the finest precision both
/// storage backends round-trip exactly.
pub fn timestamp_now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── Create ──────────────────────────────────────────────────────────────────

/// Caller-supplied input to person creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatePersonRequest {
  pub name:       String,
  pub surname:    String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub patronymic: Option<String>,
}

impl CreatePersonRequest {
  /// Reject blank required fields and normalise an empty patronymic to
  /// `None`.
  pub fn validate(mut self) -> Result<Self> {
    ensure_not_blank("name", &self.name)?;
    ensure_not_blank("surname", &self.surname)?;
    if self.patronymic.as_deref().is_some_and(|p| p.trim().is_empty()) {
      self.patronymic = None;
    }
    Ok(self)
  }
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// A tri-state field update.
///
/// In JSON an absent key is [`Patch::Unchanged`], an explicit `null` is
/// [`Patch::Clear`], and any value is [`Patch::Set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
  #[default]
  Unchanged,
  Clear,
  Set(T),
}

impl<T> Patch<T> {
  pub fn is_unchanged(&self) -> bool { matches!(self, Self::Unchanged) }

  /// The value to write, or `None` when unchanged.
  /// `Some(None)` means the column is cleared.
  pub fn as_write(&self) -> Option<Option<&T>> {
    match self {
      Self::Unchanged => None,
      Self::Clear => Some(None),
      Self::Set(v) => Some(Some(v)),
    }
  }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
  T: Deserialize<'de>,
{
  fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    // Only reached when the key is present; absence falls back to Default.
    Ok(match Option::<T>::deserialize(deserializer)? {
      Some(v) => Self::Set(v),
      None => Self::Clear,
    })
  }
}

/// A sparse update of the user-editable name fields.
///
/// `name` and `surname` are not nullable, so for them an absent key and
/// `null` both mean "leave untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdatePersonRequest {
  #[serde(default)]
  pub name:       Option<String>,
  #[serde(default)]
  pub surname:    Option<String>,
  /// `null` clears the stored patronymic.
  #[serde(default)]
  #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
  pub patronymic: Patch<String>,
}

impl UpdatePersonRequest {
  /// `true` when no field would be written.
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.surname.is_none() && self.patronymic.is_unchanged()
  }

  /// Reject present-but-blank required fields.
  pub fn validate(&self) -> Result<()> {
    if let Some(name) = &self.name {
      ensure_not_blank("name", name)?;
    }
    if let Some(surname) = &self.surname {
      ensure_not_blank("surname", surname)?;
    }
    Ok(())
  }
}

fn ensure_not_blank(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::BlankField(field));
  }
  Ok(())
}
