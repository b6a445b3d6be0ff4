//! Listing filters and pagination.
//!
//! The set of supported filters is closed: every key a caller may send maps
//! to exactly one [`PersonFilter`] variant, and each storage backend renders
//! variants into bound-parameter predicates. Filter values never become part
//! of query text.

use std::{fmt, str::FromStr};

use crate::{Error, Result};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// A filter key as accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
  Name,
  Surname,
  Gender,
  Nationality,
  Age,
  AgeGt,
  AgeLt,
}

impl FilterKey {
  pub const ALL: [FilterKey; 7] = [
    Self::Name,
    Self::Surname,
    Self::Gender,
    Self::Nationality,
    Self::Age,
    Self::AgeGt,
    Self::AgeLt,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Name => "name",
      Self::Surname => "surname",
      Self::Gender => "gender",
      Self::Nationality => "nationality",
      Self::Age => "age",
      Self::AgeGt => "age_gt",
      Self::AgeLt => "age_lt",
    }
  }
}

impl fmt::Display for FilterKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for FilterKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|k| k.as_str() == s)
      .ok_or_else(|| Error::UnknownFilterKey(s.to_owned()))
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// One listing constraint. All filters in a [`FilterSet`] apply
/// conjunctively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonFilter {
  /// Case-insensitive, unanchored substring of the given name.
  NameContains(String),
  /// Case-insensitive, unanchored substring of the family name.
  SurnameContains(String),
  /// Exact, case-sensitive gender.
  Gender(String),
  /// Exact, case-sensitive nationality code.
  Nationality(String),
  AgeEquals(i64),
  AgeGreaterThan(i64),
  AgeLessThan(i64),
}

impl PersonFilter {
  /// Build the filter for `key` from its raw string value.
  pub fn parse(key: FilterKey, value: &str) -> Result<Self> {
    let age = || {
      value.trim().parse::<i64>().map_err(|_| Error::InvalidFilterValue {
        key:   key.as_str(),
        value: value.to_owned(),
      })
    };

    Ok(match key {
      FilterKey::Name => Self::NameContains(value.to_owned()),
      FilterKey::Surname => Self::SurnameContains(value.to_owned()),
      FilterKey::Gender => Self::Gender(value.to_owned()),
      FilterKey::Nationality => Self::Nationality(value.to_owned()),
      FilterKey::Age => Self::AgeEquals(age()?),
      FilterKey::AgeGt => Self::AgeGreaterThan(age()?),
      FilterKey::AgeLt => Self::AgeLessThan(age()?),
    })
  }
}

/// An ordered collection of filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
  filters: Vec<PersonFilter>,
}

impl FilterSet {
  pub fn new() -> Self { Self::default() }

  /// Parse `(key, value)` pairs in order. Pairs with an empty value are
  /// skipped; unknown keys and non-integer age values are rejected.
  pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
  where
    I: IntoIterator<Item = (&'a str, &'a str)>,
  {
    let mut set = Self::new();
    for (key, value) in pairs {
      if value.is_empty() {
        continue;
      }
      set.push(PersonFilter::parse(key.parse()?, value)?);
    }
    Ok(set)
  }

  pub fn push(&mut self, filter: PersonFilter) { self.filters.push(filter); }

  pub fn with(mut self, filter: PersonFilter) -> Self {
    self.push(filter);
    self
  }

  pub fn iter(&self) -> impl Iterator<Item = &PersonFilter> { self.filters.iter() }
}

impl<'a> IntoIterator for &'a FilterSet {
  type Item = &'a PersonFilter;
  type IntoIter = std::slice::Iter<'a, PersonFilter>;

  fn into_iter(self) -> Self::IntoIter { self.filters.iter() }
}

/// Escape `value` for use inside a `LIKE` pattern with `\` as the escape
/// character and wrap it in `%` so it matches as a literal substring.
pub fn substring_pattern(value: &str) -> String {
  let mut pattern = String::with_capacity(value.len() + 2);
  pattern.push('%');
  for c in value.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// A normalised `LIMIT`/`OFFSET` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  limit:  i64,
  offset: i64,
}

impl Page {
  pub const DEFAULT_LIMIT: i64 = 10;

  /// Missing or non-positive limits become [`Page::DEFAULT_LIMIT`]; missing
  /// or negative offsets become `0`.
  pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
    Self {
      limit:  limit.filter(|l| *l > 0).unwrap_or(Self::DEFAULT_LIMIT),
      offset: offset.filter(|o| *o >= 0).unwrap_or(0),
    }
  }

  pub fn limit(&self) -> i64 { self.limit }

  pub fn offset(&self) -> i64 { self.offset }
}

impl Default for Page {
  fn default() -> Self { Self::new(None, None) }
}
