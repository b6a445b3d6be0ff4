//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Duration;
use census_core::{
  filter::{FilterSet, Page, PersonFilter},
  person::{Patch, Person, UpdatePersonRequest, timestamp_now},
  store::{PersonStore, StoreError},
};
use uuid::Uuid;

use crate::{Error, SqliteStore, schema::latest_version};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn person(name: &str, surname: &str, age: u32) -> Person {
  let now = timestamp_now();
  Person {
    id:          Uuid::new_v4(),
    name:        name.into(),
    surname:     surname.into(),
    patronymic:  None,
    age,
    gender:      "female".into(),
    nationality: "RU".into(),
    created_at:  now,
    updated_at:  now,
  }
}

/// A person created `minutes_ago` minutes before now, so ordering is
/// deterministic.
fn person_at(name: &str, age: u32, minutes_ago: i64) -> Person {
  let mut p = person(name, "Smith", age);
  p.created_at = timestamp_now() - Duration::minutes(minutes_ago);
  p.updated_at = p.created_at;
  p
}

async fn seed(s: &SqliteStore, people: Vec<Person>) {
  for p in people {
    s.insert(p).await.unwrap();
  }
}

fn names(people: &[Person]) -> Vec<&str> { people.iter().map(|p| p.name.as_str()).collect() }

// ─── Insert / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_roundtrip() {
  let s = store().await;
  let mut p = person("Dmitriy", "Ushakov", 30);
  p.patronymic = Some("Vasilevich".into());

  s.insert(p.clone()).await.unwrap();
  let fetched = s.get_by_id(p.id).await.unwrap();
  assert_eq!(fetched, p);
}

#[tokio::test]
async fn insert_duplicate_id_conflicts() {
  let s = store().await;
  let p = person("Anna", "Karenina", 28);
  s.insert(p.clone()).await.unwrap();

  let err = s.insert(p.clone()).await.unwrap_err();
  assert!(matches!(err, StoreError::Conflict(id) if id == p.id));
}

#[tokio::test]
async fn get_missing_is_not_found() {
  let s = store().await;
  let id = Uuid::new_v4();
  let err = s.get_by_id(id).await.unwrap_err();
  assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_update_leaves_row_untouched() {
  let s = store().await;
  let p = person_at("Ivan", 40, 5);
  s.insert(p.clone()).await.unwrap();

  s.update_fields(p.id, &UpdatePersonRequest::default()).await.unwrap();

  let fetched = s.get_by_id(p.id).await.unwrap();
  assert_eq!(fetched.updated_at, p.updated_at);
  assert_eq!(fetched, p);
}

#[tokio::test]
async fn empty_update_of_missing_row_is_not_found() {
  let s = store().await;
  let err = s
    .update_fields(Uuid::new_v4(), &UpdatePersonRequest::default())
    .await
    .unwrap_err();
  assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn surname_only_update_touches_surname_and_timestamp() {
  let s = store().await;
  let mut p = person_at("Ivan", 40, 5);
  p.patronymic = Some("Petrovich".into());
  s.insert(p.clone()).await.unwrap();

  let update = UpdatePersonRequest { surname: Some("Sidorov".into()), ..Default::default() };
  s.update_fields(p.id, &update).await.unwrap();

  let fetched = s.get_by_id(p.id).await.unwrap();
  assert_eq!(fetched.surname, "Sidorov");
  assert!(fetched.updated_at > p.updated_at);
  assert_eq!(fetched.created_at, p.created_at);
  assert_eq!(fetched.name, p.name);
  assert_eq!(fetched.patronymic, p.patronymic);
  assert_eq!(fetched.age, p.age);
  assert_eq!(fetched.gender, p.gender);
  assert_eq!(fetched.nationality, p.nationality);
}

#[tokio::test]
async fn update_never_moves_updated_at_before_created_at() {
  let s = store().await;
  // Created "in the future", as if the clock stepped back since.
  let p = person_at("Ivan", 40, -5);
  s.insert(p.clone()).await.unwrap();

  let update = UpdatePersonRequest { name: Some("Ivan II".into()), ..Default::default() };
  s.update_fields(p.id, &update).await.unwrap();

  let fetched = s.get_by_id(p.id).await.unwrap();
  assert_eq!(fetched.name, "Ivan II");
  assert_eq!(fetched.updated_at, fetched.created_at);
}

#[tokio::test]
async fn patronymic_can_be_cleared() {
  let s = store().await;
  let mut p = person("Ivan", "Ivanov", 40);
  p.patronymic = Some("Petrovich".into());
  s.insert(p.clone()).await.unwrap();

  let update = UpdatePersonRequest { patronymic: Patch::Clear, ..Default::default() };
  s.update_fields(p.id, &update).await.unwrap();

  assert_eq!(s.get_by_id(p.id).await.unwrap().patronymic, None);
}

#[tokio::test]
async fn update_missing_row_is_not_found() {
  let s = store().await;
  let update = UpdatePersonRequest { name: Some("Nobody".into()), ..Default::default() };
  let err = s.update_fields(Uuid::new_v4(), &update).await.unwrap_err();
  assert!(matches!(err, StoreError::NotFound(_)));
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_twice_succeeds_then_not_found() {
  let s = store().await;
  let p = person("Olga", "Petrova", 33);
  s.insert(p.clone()).await.unwrap();

  s.delete_by_id(p.id).await.unwrap();
  let err = s.delete_by_id(p.id).await.unwrap_err();
  assert!(matches!(err, StoreError::NotFound(_)));
  assert!(matches!(s.get_by_id(p.id).await.unwrap_err(), StoreError::NotFound(_)));
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_orders_newest_first() {
  let s = store().await;
  seed(&s, vec![
    person_at("Oldest", 20, 30),
    person_at("Newest", 20, 1),
    person_at("Middle", 20, 10),
  ])
  .await;

  let page = s.list(Page::default(), &FilterSet::new()).await.unwrap();
  assert_eq!(names(&page), ["Newest", "Middle", "Oldest"]);
}

#[tokio::test]
async fn list_breaks_timestamp_ties_by_id() {
  let s = store().await;
  let mut a = person("A", "Tie", 20);
  let mut b = person("B", "Tie", 20);
  a.created_at = timestamp_now() - Duration::minutes(1);
  b.created_at = a.created_at;
  seed(&s, vec![a.clone(), b.clone()]).await;

  let page = s.list(Page::default(), &FilterSet::new()).await.unwrap();
  let expected_first = if a.id > b.id { a.id } else { b.id };
  assert_eq!(page[0].id, expected_first);
}

#[tokio::test]
async fn list_age_range_and_name_substring() {
  let s = store().await;
  seed(&s, vec![
    person_at("Anna", 35, 1),
    person_at("Joanna", 31, 2),
    person_at("Boris", 35, 3),
    person_at("Andrey", 30, 4),
    person_at("Diana", 40, 5),
    person_at("Stefan", 39, 6),
  ])
  .await;

  let range = FilterSet::new()
    .with(PersonFilter::AgeGreaterThan(30))
    .with(PersonFilter::AgeLessThan(40));
  let page = s.list(Page::default(), &range).await.unwrap();
  assert_eq!(names(&page), ["Anna", "Joanna", "Boris", "Stefan"]);
  assert!(page.iter().all(|p| p.age > 30 && p.age < 40));

  let with_name = range.with(PersonFilter::NameContains("An".into()));
  let page = s.list(Page::default(), &with_name).await.unwrap();
  assert_eq!(names(&page), ["Anna", "Joanna", "Stefan"]);
}

#[tokio::test]
async fn list_substring_filters_fold_non_ascii_case() {
  let s = store().await;
  let mut dmitriy = person_at("Дмитрий", 30, 1);
  dmitriy.surname = "Ушаков".into();
  seed(&s, vec![dmitriy, person_at("Anna", 30, 2)]).await;

  let ascii = FilterSet::new().with(PersonFilter::NameContains("ANN".into()));
  assert_eq!(names(&s.list(Page::default(), &ascii).await.unwrap()), ["Anna"]);

  let lower = FilterSet::new().with(PersonFilter::NameContains("дмит".into()));
  assert_eq!(names(&s.list(Page::default(), &lower).await.unwrap()), ["Дмитрий"]);

  let upper = FilterSet::new().with(PersonFilter::SurnameContains("УШАК".into()));
  assert_eq!(names(&s.list(Page::default(), &upper).await.unwrap()), ["Дмитрий"]);
}

#[tokio::test]
async fn list_exact_matches_are_case_sensitive() {
  let s = store().await;
  let mut gb = person_at("Oliver", 24, 1);
  gb.nationality = "GB".into();
  gb.gender = "male".into();
  seed(&s, vec![gb, person_at("Olga", 33, 2)]).await;

  let exact = FilterSet::new().with(PersonFilter::Nationality("GB".into()));
  assert_eq!(names(&s.list(Page::default(), &exact).await.unwrap()), ["Oliver"]);

  let wrong_case = FilterSet::new().with(PersonFilter::Gender("Male".into()));
  assert!(s.list(Page::default(), &wrong_case).await.unwrap().is_empty());

  let age = FilterSet::new().with(PersonFilter::AgeEquals(33));
  assert_eq!(names(&s.list(Page::default(), &age).await.unwrap()), ["Olga"]);
}

#[tokio::test]
async fn list_substring_filters_treat_wildcards_literally() {
  let s = store().await;
  seed(&s, vec![
    person_at("Anna", 30, 1),
    {
      let mut p = person_at("Percent", 30, 2);
      p.surname = "100%_Real".into();
      p
    },
  ])
  .await;

  let wildcard = FilterSet::new().with(PersonFilter::SurnameContains("%_".into()));
  assert_eq!(names(&s.list(Page::default(), &wildcard).await.unwrap()), ["Percent"]);

  let injection = FilterSet::new().with(PersonFilter::NameContains("' OR 1=1 --".into()));
  assert!(s.list(Page::default(), &injection).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_pagination_defaults_and_clamps() {
  let s = store().await;
  seed(&s, (0..12).map(|i| person_at(&format!("P{i:02}"), 20, i)).collect()).await;

  let zero_limit = s.list(Page::new(Some(0), Some(-5)), &FilterSet::new()).await.unwrap();
  assert_eq!(zero_limit.len(), 10);
  assert_eq!(zero_limit[0].name, "P00");

  let second = s.list(Page::new(Some(5), Some(10)), &FilterSet::new()).await.unwrap();
  assert_eq!(names(&second), ["P10", "P11"]);
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_rows_and_schema_version() {
  let dir = std::env::temp_dir().join(format!("census-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("census.db");

  let p = person("Persisted", "Row", 50);
  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert(p.clone()).await.unwrap();
  }
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.get_by_id(p.id).await.unwrap(), p);

  std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn newer_schema_version_is_refused() {
  let dir = std::env::temp_dir().join(format!("census-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("census.db");

  drop(SqliteStore::open(&path).await.unwrap());
  let future = latest_version() + 1;
  rusqlite::Connection::open(&path)
    .unwrap()
    .execute_batch(&format!("PRAGMA user_version = {future};"))
    .unwrap();

  match SqliteStore::open(&path).await {
    Err(Error::UnsupportedSchemaVersion { db_version, latest_supported }) => {
      assert_eq!(db_version, future);
      assert_eq!(latest_supported, latest_version());
    }
    Err(other) => panic!("unexpected error: {other}"),
    Ok(_) => panic!("a newer schema must not be opened"),
  }

  std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn rollback_drops_the_schema_and_reopening_restores_it() {
  let dir = std::env::temp_dir().join(format!("census-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("census.db");

  let s = SqliteStore::open(&path).await.unwrap();
  s.insert(person("Gone", "Soon", 20)).await.unwrap();
  s.rollback().await.unwrap();

  let version: u32 = rusqlite::Connection::open(&path)
    .unwrap()
    .query_row("PRAGMA user_version", [], |row| row.get(0))
    .unwrap();
  assert_eq!(version, 0);
  assert!(matches!(
    s.list(Page::default(), &FilterSet::new()).await.unwrap_err(),
    StoreError::Backend(_)
  ));
  drop(s);

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.list(Page::default(), &FilterSet::new()).await.unwrap().is_empty());

  std::fs::remove_dir_all(&dir).ok();
}
