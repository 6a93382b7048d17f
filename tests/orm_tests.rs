use lunchly::orm::{Db, Param, create_schema};
use lunchly::settings::{DatabaseSettings, Settings};
use sqlx::FromRow;

#[derive(Debug, FromRow, PartialEq, Eq)]
struct Person {
    name: String,
}

#[tokio::test]
async fn test_db_basic_crud() {
    // 1. Connect and setup schema
    let db = Db::connect("sqlite::memory:").await.unwrap();
    db.execute("CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT)")
        .await
        .unwrap();
    db.execute("INSERT INTO person (name) VALUES ('Alice')")
        .await
        .unwrap();

    // 2. Fetch rows (using sqlx::FromRow)
    let people: Vec<Person> = db.fetch_all("SELECT name FROM person").await.unwrap();

    // 3. Extract names and assert
    let names: Vec<String> = people.into_iter().map(|person| person.name).collect();
    assert_eq!(names, vec!["Alice"]);
}

#[tokio::test]
async fn test_parameterized_queries() {
    let db = Db::connect("sqlite::memory:").await.unwrap();
    db.execute("CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT)")
        .await
        .unwrap();

    // Quotes in a bound value must not break the statement
    let inserted = db
        .execute_with(
            "INSERT INTO person (name) VALUES (?1), (?2)",
            &["O'Brien".into(), "Bob".into()],
        )
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let found: Option<Person> = db
        .query_optional("SELECT name FROM person WHERE name = ?1", &["O'Brien".into()])
        .await
        .unwrap();
    assert_eq!(
        found,
        Some(Person {
            name: "O'Brien".to_string()
        })
    );

    let missing: Option<Person> = db
        .query_optional("SELECT name FROM person WHERE id = ?1", &[99i64.into()])
        .await
        .unwrap();
    assert!(missing.is_none());

    let (count,): (i64,) = db
        .query_one("SELECT COUNT(*) FROM person", &[])
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_query_error_propagates() {
    let db = Db::connect("sqlite::memory:").await.unwrap();
    let result: Result<Vec<Person>, sqlx::Error> =
        db.query("SELECT name FROM no_such_table", &[]).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_create_schema_is_idempotent() {
    let db = Db::connect("sqlite::memory:").await.unwrap();
    create_schema(&db).await.unwrap();
    create_schema(&db).await.unwrap();

    let tables: Vec<(String,)> = db
        .fetch_all("SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('customers', 'reservations') ORDER BY name")
        .await
        .unwrap();
    let names: Vec<String> = tables.into_iter().map(|(name,)| name).collect();
    assert_eq!(names, vec!["customers", "reservations"]);
}

#[test]
fn test_param_conversions() {
    assert_eq!(Param::from(7i64), Param::Int(7));
    assert_eq!(Param::from("x"), Param::Text("x".to_string()));
    assert_eq!(Param::from(None::<i64>), Param::Null);
    assert_eq!(Param::from(Some(3i64)), Param::Int(3));
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::default();
    assert!(!settings.debug);
    assert_eq!(settings.database.url, "sqlite::memory:");
    assert!(settings.database.is_in_memory());

    let file = DatabaseSettings {
        url: "sqlite://lunchly.db".to_string(),
        max_connections: 5,
    };
    assert!(!file.is_in_memory());
}
