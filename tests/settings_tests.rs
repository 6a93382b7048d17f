use lunchly::orm::Db;
use lunchly::settings::Settings;

// The only test in this binary, so no other test reads the environment concurrently.
#[tokio::test]
async fn test_settings_from_env() {
    unsafe {
        std::env::set_var("LUNCHLY_DEBUG", "true");
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
        std::env::set_var("DATABASE_MAX_CONNECTIONS", "3");
    }
    let settings = Settings::from_env();
    assert!(settings.debug);
    assert_eq!(settings.database.url, "sqlite::memory:");
    assert_eq!(settings.database.max_connections, 3);

    let db = Db::connect_with(&settings.database).await.unwrap();
    db.execute("CREATE TABLE ping (id INTEGER PRIMARY KEY)")
        .await
        .unwrap();

    unsafe {
        std::env::set_var("LUNCHLY_DEBUG", "no");
        std::env::set_var("DATABASE_MAX_CONNECTIONS", "lots");
    }
    let settings = Settings::from_env();
    assert!(!settings.debug);
    // Unparsable values fall back to the default
    assert_eq!(settings.database.max_connections, 5);
}
