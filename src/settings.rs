use std::env;

#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    /// True for `sqlite::memory:` style URLs, where every pooled connection
    /// would otherwise open its own private database.
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub debug: bool,
    pub database: DatabaseSettings,
}

impl Settings {
    /// Build settings from the environment, loading `.env` first if present.
    ///
    /// Reads `LUNCHLY_DEBUG`, `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`;
    /// anything missing or unparsable keeps its default.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let defaults = DatabaseSettings::default();

        let debug = env::var("LUNCHLY_DEBUG")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let url = env::var("DATABASE_URL").unwrap_or(defaults.url);
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_connections);

        Settings {
            debug,
            database: DatabaseSettings {
                url,
                max_connections,
            },
        }
    }
}
