//! Minimal async query layer for Lunchly (sqlite + sqlx)
//!
//! Usage:
//! let db = Db::connect("sqlite::memory:").await?;
//! create_schema(&db).await?;
//! let rows: Vec<CustomerRow> = db.query("SELECT ... WHERE id = ?1", &[id.into()]).await?;
use chrono::NaiveDateTime;
use log::{debug, info};
pub use sqlx::FromRow;
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{SqliteArguments, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::customer::Customer;
use crate::reservation::Reservation;
use crate::settings::DatabaseSettings;

/// An async database pool wrapper. This is the only handle the models
/// talk to; every model operation takes it explicitly.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

/// A positional statement parameter, bound to `?1`, `?2`, ... in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Int(i64),
    Text(String),
    DateTime(NaiveDateTime),
    Null,
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl From<NaiveDateTime> for Param {
    fn from(v: NaiveDateTime) -> Self {
        Param::DateTime(v)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Param::Null)
    }
}

fn bind_query<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[Param],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            Param::Int(v) => query.bind(*v),
            Param::Text(v) => query.bind(v.clone()),
            Param::DateTime(v) => query.bind(*v),
            Param::Null => query.bind(None::<String>),
        };
    }
    query
}

fn bind_query_as<'q, T>(
    mut query: QueryAs<'q, Sqlite, T, SqliteArguments<'q>>,
    params: &[Param],
) -> QueryAs<'q, Sqlite, T, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            Param::Int(v) => query.bind(*v),
            Param::Text(v) => query.bind(v.clone()),
            Param::DateTime(v) => query.bind(*v),
            Param::Null => query.bind(None::<String>),
        };
    }
    query
}

impl Db {
    /// Connect (or create) a SQLite database at the given URI
    pub async fn connect(uri: &str) -> Result<Self, sqlx::Error> {
        let settings = DatabaseSettings {
            url: uri.to_string(),
            ..DatabaseSettings::default()
        };
        Db::connect_with(&settings).await
    }

    /// Connect using the pool limits from `settings`.
    ///
    /// In-memory databases get a single connection that is never recycled,
    /// otherwise each pooled connection would see its own empty database.
    pub async fn connect_with(settings: &DatabaseSettings) -> Result<Self, sqlx::Error> {
        info!("Connecting to SQLite database at URI: {}", settings.url);
        let mut options = SqlitePoolOptions::new().max_connections(settings.max_connections);
        if settings.is_in_memory() {
            options = options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = options.connect(&settings.url).await?;
        info!("Connected to SQLite database: {}", settings.url);
        Ok(Db { pool })
    }

    /// Execute an arbitrary SQL statement, e.g. DDL, INSERT, UPDATE.
    pub async fn execute(&self, sql: &str) -> Result<(), sqlx::Error> {
        debug!("Executing SQL: {}", sql);
        let result = self.pool.execute(sql).await;
        match &result {
            Ok(_) => info!("SQL executed successfully"),
            Err(e) => log::error!("SQL execution failed: {}", e),
        }
        result.map(|_| ())
    }

    /// Fetch all rows and map to a type implementing `FromRow`.
    pub async fn fetch_all<T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin>(
        &self,
        sql: &str,
    ) -> Result<Vec<T>, sqlx::Error> {
        self.query(sql, &[]).await
    }

    /// Execute a parameterized statement, returning the number of rows it touched.
    pub async fn execute_with(&self, sql: &str, params: &[Param]) -> Result<u64, sqlx::Error> {
        debug!("Executing SQL: {} with {} params", sql, params.len());
        let result = bind_query(sqlx::query(sql), params)
            .execute(&self.pool)
            .await;
        match &result {
            Ok(done) => info!("SQL executed successfully ({} rows)", done.rows_affected()),
            Err(e) => log::error!("SQL execution failed: {}", e),
        }
        result.map(|done| done.rows_affected())
    }

    /// Run a parameterized query and map every row through `FromRow`.
    pub async fn query<T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin>(
        &self,
        sql: &str,
        params: &[Param],
    ) -> Result<Vec<T>, sqlx::Error> {
        debug!("Fetching rows with SQL: {} with {} params", sql, params.len());
        let result = bind_query_as(sqlx::query_as(sql), params)
            .fetch_all(&self.pool)
            .await;
        match &result {
            Ok(rows) => info!("Fetched {} rows successfully", rows.len()),
            Err(e) => log::error!("Row fetch failed: {}", e),
        }
        result
    }

    /// Like [`Db::query`] but yields at most one row.
    pub async fn query_optional<T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin>(
        &self,
        sql: &str,
        params: &[Param],
    ) -> Result<Option<T>, sqlx::Error> {
        debug!("Fetching optional row with SQL: {}", sql);
        let result = bind_query_as(sqlx::query_as(sql), params)
            .fetch_optional(&self.pool)
            .await;
        if let Err(e) = &result {
            log::error!("Row fetch failed: {}", e);
        }
        result
    }

    /// Like [`Db::query`] but requires exactly one row, e.g. `INSERT ... RETURNING id`.
    pub async fn query_one<T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin>(
        &self,
        sql: &str,
        params: &[Param],
    ) -> Result<T, sqlx::Error> {
        debug!("Fetching one row with SQL: {}", sql);
        let result = bind_query_as(sqlx::query_as(sql), params)
            .fetch_one(&self.pool)
            .await;
        if let Err(e) = &result {
            log::error!("Row fetch failed: {}", e);
        }
        result
    }
}

/// A table-backed entity with upsert-style persistence.
#[async_trait::async_trait]
pub trait Model: Send + Sync {
    fn table_name() -> &'static str;
    fn create_table_sql() -> String;

    /// Store-assigned identity; `None` until the first save.
    fn id(&self) -> Option<i64>;

    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    async fn create_table(db: &Db) -> Result<(), sqlx::Error> {
        db.execute(&Self::create_table_sql()).await?;
        log::info!("Ensured table `{}` exists.", Self::table_name());
        Ok(())
    }

    /// Insert when new and capture the generated id, otherwise update by id.
    async fn save(&mut self, db: &Db) -> crate::error::Result<()>;
}

/// Create both tables. Customers go first since reservations reference them.
pub async fn create_schema(db: &Db) -> Result<(), sqlx::Error> {
    Customer::create_table(db).await?;
    Reservation::create_table(db).await?;
    Ok(())
}
