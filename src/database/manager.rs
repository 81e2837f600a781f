use once_cell::sync::OnceCell;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";

/// Errors from the data-access layer, classified by Postgres error code
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {constraint:?}")]
    UniqueViolation { constraint: Option<String> },

    #[error("Foreign key constraint violated: {constraint:?}")]
    ForeignKeyViolation {
        constraint: Option<String>,
        /// true when a delete was blocked by rows that still point at the target
        still_referenced: bool,
    },

    #[error("Required column missing: {0}")]
    NotNullViolation(String),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    /// Classify a Postgres error by SQLSTATE code. Returns None for codes we pass through.
    pub fn classify(code: &str, constraint: Option<&str>, message: &str) -> Option<Self> {
        let constraint = constraint.map(str::to_string);
        match code {
            UNIQUE_VIOLATION => Some(DatabaseError::UniqueViolation { constraint }),
            FOREIGN_KEY_VIOLATION => Some(DatabaseError::ForeignKeyViolation {
                constraint,
                still_referenced: false,
            }),
            NOT_NULL_VIOLATION => Some(DatabaseError::NotNullViolation(message.to_string())),
            _ => None,
        }
    }

    /// Reinterpret a foreign key failure raised by a DELETE: the row is still referenced.
    /// Server message text is localized, so the caller's statement decides.
    pub fn on_delete(self) -> Self {
        match self {
            DatabaseError::ForeignKeyViolation { constraint, .. } => DatabaseError::ForeignKeyViolation {
                constraint,
                still_referenced: true,
            },
            other => other,
        }
    }

    /// `NotFound` for a missing row of `entity`, e.g. "Ticket 42 no existe"
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} {} no existe", entity, id))
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
                | DatabaseError::Sqlx(sqlx::Error::PoolClosed)
                | DatabaseError::Sqlx(sqlx::Error::Io(_))
                | DatabaseError::Sqlx(sqlx::Error::Tls(_))
                | DatabaseError::ConfigMissing(_)
        )
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return DatabaseError::NotFound("Registro no encontrado".to_string());
        }
        if let sqlx::Error::Database(db_err) = &err {
            let classified = db_err
                .code()
                .and_then(|code| DatabaseError::classify(&code, db_err.constraint(), db_err.message()));
            if let Some(classified) = classified {
                return classified;
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Owner of the process-wide Postgres pool
pub struct DatabaseManager {
    pool: OnceCell<PgPool>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        static INSTANCE: OnceCell<DatabaseManager> = OnceCell::new();
        INSTANCE.get_or_init(|| DatabaseManager { pool: OnceCell::new() })
    }

    /// Shared pool. Created lazily on first use; connections are opened on demand.
    pub fn pool() -> Result<PgPool, DatabaseError> {
        Self::instance()
            .pool
            .get_or_try_init(Self::create_pool)
            .cloned()
    }

    fn create_pool() -> Result<PgPool, DatabaseError> {
        let settings = &config::config().database;
        let url = settings
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connection_timeout))
            .connect_lazy(url)
            .map_err(DatabaseError::Sqlx)?;

        info!("Created database pool (max {} connections)", settings.max_connections);
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool()?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Apply pending migrations from ./migrations
    pub async fn migrate() -> Result<(), DatabaseError> {
        let pool = Self::pool()?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close() {
        if let Some(pool) = Self::instance().pool.get() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
