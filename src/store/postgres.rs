//! PostgreSQL message store.
//!
//! The same two operations can run in two query modes:
//! - [`QueryMode::Structured`] assembles statements with [`sqlx::QueryBuilder`]
//! - [`QueryMode::Raw`] sends literal parameterized SQL
//!
//! Both produce identical rows. The API always uses the structured mode; the
//! raw mode is kept for equivalence tests and the `bench` command.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use strum::Display;
use tracing::{debug, error, info, instrument};

use crate::error::StorageError;
use crate::message::{Message, NewMessage};
use crate::metrics;

use super::MessageStore;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const SELECT_COLUMNS: &str = r#"SELECT "id", "name", "message", "createdAt" FROM "Message""#;
const ORDER_NEWEST_FIRST: &str = r#" ORDER BY "createdAt" DESC, "id" DESC"#;

const RAW_LIST_SQL: &str = r#"
    SELECT * FROM "Message"
    ORDER BY "createdAt" DESC, "id" DESC
"#;

const RAW_INSERT_SQL: &str = r#"
    INSERT INTO "Message" ("name", "message", "createdAt")
    VALUES ($1, $2, NOW())
    RETURNING *
"#;

/// How statements are issued to PostgreSQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum QueryMode {
    /// Statements assembled with the query builder.
    #[default]
    Structured,
    /// Literal SQL with positional parameters.
    Raw,
}

/// Connection pool settings.
#[derive(Clone)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Pool acquire timeout.
    pub acquire_timeout_secs: u64,
    /// Timeout for the post-connect verification query.
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl StoreConfig {
    /// Pool settings for the given URL with default limits.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            acquire_timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// Message store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
    mode: QueryMode,
}

impl PgMessageStore {
    /// Wrap an existing pool, using structured queries.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            mode: QueryMode::Structured,
        }
    }

    /// Same pool, different query mode.
    pub fn with_query_mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Create the pool and verify it answers.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StorageError> {
        debug!(
            "Creating database pool: max={}, acquire_timeout={}s",
            config.max_connections, config.acquire_timeout_secs
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.database_url)
            .await?;

        match tokio::time::timeout(
            Duration::from_secs(config.connect_timeout_secs),
            sqlx::query("SELECT 1").execute(&pool),
        )
        .await
        {
            Ok(Ok(_)) => {
                info!("Database pool created and verified");
                Ok(Self::new(pool))
            }
            Ok(Err(e)) => {
                error!(error = %e, "Database connection verification failed");
                Err(e.into())
            }
            Err(_) => {
                error!(
                    timeout_secs = config.connect_timeout_secs,
                    "Database connection verification timeout"
                );
                Err(StorageError::Unavailable(
                    "database verification timeout".to_string(),
                ))
            }
        }
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Active query mode.
    pub fn query_mode(&self) -> QueryMode {
        self.mode
    }

    /// Underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn list_structured(&self) -> Result<Vec<Message>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_COLUMNS);
        query.push(ORDER_NEWEST_FIRST);
        query.build_query_as::<Message>().fetch_all(&self.pool).await
    }

    async fn list_raw(&self) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(RAW_LIST_SQL)
            .fetch_all(&self.pool)
            .await
    }

    async fn create_structured(&self, new: NewMessage) -> Result<Message, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(r#"INSERT INTO "Message" ("name", "message") VALUES ("#);
        query.push_bind(new.name);
        query.push(", ");
        query.push_bind(new.message);
        query.push(r#") RETURNING "id", "name", "message", "createdAt""#);
        query.build_query_as::<Message>().fetch_one(&self.pool).await
    }

    async fn create_raw(&self, new: NewMessage) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(RAW_INSERT_SQL)
            .bind(new.name)
            .bind(new.message)
            .fetch_one(&self.pool)
            .await
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    #[instrument(skip(self), fields(mode = %self.mode))]
    async fn list_messages(&self) -> Result<Vec<Message>, StorageError> {
        let start = Instant::now();
        let result = match self.mode {
            QueryMode::Structured => self.list_structured().await,
            QueryMode::Raw => self.list_raw().await,
        };
        metrics::record_store_latency(start, "list", self.mode);

        let messages = result?;
        debug!(count = messages.len(), "Listed messages");
        Ok(messages)
    }

    #[instrument(skip(self, new), fields(mode = %self.mode))]
    async fn create_message(&self, new: NewMessage) -> Result<Message, StorageError> {
        let start = Instant::now();
        let result = match self.mode {
            QueryMode::Structured => self.create_structured(new).await,
            QueryMode::Raw => self.create_raw(new).await,
        };
        metrics::record_store_latency(start, "create", self.mode);

        let message = result?;
        debug!(id = message.id, "Created message");
        Ok(message)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
