use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use serde::Serialize;
use tokio::fs;
use utoipa::ToSchema;

pub mod retry;

use retry::{RetryConfig, retry_with_backoff};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DbHealth {
    Healthy,
    Degraded {
        since: DateTime<Utc>,
        #[serde(rename = "lastError")]
        last_error: String,
    },
}

impl DbHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, DbHealth::Healthy)
    }
}

/// Process-wide database handle.
///
/// Owns the SeaORM connection together with its health state. The connection
/// can be swapped out by [`Db::reconnect`]; callers hold the `Arc` returned by
/// [`Db::conn`] for the duration of one operation.
#[derive(Clone)]
pub struct Db {
    inner: Arc<DbInner>,
}

struct DbInner {
    conn: RwLock<Arc<DatabaseConnection>>,
    health: RwLock<DbHealth>,
    url: Option<String>,
    retry: RetryConfig,
}

impl Db {
    /// Open the connection, retrying with bounded backoff.
    pub async fn connect(database_url: &str, retry: RetryConfig) -> Result<Self, DbErr> {
        let conn = retry_with_backoff(|| open(database_url), &retry).await?;
        tracing::info!("database connection established");
        Ok(Self::build(conn, Some(database_url.to_string()), retry))
    }

    /// Wrap an existing connection. Such a handle cannot reconnect on its own.
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self::build(conn, None, RetryConfig::default())
    }

    fn build(conn: DatabaseConnection, url: Option<String>, retry: RetryConfig) -> Self {
        Self {
            inner: Arc::new(DbInner {
                conn: RwLock::new(Arc::new(conn)),
                health: RwLock::new(DbHealth::Healthy),
                url,
                retry,
            }),
        }
    }

    pub fn conn(&self) -> Arc<DatabaseConnection> {
        self.inner
            .conn
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn health(&self) -> DbHealth {
        self.inner
            .health
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_health(&self, health: DbHealth) {
        *self
            .inner
            .health
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = health;
    }

    /// Record a connectivity failure. Keeps the original `since` when already degraded.
    pub fn mark_degraded(&self, err: &DbErr) {
        let since = match self.health() {
            DbHealth::Degraded { since, .. } => since,
            DbHealth::Healthy => Utc::now(),
        };
        self.set_health(DbHealth::Degraded {
            since,
            last_error: err.to_string(),
        });
    }

    /// Ping the store; on failure mark the handle degraded and try one bounded reconnect.
    pub async fn check(&self) -> DbHealth {
        match self.conn().ping().await {
            Ok(()) => {
                if !self.health().is_healthy() {
                    tracing::info!("database connection recovered");
                }
                self.set_health(DbHealth::Healthy);
            }
            Err(err) => {
                tracing::error!(error = %err, "database ping failed");
                self.mark_degraded(&err);
                if let Err(err) = self.reconnect().await {
                    tracing::error!(error = %err, "database reconnect failed");
                }
            }
        }
        self.health()
    }

    pub async fn reconnect(&self) -> Result<(), DbErr> {
        let Some(url) = self.inner.url.as_deref() else {
            return Err(DbErr::Custom("connection was injected, cannot reconnect".into()));
        };
        match retry_with_backoff(|| open(url), &self.inner.retry).await {
            Ok(conn) => {
                *self
                    .inner
                    .conn
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(conn);
                self.set_health(DbHealth::Healthy);
                tracing::info!("database reconnected");
                Ok(())
            }
            Err(err) => {
                self.mark_degraded(&err);
                Err(err)
            }
        }
    }

    pub fn spawn_monitor(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let db = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                db.check().await;
            }
        })
    }
}

async fn open(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    Database::connect(opt).await
}

/// Whether the error means the store itself is unreachable.
pub fn is_connectivity_error(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

/// Minimal migration runner that executes SQL files in `migrations/` in filename order.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    let mut entries = fs::read_dir("migrations").await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    for file in files {
        tracing::debug!(file = %file.display(), "applying migration");
        let sql = fs::read_to_string(&file).await?;
        // Postgres prepared statements cannot contain multiple commands,
        // so split the migration file and run each statement individually.
        for stmt in sql.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            conn.execute(Statement::from_string(backend, format!("{stmt};")))
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, RuntimeErr};

    fn mock_db() -> Db {
        Db::from_connection(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[test]
    fn degraded_keeps_first_failure_time() {
        let db = mock_db();
        assert!(db.health().is_healthy());

        db.mark_degraded(&DbErr::Conn(RuntimeErr::Internal("refused".into())));
        let DbHealth::Degraded { since, .. } = db.health() else {
            panic!("expected degraded");
        };

        db.mark_degraded(&DbErr::Conn(RuntimeErr::Internal("still refused".into())));
        match db.health() {
            DbHealth::Degraded { since: again, last_error } => {
                assert_eq!(since, again);
                assert!(last_error.contains("still refused"));
            }
            DbHealth::Healthy => panic!("expected degraded"),
        }
    }

    #[test]
    fn handles_share_one_mock_connection() {
        let db = mock_db();
        let first = db.conn();
        let second = db.clone().conn();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(matches!(&*first, DatabaseConnection::MockDatabaseConnection(_)));
    }

    #[tokio::test]
    async fn injected_connection_cannot_reconnect() {
        let db = mock_db();
        assert!(db.reconnect().await.is_err());
    }

    #[test]
    fn classifies_connectivity_errors() {
        assert!(is_connectivity_error(&DbErr::Conn(RuntimeErr::Internal("x".into()))));
        assert!(!is_connectivity_error(&DbErr::RecordNotFound("x".into())));
    }
}
