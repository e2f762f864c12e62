// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SQLite connection pool, migrations, and the storage error type.
//!
//! Every repository borrows the pool from [`Database`]. Mutating statements run
//! inside their own transaction which is committed only when the statement
//! touched at least one row; otherwise the transaction is dropped and SQLite
//! rolls it back.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::info;

use super::repository::{ApiKeyRepository, TodoItemRepository, TodoListRepository};

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A row with the same uniqueness key already exists.
    #[error("{0}")]
    Conflict(&'static str),

    /// Any other driver failure, tagged with the operation that hit it.
    #[error("Failed to {operation}: {source}")]
    Internal {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to run database migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Map a driver error to [`StorageError::Internal`] for `operation`.
    pub(crate) fn internal(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StorageError {
        move |source| StorageError::Internal { operation, source }
    }

    /// Like [`StorageError::internal`], but unique-key violations become
    /// [`StorageError::Conflict`] carrying `conflict`.
    pub(crate) fn on_insert(
        operation: &'static str,
        conflict: &'static str,
    ) -> impl FnOnce(sqlx::Error) -> StorageError {
        move |source| {
            if is_unique_violation(&source) {
                StorageError::Conflict(conflict)
            } else {
                StorageError::Internal { operation, source }
            }
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Whether a driver error reports a UNIQUE or PRIMARY KEY constraint failure.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() || db_err.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

/// Commit `tx` when the statement affected rows, otherwise let it roll back.
pub(crate) async fn commit_if_affected(
    tx: Transaction<'_, Sqlite>,
    rows_affected: u64,
    operation: &'static str,
) -> StorageResult<bool> {
    if rows_affected == 0 {
        return Ok(false);
    }
    tx.commit().await.map_err(StorageError::internal(operation))?;
    Ok(true)
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the SQLite pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `url` and apply migrations.
    pub async fn connect(url: &str, max_connections: u32) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(StorageError::internal("parse database url"))?
            .create_if_missing(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !is_memory(options.get_filename()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(StorageError::internal("connect to database"))?;

        info!(url, max_connections, "Connected to database");
        Self::migrate(pool).await
    }

    /// Private in-memory database on a single connection.
    ///
    /// The connection is never recycled, so the data lives as long as the
    /// returned handle.
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(StorageError::internal("parse database url"))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StorageError::internal("connect to database"))?;

        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> StorageResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Round trip to the database, used by the health check.
    pub async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StorageError::internal("ping database"))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn todo_lists(&self) -> TodoListRepository<'_> {
        TodoListRepository::new(&self.pool)
    }

    pub fn todo_items(&self) -> TodoItemRepository<'_> {
        TodoItemRepository::new(&self.pool)
    }

    pub fn api_keys(&self) -> ApiKeyRepository<'_> {
        ApiKeyRepository::new(&self.pool)
    }
}

fn is_memory(path: &Path) -> bool {
    path.as_os_str() == ":memory:"
}
