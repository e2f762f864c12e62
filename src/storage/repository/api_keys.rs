// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API key repository.
//!
//! Keys are global (not owned by a user) and map a key value to the user and
//! subscription tier it authenticates as.

use sqlx::SqlitePool;
use tracing::warn;

use super::super::database::{commit_if_affected, StorageError, StorageResult};
use crate::auth::{ApiKeyLookup, Subscription};
use crate::models::ApiKey;

/// Message carried by [`StorageError::Conflict`] when the key is taken.
pub const API_KEY_EXISTS: &str = "ApiKey already exists";

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    apikey: String,
    user_id: String,
    subscription: String,
}

impl ApiKeyRow {
    /// Rows with an unrecognised tier are treated as absent.
    fn into_api_key(self) -> Option<ApiKey> {
        let Some(subscription) = Subscription::from_str(&self.subscription) else {
            warn!(
                subscription = %self.subscription,
                "Ignoring API key with unknown subscription"
            );
            return None;
        };
        Some(ApiKey {
            apikey: self.apikey,
            user_id: self.user_id,
            subscription,
        })
    }
}

/// Repository for API keys.
pub struct ApiKeyRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApiKeyRepository<'a> {
    /// Create a new ApiKeyRepository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, apikey: &str) -> StorageResult<Option<ApiKey>> {
        let row = sqlx::query_as::<_, ApiKeyRow>(
            "SELECT apikey, user_id, subscription FROM api_keys WHERE apikey = ?",
        )
        .bind(apikey)
        .fetch_optional(self.pool)
        .await
        .map_err(StorageError::internal("fetch api key"))?;

        Ok(row.and_then(ApiKeyRow::into_api_key))
    }

    pub async fn create(&self, key: &ApiKey) -> StorageResult<bool> {
        const OP: &str = "create api key";

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result =
            sqlx::query("INSERT INTO api_keys (apikey, user_id, subscription) VALUES (?, ?, ?)")
                .bind(&key.apikey)
                .bind(&key.user_id)
                .bind(key.subscription.as_str())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::on_insert(OP, API_KEY_EXISTS))?;

        commit_if_affected(tx, result.rows_affected(), OP).await
    }

    /// Reassign user and tier. Returns `false` when the key is missing or
    /// nothing changed.
    pub async fn update(&self, key: &ApiKey) -> StorageResult<bool> {
        const OP: &str = "update api key";

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result = sqlx::query(
            "UPDATE api_keys SET user_id = ?, subscription = ? \
             WHERE apikey = ? AND (user_id != ? OR subscription != ?)",
        )
        .bind(&key.user_id)
        .bind(key.subscription.as_str())
        .bind(&key.apikey)
        .bind(&key.user_id)
        .bind(key.subscription.as_str())
        .execute(&mut *tx)
        .await
        .map_err(StorageError::internal(OP))?;

        commit_if_affected(tx, result.rows_affected(), OP).await
    }

    /// Delete a key, returning it as it was before deletion.
    pub async fn delete(&self, apikey: &str) -> StorageResult<Option<ApiKey>> {
        const OP: &str = "delete api key";

        let Some(existing) = self.get(apikey).await? else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result = sqlx::query("DELETE FROM api_keys WHERE apikey = ?")
            .bind(apikey)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::internal(OP))?;

        if commit_if_affected(tx, result.rows_affected(), OP).await? {
            Ok(Some(existing))
        } else {
            Ok(None)
        }
    }

    /// Remove every key. Returns the number removed.
    pub async fn truncate(&self) -> StorageResult<u64> {
        const OP: &str = "truncate api keys";

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result = sqlx::query("DELETE FROM api_keys")
            .execute(&mut *tx)
            .await
            .map_err(StorageError::internal(OP))?;

        let removed = result.rows_affected();
        commit_if_affected(tx, removed, OP).await?;
        Ok(removed)
    }
}

impl ApiKeyLookup for ApiKeyRepository<'_> {
    async fn lookup(&self, key: &str) -> StorageResult<Option<ApiKey>> {
        self.get(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    async fn test_db() -> Database {
        Database::in_memory().await.expect("Failed to open database")
    }

    #[tokio::test]
    async fn create_and_get() {
        let db = test_db().await;
        let repo = db.api_keys();

        let key = ApiKey::new("k1", "u1", Subscription::Pro);
        assert!(repo.create(&key).await.unwrap());
        assert_eq!(repo.get("k1").await.unwrap(), Some(key));
        assert_eq!(repo.get("k2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_key_conflicts() {
        let db = test_db().await;
        let repo = db.api_keys();

        repo.create(&ApiKey::new("k1", "u1", Subscription::Pro)).await.unwrap();
        let result = repo.create(&ApiKey::new("k1", "u2", Subscription::Basic)).await;

        assert!(matches!(result, Err(StorageError::Conflict(API_KEY_EXISTS))));
    }

    #[tokio::test]
    async fn unknown_subscription_reads_as_absent() {
        let db = test_db().await;
        sqlx::query("INSERT INTO api_keys (apikey, user_id, subscription) VALUES ('k1', 'u1', 'GOLD')")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(db.api_keys().get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn stored_tier_is_parsed_case_insensitively() {
        let db = test_db().await;
        sqlx::query("INSERT INTO api_keys (apikey, user_id, subscription) VALUES ('k1', 'u1', 'ultra')")
            .execute(db.pool())
            .await
            .unwrap();

        let key = db.api_keys().get("k1").await.unwrap().unwrap();
        assert_eq!(key.subscription, Subscription::Ultra);
    }

    #[tokio::test]
    async fn update_only_when_changed() {
        let db = test_db().await;
        let repo = db.api_keys();

        repo.create(&ApiKey::new("k1", "u1", Subscription::Pro)).await.unwrap();

        assert!(!repo.update(&ApiKey::new("k1", "u1", Subscription::Pro)).await.unwrap());
        assert!(repo.update(&ApiKey::new("k1", "u1", Subscription::Mega)).await.unwrap());
        assert!(repo.update(&ApiKey::new("k1", "u5", Subscription::Mega)).await.unwrap());
        assert!(!repo.update(&ApiKey::new("k9", "u1", Subscription::Pro)).await.unwrap());

        assert_eq!(
            repo.get("k1").await.unwrap(),
            Some(ApiKey::new("k1", "u5", Subscription::Mega))
        );
    }

    #[tokio::test]
    async fn delete_and_truncate() {
        let db = test_db().await;
        let repo = db.api_keys();

        repo.create(&ApiKey::new("k1", "u1", Subscription::Pro)).await.unwrap();
        repo.create(&ApiKey::new("k2", "u2", Subscription::Basic)).await.unwrap();

        assert_eq!(
            repo.delete("k1").await.unwrap(),
            Some(ApiKey::new("k1", "u1", Subscription::Pro))
        );
        assert_eq!(repo.delete("k1").await.unwrap(), None);
        assert_eq!(repo.truncate().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn lookup_delegates_to_get() {
        let db = test_db().await;
        let repo = db.api_keys();
        repo.create(&ApiKey::new("k1", "u1", Subscription::Custom)).await.unwrap();

        let found = repo.lookup("k1").await.unwrap().unwrap();
        assert_eq!(found.user_id, "u1");
        assert!(repo.lookup("missing").await.unwrap().is_none());
    }
}
