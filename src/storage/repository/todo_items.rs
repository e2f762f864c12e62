// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Todo item repository.
//!
//! Items are keyed by `(user_id, list_id, id)`. The parent list is referenced
//! by id only; callers check that it exists before writing.

use sqlx::SqlitePool;

use super::super::database::{commit_if_affected, StorageError, StorageResult};
use crate::models::TodoItem;

/// Message carried by [`StorageError::Conflict`] when the id is taken.
pub const ITEM_EXISTS: &str = "Todo item already exists";

/// Repository for todo items.
pub struct TodoItemRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TodoItemRepository<'a> {
    /// Create a new TodoItemRepository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(
        &self,
        user_id: &str,
        list_id: &str,
        id: &str,
    ) -> StorageResult<Option<TodoItem>> {
        sqlx::query_as::<_, TodoItem>(
            "SELECT id, task, done FROM todo_items WHERE user_id = ? AND list_id = ? AND id = ?",
        )
        .bind(user_id)
        .bind(list_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(StorageError::internal("fetch item"))
    }

    /// Items of one list, open items first, then by task.
    pub async fn list(&self, user_id: &str, list_id: &str) -> StorageResult<Vec<TodoItem>> {
        sqlx::query_as::<_, TodoItem>(
            "SELECT id, task, done FROM todo_items WHERE user_id = ? AND list_id = ? \
             ORDER BY done, task",
        )
        .bind(user_id)
        .bind(list_id)
        .fetch_all(self.pool)
        .await
        .map_err(StorageError::internal("fetch items"))
    }

    pub async fn create(&self, user_id: &str, list_id: &str, item: &TodoItem) -> StorageResult<bool> {
        const OP: &str = "create item";

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result = sqlx::query(
            "INSERT INTO todo_items (user_id, list_id, id, task, done) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(list_id)
        .bind(&item.id)
        .bind(&item.task)
        .bind(item.done)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::on_insert(OP, ITEM_EXISTS))?;

        commit_if_affected(tx, result.rows_affected(), OP).await
    }

    /// Replace task and done flag.
    ///
    /// Returns `false` when the item is missing or neither field changed.
    pub async fn update(&self, user_id: &str, list_id: &str, item: &TodoItem) -> StorageResult<bool> {
        const OP: &str = "update item";

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result = sqlx::query(
            "UPDATE todo_items SET task = ?, done = ? \
             WHERE user_id = ? AND list_id = ? AND id = ? AND (task != ? OR done != ?)",
        )
        .bind(&item.task)
        .bind(item.done)
        .bind(user_id)
        .bind(list_id)
        .bind(&item.id)
        .bind(&item.task)
        .bind(item.done)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::internal(OP))?;

        commit_if_affected(tx, result.rows_affected(), OP).await
    }

    /// Delete an item, returning it as it was before deletion.
    pub async fn delete(
        &self,
        user_id: &str,
        list_id: &str,
        id: &str,
    ) -> StorageResult<Option<TodoItem>> {
        const OP: &str = "delete item";

        let Some(existing) = self.get(user_id, list_id, id).await? else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result =
            sqlx::query("DELETE FROM todo_items WHERE user_id = ? AND list_id = ? AND id = ?")
                .bind(user_id)
                .bind(list_id)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::internal(OP))?;

        if commit_if_affected(tx, result.rows_affected(), OP).await? {
            Ok(Some(existing))
        } else {
            Ok(None)
        }
    }

    /// Remove every item of every user. Returns the number removed.
    pub async fn truncate(&self) -> StorageResult<u64> {
        const OP: &str = "truncate todo items";

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result = sqlx::query("DELETE FROM todo_items")
            .execute(&mut *tx)
            .await
            .map_err(StorageError::internal(OP))?;

        let removed = result.rows_affected();
        commit_if_affected(tx, removed, OP).await?;
        Ok(removed)
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
        let repo = db.todo_items();

        let item = TodoItem::new("i1", "milk", false);
        assert!(repo.create("u1", "L1", &item).await.unwrap());
        assert_eq!(repo.get("u1", "L1", "i1").await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn items_are_scoped_by_user_and_list() {
        let db = test_db().await;
        let repo = db.todo_items();

        repo.create("u1", "L1", &TodoItem::new("i1", "milk", false)).await.unwrap();
        repo.create("u1", "L2", &TodoItem::new("i1", "bread", false)).await.unwrap();
        repo.create("u2", "L1", &TodoItem::new("i1", "eggs", true)).await.unwrap();

        assert_eq!(repo.get("u1", "L1", "i1").await.unwrap().unwrap().task, "milk");
        assert_eq!(repo.get("u1", "L2", "i1").await.unwrap().unwrap().task, "bread");
        assert_eq!(repo.get("u2", "L1", "i1").await.unwrap().unwrap().task, "eggs");
        assert_eq!(repo.get("u2", "L2", "i1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_item_conflicts() {
        let db = test_db().await;
        let repo = db.todo_items();

        repo.create("u1", "L1", &TodoItem::new("i1", "milk", false)).await.unwrap();
        let result = repo.create("u1", "L1", &TodoItem::new("i1", "other", true)).await;

        assert!(matches!(result, Err(StorageError::Conflict(ITEM_EXISTS))));
    }

    #[tokio::test]
    async fn list_orders_open_items_first_then_by_task() {
        let db = test_db().await;
        let repo = db.todo_items();

        repo.create("u1", "L1", &TodoItem::new("a", "zz", false)).await.unwrap();
        repo.create("u1", "L1", &TodoItem::new("b", "aa", true)).await.unwrap();
        repo.create("u1", "L1", &TodoItem::new("c", "mm", false)).await.unwrap();

        let ids: Vec<String> = repo
            .list("u1", "L1")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn list_of_unknown_list_is_empty() {
        let db = test_db().await;
        assert!(db.todo_items().list("u1", "missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_only_when_a_field_differs() {
        let db = test_db().await;
        let repo = db.todo_items();

        repo.create("u1", "L1", &TodoItem::new("i1", "milk", false)).await.unwrap();

        assert!(!repo.update("u1", "L1", &TodoItem::new("i1", "milk", false)).await.unwrap());
        assert!(repo.update("u1", "L1", &TodoItem::new("i1", "milk", true)).await.unwrap());
        assert!(repo.update("u1", "L1", &TodoItem::new("i1", "oat milk", true)).await.unwrap());

        let stored = repo.get("u1", "L1", "i1").await.unwrap().unwrap();
        assert_eq!(stored, TodoItem::new("i1", "oat milk", true));

        assert!(!repo.update("u1", "L2", &TodoItem::new("i1", "x", false)).await.unwrap());
    }

    #[tokio::test]
    async fn delete_returns_snapshot() {
        let db = test_db().await;
        let repo = db.todo_items();

        repo.create("u1", "L1", &TodoItem::new("i1", "milk", true)).await.unwrap();

        assert_eq!(repo.delete("u1", "L2", "i1").await.unwrap(), None);
        assert_eq!(
            repo.delete("u1", "L1", "i1").await.unwrap(),
            Some(TodoItem::new("i1", "milk", true))
        );
        assert_eq!(repo.get("u1", "L1", "i1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn truncate_counts_rows() {
        let db = test_db().await;
        let repo = db.todo_items();

        repo.create("u1", "L1", &TodoItem::new("i1", "milk", false)).await.unwrap();
        repo.create("u2", "L7", &TodoItem::new("i2", "eggs", false)).await.unwrap();

        assert_eq!(repo.truncate().await.unwrap(), 2);
        assert!(repo.list("u1", "L1").await.unwrap().is_empty());
    }
}
