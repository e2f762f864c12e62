// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Todo list repository.
//!
//! Lists are keyed by `(user_id, id)`: two users may each own a list with the
//! same id without affecting one another.

use sqlx::SqlitePool;

use super::super::database::{commit_if_affected, StorageError, StorageResult};
use crate::models::TodoList;

/// Message carried by [`StorageError::Conflict`] when the id is taken.
pub const LIST_EXISTS: &str = "Todo list already exists";

/// Repository for todo lists.
pub struct TodoListRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TodoListRepository<'a> {
    /// Create a new TodoListRepository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get one of the user's lists.
    pub async fn get(&self, user_id: &str, id: &str) -> StorageResult<Option<TodoList>> {
        sqlx::query_as::<_, TodoList>("SELECT id, name FROM todo_lists WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(StorageError::internal("fetch list"))
    }

    /// All of the user's lists, ordered by name.
    pub async fn list(&self, user_id: &str) -> StorageResult<Vec<TodoList>> {
        sqlx::query_as::<_, TodoList>(
            "SELECT id, name FROM todo_lists WHERE user_id = ? ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
        .map_err(StorageError::internal("fetch lists"))
    }

    /// Insert a new list. Fails with [`StorageError::Conflict`] when the user
    /// already has a list with this id, whatever its name.
    pub async fn create(&self, user_id: &str, list: &TodoList) -> StorageResult<bool> {
        const OP: &str = "create list";

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result = sqlx::query("INSERT INTO todo_lists (user_id, id, name) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(&list.id)
            .bind(&list.name)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::on_insert(OP, LIST_EXISTS))?;

        commit_if_affected(tx, result.rows_affected(), OP).await
    }

    /// Rename a list.
    ///
    /// Returns `false` both when the list does not exist and when the stored
    /// name already equals `list.name`.
    pub async fn update(&self, user_id: &str, list: &TodoList) -> StorageResult<bool> {
        const OP: &str = "update list";

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result = sqlx::query(
            "UPDATE todo_lists SET name = ? WHERE user_id = ? AND id = ? AND name != ?",
        )
        .bind(&list.name)
        .bind(user_id)
        .bind(&list.id)
        .bind(&list.name)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::internal(OP))?;

        commit_if_affected(tx, result.rows_affected(), OP).await
    }

    /// Delete a list, returning it as it was before deletion.
    pub async fn delete(&self, user_id: &str, id: &str) -> StorageResult<Option<TodoList>> {
        const OP: &str = "delete list";

        let Some(existing) = self.get(user_id, id).await? else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result = sqlx::query("DELETE FROM todo_lists WHERE user_id = ? AND id = ?")
            .bind(user_id)
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

    /// Remove every list of every user. Returns the number removed.
    pub async fn truncate(&self) -> StorageResult<u64> {
        const OP: &str = "truncate todo lists";

        let mut tx = self.pool.begin().await.map_err(StorageError::internal(OP))?;
        let result = sqlx::query("DELETE FROM todo_lists")
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
        let repo = db.todo_lists();

        assert!(repo.create("u1", &TodoList::new("L1", "Home")).await.unwrap());

        let found = repo.get("u1", "L1").await.unwrap();
        assert_eq!(found, Some(TodoList::new("L1", "Home")));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let db = test_db().await;
        assert_eq!(db.todo_lists().get("u1", "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn lists_are_isolated_per_user() {
        let db = test_db().await;
        let repo = db.todo_lists();

        assert!(repo.create("u1", &TodoList::new("L1", "Home")).await.unwrap());
        assert!(repo.create("u2", &TodoList::new("L1", "Work")).await.unwrap());

        assert_eq!(repo.get("u1", "L1").await.unwrap().unwrap().name, "Home");
        assert_eq!(repo.get("u2", "L1").await.unwrap().unwrap().name, "Work");
        assert_eq!(repo.get("u3", "L1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_id_conflicts_regardless_of_name() {
        let db = test_db().await;
        let repo = db.todo_lists();

        repo.create("u1", &TodoList::new("L1", "Home")).await.unwrap();

        let same = repo.create("u1", &TodoList::new("L1", "Home")).await;
        assert!(matches!(same, Err(StorageError::Conflict(LIST_EXISTS))));

        let renamed = repo.create("u1", &TodoList::new("L1", "Other")).await;
        assert!(matches!(renamed, Err(StorageError::Conflict(LIST_EXISTS))));

        // The original row is untouched
        assert_eq!(repo.get("u1", "L1").await.unwrap().unwrap().name, "Home");
    }

    #[tokio::test]
    async fn list_orders_by_name_and_filters_by_user() {
        let db = test_db().await;
        let repo = db.todo_lists();

        repo.create("u1", &TodoList::new("a", "Zoo")).await.unwrap();
        repo.create("u1", &TodoList::new("b", "Apples")).await.unwrap();
        repo.create("u1", &TodoList::new("c", "Mail")).await.unwrap();
        repo.create("u2", &TodoList::new("d", "Bank")).await.unwrap();

        let names: Vec<String> = repo
            .list("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Apples", "Mail", "Zoo"]);

        assert!(repo.list("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_only_when_name_differs() {
        let db = test_db().await;
        let repo = db.todo_lists();

        repo.create("u1", &TodoList::new("L1", "Home")).await.unwrap();

        assert!(!repo.update("u1", &TodoList::new("L1", "Home")).await.unwrap());
        assert!(repo.update("u1", &TodoList::new("L1", "House")).await.unwrap());
        assert_eq!(repo.get("u1", "L1").await.unwrap().unwrap().name, "House");

        // Missing list and another user's list look the same as a no-op
        assert!(!repo.update("u1", &TodoList::new("L9", "X")).await.unwrap());
        assert!(!repo.update("u2", &TodoList::new("L1", "X")).await.unwrap());
    }

    #[tokio::test]
    async fn delete_returns_snapshot() {
        let db = test_db().await;
        let repo = db.todo_lists();

        repo.create("u1", &TodoList::new("L1", "Home")).await.unwrap();

        assert_eq!(repo.delete("u2", "L1").await.unwrap(), None);

        let deleted = repo.delete("u1", "L1").await.unwrap();
        assert_eq!(deleted, Some(TodoList::new("L1", "Home")));
        assert_eq!(repo.get("u1", "L1").await.unwrap(), None);
        assert_eq!(repo.delete("u1", "L1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn truncate_removes_all_users() {
        let db = test_db().await;
        let repo = db.todo_lists();

        repo.create("u1", &TodoList::new("L1", "Home")).await.unwrap();
        repo.create("u2", &TodoList::new("L1", "Work")).await.unwrap();

        assert_eq!(repo.truncate().await.unwrap(), 2);
        assert_eq!(repo.truncate().await.unwrap(), 0);
        assert!(repo.list("u1").await.unwrap().is_empty());
    }
}
