// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Relational persistence on SQLite through `sqlx`.
//!
//! ## Tables
//!
//! ```text
//! api_keys    (apikey PK, user_id, subscription)
//! todo_lists  (user_id, id, name)            PK (user_id, id)
//! todo_items  (user_id, list_id, id, task, done)
//!                                            PK (user_id, list_id, id)
//! ```
//!
//! ## Semantics
//!
//! - `create` returns a `Conflict` error when the uniqueness key is taken
//! - `update` returns `false` when no row matched *or* nothing changed
//! - `delete` returns the row as it was before deletion
//! - Failures other than conflicts surface as `Failed to <op>: <cause>`
//!
//! Migrations under `migrations/` are embedded and run on connect.

pub mod database;
pub mod repository;

pub use database::{is_unique_violation, Database, StorageError, StorageResult};
pub use repository::{
    ApiKeyRepository, TodoItemRepository, TodoListRepository, API_KEY_EXISTS, ITEM_EXISTS,
    LIST_EXISTS,
};
