// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the SQLite database.
//!
//! Each repository borrows the pool and provides get / list / create /
//! update / delete / truncate for one entity type. Lists and items are
//! always scoped by the owning user.

pub mod api_keys;
pub mod todo_items;
pub mod todo_lists;

pub use api_keys::{ApiKeyRepository, API_KEY_EXISTS};
pub use todo_items::{TodoItemRepository, ITEM_EXISTS};
pub use todo_lists::{TodoListRepository, LIST_EXISTS};
