// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response data structures used by the REST API, plus the
//! validation that turns a request body into a storable entity. Todo entities
//! derive `Serialize`, `Deserialize`, and `ToSchema` for JSON handling and
//! OpenAPI documentation, and `sqlx::FromRow` for reading them back. API keys
//! never cross the HTTP boundary.
//!
//! ## Model Categories
//!
//! - **Todo lists**: named lists owned by a single user
//! - **Todo items**: tasks inside one of the user's lists
//! - **API keys**: provisioned credentials for direct access

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Subscription;

/// Maximum length of list and item identifiers, in characters.
pub const MAX_ID_CHARS: usize = 36;

/// Maximum length of list names and item tasks, in characters.
pub const MAX_TEXT_CHARS: usize = 200;

// =============================================================================
// Validation
// =============================================================================

/// One or more field constraints were violated by a request body.
///
/// Displays as the sorted violation messages joined by `"; "`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<String>,
}

impl ValidationError {
    fn new(mut violations: Vec<String>) -> Self {
        violations.sort();
        Self { violations }
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.violations.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Record violations for one required text field.
///
/// A missing field only reports "cannot be empty"; an empty string also
/// fails the size constraint.
fn check_text(violations: &mut Vec<String>, label: &str, value: Option<&str>, max: usize) {
    let Some(value) = value else {
        violations.push(format!("{label} cannot be empty"));
        return;
    };

    let chars = value.chars().count();
    if chars == 0 {
        violations.push(format!("{label} cannot be empty"));
    }
    if chars == 0 || chars > max {
        violations.push(format!(
            "{label} must have at least 1 and no more than {max} characters"
        ));
    }
}

// =============================================================================
// Todo Lists
// =============================================================================

/// A named todo list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, sqlx::FromRow)]
pub struct TodoList {
    /// List identifier, unique per user (1 to 36 characters).
    pub id: String,
    /// Display name (1 to 200 characters).
    pub name: String,
}

impl TodoList {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Build a list from possibly missing fields, reporting every violation.
    pub fn validated(id: Option<String>, name: Option<String>) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();
        check_text(&mut violations, "Todo list id", id.as_deref(), MAX_ID_CHARS);
        check_text(&mut violations, "Todo list name", name.as_deref(), MAX_TEXT_CHARS);

        match (id, name) {
            (Some(id), Some(name)) if violations.is_empty() => Ok(Self { id, name }),
            _ => Err(ValidationError::new(violations)),
        }
    }
}

/// Request body for creating or replacing a todo list.
///
/// `id` is optional on create (a UUID is generated) and ignored on update,
/// where the path parameter wins.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TodoListBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Todo Items
// =============================================================================

/// A single task inside a todo list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, sqlx::FromRow)]
pub struct TodoItem {
    /// Item identifier, unique within its list (1 to 36 characters).
    pub id: String,
    /// Task description (1 to 200 characters).
    pub task: String,
    /// Whether the task is complete.
    pub done: bool,
}

impl TodoItem {
    pub fn new(id: impl Into<String>, task: impl Into<String>, done: bool) -> Self {
        Self {
            id: id.into(),
            task: task.into(),
            done,
        }
    }

    /// Build an item from possibly missing fields, reporting every violation.
    pub fn validated(
        id: Option<String>,
        task: Option<String>,
        done: bool,
    ) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();
        check_text(&mut violations, "Todo item id", id.as_deref(), MAX_ID_CHARS);
        check_text(&mut violations, "Todo item task", task.as_deref(), MAX_TEXT_CHARS);

        match (id, task) {
            (Some(id), Some(task)) if violations.is_empty() => Ok(Self { id, task, done }),
            _ => Err(ValidationError::new(violations)),
        }
    }
}

/// Request body for creating or replacing a todo item.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TodoItemBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub done: bool,
}

// =============================================================================
// API Keys
// =============================================================================

/// A provisioned API key and the identity it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    /// Opaque key value sent in `X-Tutorial-Api-Key`.
    pub apikey: String,
    pub user_id: String,
    pub subscription: Subscription,
}

impl ApiKey {
    pub fn new(
        apikey: impl Into<String>,
        user_id: impl Into<String>,
        subscription: Subscription,
    ) -> Self {
        Self {
            apikey: apikey.into(),
            user_id: user_id.into(),
            subscription,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn valid_list_passes() {
        let list = TodoList::validated(s("L1"), s("Home")).unwrap();
        assert_eq!(list, TodoList::new("L1", "Home"));
    }

    #[test]
    fn missing_name_reports_only_empty() {
        let err = TodoList::validated(s("L1"), None).unwrap_err();
        assert_eq!(err.to_string(), "Todo list name cannot be empty");
    }

    #[test]
    fn empty_name_reports_both_messages_sorted() {
        let err = TodoList::validated(s("L1"), s("")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Todo list name cannot be empty; \
             Todo list name must have at least 1 and no more than 200 characters"
        );
    }

    #[test]
    fn multiple_fields_are_all_reported() {
        let err = TodoList::validated(s(&"x".repeat(37)), None).unwrap_err();
        assert_eq!(
            err.violations(),
            &[
                "Todo list id must have at least 1 and no more than 36 characters".to_string(),
                "Todo list name cannot be empty".to_string(),
            ]
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // 36 multi-byte characters are still within the id limit
        let id = "é".repeat(36);
        assert!(TodoList::validated(Some(id), s("Home")).is_ok());

        let name = "ü".repeat(201);
        let err = TodoList::validated(s("L1"), Some(name)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Todo list name must have at least 1 and no more than 200 characters"
        );
    }

    #[test]
    fn item_validation_messages() {
        let err = TodoItem::validated(s(""), s("task"), false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Todo item id cannot be empty; \
             Todo item id must have at least 1 and no more than 36 characters"
        );

        let err = TodoItem::validated(s("i1"), None, true).unwrap_err();
        assert_eq!(err.to_string(), "Todo item task cannot be empty");

        let item = TodoItem::validated(s("i1"), s(&"t".repeat(200)), true).unwrap();
        assert!(item.done);
    }

    #[test]
    fn item_body_defaults_done_to_false() {
        let body: TodoItemBody = serde_json::from_str(r#"{"id":"i1","task":"milk"}"#).unwrap();
        assert!(!body.done);
        assert_eq!(body.task.as_deref(), Some("milk"));
    }

    #[test]
    fn entities_serialize_with_exact_field_names() {
        let list = serde_json::to_string(&TodoList::new("L1", "Home")).unwrap();
        assert_eq!(list, r#"{"id":"L1","name":"Home"}"#);

        let item = serde_json::to_string(&TodoItem::new("i1", "milk", false)).unwrap();
        assert_eq!(item, r#"{"id":"i1","task":"milk","done":false}"#);
    }
}
