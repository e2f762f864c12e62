// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::lists::list_not_found;
use crate::{
    auth::{Auth, Principal},
    error::{ApiError, ApiJson, ErrorBody},
    models::{TodoItem, TodoItemBody},
    state::AppState,
};

fn item_not_found(list_id: &str, id: &str) -> ApiError {
    ApiError::not_found(format!(
        "Item with id {id} not found in list with id {list_id}"
    ))
}

/// 404 unless the caller owns a list with this id.
async fn require_list(state: &AppState, principal: &Principal, list_id: &str) -> Result<(), ApiError> {
    match state.db.todo_lists().get(&principal.user_id, list_id).await? {
        Some(_) => Ok(()),
        None => Err(list_not_found(list_id)),
    }
}

/// Items of a list, open items first. The list itself is not checked, so an
/// unknown list yields an empty array.
#[utoipa::path(
    get,
    path = "/api/v1/lists/{listId}/items",
    params(
        ("listId" = String, Path, description = "Identifier of the parent list")
    ),
    tag = "Todo Items",
    responses(
        (status = 200, body = [TodoItem]),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn get_items(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(list_id): Path<String>,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let items = state
        .db
        .todo_items()
        .list(&principal.user_id, &list_id)
        .await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/lists/{listId}/items/{id}",
    params(
        ("listId" = String, Path, description = "Identifier of the parent list"),
        ("id" = String, Path, description = "Identifier of the item")
    ),
    tag = "Todo Items",
    responses(
        (status = 200, body = TodoItem),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path((list_id, id)): Path<(String, String)>,
) -> Result<Json<TodoItem>, ApiError> {
    state
        .db
        .todo_items()
        .get(&principal.user_id, &list_id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| item_not_found(&list_id, &id))
}

#[utoipa::path(
    post,
    path = "/api/v1/lists/{listId}/items",
    params(
        ("listId" = String, Path, description = "Identifier of the parent list")
    ),
    request_body = TodoItemBody,
    tag = "Todo Items",
    responses(
        (status = 200, description = "The created item", body = TodoItem),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 404, description = "The list does not exist", body = ErrorBody),
        (status = 409, description = "An item with this id already exists", body = ErrorBody)
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(list_id): Path<String>,
    ApiJson(body): ApiJson<TodoItemBody>,
) -> Result<Json<TodoItem>, ApiError> {
    let id = body.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let item = TodoItem::validated(Some(id), body.task, body.done)?;

    require_list(&state, &principal, &list_id).await?;

    if state
        .db
        .todo_items()
        .create(&principal.user_id, &list_id, &item)
        .await?
    {
        Ok(Json(item))
    } else {
        Err(ApiError::bad_request("Invalid input, failed to insert todo item"))
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/lists/{listId}/items/{id}",
    params(
        ("listId" = String, Path, description = "Identifier of the parent list"),
        ("id" = String, Path, description = "Identifier of the item to update")
    ),
    request_body = TodoItemBody,
    tag = "Todo Items",
    responses(
        (status = 200, description = "The updated item", body = TodoItem),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path((list_id, id)): Path<(String, String)>,
    ApiJson(body): ApiJson<TodoItemBody>,
) -> Result<Json<TodoItem>, ApiError> {
    let item = TodoItem::validated(Some(id.clone()), body.task, body.done)?;

    require_list(&state, &principal, &list_id).await?;

    if state
        .db
        .todo_items()
        .update(&principal.user_id, &list_id, &item)
        .await?
    {
        Ok(Json(item))
    } else {
        Err(item_not_found(&list_id, &id))
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/lists/{listId}/items/{id}",
    params(
        ("listId" = String, Path, description = "Identifier of the parent list"),
        ("id" = String, Path, description = "Identifier of the item to delete")
    ),
    tag = "Todo Items",
    responses(
        (status = 200, description = "The deleted item", body = TodoItem),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path((list_id, id)): Path<(String, String)>,
) -> Result<Json<TodoItem>, ApiError> {
    state
        .db
        .todo_items()
        .delete(&principal.user_id, &list_id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| item_not_found(&list_id, &id))
}
