// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    auth::Auth,
    error::{ApiError, ApiJson, ErrorBody},
    models::{TodoList, TodoListBody},
    state::AppState,
};

pub(crate) fn list_not_found(list_id: &str) -> ApiError {
    ApiError::not_found(format!("List with id {list_id} not found"))
}

#[utoipa::path(
    get,
    path = "/api/v1/lists",
    tag = "Todo Lists",
    responses(
        (status = 200, description = "Lists of the caller, ordered by name", body = [TodoList]),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn get_lists(
    State(state): State<AppState>,
    Auth(principal): Auth,
) -> Result<Json<Vec<TodoList>>, ApiError> {
    let lists = state.db.todo_lists().list(&principal.user_id).await?;
    Ok(Json(lists))
}

#[utoipa::path(
    get,
    path = "/api/v1/lists/{listId}",
    params(
        ("listId" = String, Path, description = "Identifier of the list")
    ),
    tag = "Todo Lists",
    responses(
        (status = 200, body = TodoList),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get_list(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(list_id): Path<String>,
) -> Result<Json<TodoList>, ApiError> {
    state
        .db
        .todo_lists()
        .get(&principal.user_id, &list_id)
        .await?
        .map(Json)
        .ok_or_else(|| list_not_found(&list_id))
}

/// Create a list. A UUID is generated when the body has no `id`.
#[utoipa::path(
    post,
    path = "/api/v1/lists",
    request_body = TodoListBody,
    tag = "Todo Lists",
    responses(
        (status = 200, description = "The created list", body = TodoList),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 409, description = "A list with this id already exists", body = ErrorBody)
    )
)]
pub async fn create_list(
    State(state): State<AppState>,
    Auth(principal): Auth,
    ApiJson(body): ApiJson<TodoListBody>,
) -> Result<Json<TodoList>, ApiError> {
    let id = body.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let list = TodoList::validated(Some(id), body.name)?;

    if state.db.todo_lists().create(&principal.user_id, &list).await? {
        Ok(Json(list))
    } else {
        Err(ApiError::bad_request("Invalid input, failed to insert todo list"))
    }
}

/// Rename a list. The id always comes from the path.
///
/// An unchanged name is reported the same way as a missing list.
#[utoipa::path(
    put,
    path = "/api/v1/lists/{listId}",
    params(
        ("listId" = String, Path, description = "Identifier of the list to update")
    ),
    request_body = TodoListBody,
    tag = "Todo Lists",
    responses(
        (status = 200, description = "The updated list", body = TodoList),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn update_list(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(list_id): Path<String>,
    ApiJson(body): ApiJson<TodoListBody>,
) -> Result<Json<TodoList>, ApiError> {
    let list = TodoList::validated(Some(list_id.clone()), body.name)?;

    if state.db.todo_lists().update(&principal.user_id, &list).await? {
        Ok(Json(list))
    } else {
        Err(list_not_found(&list_id))
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/lists/{listId}",
    params(
        ("listId" = String, Path, description = "Identifier of the list to delete")
    ),
    tag = "Todo Lists",
    responses(
        (status = 200, description = "The deleted list", body = TodoList),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete_list(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(list_id): Path<String>,
) -> Result<Json<TodoList>, ApiError> {
    state
        .db
        .todo_lists()
        .delete(&principal.user_id, &list_id)
        .await?
        .map(Json)
        .ok_or_else(|| list_not_found(&list_id))
}
