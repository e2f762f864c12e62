// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::path::Path;

use axum::{
    http::Method,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        authenticate,
        headers::{RAPID_API_PROXY_SECRET, RAPID_API_SUBSCRIPTION, RAPID_API_USER, TUTORIAL_API_KEY},
    },
    error::ErrorBody,
    models::{TodoItem, TodoItemBody, TodoList, TodoListBody},
    state::AppState,
};

pub mod health;
pub mod items;
pub mod lists;

/// Swagger UI location; lives under the unauthenticated docs prefix.
pub const SWAGGER_UI_PATH: &str = "/api/openapi/ui";

/// OpenAPI document location; lives under the unauthenticated docs prefix.
pub const OPENAPI_JSON_PATH: &str = "/api/openapi.json";

/// Build the application router.
///
/// Everything under `/api` passes through [`authenticate`] (the docs prefix
/// is let through by the middleware itself). Health probes and static web
/// content are public.
pub fn router(state: AppState, web_content_dir: Option<&Path>) -> Router {
    let v1_routes = Router::new()
        .route("/lists", get(lists::get_lists).post(lists::create_list))
        .route(
            "/lists/{listId}",
            get(lists::get_list)
                .put(lists::update_list)
                .delete(lists::delete_list),
        )
        .route(
            "/lists/{listId}/items",
            get(items::get_items).post(items::create_item),
        )
        .route(
            "/lists/{listId}/items/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        );

    let api_routes = Router::new()
        .nest("/api/v1", v1_routes)
        .route("/api/test", get(health::hello))
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let mut app = Router::new()
        .merge(api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness));

    if let Some(dir) = web_content_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer())
}

/// Any origin may call the API; preflight requests are answered here,
/// before authentication.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::DELETE,
            Method::HEAD,
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers(Any)
}

/// Registers the credential headers as OpenAPI security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        for (name, header) in [
            ("api_key", TUTORIAL_API_KEY),
            ("proxy_secret", RAPID_API_PROXY_SECRET),
            ("rapidapi_user", RAPID_API_USER),
            ("rapidapi_subscription", RAPID_API_SUBSCRIPTION),
        ] {
            components.add_security_scheme(
                name,
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(header))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Todo API",
        description = "Manage todo lists and their items. Every caller only sees their own data."
    ),
    paths(
        lists::get_lists,
        lists::get_list,
        lists::create_list,
        lists::update_list,
        lists::delete_list,
        items::get_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        health::hello,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            TodoList,
            TodoListBody,
            TodoItem,
            TodoItemBody,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    security(
        ("api_key" = []),
        ("proxy_secret" = [], "rapidapi_user" = [], "rapidapi_subscription" = [])
    ),
    tags(
        (name = "Todo Lists", description = "Todo list management"),
        (name = "Todo Items", description = "Items inside a todo list"),
        (name = "Health", description = "Liveness and smoke checks")
    )
)]
pub struct ApiDoc;
