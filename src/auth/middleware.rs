// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied to the whole `/api` router subtree. Resolves the caller, stores
//! the [`Principal`] in the request extensions for the [`Auth`] extractor, and
//! writes one access log line per admitted request. Rejected requests are
//! only logged at warn.
//!
//! ```rust,ignore
//! let api = Router::new()
//!     .nest("/api", routes)
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), authenticate));
//! ```
//!
//! [`Auth`]: super::Auth

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use super::headers::is_docs_path;
use super::{resolve_principal, Principal};
use crate::state::AppState;

/// Placeholder user in the access log when no principal was resolved.
const ANONYMOUS: &str = "?";

/// Authentication middleware function.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    if is_docs_path(&path) {
        info!(target: "access_log", "{ANONYMOUS} => {method} {path}");
        return next.run(request).await;
    }

    let settings = state.settings.current();
    let keys = state.db.api_keys();

    match resolve_principal(request.headers(), &settings.proxy_secret, &keys).await {
        Ok(principal) => {
            info!(target: "access_log", "{} => {method} {path}", principal.user_id);
            request.extensions_mut().insert::<Principal>(principal);
            next.run(request).await
        }
        Err(err) => {
            warn!(error = %err, %method, %path, "Request rejected by authentication");
            err.into_response()
        }
    }
}
