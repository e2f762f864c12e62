// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal.user_id scopes every storage call
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{resolve_principal, AuthError, Principal};
use crate::state::AppState;

/// Extractor for the authenticated principal.
///
/// Uses the principal stored by the `authenticate` middleware when present,
/// and otherwise resolves it from the request headers itself.
pub struct Auth(pub Principal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>().cloned() {
            return Ok(Auth(principal));
        }

        let settings = state.settings.current();
        let principal =
            resolve_principal(&parts.headers, &settings.proxy_secret, &state.db.api_keys()).await?;

        parts.extensions.insert(principal.clone());
        Ok(Auth(principal))
    }
}
