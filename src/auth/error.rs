// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::headers::RAPID_API_SUBSCRIPTION;
use crate::error::ApiError;
use crate::storage::StorageError;

/// Authentication error type.
///
/// Every credential failure is a 401 whose message is returned verbatim to
/// the caller. A storage failure while looking up an API key is a 500.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// `X-Tutorial-Api-Key` did not match a stored key
    #[error("Invalid API Key")]
    InvalidApiKey,

    /// A required proxy header is absent
    #[error("Missing security header: {0}")]
    MissingHeader(&'static str),

    /// Subscription header absent or not a known tier
    #[error("Missing or invalid security header: {}", RAPID_API_SUBSCRIPTION)]
    InvalidSubscription,

    /// Proxy secret header does not equal the configured secret
    #[error("Invalid proxy secret")]
    InvalidProxySecret,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidApiKey
            | AuthError::MissingHeader(_)
            | AuthError::InvalidSubscription
            | AuthError::InvalidProxySecret => StatusCode::UNAUTHORIZED,
            AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
