// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Turns request headers into an authenticated [`Principal`].
//!
//! ## Auth Flow
//!
//! 1. Direct callers send `X-Tutorial-Api-Key`, looked up in the `api_keys`
//!    table.
//! 2. Callers routed through the RapidAPI proxy arrive with
//!    `X-RapidAPI-Proxy-Secret`, `X-RapidAPI-User` and
//!    `X-RapidAPI-Subscription`; the secret must match the configured one.
//! 3. The principal is attached to the request; `user_id` scopes all data.
//!
//! ## Security
//!
//! - Every `/api` endpoint requires authentication except the OpenAPI
//!   documentation under `/api/openapi`
//! - Failures terminate the request with 401 before any handler runs

pub mod error;
pub mod extractor;
pub mod headers;
pub mod middleware;
pub mod principal;
pub mod resolver;
pub mod subscription;

pub use error::AuthError;
pub use extractor::Auth;
pub use middleware::authenticate;
pub use principal::Principal;
pub use resolver::{resolve_principal, ApiKeyLookup};
pub use subscription::Subscription;
