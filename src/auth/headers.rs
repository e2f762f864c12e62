// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Security header names and case-insensitive header lookup.

use std::borrow::Cow;

use axum::http::HeaderMap;

/// API key issued directly by this service.
pub const TUTORIAL_API_KEY: &str = "X-Tutorial-Api-Key";

/// Shared secret the RapidAPI proxy adds to every forwarded request.
pub const RAPID_API_PROXY_SECRET: &str = "X-RapidAPI-Proxy-Secret";

/// Caller's user identifier, as seen by the proxy.
pub const RAPID_API_USER: &str = "X-RapidAPI-User";

/// Caller's subscription tier, as seen by the proxy.
pub const RAPID_API_SUBSCRIPTION: &str = "X-RapidAPI-Subscription";

/// Requests under this path prefix are served without authentication.
pub const DOCS_PATH_PREFIX: &str = "/api/openapi";

/// Look up a header value by name, ignoring ASCII case.
///
/// Walks the whole multimap instead of relying on the map's own key
/// normalisation. The first matching value wins. Presence alone decides:
/// bytes outside visible ASCII are decoded as UTF-8, with invalid sequences
/// replaced, so a header is never dropped for its content.
pub fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers
        .iter()
        .find(|(key, _)| key.as_str().eq_ignore_ascii_case(name))
        .map(|(_, value)| String::from_utf8_lossy(value.as_bytes()))
}

/// Whether a request path is part of the self-describing API documentation.
pub fn is_docs_path(path: &str) -> bool {
    path.starts_with(DOCS_PATH_PREFIX)
}
