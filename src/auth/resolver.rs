// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Principal resolution from request headers.
//!
//! ## Resolution order
//!
//! 1. `X-Tutorial-Api-Key` present: the key must exist in storage, and the
//!    stored user and tier become the principal.
//! 2. Otherwise the three RapidAPI headers are required, checked in order
//!    proxy secret, user, subscription. The first missing one is reported.
//! 3. The proxy secret must equal the configured secret exactly.

use std::future::Future;

use axum::http::HeaderMap;

use super::headers::{
    header_value, RAPID_API_PROXY_SECRET, RAPID_API_SUBSCRIPTION, RAPID_API_USER,
    TUTORIAL_API_KEY,
};
use super::{AuthError, Principal, Subscription};
use crate::models::ApiKey;
use crate::storage::StorageResult;

/// Source of provisioned API keys.
pub trait ApiKeyLookup {
    fn lookup(&self, key: &str) -> impl Future<Output = StorageResult<Option<ApiKey>>> + Send;
}

/// Resolve the caller from `headers`.
pub async fn resolve_principal<L>(
    headers: &HeaderMap,
    expected_secret: &str,
    keys: &L,
) -> Result<Principal, AuthError>
where
    L: ApiKeyLookup + Sync,
{
    if let Some(apikey) = header_value(headers, TUTORIAL_API_KEY) {
        return keys
            .lookup(&apikey)
            .await?
            .map(Principal::from_api_key)
            .ok_or(AuthError::InvalidApiKey);
    }

    let proxy_secret = header_value(headers, RAPID_API_PROXY_SECRET)
        .ok_or(AuthError::MissingHeader(RAPID_API_PROXY_SECRET))?;
    let user = header_value(headers, RAPID_API_USER)
        .ok_or(AuthError::MissingHeader(RAPID_API_USER))?;
    let subscription = header_value(headers, RAPID_API_SUBSCRIPTION)
        .and_then(|tier| Subscription::from_str(&tier))
        .ok_or(AuthError::InvalidSubscription)?;

    if proxy_secret != expected_secret {
        return Err(AuthError::InvalidProxySecret);
    }

    Ok(Principal::new(proxy_secret, user, subscription))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use axum::http::{HeaderName, HeaderValue};
    use std::collections::HashMap;

    struct StubKeys(HashMap<String, ApiKey>);

    impl StubKeys {
        fn with(keys: &[ApiKey]) -> Self {
            Self(keys.iter().map(|k| (k.apikey.clone(), k.clone())).collect())
        }
    }

    impl ApiKeyLookup for StubKeys {
        async fn lookup(&self, key: &str) -> StorageResult<Option<ApiKey>> {
            Ok(self.0.get(key).cloned())
        }
    }

    struct FailingKeys;

    impl ApiKeyLookup for FailingKeys {
        async fn lookup(&self, _key: &str) -> StorageResult<Option<ApiKey>> {
            Err(StorageError::Internal {
                operation: "fetch api key",
                source: sqlx::Error::PoolClosed,
            })
        }
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            let name = HeaderName::from_bytes(name.as_bytes()).unwrap();
            map.append(name, HeaderValue::from_static(value));
        }
        map
    }

    fn no_keys() -> StubKeys {
        StubKeys::with(&[])
    }

    #[tokio::test]
    async fn proxy_headers_produce_principal() {
        let h = headers(&[
            ("x-rapidapi-proxy-secret", "s"),
            ("x-rapidapi-user", "u1"),
            ("x-rapidapi-subscription", "basic"),
        ]);

        let principal = resolve_principal(&h, "s", &no_keys()).await.unwrap();
        assert_eq!(principal, Principal::new("s", "u1", Subscription::Basic));
    }

    #[tokio::test]
    async fn header_names_are_case_insensitive() {
        let h = headers(&[
            ("X-RAPIDAPI-PROXY-SECRET", "s"),
            ("X-RapidAPI-User", "u1"),
            ("x-rapidapi-SUBSCRIPTION", "MEGA"),
        ]);

        let principal = resolve_principal(&h, "s", &no_keys()).await.unwrap();
        assert_eq!(principal.subscription, Subscription::Mega);
    }

    #[tokio::test]
    async fn no_headers_reports_proxy_secret_first() {
        let err = resolve_principal(&HeaderMap::new(), "s", &no_keys())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing security header: X-RapidAPI-Proxy-Secret");
    }

    #[tokio::test]
    async fn missing_user_reported_before_subscription() {
        let h = headers(&[("x-rapidapi-proxy-secret", "s")]);
        let err = resolve_principal(&h, "s", &no_keys()).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing security header: X-RapidAPI-User");
    }

    #[tokio::test]
    async fn unknown_subscription_is_rejected() {
        let h = headers(&[
            ("x-rapidapi-proxy-secret", "s"),
            ("x-rapidapi-user", "u1"),
            ("x-rapidapi-subscription", "GOLD"),
        ]);
        let err = resolve_principal(&h, "s", &no_keys()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidSubscription));
    }

    #[tokio::test]
    async fn header_checks_run_before_secret_comparison() {
        let h = headers(&[("x-rapidapi-proxy-secret", "wrong"), ("x-rapidapi-user", "u1")]);
        let err = resolve_principal(&h, "s", &no_keys()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidSubscription));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let h = headers(&[
            ("x-rapidapi-proxy-secret", "S"),
            ("x-rapidapi-user", "u1"),
            ("x-rapidapi-subscription", "PRO"),
        ]);
        let err = resolve_principal(&h, "s", &no_keys()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidProxySecret));
    }

    #[tokio::test]
    async fn api_key_resolves_stored_identity() {
        let keys = StubKeys::with(&[ApiKey::new("k1", "u7", Subscription::Ultra)]);
        let h = headers(&[("x-tutorial-api-key", "k1")]);

        let principal = resolve_principal(&h, "s", &keys).await.unwrap();
        assert_eq!(principal, Principal::new("k1", "u7", Subscription::Ultra));
    }

    #[tokio::test]
    async fn api_key_takes_precedence_over_proxy_headers() {
        let keys = StubKeys::with(&[ApiKey::new("k1", "u7", Subscription::Ultra)]);
        let h = headers(&[
            ("x-tutorial-api-key", "k1"),
            ("x-rapidapi-proxy-secret", "s"),
            ("x-rapidapi-user", "u1"),
            ("x-rapidapi-subscription", "BASIC"),
        ]);

        let principal = resolve_principal(&h, "s", &keys).await.unwrap();
        assert_eq!(principal.user_id, "u7");
    }

    #[tokio::test]
    async fn unknown_api_key_does_not_fall_back() {
        let h = headers(&[
            ("x-tutorial-api-key", "nope"),
            ("x-rapidapi-proxy-secret", "s"),
            ("x-rapidapi-user", "u1"),
            ("x-rapidapi-subscription", "BASIC"),
        ]);

        let err = resolve_principal(&h, "s", &no_keys()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid API Key");
    }

    #[tokio::test]
    async fn non_ascii_api_key_is_still_authoritative() {
        let mut h = headers(&[
            ("x-rapidapi-proxy-secret", "s"),
            ("x-rapidapi-user", "u1"),
            ("x-rapidapi-subscription", "BASIC"),
        ]);
        h.append(
            HeaderName::from_static("x-tutorial-api-key"),
            HeaderValue::from_bytes(b"k\xE9").unwrap(),
        );

        let err = resolve_principal(&h, "s", &no_keys()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidApiKey));
    }

    #[tokio::test]
    async fn non_ascii_user_is_accepted() {
        let mut h = headers(&[
            ("x-rapidapi-proxy-secret", "s"),
            ("x-rapidapi-subscription", "PRO"),
        ]);
        h.append(
            HeaderName::from_static("x-rapidapi-user"),
            HeaderValue::from_bytes("josé".as_bytes()).unwrap(),
        );

        let principal = resolve_principal(&h, "s", &no_keys()).await.unwrap();
        assert_eq!(principal, Principal::new("s", "josé", Subscription::Pro));
    }

    #[tokio::test]
    async fn lookup_failure_propagates() {
        let h = headers(&[("x-tutorial-api-key", "k1")]);
        let err = resolve_principal(&h, "s", &FailingKeys).await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
    }
}
