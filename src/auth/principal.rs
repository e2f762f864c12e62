// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated principal representation.

use super::subscription::Subscription;
use crate::models::ApiKey;

/// The identity attached to an authenticated request.
///
/// This is the primary type used throughout the application to represent
/// the caller. `user_id` is the tenancy boundary: every stored list and item
/// is scoped by it.
///
/// Two principals are equal only when all three fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    /// Proxy secret or API key value the caller presented.
    /// Only ever compared for equality.
    pub credential_secret: String,

    /// Opaque user identifier.
    pub user_id: String,

    /// Subscription tier of the caller.
    pub subscription: Subscription,
}

impl Principal {
    pub fn new(
        credential_secret: impl Into<String>,
        user_id: impl Into<String>,
        subscription: Subscription,
    ) -> Self {
        Self {
            credential_secret: credential_secret.into(),
            user_id: user_id.into(),
            subscription,
        }
    }

    /// Build the principal for a caller that presented a stored API key.
    pub fn from_api_key(key: ApiKey) -> Self {
        Self {
            credential_secret: key.apikey,
            user_id: key.user_id,
            subscription: key.subscription,
        }
    }
}
