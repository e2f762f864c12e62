// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Subscription tiers carried on every principal.

/// Subscription tier of the caller.
///
/// Delivered by the RapidAPI proxy in `X-RapidAPI-Subscription`, or stored
/// alongside a provisioned API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    Basic,
    Pro,
    Ultra,
    Mega,
    Custom,
}

impl Subscription {
    /// Every tier, in declaration order.
    pub const ALL: [Subscription; 5] = [
        Subscription::Basic,
        Subscription::Pro,
        Subscription::Ultra,
        Subscription::Mega,
        Subscription::Custom,
    ];

    /// Parse a tier name (case-insensitive).
    ///
    /// Returns `None` for anything that is not one of the fixed tier names,
    /// including surrounding whitespace.
    pub fn from_str(s: &str) -> Option<Subscription> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s))
    }

    /// Canonical upper-case name, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Subscription::Basic => "BASIC",
            Subscription::Pro => "PRO",
            Subscription::Ultra => "ULTRA",
            Subscription::Mega => "MEGA",
            Subscription::Custom => "CUSTOM",
        }
    }
}

impl std::fmt::Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
