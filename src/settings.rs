// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Settings
//!
//! Settings that may change while the server is running, currently the
//! expected RapidAPI proxy secret.
//!
//! ## Strategy
//!
//! A single [`SettingsRefresher`] task owns the `watch` sender. Every
//! `interval` it fetches a TOML document from the configured URL:
//!
//! ```toml
//! rapidapi_proxy_secret = "..."
//! ```
//!
//! and publishes a new snapshot only when the values differ from the current
//! one. Fetch or parse failures keep the previous snapshot. Request handlers
//! read the latest snapshot through a cloned [`SettingsHandle`].
//!
//! ## Shutdown
//!
//! The refresher stops when its `CancellationToken` is cancelled.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Timeout for a single settings fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Snapshot of the settings in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub proxy_secret: String,
}

/// Remote settings document. Absent keys leave the current value in place.
#[derive(Debug, Default, Deserialize)]
struct SettingsDocument {
    rapidapi_proxy_secret: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to fetch settings: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Read-only view of the current settings.
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    rx: watch::Receiver<Arc<RuntimeSettings>>,
}

impl SettingsHandle {
    /// Handle whose settings never change.
    pub fn fixed(proxy_secret: impl Into<String>) -> Self {
        let (_tx, rx) = watch::channel(Arc::new(RuntimeSettings {
            proxy_secret: proxy_secret.into(),
        }));
        Self { rx }
    }

    /// The latest published snapshot.
    pub fn current(&self) -> Arc<RuntimeSettings> {
        self.rx.borrow().clone()
    }
}

/// Background task that polls the remote settings document.
pub struct SettingsRefresher {
    client: reqwest::Client,
    url: Url,
    interval: Duration,
    tx: watch::Sender<Arc<RuntimeSettings>>,
}

impl SettingsRefresher {
    /// Create a refresher seeded with `initial`, and the handle that observes it.
    pub fn new(
        url: Url,
        interval: Duration,
        initial: RuntimeSettings,
    ) -> Result<(Self, SettingsHandle), SettingsError> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        let (tx, rx) = watch::channel(Arc::new(initial));

        let refresher = Self {
            client,
            url,
            interval,
            tx,
        };
        Ok((refresher, SettingsHandle { rx }))
    }

    /// Parse a settings document and publish it if anything changed.
    ///
    /// Returns whether a new snapshot was published.
    pub fn apply_document(&self, document: &str) -> Result<bool, SettingsError> {
        let parsed: SettingsDocument = toml::from_str(document)?;
        let Some(proxy_secret) = parsed.rapidapi_proxy_secret else {
            return Ok(false);
        };

        let next = RuntimeSettings { proxy_secret };
        Ok(self.tx.send_if_modified(|current| {
            if **current == next {
                false
            } else {
                *current = Arc::new(next);
                true
            }
        }))
    }

    /// Fetch the document once and apply it.
    pub async fn refresh(&self) -> Result<bool, SettingsError> {
        let body = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        self.apply_document(&body)
    }

    /// Run the refresh loop until the cancellation token is triggered.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            url = %self.url,
            "Settings refresher started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Settings refresher shutting down");
                    return;
                }
            }

            match self.refresh().await {
                Ok(true) => info!("Reloading settings since configuration changed"),
                Ok(false) => debug!("Settings unchanged"),
                Err(e) => warn!(error = %e, "Settings refresh failed, keeping current values"),
            }
        }
    }
}
