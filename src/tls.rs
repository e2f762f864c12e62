// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTPS setup for `axum-server` with rustls and the ring provider.

use std::path::PathBuf;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsPaths;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Failed to load TLS certificate {cert} / key {key}: {source}")]
    Load {
        cert: PathBuf,
        key: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Install the ring crypto provider for rustls.
///
/// Must run before any TLS configuration is built. Calling it again is a
/// no-op.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Build the server TLS configuration from PEM files.
pub async fn load_rustls_config(paths: &TlsPaths) -> Result<RustlsConfig, TlsError> {
    RustlsConfig::from_pem_file(&paths.cert, &paths.key)
        .await
        .map_err(|source| TlsError::Load {
            cert: paths.cert.clone(),
            key: paths.key.clone(),
            source,
        })
}
