// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use todo_api::{
    api::router,
    config::{ConfigError, ServerConfig, LOG_FORMAT_ENV},
    settings::{RuntimeSettings, SettingsError, SettingsHandle, SettingsRefresher},
    state::AppState,
    storage::{Database, StorageError},
    tls::{install_crypto_provider, load_rustls_config, TlsError},
};

/// Time allowed for in-flight requests after a shutdown signal.
const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("Server failed: {0}")]
    Serve(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Todo API stopped with an error");
            ExitCode::FAILURE
        }
    }
}

/// Initialise the global subscriber from `RUST_LOG` and `LOG_FORMAT`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    info!(mode = %config.mode, "Starting Todo API");

    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    seed_api_key(&db, &config).await?;

    let shutdown = CancellationToken::new();
    let settings = start_settings(&config, &shutdown).await?;

    let state = AppState::new(db, settings);
    let app = router(state, config.web_content_dir.as_deref());

    let handle = axum_server::Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            info!("Shutdown signal received");
            shutdown.cancel();
            handle.graceful_shutdown(Some(GRACEFUL_SHUTDOWN_TIMEOUT));
        }
    });

    let addr = config.bind_addr;
    match &config.tls {
        Some(paths) => {
            install_crypto_provider();
            let tls_config = load_rustls_config(paths).await?;
            info!(%addr, "Todo API listening on https://{addr} (docs at /api/openapi/ui)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            warn!("TLS is not configured, serving plain HTTP");
            info!(%addr, "Todo API listening on http://{addr} (docs at /api/openapi/ui)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    shutdown.cancel();
    info!("Todo API stopped");
    Ok(())
}

/// Provision the `SEED_API_KEY`, tolerating one that already exists.
async fn seed_api_key(db: &Database, config: &ServerConfig) -> Result<(), StorageError> {
    let Some(key) = &config.seed_api_key else {
        return Ok(());
    };

    match db.api_keys().create(key).await {
        Ok(_) => info!(user_id = %key.user_id, subscription = %key.subscription, "Seeded API key"),
        Err(StorageError::Conflict(_)) => info!("Seed API key already present"),
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Fixed settings, or a refresher task polling `CONFIG_URL`.
async fn start_settings(
    config: &ServerConfig,
    shutdown: &CancellationToken,
) -> Result<SettingsHandle, SettingsError> {
    let Some(url) = &config.config_url else {
        return Ok(SettingsHandle::fixed(config.proxy_secret.clone()));
    };

    let initial = RuntimeSettings {
        proxy_secret: config.proxy_secret.clone(),
    };
    let (refresher, handle) = SettingsRefresher::new(url.clone(), config.config_refresh, initial)?;

    match refresher.refresh().await {
        Ok(changed) => info!(changed, "Loaded remote settings"),
        Err(e) => warn!(error = %e, "Remote settings unavailable, using environment values"),
    }

    tokio::spawn(refresher.run(shutdown.clone()));
    Ok(handle)
}

/// Resolve on SIGINT or, on Unix, SIGTERM.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
