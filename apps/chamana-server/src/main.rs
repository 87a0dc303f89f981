// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use chamana_server::{
    api::router,
    auth::Role,
    config::AppConfig,
    logging::init_tracing,
    repository::{InMemoryUserRepository, User, UserRepository},
    state::AppState,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    let users = Arc::new(InMemoryUserRepository::new());
    if let Some(email) = &config.seed_admin_email {
        match users.insert(User::new(email, "Administrator", Role::Admin)) {
            Ok(admin) => tracing::info!(user_id = %admin.id, email = %admin.email, "Seeded admin user"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to seed admin user");
                return ExitCode::FAILURE;
            }
        }
    }

    let state = AppState::from_config(&config, users);
    let shutdown = CancellationToken::new();

    if let Some(interval) = config.sweep_interval {
        tokio::spawn(state.rate_limiter.clone().run_sweeper(interval, shutdown.clone()));
    }

    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %config.bind_addr, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        addr = %config.bind_addr,
        rate_limit_max = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window.as_secs(),
        token_ttl = %config.token_ttl,
        trust_proxy_headers = config.trust_proxy_headers,
        "CHAMANA server listening (docs at /docs)"
    );

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
    .await;

    shutdown.cancel();

    match served {
        Ok(()) => {
            tracing::info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

/// Resolve on Ctrl-C (or SIGTERM on Unix), cancelling background tasks.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
