/*
 * Responsibility
 * - Tracing / panic hook setup
 * - Config -> credential store -> authenticator -> Router
 * - Cross-cutting HTTP middleware, then axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::middleware::http::HttpLimits;
use crate::services::auth::{Authenticator, Ticketer};
use crate::services::keys::CredentialStore;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins, e.g. RUST_LOG=info,token_gate=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Fail fast outside production
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting token gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Builds the shared state. Must run inside the tokio runtime when the
/// key document is watched.
pub fn build_state(config: &Config) -> Result<AppState> {
    let store = CredentialStore::new(config.key_source(), config.store_options());
    store.log_summary();

    let auth = Arc::new(Authenticator::new(store.clone(), &config.extractor_config()));

    let ticketer = match &config.ticket_key {
        Some(key) => Some(Arc::new(
            Ticketer::new(key, config.ticket_validity).context("invalid ticket key")?,
        )),
        None => {
            tracing::info!("no TICKET_KEY configured; ticket verification disabled");
            None
        }
    };

    Ok(AppState::new(auth, store, ticketer))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state);

    middleware::http::apply(router, HttpLimits::default())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
