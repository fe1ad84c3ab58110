//! CMS Edge - request-path caching and admission control for a CMS
//!
//! Serves cached pages, a rate limited contact form and an admin surface for
//! page edits and cache invalidation.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cms_edge::api::create_router;
use cms_edge::{spawn_sweeper, AppState, Config};

/// Main entry point for the CMS edge server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the page cache, content store and contact limiter
/// 4. Start one sweeper for the cache and one for the limiter
/// 5. Serve until SIGINT/SIGTERM, then stop and join the sweepers
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cms_edge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CMS edge server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, page_ttl={}s, cache_sweep={}s, limiter_sweep={}s, contact={} per {}s, trust_proxy_headers={}",
        config.server_port,
        config.page_cache_ttl,
        config.cache_sweep_interval,
        config.rate_limit_sweep_interval,
        config.contact_rate_limit,
        config.contact_rate_window,
        config.trust_proxy_headers
    );

    let state = AppState::from_config(&config);

    // Every sweeper hangs off one root token
    let shutdown = CancellationToken::new();
    let sweepers = vec![
        spawn_sweeper(
            "page-cache",
            state.cache.clone(),
            config.cache_sweep_interval(),
            shutdown.child_token(),
        ),
        spawn_sweeper(
            "contact-limiter",
            state.contact_limiter.clone(),
            config.rate_limit_sweep_interval(),
            shutdown.child_token(),
        ),
    ];

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    shutdown.cancel();
    for sweeper in sweepers {
        let name = sweeper.name();
        if let Err(e) = sweeper.stop().await {
            warn!(sweeper = name, error = %e, "Sweeper did not stop cleanly");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
