//! sw-daemon entry point.
//!
//! Thin: load config, wire the job, start the schedule loop and the HTTP
//! server. Handlers live in `routes.rs`; shared state in `state.rs`.
//!
//! Usage: `sw-daemon [config.yaml ...]` (merge order; default
//! `config/base.yaml`).

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use sw_config::{
    load_layered_yaml, report_unused_keys, resolve_secrets_for_mode, ConfigMode, UnusedKeyPolicy,
    WatchSettings,
};
use sw_daemon::{routes, state};
use sw_runtime::wiring::{build_job, build_notifier, build_schedule};
use tokio::sync::watch;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

const DEFAULT_CONFIG: &str = "config/base.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let mut paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        paths.push(DEFAULT_CONFIG.to_string());
    }

    let loaded = load_layered_yaml(&paths)?;
    let unused = report_unused_keys(ConfigMode::Daemon, &loaded.config_json, UnusedKeyPolicy::Warn)?;
    if !unused.is_clean() {
        warn!(keys = ?unused.unused_leaf_pointers, "config keys not read by the daemon");
    }
    let settings = WatchSettings::from_config_json(&loaded.config_json).context("invalid config")?;
    let secrets = resolve_secrets_for_mode(&loaded.config_json, ConfigMode::Daemon)?;
    info!(config_hash = %loaded.config_hash, ?secrets, "config loaded");

    let job = build_job(&settings)?;
    let schedule = build_schedule(&settings)?;
    let notifier = build_notifier(&secrets);

    let shared = Arc::new(state::AppState::new(job, schedule));

    state::spawn_heartbeat(shared.bus.clone(), Duration::from_secs(1));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let schedule_task = tokio::spawn(sw_runtime::run_schedule(
        Arc::new(state::RecordedJob(Arc::clone(&shared))),
        notifier,
        schedule,
        shutdown_rx,
    ));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr_from_env()
        .or_else(|| settings.daemon.bind.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8899)));
    info!("sw-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    let _ = shutdown_tx.send(true);
    let _ = schedule_task.await;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("SW_DAEMON_ADDR").ok()?.parse().ok()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler failed; shutting down");
    }
    info!("shutdown requested");
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
