// Framework bootstrap for the party broker runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::{party_handler, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::PartyBroker;
use crate::use_cases::relay::state_relay_task;

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{Mutex, Notify};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();

    // The relay lives as long as the server; nothing notifies it in normal runs.
    let shutdown = Arc::new(Notify::new());
    tokio::spawn(state_relay_task(
        state.broker.clone(),
        config::STATE_RELAY_INTERVAL,
        shutdown.clone(),
    ));

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/parties/{code}", get(party_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    let served = axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    });
    shutdown.notify_one();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from((config::bind_host(), config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    tracing::debug!(
        outbox_capacity = config::OUTBOUND_CHANNEL_CAPACITY,
        relay_interval_ms = config::STATE_RELAY_INTERVAL.as_millis() as u64,
        "broker configured"
    );
    Arc::new(AppState {
        broker: Arc::new(Mutex::new(PartyBroker::new())),
        outbox_capacity: config::OUTBOUND_CHANNEL_CAPACITY,
    })
}
