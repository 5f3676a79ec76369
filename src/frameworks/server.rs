// Framework bootstrap for the relay server runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::{event_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{Recipients, Room, RoomSettings};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;

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

/// Serves the relay on an already-bound listener. Split from
/// `run_with_config` so tests can bind an ephemeral port.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();

    // The front-end assets live with the rendering client; the server
    // exposes only the message transport.
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    // The single implicit room; constructed at service start, torn
    // down with the process.
    let room = Room::spawn(RoomSettings {
        input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
        event_broadcast_capacity: config::EVENT_BROADCAST_CAPACITY,
    });

    // Serialized event fan-out shared by all connections.
    let (event_bytes_tx, _event_bytes_rx) =
        broadcast::channel::<(Recipients, Utf8Bytes)>(config::EVENT_BROADCAST_CAPACITY);

    tokio::spawn(event_serializer(
        room.events_tx.subscribe(),
        event_bytes_tx.clone(),
    ));

    Arc::new(AppState {
        room,
        event_bytes_tx,
    })
}
