use crate::use_cases::{Recipients, RoomHandle};
use axum::extract::ws::Utf8Bytes;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    // Channels into and out of the single room.
    pub room: RoomHandle,
    // Events serialized once, routed to every connection loop.
    pub event_bytes_tx: broadcast::Sender<(Recipients, Utf8Bytes)>,
}
