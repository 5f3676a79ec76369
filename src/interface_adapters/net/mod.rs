// Network adapter: WebSocket client connections and event fan-out.

pub mod client;

pub use client::{event_serializer, ws_handler};
