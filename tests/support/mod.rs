// Shared primitives for driving the relay server over real WebSockets.

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Boots a fresh server on an ephemeral port and returns its ws URL.
///
/// Every test gets its own server (and therefore its own empty room)
/// so concurrently running tests cannot observe each other's players.
pub async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        arena_server::run(listener).await.expect("server failed");
    });
    format!("ws://{addr}/ws")
}

/// Next JSON event from the socket, skipping transport frames.
pub async fn recv_event(socket: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for event")
            .expect("socket closed while waiting for event")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).expect("event should be valid JSON");
        }
    }
}

pub async fn send_event(socket: &mut Socket, event: Value) {
    socket
        .send(Message::Text(event.to_string()))
        .await
        .expect("send event");
}

/// Connects a client and consumes its bootstrap events.
///
/// Returns the socket, the assigned player id and the `currentPlayers`
/// snapshot. Waiting for the snapshot also guarantees the server has
/// fully processed this join before the caller continues.
pub async fn join(url: &str) -> (Socket, String, Value) {
    let (mut socket, _response) = connect_async(url).await.expect("websocket connect");

    let identity = recv_event(&mut socket).await;
    assert_eq!(identity["type"], "identity", "got {identity}");
    let player_id = identity["data"]["playerId"]
        .as_str()
        .expect("identity carries a string id")
        .to_string();

    let snapshot = recv_event(&mut socket).await;
    assert_eq!(snapshot["type"], "currentPlayers", "got {snapshot}");

    (socket, player_id, snapshot["data"].clone())
}

pub fn movement_event(x: f32, y: f32, facing: &str) -> Value {
    serde_json::json!({
        "type": "playerMovement",
        "data": { "x": x, "y": y, "angle": 0.0, "facing": facing },
    })
}

pub fn attack_event() -> Value {
    serde_json::json!({ "type": "playerAttack" })
}

pub fn hit_event(target_id: &str) -> Value {
    serde_json::json!({
        "type": "playerHit",
        "data": { "targetId": target_id },
    })
}
