// Room orchestration: the single-writer event loop that owns the
// registry and drives the per-message handlers.

use crate::domain::PlayerRecord;
use crate::use_cases::registry::PlayerRegistry;
use crate::use_cases::types::{Outbound, RoomEvent};
use crate::use_cases::{combat, relay, session};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::{Notify, broadcast, mpsc};
use tracing::info;

/// Channel sizing for a room.
#[derive(Debug, Clone, Copy)]
pub struct RoomSettings {
    /// Capacity for inbound connection events.
    pub input_channel_capacity: usize,
    /// Capacity for the outbound event broadcast.
    pub event_broadcast_capacity: usize,
}

/// Channels into and out of a running room.
#[derive(Clone)]
pub struct RoomHandle {
    /// Sender for connection events into the room task.
    pub input_tx: mpsc::Sender<RoomEvent>,
    /// Broadcast sender for routed outbound events.
    pub events_tx: broadcast::Sender<Outbound>,
    /// Teardown signal for the room task.
    shutdown: Arc<Notify>,
}

impl RoomHandle {
    /// Stops the room task; all records are cleared on exit.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// The one logical room every connection participates in.
pub struct Room;

impl Room {
    /// Wires the room channels and spawns its event loop.
    pub fn spawn(settings: RoomSettings) -> RoomHandle {
        let (input_tx, input_rx) = mpsc::channel::<RoomEvent>(settings.input_channel_capacity);
        let (events_tx, _events_rx) =
            broadcast::channel::<Outbound>(settings.event_broadcast_capacity);
        let shutdown = Arc::new(Notify::new());

        tokio::spawn(room_task(input_rx, events_tx.clone(), shutdown.clone()));

        RoomHandle {
            input_tx,
            events_tx,
            shutdown,
        }
    }
}

/// Event loop owning the registry. There is no tick; every state
/// change is driven by an inbound event, and outbound events are
/// fire-and-forget onto the broadcast channel.
pub async fn room_task(
    mut input_rx: mpsc::Receiver<RoomEvent>,
    events_tx: broadcast::Sender<Outbound>,
    shutdown: Arc<Notify>,
) {
    let mut registry = PlayerRegistry::new();

    loop {
        let event = tokio::select! {
            _ = shutdown.notified() => break,
            event = input_rx.recv() => match event {
                Some(event) => event,
                // Every connection sender dropped; the service is stopping.
                None => break,
            },
        };

        for outbound in apply(&mut registry, event) {
            // Send failures only mean nobody is subscribed right now.
            let _ = events_tx.send(outbound);
        }
    }

    registry.clear();
    info!("room task stopped");
}

/// Applies one inbound event to the registry and returns the routed
/// events it produced.
fn apply(registry: &mut PlayerRegistry, event: RoomEvent) -> Vec<Outbound> {
    match event {
        RoomEvent::Join { player_id } => {
            info!(player_id, "player joined");
            session::connect(registry, PlayerRecord::spawn(player_id, random_color()))
        }
        RoomEvent::Leave { player_id } => {
            info!(player_id, "player left");
            session::disconnect(registry, player_id)
        }
        RoomEvent::Movement { player_id, report } => relay::movement(registry, player_id, report),
        RoomEvent::Attack { player_id } => relay::attack(registry, player_id),
        RoomEvent::Hit {
            player_id,
            target_id,
        } => combat::hit(registry, player_id, target_id),
    }
}

/// Display color for a new connection, drawn independently per
/// connect. Two concurrent players can land on near-identical colors;
/// the protocol tolerates that rather than de-duplicating.
fn random_color() -> u32 {
    rand::thread_rng().gen_range(0u32..=0xFF_FFFF)
}
