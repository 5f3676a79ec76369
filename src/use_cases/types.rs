// Use-case level inputs/outputs for the room event loop.

use crate::domain::{MovementReport, PlayerRecord};

/// Inbound events flowing from connections into the room task.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    Join { player_id: u64 },
    Leave { player_id: u64 },
    Movement { player_id: u64, report: MovementReport },
    Attack { player_id: u64 },
    Hit { player_id: u64, target_id: u64 },
}

/// Events the room emits back toward connected clients.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// Registry snapshot for a newly connected client (peers only).
    CurrentPlayers(Vec<PlayerRecord>),
    NewPlayer(PlayerRecord),
    PlayerDisconnected { player_id: u64 },
    PlayerMoved { player_id: u64, report: MovementReport },
    PlayerAttacked { player_id: u64 },
    HealthUpdate { player_id: u64, health: u8 },
    PlayerKnockedOut { player_id: u64 },
}

/// Which connections an event should be delivered to.
///
/// The room publishes every event on one ordered broadcast channel;
/// each connection loop filters by this scope. Keeping the routing on
/// the message preserves ordering between targeted and fanned-out
/// events (a newcomer's snapshot is always observed before anything
/// later said about the newcomer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    All,
    AllExcept(u64),
    Only(u64),
}

impl Recipients {
    pub fn includes(&self, player_id: u64) -> bool {
        match *self {
            Recipients::All => true,
            Recipients::AllExcept(excluded) => player_id != excluded,
            Recipients::Only(only) => player_id == only,
        }
    }
}

/// A routed outbound event.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub recipients: Recipients,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn new(recipients: Recipients, event: ServerEvent) -> Self {
        Self { recipients, event }
    }
}
