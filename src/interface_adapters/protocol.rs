// Wire protocol DTOs and conversions for the public WebSocket messages.
//
// Event and field names match the original browser client's protocol:
// adjacently tagged JSON with camelCase names and string player ids
// (u64 does not survive a JS number).

use crate::domain::{Facing, MovementReport, PlayerRecord};
use crate::use_cases::ServerEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    // Assigned identity, sent first on every new connection.
    Identity(PlayerRefDto),
    // Registry snapshot for the new connection only; excludes the
    // newcomer itself.
    CurrentPlayers(HashMap<String, PlayerDto>),
    // A player joined; sent to everyone else.
    NewPlayer(PlayerDto),
    // Bare id of a player that left; peers drop their local sprite.
    PlayerDisconnected(String),
    // Relayed movement report; sent to everyone but the mover.
    PlayerMoved(PlayerMovedDto),
    // Visual attack cue; sent to everyone but the attacker.
    PlayerAttacked(PlayerRefDto),
    // New health after a resolved hit; sent to all, target included.
    PlayerHealthUpdate(HealthUpdateDto),
    // The hit that reached zero health; sent to all, after the update.
    #[serde(rename = "playerKO")]
    PlayerKo(PlayerRefDto),
}

/// Messages clients send to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    PlayerMovement(PlayerMovementDto),
    PlayerAttack,
    PlayerHit(PlayerHitDto),
}

/// Facing direction on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingDto {
    Up,
    Down,
    Left,
    Right,
}

impl From<Facing> for FacingDto {
    fn from(facing: Facing) -> Self {
        match facing {
            Facing::Up => FacingDto::Up,
            Facing::Down => FacingDto::Down,
            Facing::Left => FacingDto::Left,
            Facing::Right => FacingDto::Right,
        }
    }
}

impl From<FacingDto> for Facing {
    fn from(facing: FacingDto) -> Self {
        match facing {
            FacingDto::Up => Facing::Up,
            FacingDto::Down => Facing::Down,
            FacingDto::Left => Facing::Left,
            FacingDto::Right => Facing::Right,
        }
    }
}

/// Full player state as shown to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub player_id: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub facing: FacingDto,
    pub health: u8,
    pub max_health: u8,
    #[serde(rename = "isKO")]
    pub is_ko: bool,
    pub color: u32,
}

impl From<&PlayerRecord> for PlayerDto {
    fn from(record: &PlayerRecord) -> Self {
        Self {
            player_id: record.id.to_string(),
            x: record.x,
            y: record.y,
            angle: record.angle,
            facing: record.facing.into(),
            health: record.health,
            max_health: record.max_health,
            is_ko: record.knocked_out,
            color: record.color,
        }
    }
}

/// Payload carrying nothing but a player id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRefDto {
    pub player_id: String,
}

/// Relayed movement as seen by peers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMovedDto {
    pub player_id: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub facing: FacingDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthUpdateDto {
    pub player_id: String,
    pub health: u8,
}

/// Movement report sent by the owning client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMovementDto {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub angle: f32,
    pub facing: FacingDto,
}

impl From<PlayerMovementDto> for MovementReport {
    fn from(dto: PlayerMovementDto) -> Self {
        Self {
            x: dto.x,
            y: dto.y,
            angle: dto.angle,
            facing: dto.facing.into(),
        }
    }
}

/// Client-reported hit against another player.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHitDto {
    pub target_id: String,
}

impl PlayerHitDto {
    /// Ids travel as strings; anything that does not parse back to an
    /// id can only reference a player that does not exist.
    pub fn parse_target_id(&self) -> Option<u64> {
        self.target_id.parse().ok()
    }
}

impl ServerMessage {
    pub fn identity(player_id: u64) -> Self {
        ServerMessage::Identity(PlayerRefDto {
            player_id: player_id.to_string(),
        })
    }
}

impl From<&ServerEvent> for ServerMessage {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::CurrentPlayers(records) => ServerMessage::CurrentPlayers(
                records
                    .iter()
                    .map(|record| (record.id.to_string(), PlayerDto::from(record)))
                    .collect(),
            ),
            ServerEvent::NewPlayer(record) => ServerMessage::NewPlayer(PlayerDto::from(record)),
            ServerEvent::PlayerDisconnected { player_id } => {
                ServerMessage::PlayerDisconnected(player_id.to_string())
            }
            ServerEvent::PlayerMoved { player_id, report } => {
                ServerMessage::PlayerMoved(PlayerMovedDto {
                    player_id: player_id.to_string(),
                    x: report.x,
                    y: report.y,
                    angle: report.angle,
                    facing: report.facing.into(),
                })
            }
            ServerEvent::PlayerAttacked { player_id } => ServerMessage::PlayerAttacked(PlayerRefDto {
                player_id: player_id.to_string(),
            }),
            ServerEvent::HealthUpdate { player_id, health } => {
                ServerMessage::PlayerHealthUpdate(HealthUpdateDto {
                    player_id: player_id.to_string(),
                    health: *health,
                })
            }
            ServerEvent::PlayerKnockedOut { player_id } => ServerMessage::PlayerKo(PlayerRefDto {
                player_id: player_id.to_string(),
            }),
        }
    }
}
