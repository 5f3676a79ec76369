// Domain layer: player records and combat rules.

pub mod player;

pub use player::{Facing, HitOutcome, MAX_HEALTH, MovementReport, PlayerRecord};
