// Player record state and the health/knock-out rules applied to it.

pub const MAX_HEALTH: u8 = 3;

// Fixed spawn point for every new connection (map pixels).
pub const SPAWN_X: f32 = 160.0;
pub const SPAWN_Y: f32 = 160.0;

/// Cardinal direction a player sprite is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

/// Position/facing update reported by the owning client.
///
/// The server stores whatever the client sends; `angle` has no
/// server-side meaning and is carried for the presentation layer only.
#[derive(Debug, Clone, Copy)]
pub struct MovementReport {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub facing: Facing,
}

/// Authoritative state for one connected player.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub facing: Facing,
    pub health: u8,
    pub max_health: u8,
    pub knocked_out: bool,
    // Assigned once at connect, immutable afterwards. Presentation only.
    pub color: u32,
}

/// Result of applying one hit to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Health dropped but the player is still up.
    Damaged { health: u8 },
    /// This hit brought health to 0; the knock-out is now set.
    KnockedOut,
    /// Target was already knocked out; nothing changed.
    Ignored,
}

impl PlayerRecord {
    /// New record with connect-time defaults at the fixed spawn point.
    pub fn spawn(id: u64, color: u32) -> Self {
        Self {
            id,
            x: SPAWN_X,
            y: SPAWN_Y,
            angle: 0.0,
            facing: Facing::default(),
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            knocked_out: false,
            color,
        }
    }

    /// Overwrites position/facing with the owner's latest report.
    pub fn apply_movement(&mut self, report: &MovementReport) {
        self.x = report.x;
        self.y = report.y;
        self.angle = report.angle;
        self.facing = report.facing;
    }

    /// Applies one point of damage.
    ///
    /// Knock-out is terminal for the lifetime of the connection: once
    /// set, further hits change nothing and report `Ignored`.
    pub fn apply_hit(&mut self) -> HitOutcome {
        if self.knocked_out {
            return HitOutcome::Ignored;
        }

        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.knocked_out = true;
            HitOutcome::KnockedOut
        } else {
            HitOutcome::Damaged {
                health: self.health,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_uses_connect_defaults() {
        let record = PlayerRecord::spawn(7, 0xAB_CDEF);
        assert_eq!(record.id, 7);
        assert_eq!((record.x, record.y), (SPAWN_X, SPAWN_Y));
        assert_eq!(record.facing, Facing::Down);
        assert_eq!(record.health, MAX_HEALTH);
        assert_eq!(record.max_health, MAX_HEALTH);
        assert!(!record.knocked_out);
        assert_eq!(record.color, 0xAB_CDEF);
    }

    #[test]
    fn hits_decrement_until_knock_out() {
        let mut record = PlayerRecord::spawn(1, 0);

        assert_eq!(record.apply_hit(), HitOutcome::Damaged { health: 2 });
        assert_eq!(record.apply_hit(), HitOutcome::Damaged { health: 1 });
        assert_eq!(record.apply_hit(), HitOutcome::KnockedOut);
        assert!(record.knocked_out);
        assert_eq!(record.health, 0);
    }

    #[test]
    fn knock_out_is_terminal() {
        let mut record = PlayerRecord::spawn(1, 0);
        record.apply_hit();
        record.apply_hit();
        record.apply_hit();

        // Health never goes below zero and KO never re-triggers.
        assert_eq!(record.apply_hit(), HitOutcome::Ignored);
        assert_eq!(record.apply_hit(), HitOutcome::Ignored);
        assert_eq!(record.health, 0);
        assert!(record.knocked_out);
    }

    #[test]
    fn movement_overwrites_position_and_facing() {
        let mut record = PlayerRecord::spawn(1, 0);
        record.apply_movement(&MovementReport {
            x: 12.5,
            y: -3.0,
            angle: 90.0,
            facing: Facing::Left,
        });

        assert_eq!((record.x, record.y), (12.5, -3.0));
        assert_eq!(record.angle, 90.0);
        assert_eq!(record.facing, Facing::Left);
    }
}
