// Combat resolver: applies client-reported hits to the registry.

use crate::domain::HitOutcome;
use crate::use_cases::registry::PlayerRegistry;
use crate::use_cases::types::{Outbound, Recipients, ServerEvent};
use tracing::info;

/// Resolves a hit report from `attacker_id` against `target_id`.
///
/// The only validation is liveness: absent or knocked-out attackers
/// and targets are rejected silently. There is deliberately no
/// distance, facing or cooldown check server-side; hit detection is
/// trusted to the reporting client. That trust boundary comes from the
/// original protocol and is kept as-is.
pub fn hit(registry: &mut PlayerRegistry, attacker_id: u64, target_id: u64) -> Vec<Outbound> {
    match registry.get(attacker_id) {
        Some(attacker) if !attacker.knocked_out => {}
        _ => return Vec::new(),
    }
    match registry.get(target_id) {
        Some(target) if !target.knocked_out => {}
        _ => return Vec::new(),
    }

    let Some(outcome) = registry.mutate(target_id, |record| record.apply_hit()) else {
        return Vec::new();
    };

    match outcome {
        HitOutcome::Damaged { health } => {
            info!(attacker_id, target_id, health, "player hit");
            vec![Outbound::new(
                Recipients::All,
                ServerEvent::HealthUpdate {
                    player_id: target_id,
                    health,
                },
            )]
        }
        HitOutcome::KnockedOut => {
            info!(attacker_id, target_id, "player knocked out");
            // Health update first, then the knock-out, on the same
            // ordered stream.
            vec![
                Outbound::new(
                    Recipients::All,
                    ServerEvent::HealthUpdate {
                        player_id: target_id,
                        health: 0,
                    },
                ),
                Outbound::new(
                    Recipients::All,
                    ServerEvent::PlayerKnockedOut {
                        player_id: target_id,
                    },
                ),
            ]
        }
        // Unreachable given the gate above; kept total rather than panicking.
        HitOutcome::Ignored => Vec::new(),
    }
}
