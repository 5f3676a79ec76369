// Event relay: movement and attack reports fanned out to peers.

use crate::domain::MovementReport;
use crate::use_cases::registry::PlayerRegistry;
use crate::use_cases::types::{Outbound, Recipients, ServerEvent};
use tracing::debug;

/// Stores the owner's reported position/facing and relays it to every
/// other connection. Reports from ids with no live record (a race with
/// disconnect) are dropped without a broadcast.
pub fn movement(
    registry: &mut PlayerRegistry,
    player_id: u64,
    report: MovementReport,
) -> Vec<Outbound> {
    let applied = registry.mutate(player_id, |record| record.apply_movement(&report));
    if applied.is_none() {
        debug!(player_id, "movement from unknown id dropped");
        return Vec::new();
    }

    vec![Outbound::new(
        Recipients::AllExcept(player_id),
        ServerEvent::PlayerMoved { player_id, report },
    )]
}

/// Relays an attack announcement as a visual cue for peers. Never
/// touches health. Ignored when the attacker is absent or knocked out.
pub fn attack(registry: &PlayerRegistry, player_id: u64) -> Vec<Outbound> {
    match registry.get(player_id) {
        Some(record) if !record.knocked_out => vec![Outbound::new(
            Recipients::AllExcept(player_id),
            ServerEvent::PlayerAttacked { player_id },
        )],
        _ => Vec::new(),
    }
}
