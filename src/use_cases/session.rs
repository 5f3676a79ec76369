// Session lifecycle: registry entries created on connect, removed on
// disconnect, both announced to peers.

use crate::domain::PlayerRecord;
use crate::use_cases::registry::PlayerRegistry;
use crate::use_cases::types::{Outbound, Recipients, ServerEvent};

/// Handles a new connection's fully-built record.
///
/// The snapshot goes to the newcomer only and is emitted before the
/// `NewPlayer` fan-out, so on the ordered event stream no peer can say
/// anything about the newcomer ahead of its snapshot. The snapshot
/// contains the newcomer's peers, not the newcomer itself; the client
/// already knows its own identity.
pub fn connect(registry: &mut PlayerRegistry, record: PlayerRecord) -> Vec<Outbound> {
    let player_id = record.id;
    let peers = registry.all();
    registry.insert(record.clone());

    vec![
        Outbound::new(
            Recipients::Only(player_id),
            ServerEvent::CurrentPlayers(peers),
        ),
        Outbound::new(
            Recipients::AllExcept(player_id),
            ServerEvent::NewPlayer(record),
        ),
    ]
}

/// Handles a connection teardown. Idempotent: an id that is already
/// gone produces no events.
pub fn disconnect(registry: &mut PlayerRegistry, player_id: u64) -> Vec<Outbound> {
    if registry.remove(player_id).is_none() {
        return Vec::new();
    }

    vec![Outbound::new(
        Recipients::AllExcept(player_id),
        ServerEvent::PlayerDisconnected { player_id },
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MAX_HEALTH;

    #[test]
    fn connect_sends_snapshot_then_announces() {
        let mut registry = PlayerRegistry::new();
        connect(&mut registry, PlayerRecord::spawn(1, 0));
        connect(&mut registry, PlayerRecord::spawn(2, 0));

        let events = connect(&mut registry, PlayerRecord::spawn(3, 0));
        assert_eq!(events.len(), 2);

        // Snapshot first, to the newcomer only, without the newcomer.
        assert_eq!(events[0].recipients, Recipients::Only(3));
        let ServerEvent::CurrentPlayers(snapshot) = &events[0].event else {
            panic!("expected snapshot, got {:?}", events[0].event);
        };
        let mut ids: Vec<u64> = snapshot.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);

        // Announcement second, to everyone else.
        assert_eq!(events[1].recipients, Recipients::AllExcept(3));
        let ServerEvent::NewPlayer(record) = &events[1].event else {
            panic!("expected new player, got {:?}", events[1].event);
        };
        assert_eq!(record.id, 3);
        assert_eq!(record.health, MAX_HEALTH);

        assert!(registry.contains(3));
    }

    #[test]
    fn disconnect_removes_and_announces_bare_id() {
        let mut registry = PlayerRegistry::new();
        connect(&mut registry, PlayerRecord::spawn(1, 0));

        let events = disconnect(&mut registry, 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipients, Recipients::AllExcept(1));
        assert!(matches!(
            events[0].event,
            ServerEvent::PlayerDisconnected { player_id: 1 }
        ));
        assert!(!registry.contains(1));
    }

    #[test]
    fn disconnect_of_unknown_id_is_silent() {
        let mut registry = PlayerRegistry::new();
        assert!(disconnect(&mut registry, 42).is_empty());
    }

    #[test]
    fn snapshot_after_disconnect_omits_the_removed_id() {
        let mut registry = PlayerRegistry::new();
        connect(&mut registry, PlayerRecord::spawn(1, 0));
        connect(&mut registry, PlayerRecord::spawn(2, 0));
        disconnect(&mut registry, 1);

        let events = connect(&mut registry, PlayerRecord::spawn(3, 0));
        let ServerEvent::CurrentPlayers(snapshot) = &events[0].event else {
            panic!("expected snapshot");
        };
        let ids: Vec<u64> = snapshot.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2]);
    }
}
