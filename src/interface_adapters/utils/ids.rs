use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_ID: OnceLock<AtomicU64> = OnceLock::new();

/// Returns a process-unique connection id.
///
/// Seeded once from the clock, then strictly incremented, so ids stay
/// unique even when many connections arrive within the same instant.
/// Ids are never reused while the process lives; a reconnecting client
/// is a brand-new player.
pub fn next_conn_id() -> u64 {
    let counter = NEXT_ID.get_or_init(|| {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        AtomicU64::new(seed)
    });
    counter.fetch_add(1, Ordering::Relaxed)
}
