// Use cases layer: registry, message handlers and the room event loop.

pub mod combat;
pub mod registry;
pub mod relay;
pub mod room;
pub mod session;
pub mod types;

pub use registry::PlayerRegistry;
pub use room::{Room, RoomHandle, RoomSettings};
pub use types::{Outbound, Recipients, RoomEvent, ServerEvent};
