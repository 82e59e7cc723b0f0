use serde::Serialize;

use super::invasion::InvaderId;
use super::role::Role;

/// Everything observable that happened during a tick, in the order it
/// happened. The scene drains these and forwards them to its presenter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimEvent {
    SelectionChanged { from: Role, to: Role },
    Born { role: Role, count: i32 },
    MinerDecayed { remaining: i32 },
    MinersDepleted,
    Sparkle { total: u32 },
    InvaderSpawned { id: InvaderId },
    Repelled { id: InvaderId, guards_left: i32 },
    Breached { id: InvaderId, farmers_raw: i32 },
    InvaderRemoved { id: InvaderId },
    Died,
}
