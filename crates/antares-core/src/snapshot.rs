//! Read-only render view of the arena.
//! Produced lazily, valid until the next `SimulationStep`.

use crate::coord::UniverseCoord;
use crate::fixed::Angle;
use crate::handle::Handle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub handle: Handle,
    pub location: UniverseCoord,
    pub direction: Angle,
    pub sprite_id: u32,
    pub tiny_color_class: u8,
    pub hit_state: i32,
    pub cloak_state: i32,
    pub visible_to_local_player: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: i64,
    pub objects: Vec<ObjectSnapshot>,
}
