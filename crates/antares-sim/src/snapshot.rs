//! Build a read-only `Snapshot` from the live arena. Grounded in `systems/snapshot.rs::build_snapshot`.

use crate::arena::Arena;
use antares_core::flags::PlayerFlags;
use antares_core::snapshot::{ObjectSnapshot, Snapshot};

pub fn build_snapshot(arena: &Arena, tick: i64, local_player: PlayerFlags) -> Snapshot {
    let objects = arena
        .iter_active()
        .map(|obj| ObjectSnapshot {
            handle: antares_core::handle::Handle { slot: obj.slot, id: obj.id },
            location: obj.location,
            direction: obj.direction,
            sprite_id: obj.base_type.0,
            tiny_color_class: 0,
            hit_state: obj.hit_state,
            cloak_state: obj.cloak_state,
            visible_to_local_player: obj.seen_by_player_flags.intersects(local_player),
        })
        .collect();
    Snapshot { tick, objects }
}
