//! Two overlaid toroidal 16x16 proximity grids, rebuilt every major
//! tick: a tight collision grid (cell size 128) and a
//! coarse awareness grid (cell size 2048). Each cell threads a
//! singly-linked list through the objects themselves via the
//! `next_near_object`/`next_far_object` fields already on `SpaceObject`.

use crate::arena::Arena;
use antares_core::base_object::{BaseObject, BaseObjectId};
use antares_core::coord::SCALE_SCALE;
use antares_core::flags::{AttributeFlags, PlayerFlags};
use antares_core::object::{AabbI, GridPos};
use std::collections::HashMap;

const GRID_SIDE: i32 = 16;
const CELL_COUNT: usize = (GRID_SIDE * GRID_SIDE) as usize;

pub const COLLISION_CELL_SHIFT: i32 = 7;
pub const COLLISION_SUPER_SHIFT: i32 = 11;
pub const AWARENESS_CELL_SHIFT: i32 = 11;
pub const AWARENESS_SUPER_SHIFT: i32 = 15;

/// A neighbor cell to probe, plus the super-cell offset that confirms
/// the match isn't just a toroidal wrap-around collision.
#[derive(Debug, Clone, Copy)]
pub struct NeighborOffset {
    pub dh: i32,
    pub dv: i32,
    pub super_dh: i32,
    pub super_dv: i32,
}

/// The five neighbor offsets the narrow phase enumerates per cell
///: self, +h, -h+v, +v, +h+v.
pub const NEIGHBOR_OFFSETS: [NeighborOffset; 5] = [
    NeighborOffset { dh: 0, dv: 0, super_dh: 0, super_dv: 0 },
    NeighborOffset { dh: 1, dv: 0, super_dh: 1, super_dv: 0 },
    NeighborOffset { dh: -1, dv: 1, super_dh: -1, super_dv: 1 },
    NeighborOffset { dh: 0, dv: 1, super_dh: 0, super_dv: 1 },
    NeighborOffset { dh: 1, dv: 1, super_dh: 1, super_dv: 1 },
];

fn cell_index(h: i32, v: i32) -> usize {
    let ch = h.rem_euclid(GRID_SIDE);
    let cv = v.rem_euclid(GRID_SIDE);
    (ch * GRID_SIDE + cv) as usize
}

pub struct Grid {
    heads: [Option<u16>; CELL_COUNT],
    cell_shift: i32,
    super_shift: i32,
}

impl Grid {
    fn new(cell_shift: i32, super_shift: i32) -> Grid {
        Grid { heads: [None; CELL_COUNT], cell_shift, super_shift }
    }

    pub fn cell_of(&self, h: i32, v: i32) -> (i32, i32) {
        ((h >> self.cell_shift) & (GRID_SIDE - 1), (v >> self.cell_shift) & (GRID_SIDE - 1))
    }

    pub fn super_of(&self, h: i32, v: i32) -> GridPos {
        GridPos { h: h >> self.super_shift, v: v >> self.super_shift }
    }

    pub fn head(&self, cell_h: i32, cell_v: i32) -> Option<u16> {
        self.heads[cell_index(cell_h, cell_v)]
    }

    /// Every occupied cell, for iteration by the narrow phase.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..GRID_SIDE).flat_map(move |h| (0..GRID_SIDE).map(move |v| (h, v)))
    }
}

fn eligible(obj: &antares_core::object::SpaceObject) -> bool {
    obj.is_in_use() && obj.attributes.intersects(AttributeFlags::CONSIDERS_DISTANCE_GROUP)
}

/// Recompute an object's universe-space AABB from its current location
/// and `natural_scale`, centered on `location`. There's no sprite asset
/// to size against here, so `natural_scale` itself (already
/// `SCALE_SCALE`-relative) stands in for the sprite footprint.
fn recompute_absolute_bounds(obj: &mut antares_core::object::SpaceObject, base: Option<&BaseObject>) {
    let half = base.map(|b| b.natural_scale).unwrap_or(SCALE_SCALE) / 2;
    obj.absolute_bounds = AabbI {
        left: obj.location.h - half,
        top: obj.location.v - half,
        right: obj.location.h + half,
        bottom: obj.location.v + half,
    };
}

/// Clear and repopulate the collision grid, threading `next_near_object`
/// and recording each object's collision super-cell. Also the point in
/// the tick where every eligible object's `absolute_bounds` is
/// refreshed, since both happen over the same per-object pass.
pub fn build_collision_grid(arena: &mut Arena, base_objects: &HashMap<BaseObjectId, BaseObject>) -> Grid {
    let mut grid = Grid::new(COLLISION_CELL_SHIFT, COLLISION_SUPER_SHIFT);
    let slots = arena.active_slots();
    for slot in slots {
        let (insert, cell, sup) = {
            let obj = arena.by_slot(slot).unwrap();
            if !eligible(obj) {
                (false, (0, 0), GridPos::default())
            } else {
                let (h, v) = grid.cell_of(obj.location.h, obj.location.v);
                (true, (h, v), grid.super_of(obj.location.h, obj.location.v))
            }
        };
        if !insert {
            continue;
        }
        let idx = cell_index(cell.0, cell.1);
        let head = grid.heads[idx];
        grid.heads[idx] = Some(slot);
        let base_type = arena.by_slot(slot).unwrap().base_type;
        let base = base_objects.get(&base_type);
        let obj = arena.by_slot_mut(slot).unwrap();
        obj.next_near_object = head;
        obj.collision_grid = sup;
        recompute_absolute_bounds(obj, base);
    }
    grid
}

/// Clear and repopulate the awareness grid, threading `next_far_object`.
pub fn build_awareness_grid(arena: &mut Arena) -> Grid {
    let mut grid = Grid::new(AWARENESS_CELL_SHIFT, AWARENESS_SUPER_SHIFT);
    let slots = arena.active_slots();
    for slot in slots {
        let (insert, cell, sup) = {
            let obj = arena.by_slot(slot).unwrap();
            if !eligible(obj) {
                (false, (0, 0), GridPos::default())
            } else {
                let (h, v) = grid.cell_of(obj.location.h, obj.location.v);
                (true, (h, v), grid.super_of(obj.location.h, obj.location.v))
            }
        };
        if !insert {
            continue;
        }
        let idx = cell_index(cell.0, cell.1);
        let head = grid.heads[idx];
        grid.heads[idx] = Some(slot);
        let obj = arena.by_slot_mut(slot).unwrap();
        obj.next_far_object = head;
        obj.distance_grid = sup;
    }
    grid
}

const REMOTE_OR_HUMAN_OR_THINKING: AttributeFlags = AttributeFlags::CAN_THINK
    .union(AttributeFlags::IS_REMOTE)
    .union(AttributeFlags::IS_HUMAN_CONTROLLED)
    .union(AttributeFlags::HATED);

/// Whether `a` is allowed to consider `b` a target: if `a` declares
/// `CAN_ONLY_ENGAGE` or `b` declares `ONLY_ENGAGED_BY`, `a`'s
/// `engage_key_tag` must match `b`'s, otherwise `a` never considers `b`
/// regardless of distance.
fn can_engage(a: &antares_core::object::SpaceObject, b: &antares_core::object::SpaceObject) -> bool {
    if !a.attributes.contains(AttributeFlags::CAN_ONLY_ENGAGE) && !b.attributes.contains(AttributeFlags::ONLY_ENGAGED_BY) {
        return true;
    }
    a.engage_key_tag == b.engage_key_tag
}

/// Awareness-grid pairwise sweep: for every cross-owner pair of
/// thinking/remote/human/hated objects within
/// `coord::MAX_RELEVANT` of each other, OR each other's
/// `my_player_flag` into `seen_by_player_flags`, raise `IS_HIDDEN`
/// on whichever side faces a `HIDE_EFFECT` counterpart, update each
/// side's `closest_object`/`closest_distance_squared`/`farthest_object`
/// subject to the can-engage tag filter, and accumulate local foe
/// strength. Resets every active object's closest/farthest/strength
/// fields first, since this is the only pass that recomputes them.
pub fn update_visibility(arena: &mut Arena, grid: &Grid) {
    use antares_core::coord::MAX_RELEVANT;
    use antares_core::flags::RuntimeFlags;

    let max_relevant_sq = (MAX_RELEVANT as i64) * (MAX_RELEVANT as i64);

    for &slot in &arena.active_slots() {
        if let Some(o) = arena.by_slot_mut(slot) {
            o.closest_object = None;
            o.closest_distance_squared = i64::MAX;
            o.farthest_object = None;
            o.farthest_distance_squared = i64::MIN;
            o.local_friend_strength = 0;
            o.local_foe_strength = 0;
        }
    }

    for (ch, cv) in grid.occupied_cells() {
        let base_members: Vec<u16> =
            bucket_members(arena, grid.head(ch, cv), |o| o.next_far_object).collect();
        if base_members.is_empty() {
            continue;
        }
        for offset in NEIGHBOR_OFFSETS {
            let (nh, nv) = (ch + offset.dh, cv + offset.dv);
            let other_members: Vec<u16> =
                bucket_members(arena, grid.head(nh, nv), |o| o.next_far_object).collect();
            for &a in &base_members {
                for &b in &other_members {
                    if offset.dh == 0 && offset.dv == 0 && a >= b {
                        continue;
                    }
                    if a == b {
                        continue;
                    }
                    let (
                        eligible,
                        owner_a_flag,
                        owner_b_flag,
                        hide_a,
                        hide_b,
                        dist_sq,
                        a_may_target_b,
                        b_may_target_a,
                        b_can_be_hit,
                        a_can_be_hit,
                    ) = {
                        let oa = arena.by_slot(a).unwrap();
                        let ob = arena.by_slot(b).unwrap();
                        if oa.distance_grid.h + offset.super_dh != ob.distance_grid.h
                            || oa.distance_grid.v + offset.super_dv != ob.distance_grid.v
                        {
                            (false, PlayerFlags::empty(), PlayerFlags::empty(), false, false, 0, false, false, false, false)
                        } else {
                            let both_relevant = oa.attributes.intersects(REMOTE_OR_HUMAN_OR_THINKING)
                                && ob.attributes.intersects(REMOTE_OR_HUMAN_OR_THINKING);
                            let dist_sq = oa.location.distance_squared(ob.location);
                            (
                                oa.owner != ob.owner && both_relevant,
                                oa.my_player_flag,
                                ob.my_player_flag,
                                ob.attributes.contains(AttributeFlags::HIDE_EFFECT),
                                oa.attributes.contains(AttributeFlags::HIDE_EFFECT),
                                dist_sq,
                                can_engage(oa, ob),
                                can_engage(ob, oa),
                                ob.attributes.contains(AttributeFlags::CAN_BE_HIT),
                                oa.attributes.contains(AttributeFlags::CAN_BE_HIT),
                            )
                        }
                    };
                    if !eligible || dist_sq >= max_relevant_sq {
                        continue;
                    }
                    if let Some(oa) = arena.by_slot_mut(a) {
                        oa.seen_by_player_flags |= owner_b_flag;
                        if hide_a {
                            oa.runtime_flags.insert(RuntimeFlags::IS_HIDDEN);
                        }
                        oa.local_foe_strength += 1;
                        if a_may_target_b && b_can_be_hit {
                            if dist_sq < oa.closest_distance_squared {
                                oa.closest_distance_squared = dist_sq;
                                oa.closest_object = Some(b);
                            }
                            if dist_sq > oa.farthest_distance_squared {
                                oa.farthest_distance_squared = dist_sq;
                                oa.farthest_object = Some(b);
                            }
                        }
                    }
                    if let Some(ob) = arena.by_slot_mut(b) {
                        ob.seen_by_player_flags |= owner_a_flag;
                        if hide_b {
                            ob.runtime_flags.insert(RuntimeFlags::IS_HIDDEN);
                        }
                        ob.local_foe_strength += 1;
                        if b_may_target_a && a_can_be_hit {
                            if dist_sq < ob.closest_distance_squared {
                                ob.closest_distance_squared = dist_sq;
                                ob.closest_object = Some(a);
                            }
                            if dist_sq > ob.farthest_distance_squared {
                                ob.farthest_distance_squared = dist_sq;
                                ob.farthest_object = Some(a);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Walk a cell's singly-linked bucket list via `link`.
pub fn bucket_members<'a>(
    arena: &'a Arena,
    head: Option<u16>,
    link: impl Fn(&antares_core::object::SpaceObject) -> Option<u16> + 'a,
) -> impl Iterator<Item = u16> + 'a {
    std::iter::successors(head, move |&slot| link(arena.by_slot(slot).unwrap())).collect::<Vec<_>>().into_iter()
}
