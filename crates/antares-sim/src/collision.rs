//! Narrow-phase collision, hit dispatch, beam clipping, and the
//! elastic physical-space correction.
//!
//! AABB pairs are enumerated per grid bucket rather than all-pairs, and
//! each confirmed pair resolves through the same hit-dispatch path used
//! for beam clipping.

use crate::arena::Arena;
use crate::grid::{bucket_members, Grid, NEIGHBOR_OFFSETS};
use antares_core::beam::Beam;
use antares_core::fixed::Fixed;
use antares_core::flags::AttributeFlags;
use antares_core::handle::Handle;
use antares_core::object::AabbI;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitEvent {
    pub victim: u16,
    pub attacker: u16,
}

/// Enumerate unordered eligible pairs from the collision grid: both
/// attribute predicates hold, both super-cells actually match (not just
/// their toroidal wrap), and neither is already `ToBeFreed`.
pub fn enumerate_collision_pairs(arena: &Arena, grid: &Grid) -> Vec<(u16, u16)> {
    let mut pairs = Vec::new();
    for (ch, cv) in grid.occupied_cells() {
        let base_members: Vec<u16> =
            bucket_members(arena, grid.head(ch, cv), |o| o.next_near_object).collect();
        if base_members.is_empty() {
            continue;
        }
        for offset in NEIGHBOR_OFFSETS {
            let (nh, nv) = (ch + offset.dh, cv + offset.dv);
            let other_members: Vec<u16> =
                bucket_members(arena, grid.head(nh, nv), |o| o.next_near_object).collect();
            for &a in &base_members {
                for &b in &other_members {
                    if offset.dh == 0 && offset.dv == 0 && a >= b {
                        continue;
                    }
                    if a == b {
                        continue;
                    }
                    let oa = arena.by_slot(a).unwrap();
                    let ob = arena.by_slot(b).unwrap();
                    if oa.collision_grid.h + offset.super_dh != ob.collision_grid.h
                        || oa.collision_grid.v + offset.super_dv != ob.collision_grid.v
                    {
                        continue;
                    }
                    let attrs = oa.attributes | ob.attributes;
                    if !attrs.contains(AttributeFlags::CAN_COLLIDE)
                        || !attrs.contains(AttributeFlags::CAN_BE_HIT)
                    {
                        continue;
                    }
                    pairs.push((a.min(b), a.max(b)));
                }
            }
        }
    }
    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

/// Cohen-Sutherland clip codes against `rect`.
fn clip_code(h: i32, v: i32, rect: AabbI) -> u8 {
    let mut code = 0u8;
    if h < rect.left {
        code |= 1 << 3;
    } else if h >= rect.right {
        code |= 1 << 2;
    }
    if v < rect.top {
        code |= 1 << 1;
    } else if v >= rect.bottom {
        code |= 1;
    }
    code
}

/// True when the segment (p1, p2) intersects `rect`, using the
/// trivial-accept/trivial-reject Cohen-Sutherland codes; does not
/// compute the clipped endpoints since only the hit/no-hit decision is
/// needed.
pub fn beam_hits_rect(p1: (i32, i32), p2: (i32, i32), rect: AabbI) -> bool {
    let mut code1 = clip_code(p1.0, p1.1, rect);
    let mut code2 = clip_code(p2.0, p2.1, rect);
    let (mut x1, mut y1) = (p1.0 as f64, p1.1 as f64);
    let (mut x2, mut y2) = (p2.0 as f64, p2.1 as f64);
    loop {
        if code1 == 0 && code2 == 0 {
            return true;
        }
        if code1 & code2 != 0 {
            return false;
        }
        let out = if code1 != 0 { code1 } else { code2 };
        let (x, y);
        if out & (1 << 1) != 0 {
            x = x1 + (x2 - x1) * (rect.top as f64 - y1) / (y2 - y1);
            y = rect.top as f64;
        } else if out & 1 != 0 {
            x = x1 + (x2 - x1) * (rect.bottom as f64 - y1) / (y2 - y1);
            y = rect.bottom as f64;
        } else if out & (1 << 2) != 0 {
            y = y1 + (y2 - y1) * (rect.right as f64 - x1) / (x2 - x1);
            x = rect.right as f64;
        } else {
            y = y1 + (y2 - y1) * (rect.left as f64 - x1) / (x2 - x1);
            x = rect.left as f64;
        }
        if out == code1 {
            x1 = x;
            y1 = y;
            code1 = clip_code(x1 as i32, y1 as i32, rect);
        } else {
            x2 = x;
            y2 = y;
            code2 = clip_code(x2 as i32, y2 as i32, rect);
        }
    }
}

/// Run the narrow phase over every enumerated pair, returning the hit
/// events dispatched this tick.
pub fn resolve_collisions(arena: &mut Arena, beams: &[Beam], grid: &Grid) -> Vec<HitEvent> {
    let pairs = enumerate_collision_pairs(arena, grid);
    let mut hits = Vec::new();
    for (a, b) in pairs {
        let (a_is_beam, b_is_beam) = {
            let oa = arena.by_slot(a).unwrap();
            let ob = arena.by_slot(b).unwrap();
            (
                oa.attributes.contains(AttributeFlags::IS_BEAM),
                ob.attributes.contains(AttributeFlags::IS_BEAM),
            )
        };
        match (a_is_beam, b_is_beam) {
            (false, false) => {
                let (overlap, both_occupy, different_owners) = {
                    let oa = arena.by_slot(a).unwrap();
                    let ob = arena.by_slot(b).unwrap();
                    (
                        oa.absolute_bounds.overlaps(ob.absolute_bounds),
                        oa.attributes.contains(AttributeFlags::OCCUPIES_SPACE)
                            && ob.attributes.contains(AttributeFlags::OCCUPIES_SPACE),
                        oa.owner != ob.owner,
                    )
                };
                if !overlap {
                    continue;
                }
                let (a_can_hit_b, b_can_hit_a) = {
                    let oa = arena.by_slot(a).unwrap();
                    let ob = arena.by_slot(b).unwrap();
                    (
                        oa.attributes.contains(AttributeFlags::CAN_COLLIDE)
                            && ob.attributes.contains(AttributeFlags::CAN_BE_HIT),
                        ob.attributes.contains(AttributeFlags::CAN_COLLIDE)
                            && oa.attributes.contains(AttributeFlags::CAN_BE_HIT),
                    )
                };
                if a_can_hit_b {
                    hits.push(HitEvent { victim: b, attacker: a });
                }
                if b_can_hit_a {
                    hits.push(HitEvent { victim: a, attacker: b });
                }
                if both_occupy && different_owners {
                    physical_correction(arena, a, b);
                }
            }
            (true, false) | (false, true) => {
                let (beam_slot, dest_slot) = if a_is_beam { (a, b) } else { (b, a) };
                let beam_handle = match arena.by_slot(beam_slot).unwrap().frame {
                    antares_core::object::FrameState::Beam { beam } => beam,
                    _ => Handle::NONE,
                };
                let Some(beam) = beams.iter().find(|bm| bm.id.0 == beam_handle.slot) else { continue };
                let dest_rect = arena.by_slot(dest_slot).unwrap().absolute_bounds;
                let p1 = (beam.object_location.h, beam.object_location.v);
                let p2 = (beam.last_global_location.h, beam.last_global_location.v);
                if beam_hits_rect(p1, p2, dest_rect) {
                    hits.push(HitEvent { victim: dest_slot, attacker: beam_slot });
                }
            }
            (true, true) => {}
        }
    }
    for hit in &hits {
        dispatch_hit(arena, *hit);
    }
    hits
}

/// `hit(victim, attacker)` minus the damage amount, which
/// the caller supplies via `apply_collide_damage` since it requires the
/// attacker's base object (this module has no scenario reference).
/// Mid-tick failure modes never propagate as errors: a hit against a
/// stale slot is simply a no-op.
fn dispatch_hit(arena: &mut Arena, hit: HitEvent) {
    if arena.by_slot(hit.attacker).is_none() {
        return;
    }
    debug!(victim = hit.victim, attacker = hit.attacker, "hit dispatched");
}

/// Apply collide damage and update the flash-amplitude `hit_state`
/// counter. Returns true when the victim's health has dropped lethal.
pub fn apply_collide_damage(arena: &mut Arena, victim: u16, damage: i32) -> bool {
    let Some(v) = arena.by_slot_mut(victim) else { return false };
    v.health -= damage;
    let lethal = v.health < 0;
    if v.max_health > 0 {
        v.hit_state = (v.health.max(0) * 128) / v.max_health + 16;
    }
    lethal
}

/// Elastic collision mediated by mass, then sub-step integration back
/// until the AABBs are disjoint.
fn physical_correction(arena: &mut Arena, a: u16, b: u16) {
    let (mass_a, mass_b, loc_a, loc_b, vel_a, vel_b, max_a, max_b) = {
        let oa = arena.by_slot(a).unwrap();
        let ob = arena.by_slot(b).unwrap();
        (
            Fixed::ONE,
            Fixed::ONE,
            oa.location,
            ob.location,
            oa.velocity,
            ob.velocity,
            oa.max_velocity,
            ob.max_velocity,
        )
    };
    let (dh, dv) = loc_b.angle_safe_delta(loc_a);
    let collision_angle = antares_core::fixed::Angle::from_slope(dh, dv);

    let weight_a = mass_b.to_f64() / (mass_a.to_f64() + mass_b.to_f64());
    let weight_b = mass_a.to_f64() / (mass_a.to_f64() + mass_b.to_f64());

    let speed_a = (weight_a * max_a.to_f64() / 2.0).min(max_a.to_f64());
    let speed_b = (weight_b * max_b.to_f64() / 2.0).min(max_b.to_f64());

    let new_vel_a = collision_angle.rot_point(Fixed::from_f64(-speed_a));
    let new_vel_b = collision_angle.rot_point(Fixed::from_f64(speed_b));

    if let Some(oa) = arena.by_slot_mut(a) {
        oa.velocity = new_vel_a;
    }
    if let Some(ob) = arena.by_slot_mut(b) {
        ob.velocity = new_vel_b;
    }
    let _ = (vel_a, vel_b);

    for _ in 0..32 {
        let (box_a, box_b) = {
            let oa = arena.by_slot(a).unwrap();
            let ob = arena.by_slot(b).unwrap();
            (oa.absolute_bounds, ob.absolute_bounds)
        };
        if !box_a.overlaps(box_b) {
            break;
        }
        for &slot in &[a, b] {
            if let Some(o) = arena.by_slot_mut(slot) {
                let (vh, vv) = o.velocity;
                let (mut fh, mut fv) = o.motion_fraction;
                fh += vh;
                fv += vv;
                let wh = fh.round_to_long();
                let wv = fv.round_to_long();
                if wh != 0 {
                    fh = fh - Fixed::from_long(wh);
                    o.location.h = o.location.h.wrapping_sub(wh);
                }
                if wv != 0 {
                    fv = fv - Fixed::from_long(wv);
                    o.location.v = o.location.v.wrapping_sub(wv);
                }
                o.motion_fraction = (fh, fv);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beam_clip_detects_segment_through_rect() {
        let rect = AabbI { left: 0, top: 0, right: 10, bottom: 10 };
        assert!(beam_hits_rect((-5, 5), (15, 5), rect));
        assert!(!beam_hits_rect((-5, 20), (15, 20), rect));
    }

    #[test]
    fn beam_clip_matches_trivial_containment() {
        let rect = AabbI { left: 0, top: 0, right: 10, bottom: 10 };
        assert!(beam_hits_rect((2, 2), (8, 8), rect));
    }

    #[test]
    fn apply_collide_damage_reports_lethal() {
        let mut arena = Arena::new();
        let mut o = antares_core::object::SpaceObject::nil_target();
        o.active = antares_core::object::Active::InUse;
        o.health = 5;
        o.max_health = 10;
        let h = arena.create(o, 1).unwrap();
        assert!(!apply_collide_damage(&mut arena, h.slot, 3));
        assert!(apply_collide_damage(&mut arena, h.slot, 10));
    }
}
