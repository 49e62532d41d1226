//! The eight-step per-object motion integrator.
//!
//! Decomposed into named helper steps rather than one long function,
//! the way a state machine with several sequential phases reads best
//! one phase at a time.

use crate::arena::Arena;
use antares_core::base_object::{BaseObject, BaseObjectId, FrameKind};
use antares_core::beam::{Beam, BeamKind};
use antares_core::coord::UniverseCoord;
use antares_core::fixed::{Angle, Fixed};
use antares_core::flags::AttributeFlags;
use antares_core::object::{Active, FrameState, Presence, SpaceObject};
use std::collections::HashMap;

/// Step 1: integrate `turnFraction`, rounding toward zero then away on
/// negative values, and wrap `direction`.
fn turn(obj: &mut SpaceObject) {
    if obj.turn_velocity == Fixed::ZERO {
        return;
    }
    obj.turn_fraction += obj.turn_velocity;
    let whole = obj.turn_fraction.round_to_long();
    if whole != 0 {
        obj.turn_fraction = obj.turn_fraction - Fixed::from_long(whole);
        obj.direction = obj.direction.add(whole);
    }
}

fn presence_speed(obj: &SpaceObject) -> Fixed {
    match obj.presence {
        // The ship holds position while the warp-in effect ramps up.
        Presence::WarpIn { .. } => Fixed::ZERO,
        Presence::Warping { speed, .. } => speed,
        Presence::WarpOut { speed, .. } => speed,
        Presence::Normal | Presence::Landing { .. } => obj.max_velocity,
    }
}

/// Step 2: accelerate/brake `velocity` toward a target, capped by
/// `|thrust|` along the delta's own direction. Mirrors `Motion.cpp`:
/// find the delta vector's angle via the same table `rot_point` reads
/// from, build the max-thrust vector at that angle, then clamp each
/// axis of the delta against it — no floating point anywhere.
fn thrust(obj: &mut SpaceObject) {
    if obj.thrust == Fixed::ZERO {
        return;
    }
    let (vh, vv) = obj.velocity;
    let (mut fa, mut fb, use_thrust) = if obj.thrust > Fixed::ZERO {
        let speed = presence_speed(obj);
        let (gh, gv) = obj.direction.rot_point(speed);
        (gh - vh, gv - vv, obj.thrust)
    } else {
        (-vh, -vv, -obj.thrust)
    };

    let angle = Angle::from_slope(fa, fb);
    let (fh, fv) = angle.rot_point(use_thrust);

    if fh < Fixed::ZERO {
        if fa < fh {
            fa = fh;
        }
    } else if fa > fh {
        fa = fh;
    }
    if fv < Fixed::ZERO {
        if fb < fv {
            fb = fv;
        }
    } else if fb > fv {
        fb = fv;
    }

    obj.velocity = (vh + fa, vv + fb);
}

/// Step 3: integrate `motionFraction` into `location`. The source
/// decrements location by the rounded velocity — preserved exactly
/// so rendering and sensor
/// geometry agree with the original.
fn integrate_position(obj: &mut SpaceObject) {
    let (vh, vv) = obj.velocity;
    let (mut fh, mut fv) = obj.motion_fraction;
    fh += vh;
    fv += vv;
    let wh = fh.round_to_long();
    let wv = fv.round_to_long();
    if wh != 0 {
        fh = fh - Fixed::from_long(wh);
        obj.location.h = obj.location.h.wrapping_sub(wh);
    }
    if wv != 0 {
        fv = fv - Fixed::from_long(wv);
        obj.location.v = obj.location.v.wrapping_sub(wv);
    }
    obj.motion_fraction = (fh, fv);
}

/// Step 4: thinkiverse bounds. Bouncing objects clamp and reflect;
/// others are marked for destruction once they leave the box.
fn bounds(obj: &mut SpaceObject) {
    if obj.location.in_thinkiverse() {
        return;
    }
    if obj.attributes.contains(AttributeFlags::DOES_BOUNCE) {
        let clamped = obj.location.clamp_to_thinkiverse();
        if clamped.h != obj.location.h {
            obj.velocity.0 = -obj.velocity.0;
        }
        if clamped.v != obj.location.v {
            obj.velocity.1 = -obj.velocity.1;
        }
        obj.location = clamped;
    } else {
        obj.active = Active::ToBeFreed;
    }
}

/// Step 5: self-animation shape stepping.
fn self_animate(obj: &mut SpaceObject, base: Option<&BaseObject>) {
    if !obj.attributes.contains(AttributeFlags::IS_SELF_ANIMATED) {
        return;
    }
    let Some(base) = base else { return };
    let FrameKind::Animation { first_shape, last_shape, frame_direction, frame_speed } = base.frame else {
        return;
    };
    if frame_speed == Fixed::ZERO {
        return;
    }
    if let FrameState::Animation { this_shape } = &mut obj.frame {
        *this_shape += frame_speed.mul(Fixed::from_long(frame_direction));
        let lo = Fixed::from_long(first_shape);
        let hi = Fixed::from_long(last_shape + 1);
        if *this_shape >= hi || *this_shape < lo {
            if obj.attributes.contains(AttributeFlags::ANIMATION_CYCLE) {
                let span = hi - lo;
                let mut v = *this_shape;
                while v >= hi {
                    v = v - span;
                }
                while v < lo {
                    v = v + span;
                }
                *this_shape = v;
            } else {
                *this_shape = if *this_shape >= hi { hi - Fixed::ONE } else { lo };
                obj.active = Active::ToBeFreed;
            }
        }
    }
}

/// Step 6: beam-hosting objects copy their motion into the beam table.
fn follow_beam(obj: &SpaceObject, beams: &mut [Beam], arena_lookup: &dyn Fn(u16) -> Option<UniverseCoord>) {
    let FrameState::Beam { beam } = obj.frame else { return };
    if beam.is_none() {
        return;
    }
    let Some(b) = beams.iter_mut().find(|b| b.id.0 == beam.slot) else { return };
    b.object_location = obj.location;
    match b.kind {
        BeamKind::StaticObjectToObject | BeamKind::BoltObjectToObject => {
            let from_ok = arena_lookup(b.from.slot).map(|loc| b.last_global_location = loc).is_some();
            let to_ok = arena_lookup(b.to.slot).is_some();
            if !from_ok || !to_ok {
                b.kill_me = true;
            }
        }
        BeamKind::StaticObjectToRelativeCoord | BeamKind::BoltObjectToRelativeCoord => {
            if let Some(from_loc) = arena_lookup(b.from.slot) {
                b.object_location = UniverseCoord::new(
                    from_loc.h + b.to_relative_coord.h,
                    from_loc.v + b.to_relative_coord.v,
                );
            } else {
                b.kill_me = true;
            }
        }
        BeamKind::Kinetic => {}
    }
}

/// Step 8: hit-state and cloak counters decay toward their rest values.
fn decay_visual_state(obj: &mut SpaceObject, ticks: i32) {
    if obj.hit_state > 0 {
        obj.hit_state = (obj.hit_state - 4 * ticks).max(0);
    }
    if obj.cloak_state > 0 {
        obj.cloak_state = (obj.cloak_state + ticks).min(254);
    } else if obj.cloak_state < 0 {
        obj.cloak_state = (obj.cloak_state + ticks).min(0);
    }
}

/// Run one minor tick's motion pass over every active, non-stationary
/// object. Per-object `closest_object`/`closest_distance_squared`/
/// `farthest_object` bookkeeping is a pairwise concept that needs the
/// full proximity grid, not just this pass's sequential walk, so it
/// runs in `grid::update_visibility`'s far-grid sweep instead.
pub fn run_minor_tick(
    arena: &mut Arena,
    base_objects: &HashMap<BaseObjectId, BaseObject>,
    beams: &mut Vec<Beam>,
    ticks: i32,
) {
    let slots = arena.active_slots();
    for &slot in &slots {
        let base_type = arena.by_slot(slot).unwrap().base_type;
        let base = base_objects.get(&base_type);
        {
            let obj = arena.by_slot_mut(slot).unwrap();
            turn(obj);
            thrust(obj);
            integrate_position(obj);
            bounds(obj);
            self_animate(obj, base);
            decay_visual_state(obj, ticks);
        }
    }

    // Step 6 needs to read other objects' locations, so it runs in a
    // second pass once everyone has moved.
    for &slot in &slots {
        let obj = arena.by_slot(slot).unwrap().clone();
        let lookup = |s: u16| arena.by_slot(s).map(|o| o.location);
        follow_beam(&obj, beams, &lookup);
    }
    // Culling of `kill_me` beams is the caller's concern —
    // it happens alongside the arena sweep, not here.
}
