//! Presence state machine: Normal / WarpIn / Warping / WarpOut / Landing.
//!
//! Grounded the way `deterrence-threat-ai::fsm` is: a pure `evaluate`
//! per phase, matched on the current variant, returning the next one.

use antares_core::base_object::BaseObject;
use antares_core::fixed::Fixed;
use antares_core::flags::{AttributeFlags, KeysDown};
use antares_core::object::{Active, Presence, SpaceObject};

pub const WARP_ACCELERATION: Fixed = Fixed::from_val(1 << 14);

/// Sound cue ids emitted at each WarpIn step.
pub const WARP_IN_STEPS: [i32; 4] = [25, 50, 75, 100];

#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceEvent {
    pub warp_in_step_sound: Option<i32>,
    pub entered_warping: bool,
    pub entered_warp_out: bool,
    pub returned_to_normal: bool,
    pub spawn_warp_in_flare: bool,
    pub spawn_warp_out_flare: bool,
    pub landed_and_expired: bool,
}

/// Advance one object's presence by one major tick. Returns any
/// side-effecting events the caller (action dispatch / event stream)
/// needs to react to.
pub fn step_presence(obj: &mut SpaceObject, base: &BaseObject, major_tick_ticks: i32) -> PresenceEvent {
    let mut ev = PresenceEvent::default();
    match obj.presence {
        Presence::Normal => {
            obj.max_velocity = obj.max_velocity.min(base.max_velocity);
            if obj.keys_down.contains(KeysDown::WARP)
                && base.warp_speed > Fixed::ZERO
                && obj.energy > (obj.max_energy >> 3)
            {
                obj.presence = Presence::WarpIn { progress: 0 };
            }
        }
        Presence::WarpIn { mut progress } => {
            progress += major_tick_ticks;
            if let Some(&step) = WARP_IN_STEPS.iter().find(|&&s| progress >= s && progress - major_tick_ticks < s) {
                ev.warp_in_step_sound = Some(step);
            }
            if progress >= 100 {
                let cost = obj.max_energy >> 3;
                let debited = debit_energy(obj, cost);
                if debited {
                    obj.presence = Presence::Warping { speed: base.warp_speed, drained: 0 };
                    obj.attributes.remove(AttributeFlags::OCCUPIES_SPACE);
                    ev.entered_warping = true;
                    ev.spawn_warp_in_flare = true;
                } else {
                    obj.energy = 0;
                    obj.presence = Presence::Normal;
                }
            } else {
                obj.presence = Presence::WarpIn { progress };
            }
        }
        Presence::Warping { speed, mut drained } => {
            obj.max_velocity = speed;
            let drain = collect_warp_energy(obj, 1);
            drained += drain;
            if obj.energy <= 0 {
                obj.presence = Presence::WarpOut { speed, refund: drained };
                ev.entered_warp_out = true;
            } else {
                obj.presence = Presence::Warping { speed, drained };
            }
        }
        Presence::WarpOut { mut speed, refund } => {
            speed -= WARP_ACCELERATION;
            if speed < obj.max_velocity {
                obj.battery = (obj.battery + refund).min(obj.max_energy * 5);
                obj.attributes.insert(AttributeFlags::OCCUPIES_SPACE);
                let dir_vec = obj.direction.rot_point(obj.max_velocity);
                obj.velocity = dir_vec;
                obj.presence = Presence::Normal;
                ev.returned_to_normal = true;
                ev.spawn_warp_out_flare = true;
            } else {
                obj.presence = Presence::WarpOut { speed, refund };
            }
        }
        Presence::Landing { mut scale, speed } => {
            scale -= speed;
            if scale <= Fixed::ZERO {
                obj.active = Active::ToBeFreed;
                ev.landed_and_expired = true;
            } else {
                obj.presence = Presence::Landing { scale, speed };
            }
        }
    }
    ev
}

/// Whether an AI-controlled warping object should signal `WarpKey` to
/// bail out of warp.
pub fn should_signal_warp_out(
    obj: &SpaceObject,
    base: &BaseObject,
    destination_distance_squared: i64,
    target_is_warping: bool,
) -> bool {
    matches!(obj.presence, Presence::Warping { .. })
        && (destination_distance_squared >= base.warp_out_distance_squared || target_is_warping)
}

fn debit_energy(obj: &mut SpaceObject, amount: i32) -> bool {
    if obj.battery >= amount {
        obj.battery -= amount;
        true
    } else if obj.energy >= amount {
        obj.energy -= amount;
        true
    } else {
        false
    }
}

fn collect_warp_energy(obj: &mut SpaceObject, amount: i32) -> i32 {
    let take = amount.min(obj.energy);
    obj.energy -= take;
    take
}

#[cfg(test)]
mod tests {
    use super::*;
    use antares_core::base_object::{BaseObjectId, FrameKind, IntRange, SkillRatio};

    fn dummy_base() -> BaseObject {
        BaseObject {
            id: BaseObjectId(0),
            attributes: AttributeFlags::empty(),
            mass: Fixed::ONE,
            max_velocity: Fixed::from_long(10),
            thrust: Fixed::ZERO,
            max_health: 10,
            max_energy: 100,
            initial_velocity: IntRange::default(),
            initial_direction: IntRange::default(),
            initial_age: IntRange::default(),
            natural_scale: 4096,
            frame: FrameKind::Rotation { rot_res: 1 },
            pulse: None,
            beam: None,
            special: None,
            arrive_distance_squared: 0,
            build_flags: 0,
            skill: SkillRatio { num: 1, den: 1 },
            warp_speed: Fixed::from_long(500),
            warp_out_distance_squared: 0,
            destroy: vec![],
            expire: vec![],
            create: vec![],
            collide: vec![],
            activate: vec![],
            arrive: vec![],
            collide_damage: 0,
            engage_range_squared: 0,
        }
    }

    #[test]
    fn warp_key_with_enough_energy_enters_warp_in() {
        let base = dummy_base();
        let mut obj = SpaceObject::nil_target();
        obj.active = Active::InUse;
        obj.energy = 100;
        obj.max_energy = 100;
        obj.keys_down = KeysDown::WARP;
        step_presence(&mut obj, &base, 3);
        assert!(matches!(obj.presence, Presence::WarpIn { .. }));
    }

    #[test]
    fn warp_in_completes_after_100_ticks_with_enough_energy() {
        let base = dummy_base();
        let mut obj = SpaceObject::nil_target();
        obj.active = Active::InUse;
        obj.energy = 100;
        obj.max_energy = 100;
        obj.presence = Presence::WarpIn { progress: 99 };
        let ev = step_presence(&mut obj, &base, 3);
        assert!(matches!(obj.presence, Presence::Warping { .. }));
        assert!(ev.entered_warping);
        assert!(!obj.attributes.contains(AttributeFlags::OCCUPIES_SPACE));
    }

    #[test]
    fn landing_expires_when_scale_reaches_zero() {
        let base = dummy_base();
        let mut obj = SpaceObject::nil_target();
        obj.active = Active::InUse;
        obj.presence = Presence::Landing { scale: Fixed::from_f64(0.05), speed: Fixed::from_f64(0.1) };
        let ev = step_presence(&mut obj, &base, 3);
        assert!(ev.landed_and_expired);
        assert_eq!(obj.active, Active::ToBeFreed);
    }
}
