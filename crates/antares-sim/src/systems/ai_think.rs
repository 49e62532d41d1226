//! Runs `antares_ai::think::decide` once per major tick per thinking
//! object, building its `ThinkContext` from the live arena and applying
//! the result back.

use crate::arena::Arena;
use antares_ai::think::{decide, SkillRatio as AiSkillRatio, TargetCandidate, ThinkContext, WeaponInfo};
use antares_core::base_object::{BaseObject, BaseObjectId, WeaponSlot};
use antares_core::flags::{AttributeFlags, RuntimeFlags};
use antares_core::handle::Handle;
use antares_core::random::Rng;
use std::collections::HashMap;

fn candidate_from_slot(arena: &Arena, slot: u16, self_direction_goal: antares_core::fixed::Angle) -> Option<TargetCandidate> {
    let obj = arena.by_slot(slot)?;
    let axis_distance = (obj.direction.value() as i64 - self_direction_goal.value() as i64).abs();
    Some(TargetCandidate {
        handle: arena.handle_of(slot),
        location: obj.location,
        owner: obj.owner,
        hated: obj.attributes.contains(AttributeFlags::HATED),
        is_guided: obj.attributes.contains(AttributeFlags::IS_GUIDED),
        health: obj.health,
        longest_weapon_range_squared: 0,
        can_engage_tag: obj
            .attributes
            .contains(AttributeFlags::ONLY_ENGAGED_BY)
            .then_some(obj.engage_key_tag),
        is_cloaked: obj.runtime_flags.contains(RuntimeFlags::IS_CLOAKED),
        direction: obj.direction,
        direction_goal_axis_distance: axis_distance,
    })
}

fn weapon_info(base: &BaseObject, slot: WeaponSlot) -> WeaponInfo {
    match base.weapon(slot) {
        Some(device) => WeaponInfo {
            equipped: true,
            usage_attacking: true,
            auto_target: device.auto_target,
            range_squared: base.engage_range_squared,
        },
        None => WeaponInfo { equipped: false, usage_attacking: false, auto_target: false, range_squared: 0 },
    }
}

/// Run think for one slot, applying the resulting target/destination
/// updates and keys-down bits directly onto the arena.
pub fn run_think_for_slot(arena: &mut Arena, base_objects: &HashMap<BaseObjectId, BaseObject>, slot: u16, rng: &mut Rng) {
    let (base_type, skip) = {
        let obj = match arena.by_slot(slot) {
            Some(o) => o,
            None => return,
        };
        let human = obj.attributes.contains(AttributeFlags::IS_HUMAN_CONTROLLED)
            || obj.attributes.contains(AttributeFlags::IS_REMOTE);
        (obj.base_type, human || !obj.attributes.contains(AttributeFlags::CAN_THINK))
    };
    if skip {
        return;
    }
    let Some(base) = base_objects.get(&base_type) else { return };

    let ctx = {
        let obj = arena.by_slot(slot).unwrap();
        let current_target_valid = !obj.target_object.is_none() && arena.get(obj.target_object).is_some();
        let current_target = if current_target_valid {
            candidate_from_slot(arena, obj.target_object.slot, obj.direction_goal)
        } else {
            None
        };
        let closest_object = obj
            .closest_object
            .and_then(|s| candidate_from_slot(arena, s, obj.direction_goal));
        let dest_object = if !obj.dest_object.is_none() {
            candidate_from_slot(arena, obj.dest_object.slot, obj.direction_goal)
        } else {
            None
        };
        ThinkContext {
            self_location: obj.location,
            self_direction: obj.direction,
            self_direction_goal: obj.direction_goal,
            self_owner: obj.owner,
            self_health: obj.health,
            self_max_health: obj.max_health,
            current_target,
            current_target_valid,
            closest_object,
            last_known_target_location: obj.location,
            engage_range_squared: base.engage_range_squared,
            weapons: [
                weapon_info(base, WeaponSlot::Pulse),
                weapon_info(base, WeaponSlot::Beam),
                weapon_info(base, WeaponSlot::Special),
            ],
            dest_object,
            dest_object_dest: if obj.dest_object_dest.is_none() { None } else { Some(obj.dest_object_dest) },
            destination_location: obj.destination_location,
            is_holding_station: obj.dest_object == Handle { slot, id: obj.id },
            has_arrived: obj.runtime_flags.contains(antares_core::flags::RuntimeFlags::HAS_ARRIVED),
            arrive_distance_squared: Some(base.arrive_distance_squared),
            arrive_action_configured: !base.arrive.is_empty(),
            skill: AiSkillRatio { num: base.skill.num, den: base.skill.den },
            persistent_keys_down: obj.keys_down,
            manual_override: false,
        }
    };

    let out = decide(&ctx, rng);

    if let Some(o) = arena.by_slot_mut(slot) {
        o.keys_down = out.keys_down;
        if let Some(target) = out.new_target {
            o.target_object = target;
        }
        if let Some(goal) = out.direction_goal {
            o.direction_goal = goal;
        }
        if let Some(angle) = out.target_angle {
            o.target_angle = angle;
        }
        if let Some(dest) = out.new_destination {
            o.dest_object = dest;
        }
        if let Some(arrived) = out.has_arrived {
            if arrived {
                o.runtime_flags.insert(antares_core::flags::RuntimeFlags::HAS_ARRIVED);
            } else {
                o.runtime_flags.remove(antares_core::flags::RuntimeFlags::HAS_ARRIVED);
            }
        }
    }
}

pub fn run_think(arena: &mut Arena, base_objects: &HashMap<BaseObjectId, BaseObject>, rng: &mut Rng) {
    for slot in arena.active_slots() {
        run_think_for_slot(arena, base_objects, slot, rng);
    }
}
