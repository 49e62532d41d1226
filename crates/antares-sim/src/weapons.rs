//! Weapon firing discipline and the energy/battery/ammo economy.
//!
//! Grounded in `systems/fire_control.rs`: recharge and economy are
//! stepped once per major tick, fire-time gating is a
//! `next_fire_tick`-shaped field compared against the current tick.

use antares_core::base_object::{BaseObject, WeaponSlot};
use antares_core::flags::KeysDown;
use antares_core::object::SpaceObject;

pub const HEALTH_RATIO: i32 = 5;
pub const WEAPON_RATIO: i32 = 2;
pub const ENERGY_CHUNK: i32 = HEALTH_RATIO + 3 * WEAPON_RATIO; // 11

const SLOTS: [WeaponSlot; 3] = [WeaponSlot::Pulse, WeaponSlot::Beam, WeaponSlot::Special];
const SLOT_KEYS: [KeysDown; 3] = [KeysDown::PULSE, KeysDown::BEAM, KeysDown::SPECIAL];

/// Run one major tick's recharge step, gated by
/// `rechargeTime` crossing 12 every 3 ticks.
pub fn recharge(obj: &mut SpaceObject, base: &BaseObject) {
    obj.recharge_time += 3;
    if obj.recharge_time < 12 {
        return;
    }
    obj.recharge_time = 0;

    if obj.energy <= obj.max_energy - ENERGY_CHUNK && obj.battery > ENERGY_CHUNK {
        obj.battery -= ENERGY_CHUNK;
        obj.energy += ENERGY_CHUNK;
    }

    if obj.health < obj.max_health / 2 && obj.energy > HEALTH_RATIO {
        obj.health += 1;
        obj.energy -= HEALTH_RATIO;
    }

    for slot in SLOTS {
        let Some(device) = base.weapon(slot) else { continue };
        let ammo = obj.weapon_mount_mut(slot).ammo;
        if ammo >= device.ammo / 2 || obj.energy < WEAPON_RATIO {
            continue;
        }
        let mount = obj.weapon_mount_mut(slot);
        mount.charge += 1;
        obj.energy -= WEAPON_RATIO;
        let mount = obj.weapon_mount_mut(slot);
        if device.restock_cost > 0 && mount.charge >= device.restock_cost {
            mount.charge -= device.restock_cost;
            mount.ammo += 1;
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FireResult {
    pub slot: WeaponSlot,
    pub rotated_position: (antares_core::fixed::Fixed, antares_core::fixed::Fixed),
}

/// Attempt to fire every weapon whose key is pressed, in slot order.
/// Firing debits energy and, if not the special slot, uncloaks the
/// object; returns one `FireResult` per weapon that actually fired.
pub fn fire_requested_weapons(obj: &mut SpaceObject, base: &BaseObject, tick: i64) -> Vec<FireResult> {
    let mut fired = Vec::new();
    for (slot, key) in SLOTS.into_iter().zip(SLOT_KEYS) {
        if !obj.keys_down.contains(key) {
            continue;
        }
        let Some(device) = base.weapon(slot) else { continue };
        let mount = obj.weapon_mount(slot);
        if tick < mount.next_fire_tick {
            continue;
        }
        if obj.energy < device.energy_cost {
            continue;
        }
        if device.ammo >= 0 && mount.ammo <= 0 {
            continue;
        }
        obj.energy -= device.energy_cost;
        if !matches!(slot, WeaponSlot::Special) {
            obj.cloak_state = 0;
            obj.runtime_flags.remove(antares_core::flags::RuntimeFlags::IS_CLOAKED);
        }
        let position_index = {
            let mount = obj.weapon_mount_mut(slot);
            let idx = mount.position_index as usize % device.positions.len().max(1);
            mount.position_index = mount.position_index.wrapping_add(1);
            idx
        };
        let (lh, lv) = device.positions.get(position_index).copied().unwrap_or((
            antares_core::fixed::Fixed::ZERO,
            antares_core::fixed::Fixed::ZERO,
        ));
        let (cos, sin) = (obj.direction.cos(), obj.direction.sin());
        let rotated_position = (lh.mul(cos) - lv.mul(sin), lh.mul(sin) + lv.mul(cos));

        let mount = obj.weapon_mount_mut(slot);
        mount.next_fire_tick = tick + device.fire_time as i64;
        if device.ammo > 0 {
            mount.ammo -= 1;
        }
        fired.push(FireResult { slot, rotated_position });
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use antares_core::base_object::{BaseObjectId, FrameKind, IntRange, SkillRatio, WeaponDevice};
    use antares_core::flags::AttributeFlags;
    use antares_core::object::Active;

    fn base_with_pulse() -> BaseObject {
        BaseObject {
            id: BaseObjectId(0),
            attributes: AttributeFlags::empty(),
            mass: antares_core::fixed::Fixed::ONE,
            max_velocity: antares_core::fixed::Fixed::ONE,
            thrust: antares_core::fixed::Fixed::ZERO,
            max_health: 10,
            max_energy: 100,
            initial_velocity: IntRange::default(),
            initial_direction: IntRange::default(),
            initial_age: IntRange::default(),
            natural_scale: 4096,
            frame: FrameKind::Rotation { rot_res: 1 },
            pulse: Some(WeaponDevice {
                fires: BaseObjectId(1),
                ammo: 10,
                positions: vec![(antares_core::fixed::Fixed::ZERO, antares_core::fixed::Fixed::ZERO)],
                fire_time: 30,
                energy_cost: 1,
                restock_cost: 4,
                auto_target: false,
                activate: vec![],
            }),
            beam: None,
            special: None,
            arrive_distance_squared: 0,
            build_flags: 0,
            skill: SkillRatio { num: 1, den: 1 },
            warp_speed: antares_core::fixed::Fixed::ZERO,
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
    fn recharge_transfers_battery_to_energy_in_chunks() {
        let base = base_with_pulse();
        let mut obj = SpaceObject::nil_target();
        obj.active = Active::InUse;
        obj.energy = 0;
        obj.max_energy = 100;
        obj.battery = 50;
        for _ in 0..4 {
            recharge(&mut obj, &base);
        }
        assert_eq!(obj.energy, ENERGY_CHUNK);
        assert_eq!(obj.battery, 50 - ENERGY_CHUNK);
    }

    #[test]
    fn firing_respects_next_fire_tick_gate() {
        let base = base_with_pulse();
        let mut obj = SpaceObject::nil_target();
        obj.active = Active::InUse;
        obj.energy = 10;
        obj.keys_down = KeysDown::PULSE;
        let first = fire_requested_weapons(&mut obj, &base, 0);
        assert_eq!(first.len(), 1);
        let second = fire_requested_weapons(&mut obj, &base, 1);
        assert!(second.is_empty());
        let third = fire_requested_weapons(&mut obj, &base, 30);
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn firing_without_ammo_is_a_no_op() {
        let mut base = base_with_pulse();
        base.pulse.as_mut().unwrap().ammo = 0;
        let mut obj = SpaceObject::nil_target();
        obj.active = Active::InUse;
        obj.energy = 10;
        obj.keys_down = KeysDown::PULSE;
        let fired = fire_requested_weapons(&mut obj, &base, 0);
        assert!(fired.is_empty());
    }
}
