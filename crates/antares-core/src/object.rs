//! `SpaceObject`: the core entity.

use crate::base_object::{BaseObjectId, WeaponSlot};
use crate::coord::UniverseCoord;
use crate::fixed::{Angle, Fixed};
use crate::flags::{AttributeFlags, KeysDown, PlayerFlags, RuntimeFlags};
use crate::handle::Handle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Active {
    Available,
    InUse,
    ToBeFreed,
}

impl Default for Active {
    fn default() -> Self {
        Active::Available
    }
}

/// A weapon instance mounted on an object, distinct from its immutable
/// `WeaponDevice` descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponMount {
    pub base: Option<BaseObjectId>,
    pub ammo: i32,
    pub position_index: u32,
    pub charge: i32,
    pub next_fire_tick: i64,
}

impl Default for WeaponMount {
    fn default() -> Self {
        WeaponMount {
            base: None,
            ammo: 0,
            position_index: 0,
            charge: 0,
            next_fire_tick: 0,
        }
    }
}

/// Per-variant presence data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Presence {
    Normal,
    WarpIn { progress: i32 },
    Warping { speed: Fixed, drained: i32 },
    WarpOut { speed: Fixed, refund: i32 },
    Landing { scale: Fixed, speed: Fixed },
}

impl Default for Presence {
    fn default() -> Self {
        Presence::Normal
    }
}

/// Polymorphic per-instance animation/rotation/beam state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FrameState {
    Rotation,
    Animation { this_shape: Fixed },
    Beam { beam: Handle },
    Weapon,
}

impl Default for FrameState {
    fn default() -> Self {
        FrameState::Rotation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AabbI {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl AabbI {
    pub fn overlaps(self, other: AabbI) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub h: i32,
    pub v: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceObject {
    pub slot: u16,
    pub id: u16,
    pub active: Active,

    pub base_type: BaseObjectId,
    pub attributes: AttributeFlags,

    pub owner: Option<i32>,

    pub location: UniverseCoord,
    pub direction: Angle,
    pub turn_velocity: Fixed,
    pub turn_fraction: Fixed,
    pub direction_goal: Angle,

    pub velocity: (Fixed, Fixed),
    pub motion_fraction: (Fixed, Fixed),
    pub thrust: Fixed,
    pub max_velocity: Fixed,

    pub absolute_bounds: AabbI,

    pub next_near_object: Option<u16>,
    pub next_far_object: Option<u16>,
    pub prev_active: Option<u16>,
    pub next_active: Option<u16>,

    pub health: i32,
    pub max_health: i32,
    pub energy: i32,
    pub max_energy: i32,
    pub battery: i32,

    pub pulse: WeaponMount,
    pub beam: WeaponMount,
    pub special: WeaponMount,

    pub target_object: Handle,
    pub closest_object: Option<u16>,
    pub closest_distance_squared: i64,
    pub farthest_object: Option<u16>,
    pub farthest_distance_squared: i64,
    pub target_angle: Angle,
    pub last_target_distance: i64,

    pub dest_object: Handle,
    pub dest_object_dest: Handle,
    pub destination_location: UniverseCoord,

    pub presence: Presence,

    pub runtime_flags: RuntimeFlags,

    pub seen_by_player_flags: PlayerFlags,
    pub my_player_flag: PlayerFlags,
    pub hit_state: i32,
    pub cloak_state: i32,

    pub frame: FrameState,

    pub random_seed: i32,

    pub time_from_origin: i64,
    pub offline_time: i32,
    pub recharge_time: i32,
    pub periodic_time: i32,
    pub expire_after: i32,
    pub age: i32,

    pub keys_down: KeysDown,

    pub collision_grid: GridPos,
    pub distance_grid: GridPos,

    pub engage_key_tag: u32,

    pub local_friend_strength: i32,
    pub local_foe_strength: i32,
}

impl SpaceObject {
    /// A zero-initialized sentinel used wherever `direct` has no real
    /// object: every bit test against its attributes is false, every
    /// handle on it is `Handle::NONE`, so action-queue filters behave
    /// uniformly whether or not the target resolved.
    pub fn nil_target() -> SpaceObject {
        SpaceObject {
            slot: u16::MAX,
            id: 0,
            active: Active::Available,
            base_type: BaseObjectId(0),
            attributes: AttributeFlags::empty(),
            owner: None,
            location: UniverseCoord::default(),
            direction: Angle::new(0),
            turn_velocity: Fixed::ZERO,
            turn_fraction: Fixed::ZERO,
            direction_goal: Angle::new(0),
            velocity: (Fixed::ZERO, Fixed::ZERO),
            motion_fraction: (Fixed::ZERO, Fixed::ZERO),
            thrust: Fixed::ZERO,
            max_velocity: Fixed::ZERO,
            absolute_bounds: AabbI::default(),
            next_near_object: None,
            next_far_object: None,
            prev_active: None,
            next_active: None,
            health: 0,
            max_health: 0,
            energy: 0,
            max_energy: 0,
            battery: 0,
            pulse: WeaponMount::default(),
            beam: WeaponMount::default(),
            special: WeaponMount::default(),
            target_object: Handle::NONE,
            closest_object: None,
            closest_distance_squared: i64::MAX,
            farthest_object: None,
            farthest_distance_squared: i64::MIN,
            target_angle: Angle::new(0),
            last_target_distance: i64::MAX,
            dest_object: Handle::NONE,
            dest_object_dest: Handle::NONE,
            destination_location: UniverseCoord::default(),
            presence: Presence::Normal,
            runtime_flags: RuntimeFlags::empty(),
            seen_by_player_flags: PlayerFlags::empty(),
            my_player_flag: PlayerFlags::empty(),
            hit_state: 0,
            cloak_state: 0,
            frame: FrameState::Rotation,
            random_seed: 0,
            time_from_origin: 0,
            offline_time: 0,
            recharge_time: 0,
            periodic_time: 0,
            expire_after: -1,
            age: -1,
            keys_down: KeysDown::empty(),
            collision_grid: GridPos::default(),
            distance_grid: GridPos::default(),
            engage_key_tag: 0,
            local_friend_strength: 0,
            local_foe_strength: 0,
        }
    }

    pub fn is_in_use(&self) -> bool {
        matches!(self.active, Active::InUse)
    }

    pub fn weapon_mount(&self, slot: WeaponSlot) -> &WeaponMount {
        match slot {
            WeaponSlot::Pulse => &self.pulse,
            WeaponSlot::Beam => &self.beam,
            WeaponSlot::Special => &self.special,
        }
    }

    pub fn weapon_mount_mut(&mut self, slot: WeaponSlot) -> &mut WeaponMount {
        match slot {
            WeaponSlot::Pulse => &mut self.pulse,
            WeaponSlot::Beam => &mut self.beam,
            WeaponSlot::Special => &mut self.special,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_target_attributes_are_all_false() {
        let nil = SpaceObject::nil_target();
        assert!(!nil.attributes.contains(AttributeFlags::CAN_COLLIDE));
        assert!(nil.target_object.is_none());
        assert!(nil.dest_object.is_none());
    }

    #[test]
    fn aabb_overlap_is_exclusive_on_shared_edge() {
        let a = AabbI { left: 0, top: 0, right: 10, bottom: 10 };
        let touching = AabbI { left: 10, top: 0, right: 20, bottom: 10 };
        assert!(!a.overlaps(touching));
        let overlapping = AabbI { left: 9, top: 0, right: 20, bottom: 10 };
        assert!(a.overlaps(overlapping));
    }
}
