//! Immutable type descriptors, loaded once and shared by every instance.

use crate::action::ActionId;
use crate::fixed::Fixed;
use crate::flags::AttributeFlags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BaseObjectId(pub u32);

/// A `lo..=hi` range rolled at creation time (for initial velocity,
/// direction, and age).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i32,
    pub range: i32,
}

impl IntRange {
    pub fn fixed(value: i32) -> IntRange {
        IntRange { min: value, range: 0 }
    }

    /// Roll a value in `min..min+range`, consuming the global seed.
    pub fn sample(&self, rng: &mut crate::random::Rng) -> i32 {
        self.min + rng.next_in_range(self.range.max(0))
    }
}

/// One of the three weapon slots a base type may equip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponSlot {
    Pulse,
    Beam,
    Special,
}

/// A weapon device descriptor, referenced by slot from `BaseObject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDevice {
    pub fires: BaseObjectId,
    pub ammo: i32,
    /// Barrel offsets, in object-local space, cycled through on each shot.
    pub positions: Vec<(Fixed, Fixed)>,
    pub fire_time: i32,
    pub energy_cost: i32,
    pub restock_cost: i32,
    pub auto_target: bool,
    pub activate: Vec<ActionId>,
}

/// Polymorphic sprite-frame descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    Rotation { rot_res: i32 },
    Animation {
        first_shape: i32,
        last_shape: i32,
        frame_direction: i32,
        frame_speed: Fixed,
    },
    Beam,
    Weapon,
}

/// Skill ratio (`num`/`den`) that gates how often AI adopts a motion or
/// weapon decision into its persistent keys-down state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRatio {
    pub num: i32,
    pub den: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseObject {
    pub id: BaseObjectId,
    pub attributes: AttributeFlags,
    pub mass: Fixed,
    pub max_velocity: Fixed,
    pub thrust: Fixed,
    pub max_health: i32,
    pub max_energy: i32,
    pub initial_velocity: IntRange,
    pub initial_direction: IntRange,
    pub initial_age: IntRange,
    pub natural_scale: i32,
    pub frame: FrameKind,
    pub pulse: Option<WeaponDevice>,
    pub beam: Option<WeaponDevice>,
    pub special: Option<WeaponDevice>,
    pub arrive_distance_squared: i64,
    pub build_flags: u32,
    pub skill: SkillRatio,
    pub warp_speed: Fixed,
    pub warp_out_distance_squared: i64,

    pub destroy: Vec<ActionId>,
    pub expire: Vec<ActionId>,
    pub create: Vec<ActionId>,
    pub collide: Vec<ActionId>,
    pub activate: Vec<ActionId>,
    pub arrive: Vec<ActionId>,

    pub collide_damage: i32,
    pub engage_range_squared: i64,
}

impl BaseObject {
    pub fn weapon(&self, slot: WeaponSlot) -> Option<&WeaponDevice> {
        match slot {
            WeaponSlot::Pulse => self.pulse.as_ref(),
            WeaponSlot::Beam => self.beam.as_ref(),
            WeaponSlot::Special => self.special.as_ref(),
        }
    }

    /// Roll this type's starting age, or `-1` (never expires) if
    /// `initial_age` was left at its default zero range — real expiry
    /// ages are configured with a non-default range.
    pub fn roll_initial_age(&self, rng: &mut crate::random::Rng) -> i32 {
        if self.initial_age == IntRange::default() {
            -1
        } else {
            self.initial_age.sample(rng)
        }
    }
}
