//! Bitset types. These are genuine bitsets tested with `&`/`|`, not
//! closed enumerations, so they're modeled with `bitflags!` rather than a
//! Rust `enum`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Static, type-level capabilities copied from a `BaseObject` at
    /// object creation, since collision-eligibility checks are hot
    /// enough to want a cached copy rather than chasing the base-type
    /// pointer every test.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AttributeFlags: u32 {
        const CAN_THINK            = 1 << 0;
        const CAN_TURN             = 1 << 1;
        const CAN_COLLIDE          = 1 << 2;
        const CAN_BE_HIT           = 1 << 3;
        const IS_BEAM              = 1 << 4;
        const IS_SELF_ANIMATED     = 1 << 5;
        const SHAPE_FROM_DIRECTION = 1 << 6;
        const CAN_ACCEPT_DEST      = 1 << 7;
        const IS_DESTINATION       = 1 << 8;
        const IS_GUIDED            = 1 << 9;
        const OCCUPIES_SPACE       = 1 << 10;
        const HATED                = 1 << 11;
        const AUTO_TARGET          = 1 << 12;
        const RELEASE_ENERGY_ON_DEATH = 1 << 13;
        const NEUTRAL_DEATH        = 1 << 14;
        const ANIMATION_CYCLE      = 1 << 15;
        const ON_AUTO_PILOT        = 1 << 16;
        const HAS_DIRECTION_GOAL   = 1 << 17;
        const DOES_BOUNCE          = 1 << 18;
        const CONSIDER_DISTANCE    = 1 << 19;
        const CAN_BE_EVADED        = 1 << 20;
        const IS_HUMAN_CONTROLLED  = 1 << 21;
        const IS_REMOTE            = 1 << 22;
        const HIDE_EFFECT          = 1 << 23;
        const CAN_ONLY_ENGAGE      = 1 << 24;
        const ONLY_ENGAGED_BY      = 1 << 25;

        /// Objects that the proximity grid should insert at all.
        const CONSIDERS_DISTANCE_GROUP = Self::CAN_COLLIDE.bits()
            | Self::CAN_BE_HIT.bits()
            | Self::IS_DESTINATION.bits()
            | Self::CAN_THINK.bits()
            | Self::CONSIDER_DISTANCE.bits()
            | Self::CAN_BE_EVADED.bits()
            | Self::IS_HUMAN_CONTROLLED.bits()
            | Self::IS_REMOTE.bits();
    }
}

bitflags! {
    /// Per-instance, mutable runtime state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct RuntimeFlags: u32 {
        const HAS_ARRIVED   = 1 << 0;
        const TARGET_LOCKED = 1 << 1;
        const IS_CLOAKED    = 1 << 2;
        const IS_HIDDEN     = 1 << 3;
        const IS_TARGET     = 1 << 4;
    }
}

bitflags! {
    /// AI-produced, motion-consumed input bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct KeysDown: u32 {
        const UP           = 1 << 0;
        const DOWN         = 1 << 1;
        const LEFT         = 1 << 2;
        const RIGHT        = 1 << 3;
        const PULSE        = 1 << 4;
        const BEAM         = 1 << 5;
        const SPECIAL      = 1 << 6;
        const WARP         = 1 << 7;
        const ADOPT_TARGET = 1 << 8;
        const AUTO_PILOT   = 1 << 9;
        const GIVE_COMMAND = 1 << 10;
    }
}

bitflags! {
    /// Which admirals have observed an object, one bit per admiral index
    /// (`seenByPlayerFlags`); also used for an object's own `myPlayerFlag`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct PlayerFlags: u32 {
        const P0 = 1 << 0;
        const P1 = 1 << 1;
        const P2 = 1 << 2;
        const P3 = 1 << 3;
        const P4 = 1 << 4;
        const P5 = 1 << 5;
        const P6 = 1 << 6;
        const P7 = 1 << 7;
    }
}

impl PlayerFlags {
    /// The bit for admiral index `n` (0..=7 supported).
    pub fn for_admiral(n: u8) -> PlayerFlags {
        PlayerFlags::from_bits_truncate(1 << (n.min(7)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn considers_distance_group_includes_collision_and_human_controlled() {
        let group = AttributeFlags::CONSIDERS_DISTANCE_GROUP;
        assert!(group.contains(AttributeFlags::CAN_COLLIDE));
        assert!(group.contains(AttributeFlags::IS_HUMAN_CONTROLLED));
        assert!(!group.contains(AttributeFlags::IS_BEAM));
    }

    #[test]
    fn runtime_flags_default_to_empty() {
        assert_eq!(RuntimeFlags::default(), RuntimeFlags::empty());
    }
}
