//! The universe coordinate system: a signed 30-bit-centered plane with
//! three nested cell sizes and a bounded "thinkiverse" play region.

use crate::fixed::Fixed;
use serde::{Deserialize, Serialize};

/// Origin of all world coordinates: `2^30 - 1`.
pub const UNIVERSE_CENTER: i32 = (1 << 30) - 1;

/// Coordinate differences beyond this (per axis) are clamped before
/// squaring, to avoid 32-bit overflow in distance-squared math.
pub const MAX_RELEVANT: i32 = 46340;

/// Beyond this, angle computation shifts coordinates down first.
pub const MAX_ANGLE_DIST: i32 = 32767;

/// Half-width of the thinkiverse box around `UNIVERSE_CENTER`.
pub const THINKIVERSE_HALF: i32 = 1 << 17;

pub const SUB_SECTOR_SIZE: i32 = 512;
pub const SECTOR_SIZE: i32 = 4096;
pub const SUPER_SECTOR_SIZE: i32 = 32768;

pub const COLLISION_CELL_SIZE: i32 = 128;
pub const AWARENESS_CELL_SIZE: i32 = 2048;

pub const SCALE_SCALE: i32 = 4096;

/// A point in the universe plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UniverseCoord {
    pub h: i32,
    pub v: i32,
}

impl UniverseCoord {
    pub const ORIGIN: UniverseCoord = UniverseCoord {
        h: UNIVERSE_CENTER,
        v: UNIVERSE_CENTER,
    };

    pub fn new(h: i32, v: i32) -> UniverseCoord {
        UniverseCoord { h, v }
    }

    /// Raw signed axis deltas, unclamped.
    pub fn delta(self, other: UniverseCoord) -> (i32, i32) {
        (self.h.wrapping_sub(other.h), self.v.wrapping_sub(other.v))
    }

    /// Squared Euclidean distance, clamping each axis to `MAX_RELEVANT`
    /// and widening to 64 bits so two near-maximal axes can't overflow.
    pub fn distance_squared(self, other: UniverseCoord) -> i64 {
        let (dh, dv) = self.delta(other);
        let dh = dh.clamp(-MAX_RELEVANT, MAX_RELEVANT) as i64;
        let dv = dv.clamp(-MAX_RELEVANT, MAX_RELEVANT) as i64;
        dh * dh + dv * dv
    }

    /// True when this point lies inside the thinkiverse box.
    pub fn in_thinkiverse(self) -> bool {
        (self.h - UNIVERSE_CENTER).abs() <= THINKIVERSE_HALF
            && (self.v - UNIVERSE_CENTER).abs() <= THINKIVERSE_HALF
    }

    pub fn clamp_to_thinkiverse(self) -> UniverseCoord {
        UniverseCoord {
            h: (self.h).clamp(
                UNIVERSE_CENTER - THINKIVERSE_HALF,
                UNIVERSE_CENTER + THINKIVERSE_HALF,
            ),
            v: (self.v).clamp(
                UNIVERSE_CENTER - THINKIVERSE_HALF,
                UNIVERSE_CENTER + THINKIVERSE_HALF,
            ),
        }
    }

    /// Coordinate used for angle computation: if either axis delta
    /// exceeds `MAX_ANGLE_DIST`, both axes are shifted down uniformly
    /// before the caller computes an angle from them.
    pub fn angle_safe_delta(self, other: UniverseCoord) -> (Fixed, Fixed) {
        let (mut dh, mut dv) = self.delta(other);
        while dh.abs() > MAX_ANGLE_DIST || dv.abs() > MAX_ANGLE_DIST {
            dh >>= 1;
            dv >>= 1;
        }
        (Fixed::from_long(dh), Fixed::from_long(dv))
    }

    /// Convert a world coordinate to a screen-space coordinate given an
    /// absolute scale (`SCALE_SCALE`-relative) and the player's
    /// `global_corner`.
    pub fn to_screen(self, global_corner: UniverseCoord, absolute_scale: i32) -> (i32, i32) {
        let dh = self.h.wrapping_sub(global_corner.h);
        let dv = self.v.wrapping_sub(global_corner.v);
        (
            ((dh as i64 * absolute_scale as i64) >> 12) as i32,
            ((dv as i64 * absolute_scale as i64) >> 12) as i32,
        )
    }
}
