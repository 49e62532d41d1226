//! Fixed-point arithmetic and angle lookup, the numeric foundation of the
//! whole simulation. Gameplay fields wrap on over/underflow; only the
//! display-facing `saturating_add`/`saturating_sub` helpers saturate.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Signed Q16.16 fixed-point number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize, Deserialize)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << 16);

    pub const fn from_val(val: i32) -> Fixed {
        Fixed(val)
    }

    pub const fn val(self) -> i32 {
        self.0
    }

    /// Shift a whole number left 16 to produce a Fixed.
    pub const fn from_long(n: i32) -> Fixed {
        Fixed(n.wrapping_shl(16))
    }

    /// Arithmetic right-shift 16; truncates toward negative infinity.
    pub const fn to_long(self) -> i32 {
        self.0 >> 16
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }

    pub fn from_f64(v: f64) -> Fixed {
        Fixed((v * 65536.0).round() as i32)
    }

    /// `(a * b) >> 16`, widened to 64 bits so the multiply cannot overflow.
    pub fn mul(self, other: Fixed) -> Fixed {
        let wide = (self.0 as i64) * (other.0 as i64);
        Fixed((wide >> 16) as i32)
    }

    /// `(a << 16) / b`, widened to 64 bits.
    pub fn div(self, other: Fixed) -> Fixed {
        let wide = (self.0 as i64) << 16;
        Fixed((wide / other.0 as i64) as i32)
    }

    pub fn abs(self) -> Fixed {
        Fixed(self.0.wrapping_abs())
    }

    pub fn saturating_add(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(other.0))
    }

    /// Round to nearest integer, rounding negative halves toward zero then
    /// away (matches the source's round-then-adjust convention used for
    /// turn-fraction and motion-fraction integration).
    pub fn round_to_long(self) -> i32 {
        if self.0 >= 0 {
            (self.0 + (1 << 15)) >> 16
        } else {
            -(((-self.0) + (1 << 15)) >> 16)
        }
    }
}

impl Add for Fixed {
    type Output = Fixed;
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Fixed) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    fn neg(self) -> Fixed {
        Fixed(self.0.wrapping_neg())
    }
}

/// Integer angle in degrees, always normalized to `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize, Deserialize)]
pub struct Angle(i16);

const ANGLE_COUNT: i16 = 360;

struct TrigTable {
    cos: [Fixed; ANGLE_COUNT as usize],
    sin: [Fixed; ANGLE_COUNT as usize],
}

static TRIG_TABLE: OnceLock<TrigTable> = OnceLock::new();

fn trig_table() -> &'static TrigTable {
    TRIG_TABLE.get_or_init(|| {
        let mut cos = [Fixed::ZERO; ANGLE_COUNT as usize];
        let mut sin = [Fixed::ZERO; ANGLE_COUNT as usize];
        for deg in 0..ANGLE_COUNT as usize {
            let radians = (deg as f64) * std::f64::consts::PI / 180.0;
            cos[deg] = Fixed::from_f64(radians.cos());
            sin[deg] = Fixed::from_f64(radians.sin());
        }
        TrigTable { cos, sin }
    })
}

impl Angle {
    pub fn new(deg: i32) -> Angle {
        Angle(deg.rem_euclid(ANGLE_COUNT as i32) as i16)
    }

    pub const fn from_normalized(deg: i16) -> Angle {
        Angle(deg)
    }

    pub fn value(self) -> i16 {
        self.0
    }

    /// `add_angle(d, k) == (d + k) mod 360`.
    pub fn add(self, delta: i32) -> Angle {
        Angle::new(self.0 as i32 + delta)
    }

    pub fn cos(self) -> Fixed {
        trig_table().cos[self.0 as usize]
    }

    pub fn sin(self) -> Fixed {
        trig_table().sin[self.0 as usize]
    }

    /// Unit vector (h, v) scaled by `magnitude`, looked up from the table
    /// (never interpolated).
    pub fn rot_point(self, magnitude: Fixed) -> (Fixed, Fixed) {
        (magnitude.mul(self.cos()), magnitude.mul(self.sin()))
    }

    /// Angle whose direction best matches `(h, v)`, found by searching the
    /// same 360-entry table `rot_point` reads from rather than a continuous
    /// `atan2`. Picks the table angle that maximizes the dot product with
    /// `(h, v)`; a tie is broken toward the entry whose component on the
    /// larger of `|h|`/`|v|` has the bigger magnitude.
    pub fn from_slope(h: Fixed, v: Fixed) -> Angle {
        if h == Fixed::ZERO && v == Fixed::ZERO {
            return Angle::new(0);
        }
        let table = trig_table();
        let prefer_horizontal = h.abs() >= v.abs();
        let mut best_angle: i16 = 0;
        let mut best_dot = i64::MIN;
        for deg in 0..ANGLE_COUNT {
            let cos = table.cos[deg as usize];
            let sin = table.sin[deg as usize];
            let dot = (h.val() as i64) * (cos.val() as i64) + (v.val() as i64) * (sin.val() as i64);
            let take = if dot > best_dot {
                true
            } else if dot == best_dot {
                let current = if prefer_horizontal { table.cos[best_angle as usize].abs() } else { table.sin[best_angle as usize].abs() };
                let candidate = if prefer_horizontal { cos.abs() } else { sin.abs() };
                candidate > current
            } else {
                false
            };
            if take {
                best_dot = dot;
                best_angle = deg;
            }
        }
        Angle::from_normalized(best_angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_fixed_matches_q16_16_formula() {
        let a = Fixed::from_long(3);
        let b = Fixed::from_long(4);
        assert_eq!(a.mul(b), Fixed::from_long(12));
    }

    #[test]
    fn div_fixed_matches_q16_16_formula() {
        let a = Fixed::from_long(12);
        let b = Fixed::from_long(4);
        assert_eq!(a.div(b), Fixed::from_long(3));
    }

    #[test]
    fn long_roundtrip() {
        assert_eq!(Fixed::from_long(7).to_long(), 7);
        assert_eq!(Fixed::from_long(-7).to_long(), -7);
    }

    #[test]
    fn add_angle_wraps_modulo_360() {
        let a = Angle::new(350);
        assert_eq!(a.add(20).value(), 10);
        let b = Angle::new(5);
        assert_eq!(b.add(-10).value(), 355);
    }

    #[test]
    fn angle_always_normalized() {
        for raw in [-720, -361, -1, 0, 1, 359, 360, 361, 719, 1000] {
            let a = Angle::new(raw);
            assert!(a.value() >= 0 && a.value() < 360);
        }
    }

    #[test]
    fn cos_sin_lookup_never_interpolates() {
        // Table values must come back bit-identical across repeated calls.
        let a = Angle::new(47);
        assert_eq!(a.cos(), a.cos());
        assert_eq!(a.sin(), a.sin());
    }

    #[test]
    fn round_to_long_rounds_negative_toward_then_away_from_zero() {
        let half = Fixed::from_f64(-0.5);
        assert_eq!(half.round_to_long(), -1);
        let quarter = Fixed::from_f64(-0.25);
        assert_eq!(quarter.round_to_long(), 0);
    }
}
