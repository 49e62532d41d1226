//! The non-player ship decision tree, decomposed into named
//! steps the way the corpus breaks a state machine into helper
//! functions rather than one monolithic match.

use antares_core::coord::UniverseCoord;
use antares_core::fixed::Angle;
use antares_core::flags::KeysDown;
use antares_core::handle::Handle;
use antares_core::random::Rng;

pub const SHOOT_ANGLE: i32 = 15;
pub const PARANOIA_ANGLE: i32 = 30;
pub const EVADE_ANGLE: i32 = 30;
pub const EVADE_ANGLE_GUIDED: i32 = 90;
pub const MOTION_MARGIN_SQUARED: i64 = 5000 * 5000;
pub const WARP_IN_DISTANCE_SQUARED: i64 = 2_000_000 * 2_000_000;
pub const DIRECTION_ERROR: i32 = 5;

/// A resolved candidate object, whether it's the current target, the
/// nearest-by-awareness-grid object, or a destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetCandidate {
    pub handle: Handle,
    pub location: UniverseCoord,
    pub owner: Option<i32>,
    pub hated: bool,
    pub is_guided: bool,
    pub health: i32,
    pub longest_weapon_range_squared: i64,
    pub can_engage_tag: Option<u32>,
    pub is_cloaked: bool,
    pub direction: Angle,
    /// Distance (unsquared axis projection) from the thinking object's
    /// current `direction_goal` axis, used only to break distance ties
    /// in target re-resolution (see `resolve_target`).
    pub direction_goal_axis_distance: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct WeaponInfo {
    pub equipped: bool,
    pub usage_attacking: bool,
    pub auto_target: bool,
    pub range_squared: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct SkillRatio {
    pub num: i32,
    pub den: i32,
}

#[derive(Debug, Clone)]
pub struct ThinkContext {
    pub self_location: UniverseCoord,
    pub self_direction: Angle,
    pub self_direction_goal: Angle,
    pub self_owner: Option<i32>,
    pub self_health: i32,
    pub self_max_health: i32,

    pub current_target: Option<TargetCandidate>,
    pub current_target_valid: bool,
    pub closest_object: Option<TargetCandidate>,
    pub last_known_target_location: UniverseCoord,

    pub engage_range_squared: i64,
    pub weapons: [WeaponInfo; 3],

    pub dest_object: Option<TargetCandidate>,
    pub dest_object_dest: Option<Handle>,
    pub destination_location: UniverseCoord,
    pub is_holding_station: bool,

    pub has_arrived: bool,
    pub arrive_distance_squared: Option<i64>,
    pub arrive_action_configured: bool,

    pub skill: SkillRatio,
    pub persistent_keys_down: KeysDown,
    pub manual_override: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ThinkOutput {
    pub keys_down: KeysDown,
    pub new_target: Option<Handle>,
    pub direction_goal: Option<Angle>,
    pub target_angle: Option<Angle>,
    pub new_destination: Option<Handle>,
    pub has_arrived: Option<bool>,
    pub trigger_arrive_action: bool,
}

/// Step 1: re-resolve the current target if it's invalid. Prefers
/// `closest_object`; among distance ties, biases toward the candidate
/// closest to the object's existing `direction_goal` axis rather than
/// pure nearest-neighbor, to avoid flip-flopping targets tick to tick.
fn resolve_target(ctx: &ThinkContext) -> Option<TargetCandidate> {
    let current_is_valid = ctx.current_target_valid
        && ctx.current_target.map_or(false, |t| {
            !(t.owner == ctx.self_owner && t.hated)
        });
    if current_is_valid {
        return ctx.current_target;
    }
    match ctx.closest_object {
        Some(candidate) => Some(candidate),
        None => None,
    }
}

/// Tie-break helper: given two equally-close candidates, prefer the one
/// whose `direction_goal_axis_distance` is smaller.
pub fn break_target_tie(a: TargetCandidate, b: TargetCandidate) -> TargetCandidate {
    if a.direction_goal_axis_distance <= b.direction_goal_axis_distance {
        a
    } else {
        b
    }
}

fn angle_to(from: UniverseCoord, to: UniverseCoord) -> Angle {
    let (dh, dv) = from.angle_safe_delta(to);
    Angle::from_slope(dh, dv)
}

fn in_engage_range(ctx: &ThinkContext, target: &TargetCandidate) -> bool {
    ctx.self_location.distance_squared(target.location) <= ctx.engage_range_squared
}

pub fn decide(ctx: &ThinkContext, rng: &mut Rng) -> ThinkOutput {
    let mut out = ThinkOutput::default();
    let mut raw_keys = KeysDown::empty();

    // Step 1: resolve target.
    let target = resolve_target(ctx);
    if target.map(|t| t.handle) != ctx.current_target.map(|t| t.handle) {
        out.new_target = Some(target.map_or(Handle::NONE, |t| t.handle));
    }

    let target_location = target.map_or(ctx.last_known_target_location, |t| t.location);

    // Step 2: in engage range and hated -> face target, with cloak jitter.
    if let Some(t) = target {
        if t.hated && in_engage_range(ctx, &t) {
            let mut angle = angle_to(ctx.self_location, t.location);
            if t.is_cloaked {
                let jitter = rng.next_in_range(91) - 45;
                angle = angle.add(jitter);
            }
            out.direction_goal = Some(angle);
            out.target_angle = Some(angle);
        }
    }

    let facing = out.direction_goal.unwrap_or(ctx.self_direction_goal);

    // Step 3: weapons.
    if let Some(t) = target {
        let distance_sq = ctx.self_location.distance_squared(t.location);
        let angle_err = {
            let to_target = angle_to(ctx.self_location, t.location);
            let diff = (to_target.value() as i32 - ctx.self_direction.value() as i32).abs();
            diff.min(360 - diff)
        };
        const WEAPON_KEYS: [KeysDown; 3] = [KeysDown::PULSE, KeysDown::BEAM, KeysDown::SPECIAL];
        for (slot, weapon) in ctx.weapons.iter().enumerate() {
            if !weapon.equipped || !weapon.usage_attacking {
                continue;
            }
            if distance_sq <= weapon.range_squared
                && (angle_err <= SHOOT_ANGLE || weapon.auto_target)
            {
                raw_keys |= WEAPON_KEYS[slot];
            }
        }
    }

    // Step 4: evade.
    if let Some(t) = target {
        let distance_sq = ctx.self_location.distance_squared(t.location);
        let can_be_hit = distance_sq < t.longest_weapon_range_squared;
        let looking_at_us = {
            let to_us = angle_to(t.location, ctx.self_location);
            let diff = (to_us.value() as i32 - t.direction.value() as i32).abs();
            diff.min(360 - diff) <= PARANOIA_ANGLE
        };
        let we_cannot_engage = t.can_engage_tag.is_some();
        let we_are_weaker = ctx.self_health <= t.health;
        if can_be_hit && looking_at_us && (we_cannot_engage || we_are_weaker) {
            let evade = if t.is_guided { EVADE_ANGLE_GUIDED } else { EVADE_ANGLE };
            let away = angle_to(t.location, ctx.self_location);
            out.direction_goal = Some(away.add(evade));
            raw_keys |= KeysDown::UP;
        }
    }

    // Step 5: range control.
    if let Some(t) = target {
        let distance_sq = ctx.self_location.distance_squared(t.location);
        let shortest_range = ctx
            .weapons
            .iter()
            .filter(|w| w.equipped)
            .map(|w| w.range_squared)
            .min()
            .unwrap_or(i64::MAX);
        if distance_sq > shortest_range {
            raw_keys |= KeysDown::UP;
        } else if distance_sq < MOTION_MARGIN_SQUARED || distance_sq < ctx.last_target_distance_or(distance_sq) {
            raw_keys |= KeysDown::DOWN;
        } else {
            raw_keys |= KeysDown::UP;
        }
    }

    // Step 6: arrival.
    if let (Some(t), Some(arrive_sq)) = (target, ctx.arrive_distance_squared) {
        if ctx.arrive_action_configured && !ctx.has_arrived {
            let distance_sq = ctx.self_location.distance_squared(t.location);
            if distance_sq < arrive_sq {
                out.has_arrived = Some(true);
                out.trigger_arrive_action = true;
            }
        }
    }

    // Step 7: destination fallback when there's no valid target.
    if target.is_none() {
        let dest_point = match ctx.dest_object {
            Some(d) => d.location,
            None => ctx.destination_location,
        };
        if ctx.is_holding_station {
            raw_keys |= KeysDown::DOWN;
            out.has_arrived = Some(false);
        } else {
            out.direction_goal = Some(angle_to(ctx.self_location, dest_point));
            raw_keys |= KeysDown::UP;
        }
        if ctx.dest_object.is_none() {
            if let Some(chained) = ctx.dest_object_dest {
                out.new_destination = Some(chained);
            }
        }
    }

    // Step 8: warp entry.
    let dest_point = target.map(|t| t.location).unwrap_or(ctx.destination_location);
    let dest_distance_sq = ctx.self_location.distance_squared(dest_point);
    if dest_distance_sq > WARP_IN_DISTANCE_SQUARED {
        let heading_err = {
            let wanted = angle_to(ctx.self_location, dest_point);
            let diff = (wanted.value() as i32 - facing.value() as i32).abs();
            diff.min(360 - diff)
        };
        if heading_err <= DIRECTION_ERROR {
            raw_keys |= KeysDown::WARP;
        }
    }

    // Step 9: skill filter.
    out.keys_down = if ctx.manual_override {
        raw_keys
    } else {
        adopt_with_skill(raw_keys, ctx.skill, rng)
    };
    out
}

impl ThinkContext {
    fn last_target_distance_or(&self, fallback: i64) -> i64 {
        self.current_target
            .map(|t| self.self_location.distance_squared(t.location))
            .unwrap_or(fallback + 1)
    }
}

const MOTION_MASK: KeysDown = KeysDown::UP
    .union(KeysDown::DOWN)
    .union(KeysDown::LEFT)
    .union(KeysDown::RIGHT)
    .union(KeysDown::WARP);
const WEAPON_MASK: KeysDown = KeysDown::PULSE.union(KeysDown::BEAM).union(KeysDown::SPECIAL);

/// Motion/weapon keys are adopted into the persistent `keysDown` only
/// when a skill roll succeeds; weapon keys independently roll 1-in-3.
fn adopt_with_skill(raw: KeysDown, skill: SkillRatio, rng: &mut Rng) -> KeysDown {
    let mut adopted = KeysDown::empty();
    let motion_bits = raw & MOTION_MASK;
    if !motion_bits.is_empty() {
        if rng.next_in_range(skill.den.max(1)) < skill.num {
            adopted |= motion_bits;
        }
    }
    let weapon_bits = raw & WEAPON_MASK;
    if !weapon_bits.is_empty() {
        if rng.next_in_range(3) < 1 {
            adopted |= weapon_bits;
        }
    }
    adopted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_ctx() -> ThinkContext {
        ThinkContext {
            self_location: UniverseCoord::new(0, 0),
            self_direction: Angle::new(0),
            self_direction_goal: Angle::new(0),
            self_owner: Some(1),
            self_health: 100,
            self_max_health: 100,
            current_target: None,
            current_target_valid: false,
            closest_object: None,
            last_known_target_location: UniverseCoord::new(0, 0),
            engage_range_squared: 10_000 * 10_000,
            weapons: [WeaponInfo { equipped: false, usage_attacking: false, auto_target: false, range_squared: 0 }; 3],
            dest_object: None,
            dest_object_dest: None,
            destination_location: UniverseCoord::new(0, 0),
            is_holding_station: true,
            has_arrived: false,
            arrive_distance_squared: None,
            arrive_action_configured: false,
            skill: SkillRatio { num: 1, den: 1 },
            persistent_keys_down: KeysDown::empty(),
            manual_override: false,
        }
    }

    #[test]
    fn holding_station_with_no_target_presses_down() {
        let ctx = base_ctx();
        let mut rng = Rng::new(1);
        let out = decide(&ctx, &mut rng);
        assert!(out.keys_down.contains(KeysDown::DOWN));
    }

    #[test]
    fn invalid_target_is_replaced_by_closest_object() {
        let mut ctx = base_ctx();
        ctx.current_target_valid = false;
        ctx.closest_object = Some(TargetCandidate {
            handle: Handle { slot: 3, id: 1 },
            location: UniverseCoord::new(1000, 0),
            owner: Some(2),
            hated: true,
            is_guided: false,
            health: 10,
            longest_weapon_range_squared: 0,
            can_engage_tag: None,
            is_cloaked: false,
            direction: Angle::new(180),
            direction_goal_axis_distance: 0,
        });
        let mut rng = Rng::new(1);
        let out = decide(&ctx, &mut rng);
        assert_eq!(out.new_target, Some(Handle { slot: 3, id: 1 }));
    }

    #[test]
    fn manual_override_bypasses_skill_adoption() {
        let mut ctx = base_ctx();
        ctx.manual_override = true;
        ctx.skill = SkillRatio { num: 0, den: 1 };
        let mut rng = Rng::new(1);
        let out = decide(&ctx, &mut rng);
        // Even with a zero skill ratio, manual override keeps the raw keys.
        assert!(out.keys_down.contains(KeysDown::DOWN));
    }

    #[test]
    fn tie_break_prefers_smaller_axis_distance() {
        let a = TargetCandidate {
            handle: Handle { slot: 1, id: 1 },
            location: UniverseCoord::new(0, 0),
            owner: None,
            hated: false,
            is_guided: false,
            health: 1,
            longest_weapon_range_squared: 0,
            can_engage_tag: None,
            is_cloaked: false,
            direction: Angle::new(0),
            direction_goal_axis_distance: 50,
        };
        let mut b = a;
        b.handle = Handle { slot: 2, id: 1 };
        b.direction_goal_axis_distance = 10;
        assert_eq!(break_target_tie(a, b).handle, b.handle);
    }
}
