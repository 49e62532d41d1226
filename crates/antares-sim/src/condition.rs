//! Scenario condition evaluator, polled every `kConditionTick` (90)
//! ticks.

use antares_core::coord::UniverseCoord;
use antares_core::fixed::Fixed;
use antares_core::scenario::{Condition, Predicate};

pub const CONDITION_TICK: i64 = 90;

/// Everything a predicate might need to read, gathered by the caller
/// (which owns the arena and admiral table) into one read-only view so
/// this module stays arena-independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectFacts {
    pub alive: bool,
    pub location: UniverseCoord,
    pub owner: Option<i32>,
    pub health: i32,
    pub max_health: i32,
    pub velocity: (Fixed, Fixed),
    pub dest_object_id: Option<u16>,
    pub id: Option<u16>,
}

pub struct ConditionWorld<'a> {
    pub game_time_ticks: i64,
    pub admiral_scores: &'a dyn Fn(i32, u32) -> i32,
    pub admiral_ships_left: &'a dyn Fn(i32) -> i32,
    pub resolve_initial: &'a dyn Fn(u32) -> ObjectFacts,
    pub current_message_id: u32,
    pub current_computer: (i32, i32),
    pub zoom_level: i32,
    pub player_autopilot: bool,
    pub auxiliary_initial_index: Option<u32>,
    pub target_initial_index: Option<u32>,
    pub being_built_initial_index: Option<u32>,
    pub subject_is_player_initial_index: Option<u32>,
}

pub fn evaluate_predicate(pred: &Predicate, world: &ConditionWorld) -> bool {
    match *pred {
        Predicate::CounterEq { admiral, counter, amount } => (world.admiral_scores)(admiral, counter) == amount,
        Predicate::CounterGe { admiral, counter, amount } => (world.admiral_scores)(admiral, counter) >= amount,
        Predicate::CounterNe { admiral, counter, amount } => (world.admiral_scores)(admiral, counter) != amount,
        Predicate::Destruction { initial_index } => !(world.resolve_initial)(initial_index).alive,
        Predicate::Owner { initial_index, admiral } => {
            (world.resolve_initial)(initial_index).owner == Some(admiral)
        }
        Predicate::Time { ticks } => world.game_time_ticks >= ticks,
        Predicate::Proximity { subject_index, direct_index, distance_squared } => {
            let s = (world.resolve_initial)(subject_index);
            let d = (world.resolve_initial)(direct_index);
            s.alive && d.alive && s.location.distance_squared(d.location) < distance_squared
        }
        Predicate::DistanceGreater { subject_index, direct_index, distance_squared } => {
            let s = (world.resolve_initial)(subject_index);
            let d = (world.resolve_initial)(direct_index);
            s.alive && d.alive && s.location.distance_squared(d.location) >= distance_squared
        }
        Predicate::HalfHealth { initial_index } => {
            let f = (world.resolve_initial)(initial_index);
            !f.alive || f.health <= f.max_health / 2
        }
        Predicate::IsAuxiliary { initial_index } => world.auxiliary_initial_index == Some(initial_index),
        Predicate::IsTarget { initial_index } => world.target_initial_index == Some(initial_index),
        Predicate::VelocityLe { initial_index, limit } => {
            let f = (world.resolve_initial)(initial_index);
            f.velocity.0.abs() < limit && f.velocity.1.abs() < limit
        }
        Predicate::NoShipsLeft { admiral } => (world.admiral_ships_left)(admiral) <= 0,
        Predicate::CurrentMessage { id } => world.current_message_id == id,
        Predicate::CurrentComputer { screen, line } => world.current_computer == (screen, line),
        Predicate::ZoomLevel { level } => world.zoom_level == level,
        Predicate::Autopilot => world.player_autopilot,
        Predicate::NotAutopilot => !world.player_autopilot,
        Predicate::ObjectIsBeingBuilt { initial_index } => {
            world.being_built_initial_index == Some(initial_index)
        }
        Predicate::DirectIsSubjectTarget { subject_index, direct_index } => {
            let subject = (world.resolve_initial)(subject_index);
            let direct = (world.resolve_initial)(direct_index);
            subject.dest_object_id.is_some() && subject.dest_object_id == direct.id
        }
        Predicate::SubjectIsPlayer { subject_index } => {
            world.subject_is_player_initial_index == Some(subject_index)
        }
    }
}

/// Evaluate every not-yet-latched condition; returns the indices (into
/// the scenario's condition list) whose action list should fire this
/// pass, and flags `has_been_true` on `TrueOnlyOnce` conditions that
/// fired.
pub fn evaluate_conditions(conditions: &mut [Condition], world: &ConditionWorld) -> Vec<usize> {
    let mut fired = Vec::new();
    for (i, cond) in conditions.iter_mut().enumerate() {
        if cond.flags.true_only_once && cond.flags.has_been_true {
            continue;
        }
        if evaluate_predicate(&cond.predicate, world) {
            fired.push(i);
            cond.flags.has_been_true = true;
        }
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts_alive(health: i32, max_health: i32) -> ObjectFacts {
        ObjectFacts {
            alive: true,
            location: UniverseCoord::default(),
            owner: None,
            health,
            max_health,
            velocity: (Fixed::ZERO, Fixed::ZERO),
            dest_object_id: None,
            id: Some(1),
        }
    }

    fn world<'a>(resolve: &'a dyn Fn(u32) -> ObjectFacts) -> ConditionWorld<'a> {
        ConditionWorld {
            game_time_ticks: 0,
            admiral_scores: &|_, _| 0,
            admiral_ships_left: &|_| 1,
            resolve_initial: resolve,
            current_message_id: 0,
            current_computer: (0, 0),
            zoom_level: 0,
            player_autopilot: false,
            auxiliary_initial_index: None,
            target_initial_index: None,
            being_built_initial_index: None,
            subject_is_player_initial_index: None,
        }
    }

    #[test]
    fn half_health_true_when_at_or_below_half() {
        let resolve = |_: u32| facts_alive(5, 10);
        let w = world(&resolve);
        assert!(evaluate_predicate(&Predicate::HalfHealth { initial_index: 0 }, &w));
        let resolve2 = |_: u32| facts_alive(6, 10);
        let w2 = world(&resolve2);
        assert!(!evaluate_predicate(&Predicate::HalfHealth { initial_index: 0 }, &w2));
    }

    #[test]
    fn true_only_once_condition_latches() {
        let resolve = |_: u32| facts_alive(10, 10);
        let w = world(&resolve);
        let mut conditions = vec![Condition {
            predicate: Predicate::Time { ticks: 0 },
            subject_initial_index: None,
            direct_initial_index: None,
            actions: vec![],
            flags: antares_core::scenario::ConditionFlags {
                true_only_once: true,
                initially_true: false,
                has_been_true: false,
            },
        }];
        let fired_first = evaluate_conditions(&mut conditions, &w);
        assert_eq!(fired_first, vec![0]);
        let fired_second = evaluate_conditions(&mut conditions, &w);
        assert!(fired_second.is_empty());
    }
}
