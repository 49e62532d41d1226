use antares_core::base_object::{BaseObject, BaseObjectId, FrameKind, IntRange, SkillRatio};
use antares_core::coord::UniverseCoord;
use antares_core::fixed::{Angle, Fixed};
use antares_core::flags::AttributeFlags;
use antares_core::input::InputFrame;
use antares_core::scenario::{InitialObject, PluginId, Scenario};
use antares_sim::load::load;
use std::collections::HashMap;

fn brawler(id: u32) -> BaseObject {
    BaseObject {
        id: BaseObjectId(id),
        attributes: AttributeFlags::CAN_COLLIDE | AttributeFlags::CAN_BE_HIT,
        mass: Fixed::ONE,
        max_velocity: Fixed::ZERO,
        thrust: Fixed::ZERO,
        max_health: 20,
        max_energy: 0,
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
        warp_speed: Fixed::ZERO,
        warp_out_distance_squared: 0,
        destroy: vec![],
        expire: vec![],
        create: vec![],
        collide: vec![],
        activate: vec![],
        arrive: vec![],
        collide_damage: 3,
        engage_range_squared: 0,
    }
}

fn human_controlled(mut base: BaseObject) -> BaseObject {
    base.attributes |= AttributeFlags::IS_HUMAN_CONTROLLED;
    base
}

fn scenario_with_order(swap_arena_order: bool) -> Scenario {
    let mut base_objects = HashMap::new();
    base_objects.insert(BaseObjectId(1), human_controlled(brawler(1)));
    base_objects.insert(BaseObjectId(2), brawler(2));

    let human = InitialObject {
        base_type: BaseObjectId(1),
        location: UniverseCoord::ORIGIN,
        owner: Some(0),
        can_build: vec![],
        sprite_id_override: None,
        initial_destination: None,
        attributes: AttributeFlags::empty(),
        direction: Angle::new(0),
    };
    let rival = InitialObject {
        base_type: BaseObjectId(2),
        location: UniverseCoord::new(UniverseCoord::ORIGIN.h + 10, UniverseCoord::ORIGIN.v),
        owner: Some(1),
        can_build: vec![],
        sprite_id_override: None,
        initial_destination: None,
        attributes: AttributeFlags::empty(),
        direction: Angle::new(0),
    };

    let initial_objects = if swap_arena_order { vec![rival, human] } else { vec![human, rival] };

    Scenario {
        plugin: PluginId(0),
        chapter_id: 1,
        base_objects,
        actions: HashMap::new(),
        initial_objects,
        conditions: vec![],
        briefing: vec![],
        beams: vec![],
        admiral_count: 2,
        warp_in_flare: None,
        warp_out_flare: None,
    }
}

fn final_healths(scenario: Scenario) -> Vec<i32> {
    let mut session = load(scenario, 1).unwrap();
    for _ in 0..6 {
        session.step(InputFrame::default());
    }
    let mut healths: Vec<i32> =
        session.arena().active_slots().iter().map(|&slot| session.arena().by_slot(slot).unwrap().health).collect();
    healths.sort_unstable();
    healths
}

#[test]
fn collision_damage_is_symmetric_regardless_of_arena_slot_order() {
    let ordinary = final_healths(scenario_with_order(false));
    let swapped = final_healths(scenario_with_order(true));
    assert_eq!(ordinary, swapped, "mutually colliding objects must damage each other the same way regardless of which arena slot each lands in");
    assert!(ordinary.iter().all(|&h| h < 20), "both objects should have taken collision damage");
}
