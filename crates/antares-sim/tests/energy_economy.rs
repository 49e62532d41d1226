use antares_core::base_object::{BaseObject, BaseObjectId, FrameKind, IntRange, SkillRatio, WeaponDevice};
use antares_core::coord::UniverseCoord;
use antares_core::fixed::{Angle, Fixed};
use antares_core::flags::{AttributeFlags, KeysDown};
use antares_core::input::InputFrame;
use antares_core::scenario::{InitialObject, PluginId, Scenario};
use antares_sim::load::load;
use std::collections::HashMap;

fn trigger_happy_player(max_energy: i32, energy_cost: i32) -> Scenario {
    let mut base_objects = HashMap::new();
    let player = BaseObject {
        id: BaseObjectId(1),
        attributes: AttributeFlags::IS_HUMAN_CONTROLLED,
        mass: Fixed::ONE,
        max_velocity: Fixed::ZERO,
        thrust: Fixed::ZERO,
        max_health: 10,
        max_energy,
        initial_velocity: IntRange::default(),
        initial_direction: IntRange::default(),
        initial_age: IntRange::default(),
        natural_scale: 4096,
        frame: FrameKind::Rotation { rot_res: 1 },
        pulse: Some(WeaponDevice {
            fires: BaseObjectId(2),
            ammo: -1,
            positions: vec![(Fixed::ZERO, Fixed::ZERO)],
            fire_time: 1,
            energy_cost,
            restock_cost: 0,
            auto_target: false,
            activate: vec![],
        }),
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
        collide_damage: 0,
        engage_range_squared: 0,
    };
    let mut projectile = player.clone();
    projectile.id = BaseObjectId(2);
    projectile.attributes = AttributeFlags::empty();
    projectile.pulse = None;
    base_objects.insert(BaseObjectId(1), player);
    base_objects.insert(BaseObjectId(2), projectile);

    Scenario {
        plugin: PluginId(0),
        chapter_id: 1,
        base_objects,
        actions: HashMap::new(),
        initial_objects: vec![InitialObject {
            base_type: BaseObjectId(1),
            location: UniverseCoord::ORIGIN,
            owner: Some(0),
            can_build: vec![],
            sprite_id_override: None,
            initial_destination: None,
            attributes: AttributeFlags::empty(),
            direction: Angle::new(0),
        }],
        conditions: vec![],
        briefing: vec![],
        beams: vec![],
        admiral_count: 1,
        warp_in_flare: None,
        warp_out_flare: None,
    }
}

#[test]
fn firing_every_tick_never_drives_energy_negative_and_it_recharges_when_idle() {
    let mut session = load(trigger_happy_player(20, 3), 11).unwrap();
    let mut fire = InputFrame::default();
    fire.keys_down = KeysDown::PULSE;

    let player_slot = session.arena().active_slots()[0];
    let mut min_energy_seen = i32::MAX;

    for _ in 0..40 {
        session.step(fire);
        let energy = session.arena().by_slot(player_slot).unwrap().energy;
        assert!(energy >= 0, "energy must never go negative: observed {energy}");
        min_energy_seen = min_energy_seen.min(energy);
    }
    assert!(min_energy_seen < 20, "sustained firing should have drawn energy down from the max at some point");

    for _ in 0..40 {
        session.step(InputFrame::default());
    }
    let recharged = session.arena().by_slot(player_slot).unwrap().energy;
    assert!(recharged > min_energy_seen, "battery-fed recharge should raise energy back up once firing stops");
    assert!(recharged <= 20, "recharge must never push energy past its ceiling");
}

#[test]
fn weapon_never_fires_without_enough_energy_to_pay_its_cost() {
    let mut session = load(trigger_happy_player(2, 5), 11).unwrap();
    let mut fire = InputFrame::default();
    fire.keys_down = KeysDown::PULSE;
    let player_slot = session.arena().active_slots()[0];

    for _ in 0..10 {
        session.step(fire);
        let energy = session.arena().by_slot(player_slot).unwrap().energy;
        assert_eq!(energy, 2, "a weapon costing more energy than the ship ever holds must never fire");
    }
}
