use antares_core::action::{Action, ActionId, OwnerPredicate, SubjectOverride, Verb};
use antares_core::base_object::{BaseObject, BaseObjectId, FrameKind, IntRange, SkillRatio, WeaponDevice};
use antares_core::coord::UniverseCoord;
use antares_core::fixed::{Angle, Fixed};
use antares_core::flags::{AttributeFlags, KeysDown};
use antares_core::input::InputFrame;
use antares_core::scenario::{InitialObject, PluginId, Scenario};
use antares_sim::load::load;
use antares_sim::replay::{InputSource, Replay, ReplaySource};
use antares_sim::snapshot::build_snapshot;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

fn duel_scenario() -> Scenario {
    let mut base_objects = HashMap::new();

    let player = BaseObject {
        id: BaseObjectId(1),
        attributes: AttributeFlags::IS_HUMAN_CONTROLLED,
        mass: Fixed::ONE,
        max_velocity: Fixed::ONE,
        thrust: Fixed::ONE,
        max_health: 10,
        max_energy: 100,
        initial_velocity: IntRange::default(),
        initial_direction: IntRange::default(),
        initial_age: IntRange::default(),
        natural_scale: 4096,
        frame: FrameKind::Rotation { rot_res: 1 },
        pulse: Some(WeaponDevice {
            fires: BaseObjectId(2),
            ammo: -1,
            positions: vec![(Fixed::ZERO, Fixed::ZERO)],
            fire_time: 7,
            energy_cost: 2,
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
    projectile.attributes = AttributeFlags::CAN_COLLIDE;
    projectile.pulse = None;
    projectile.collide_damage = 1;
    projectile.collide = vec![ActionId(1)];

    base_objects.insert(BaseObjectId(1), player);
    base_objects.insert(BaseObjectId(2), projectile);

    let mut actions = HashMap::new();
    actions.insert(
        ActionId(1),
        Action {
            id: ActionId(1),
            verb: Verb::Die { expire: false },
            reflexive: false,
            owner: OwnerPredicate::Any,
            inclusive_filter: 0,
            exclusive_filter: 0,
            delay_ticks: 0,
            subject_override: SubjectOverride::None,
            direct_override: SubjectOverride::Subject,
        },
    );

    let initial_objects = vec![InitialObject {
        base_type: BaseObjectId(1),
        location: UniverseCoord::ORIGIN,
        owner: Some(0),
        can_build: vec![],
        sprite_id_override: None,
        initial_destination: None,
        attributes: AttributeFlags::empty(),
        direction: Angle::new(0),
    }];

    Scenario {
        plugin: PluginId(0),
        chapter_id: 1,
        base_objects,
        actions,
        initial_objects,
        conditions: vec![],
        briefing: vec![],
        beams: vec![],
        admiral_count: 1,
        warp_in_flare: None,
        warp_out_flare: None,
    }
}

fn play(replay: Replay) -> String {
    let mut session = load(duel_scenario(), replay.global_seed).unwrap();
    let mut source = ReplaySource::new(replay);
    let mut hasher = Sha256::new();
    while let Some(frame) = source.next_frame() {
        session.step(frame);
        let snapshot = build_snapshot(session.arena(), session.tick(), antares_core::flags::PlayerFlags::P0);
        hasher.update(serde_json::to_vec(&snapshot).unwrap());
    }
    format!("{:x}", hasher.finalize())
}

fn turning_and_firing_frames(count: usize) -> Vec<InputFrame> {
    (0..count)
        .map(|i| {
            let mut frame = InputFrame::default();
            frame.keys_down = match i % 4 {
                0 => KeysDown::PULSE,
                1 => KeysDown::LEFT,
                2 => KeysDown::UP,
                _ => KeysDown::empty(),
            };
            frame
        })
        .collect()
}

#[test]
fn replaying_the_same_frame_log_twice_produces_identical_checksums() {
    let replay = Replay { global_seed: 99, chapter_id: 1, frames: turning_and_firing_frames(60) };
    let a = play(replay.clone());
    let b = play(replay);
    assert_eq!(a, b, "replaying identical (seed, frames) must be bit-identical");
}

#[test]
fn diverging_frame_logs_produce_different_checksums() {
    let mut frames_a = turning_and_firing_frames(40);
    let frames_b = turning_and_firing_frames(40);
    frames_a[10].keys_down = KeysDown::RIGHT;

    let a = play(Replay { global_seed: 5, chapter_id: 1, frames: frames_a });
    let b = play(Replay { global_seed: 5, chapter_id: 1, frames: frames_b });
    assert_ne!(a, b, "a single differing frame must change the recorded checksum");
}
