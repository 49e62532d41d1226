//! `Load(scenario) -> Session`. Builds
//! the arena, admirals, conditions, and initial objects, and primes the
//! RNG from `global_seed`. Deterministic.

use crate::arena::Arena;
use crate::engine::{Admiral, Session};
use antares_core::errors::LoadError;
use antares_core::flags::AttributeFlags;
use antares_core::object::{Active, SpaceObject};
use antares_core::random::Rng;
use antares_core::scenario::Scenario;
use tracing::info;

pub fn load(scenario: Scenario, global_seed: u32) -> Result<Session, LoadError> {
    if scenario.admiral_count == 0 {
        return Err(LoadError::NoAdmirals);
    }
    if scenario.initial_objects.len() > crate::arena::MAX_SPACE_OBJECT {
        return Err(LoadError::TooManyInitialObjects(
            scenario.initial_objects.len(),
            crate::arena::MAX_SPACE_OBJECT,
        ));
    }
    let has_player_body = scenario.initial_objects.iter().any(|initial| {
        scenario
            .base_object(initial.base_type)
            .map(|base| (base.attributes | initial.attributes).contains(AttributeFlags::IS_HUMAN_CONTROLLED))
            .unwrap_or(false)
    });
    if !has_player_body {
        return Err(LoadError::MissingPlayerBody);
    }

    let mut rng = Rng::new(global_seed);
    let mut arena = Arena::new();
    let mut initial_handles = Vec::with_capacity(scenario.initial_objects.len());

    for initial in &scenario.initial_objects {
        let base = scenario
            .base_object(initial.base_type)
            .ok_or(LoadError::UnknownBaseObject(initial.base_type.0))?;

        let mut obj = SpaceObject::nil_target();
        obj.base_type = initial.base_type;
        obj.attributes = base.attributes | initial.attributes;
        obj.owner = initial.owner;
        obj.my_player_flag = initial
            .owner
            .map(|owner| antares_core::flags::PlayerFlags::for_admiral(owner.max(0) as u8))
            .unwrap_or_default();
        obj.location = initial.location;
        obj.direction = initial.direction;
        obj.max_velocity = base.max_velocity;
        obj.thrust = base.thrust;
        obj.health = base.max_health;
        obj.max_health = base.max_health;
        obj.energy = base.max_energy;
        obj.max_energy = base.max_energy;
        obj.battery = base.max_energy * 5;
        obj.random_seed = rng.next_in_range(i32::MAX);
        obj.active = Active::InUse;
        obj.age = base.roll_initial_age(&mut rng);

        if obj.attributes.contains(AttributeFlags::IS_SELF_ANIMATED) {
            if let antares_core::base_object::FrameKind::Animation { first_shape, .. } = base.frame {
                let range = rng.next_in_range(4);
                obj.frame = antares_core::object::FrameState::Animation {
                    this_shape: antares_core::fixed::Fixed::from_long(first_shape + range),
                };
            }
        }

        let seed = rng.next_in_range(u16::MAX as i32) as u16;
        match arena.create(obj, seed) {
            Some(handle) => initial_handles.push(handle),
            None => {
                return Err(LoadError::TooManyInitialObjects(
                    scenario.initial_objects.len(),
                    crate::arena::MAX_SPACE_OBJECT,
                ));
            }
        }
    }

    let admirals = (0..scenario.admiral_count).map(|_| Admiral::default()).collect();

    info!(
        chapter = scenario.chapter_id,
        objects = scenario.initial_objects.len(),
        "scenario loaded"
    );

    Ok(Session::new(arena, scenario, rng, admirals, initial_handles))
}
