//! Cross-module assertions that don't belong to any single file.

use crate::action::{Action, ActionId, OwnerPredicate, SubjectOverride, Verb};
use crate::base_object::BaseObjectId;
use crate::fixed::{Angle, Fixed};
use crate::flags::AttributeFlags;
use crate::handle::Handle;
use crate::object::SpaceObject;

#[test]
fn nil_target_handle_round_trips_through_serde_json() {
    let nil = SpaceObject::nil_target();
    let json = serde_json::to_string(&nil).expect("serialize nil target");
    let back: SpaceObject = serde_json::from_str(&json).expect("deserialize nil target");
    assert_eq!(back.target_object, Handle::NONE);
    assert!(back.attributes.is_empty());
}

#[test]
fn action_predicate_against_nil_target_is_false_for_any_nonzero_bit() {
    let nil = SpaceObject::nil_target();
    let action = Action {
        id: ActionId(1),
        verb: Verb::NilTarget,
        reflexive: false,
        owner: OwnerPredicate::Any,
        inclusive_filter: AttributeFlags::CAN_COLLIDE.bits(),
        exclusive_filter: 0,
        delay_ticks: 0,
        subject_override: SubjectOverride::None,
        direct_override: SubjectOverride::None,
    };
    assert!(!action.predicate_allows(nil.attributes.bits(), 0));
}

#[test]
fn angle_from_slope_agrees_with_rot_point_round_trip() {
    let original = Angle::new(40);
    let (h, v) = original.rot_point(Fixed::from_long(100));
    let recovered = Angle::from_slope(h, v);
    // Table lookup + atan2 recovery is accurate to within a degree of jitter.
    let diff = (recovered.value() as i32 - original.value() as i32).abs();
    assert!(diff <= 1 || diff >= 359);
}

#[test]
fn base_object_id_is_a_stable_hash_key() {
    use std::collections::HashMap;
    let mut map: HashMap<BaseObjectId, &str> = HashMap::new();
    map.insert(BaseObjectId(7), "dummy");
    assert_eq!(map.get(&BaseObjectId(7)), Some(&"dummy"));
}
