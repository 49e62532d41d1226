//! Scenario data model, plus a `PluginId` namespace: base-object and
//! scenario tables are grouped into named plugins so a multi-plugin
//! host can disambiguate object-type ids across tables. Cheap to carry
//! since it only affects id namespacing, not simulation semantics.

use crate::action::ActionId;
use crate::base_object::{BaseObject, BaseObjectId};
use crate::beam::Beam;
use crate::coord::UniverseCoord;
use crate::fixed::{Angle, Fixed};
use crate::flags::AttributeFlags;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    CounterEq { admiral: i32, counter: u32, amount: i32 },
    CounterGe { admiral: i32, counter: u32, amount: i32 },
    CounterNe { admiral: i32, counter: u32, amount: i32 },
    Destruction { initial_index: u32 },
    Owner { initial_index: u32, admiral: i32 },
    Time { ticks: i64 },
    Proximity { subject_index: u32, direct_index: u32, distance_squared: i64 },
    DistanceGreater { subject_index: u32, direct_index: u32, distance_squared: i64 },
    HalfHealth { initial_index: u32 },
    IsAuxiliary { initial_index: u32 },
    IsTarget { initial_index: u32 },
    VelocityLe { initial_index: u32, limit: Fixed },
    NoShipsLeft { admiral: i32 },
    CurrentMessage { id: u32 },
    CurrentComputer { screen: i32, line: i32 },
    ZoomLevel { level: i32 },
    Autopilot,
    NotAutopilot,
    ObjectIsBeingBuilt { initial_index: u32 },
    DirectIsSubjectTarget { subject_index: u32, direct_index: u32 },
    SubjectIsPlayer { subject_index: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionFlags {
    pub true_only_once: bool,
    pub initially_true: bool,
    pub has_been_true: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub predicate: Predicate,
    pub subject_initial_index: Option<u32>,
    pub direct_initial_index: Option<u32>,
    pub actions: Vec<ActionId>,
    pub flags: ConditionFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialObject {
    pub base_type: BaseObjectId,
    /// Location in the scenario's pre-rotation frame; rotated/placed by
    /// the loader at `Load` time.
    pub location: UniverseCoord,
    pub owner: Option<i32>,
    pub can_build: Vec<BaseObjectId>,
    pub sprite_id_override: Option<u32>,
    pub initial_destination: Option<u32>,
    pub attributes: AttributeFlags,
    pub direction: Angle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BriefingPoint {
    pub initial_index: Option<u32>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub plugin: PluginId,
    pub chapter_id: u16,
    pub base_objects: HashMap<BaseObjectId, BaseObject>,
    pub actions: HashMap<ActionId, crate::action::Action>,
    pub initial_objects: Vec<InitialObject>,
    pub conditions: Vec<Condition>,
    pub briefing: Vec<BriefingPoint>,
    pub beams: Vec<Beam>,
    pub admiral_count: u32,
    /// Base type spawned at an object's location when it finishes
    /// warping in/out. `None` means the plugin defines no flare, in
    /// which case presence transitions simply don't spawn one.
    #[serde(default)]
    pub warp_in_flare: Option<BaseObjectId>,
    #[serde(default)]
    pub warp_out_flare: Option<BaseObjectId>,
}

impl Scenario {
    pub fn base_object(&self, id: BaseObjectId) -> Option<&BaseObject> {
        self.base_objects.get(&id)
    }

    pub fn action(&self, id: ActionId) -> Option<&crate::action::Action> {
        self.actions.get(&id)
    }
}
