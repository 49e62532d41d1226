//! Beam data model. Beams live in their own fixed-capacity
//! table; objects reference one by handle via `frame.beam`.

use crate::coord::UniverseCoord;
use crate::handle::Handle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamKind {
    Kinetic,
    StaticObjectToObject,
    StaticObjectToRelativeCoord,
    BoltObjectToObject,
    BoltObjectToRelativeCoord,
}

impl BeamKind {
    pub fn is_object_to_object(self) -> bool {
        matches!(
            self,
            BeamKind::StaticObjectToObject | BeamKind::BoltObjectToObject
        )
    }

    pub fn is_object_to_relative(self) -> bool {
        matches!(
            self,
            BeamKind::StaticObjectToRelativeCoord | BeamKind::BoltObjectToRelativeCoord
        )
    }

    pub fn is_bolt(self) -> bool {
        matches!(
            self,
            BeamKind::BoltObjectToObject | BeamKind::BoltObjectToRelativeCoord
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamId(pub u16);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beam {
    pub id: BeamId,
    pub kind: BeamKind,
    pub color: u8,
    pub from: Handle,
    pub to: Handle,
    pub to_relative_coord: UniverseCoord,
    pub object_location: UniverseCoord,
    pub last_global_location: UniverseCoord,
    pub bolt_cycle_timer: i32,
    pub bolt_state: i32,
    pub jitter_points: Vec<UniverseCoord>,
    pub kill_me: bool,
}

impl Beam {
    pub fn new(id: BeamId, kind: BeamKind, color: u8) -> Beam {
        Beam {
            id,
            kind,
            color,
            from: Handle::NONE,
            to: Handle::NONE,
            to_relative_coord: UniverseCoord::default(),
            object_location: UniverseCoord::default(),
            last_global_location: UniverseCoord::default(),
            bolt_cycle_timer: 0,
            bolt_state: 0,
            jitter_points: Vec::new(),
            kill_me: false,
        }
    }
}
