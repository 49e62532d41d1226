//! The simulation's two fallible boundaries: loading a
//! scenario, and unrecoverable arena exhaustion. Everything else inside
//! a tick resolves to "no effect this tick", never a `Result`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("scenario references unknown base object id {0}")]
    UnknownBaseObject(u32),
    #[error("scenario references unknown action id {0}")]
    UnknownAction(u32),
    #[error("scenario is missing a required player body base type")]
    MissingPlayerBody,
    #[error("scenario initial-object list exceeds arena capacity ({0} objects for {1} slots)")]
    TooManyInitialObjects(usize, usize),
    #[error("scenario admiral table is empty")]
    NoAdmirals,
}

#[derive(Debug, Error)]
pub enum FatalError {
    #[error("space-object arena exhausted while seating scenario's initial objects")]
    ArenaExhaustedAtLoad,
    #[error("proximity grid produced an out-of-range cell offset: {0}")]
    GridOverflow(String),
}
