//! The Antares simulation engine: arena, proximity grids, motion,
//! collision, presence state machines, weapons economy, action queue,
//! condition evaluator, tick scheduler, and replay.
//!
//! `Session` is the one owned value: `load::load` produces it,
//! `Session::step` mutates it. Nothing here suspends; every system runs
//! to completion synchronously within a tick.

pub mod action_queue;
pub mod arena;
pub mod collision;
pub mod condition;
pub mod engine;
pub mod grid;
pub mod load;
pub mod motion;
pub mod presence;
pub mod replay;
pub mod snapshot;
pub mod systems;
pub mod weapons;

pub use engine::{Session, SimConfig};
