//! `Session`: owns the arena, beam table, RNG, action queue and
//! conditions, and drives the tick pipeline.
//!
//! One orchestrator method calls out to independently-testable system
//! modules in a fixed order, rather than a generic scheduler.

use crate::action_queue::{ActionQueue, QueuedDispatch};
use crate::arena::Arena;
use crate::collision;
use crate::condition::{self, ConditionWorld, ObjectFacts};
use crate::grid;
use crate::motion;
use crate::presence;
use crate::systems::ai_think;
use crate::weapons;
use antares_core::action::{Action, ActionId, AlterVerb, SubjectOverride, Verb};
use antares_core::base_object::BaseObjectId;
use antares_core::beam::Beam;
use antares_core::coord::UniverseCoord;
use antares_core::events::{Event, StepOutcome};
use antares_core::fixed::Angle;
use antares_core::flags::{KeysDown, RuntimeFlags};
use antares_core::handle::Handle;
use antares_core::input::InputFrame;
use antares_core::object::{Active, Presence, SpaceObject};
use antares_core::random::Rng;
use antares_core::scenario::{Condition, Scenario};
use std::collections::HashMap;
use tracing::debug;

/// Minor ticks per major tick: grid rebuild, collision, AI, weapons and
/// the action-queue drain all run on this cadence, motion every tick.
pub const MAJOR_TICK_TICKS: i64 = 3;

#[derive(Debug, Clone, Default)]
pub struct Admiral {
    pub scores: HashMap<u32, i32>,
    pub cash: i32,
    pub ships_left: i32,
}

/// Construction-time configuration.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub global_seed: u32,
}

pub struct Session {
    arena: Arena,
    beams: Vec<Beam>,
    rng: Rng,
    action_queue: ActionQueue,
    scenario: Scenario,
    conditions: Vec<Condition>,
    admirals: Vec<Admiral>,
    initial_handles: Vec<Handle>,
    tick: i64,
    game_over: bool,
    winner: Option<i32>,
}

impl Session {
    pub fn new(
        arena: Arena,
        scenario: Scenario,
        rng: Rng,
        admirals: Vec<Admiral>,
        initial_handles: Vec<Handle>,
    ) -> Session {
        let conditions = scenario.conditions.clone();
        Session {
            arena,
            beams: Vec::new(),
            rng,
            action_queue: ActionQueue::new(),
            scenario,
            conditions,
            admirals,
            initial_handles,
            tick: 0,
            game_over: false,
            winner: None,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn tick(&self) -> i64 {
        self.tick
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self, frame: InputFrame) -> StepOutcome {
        self.tick += 1;
        let mut events = Vec::new();

        self.apply_input(frame);

        motion::run_minor_tick(&mut self.arena, &self.scenario.base_objects, &mut self.beams, 1);

        if self.tick % MAJOR_TICK_TICKS == 0 {
            self.run_major_tick(&mut events);
        }

        if self.tick % condition::CONDITION_TICK == 0 {
            self.run_conditions(&mut events);
        }

        for slot in self.arena.sweep() {
            events.push(Event::ObjectDestroyed { slot, remaining: self.arena.count_in_use() as i32 });
        }
        self.beams.retain(|b| !b.kill_me);

        StepOutcome { game_over: self.game_over, winner: self.winner, next_level: None, events }
    }

    pub fn step_n(&mut self, frames: impl IntoIterator<Item = InputFrame>) -> Vec<StepOutcome> {
        frames.into_iter().map(|f| self.step(f)).collect()
    }

    fn apply_input(&mut self, frame: InputFrame) {
        let player_slot = self.arena.active_slots().into_iter().find(|&s| {
            self.arena
                .by_slot(s)
                .map(|o| o.attributes.contains(antares_core::flags::AttributeFlags::IS_HUMAN_CONTROLLED))
                .unwrap_or(false)
        });
        let Some(slot) = player_slot else { return };
        let target_id = frame
            .selection
            .and_then(|selection| self.arena.by_slot(selection.target_slot).map(|target| target.id));
        if let Some(o) = self.arena.by_slot_mut(slot) {
            o.keys_down = frame.keys_down;
            if let Some(selection) = frame.selection {
                if let Some(id) = target_id {
                    o.target_object = Handle { slot: selection.target_slot, id };
                }
            }
        }
        // `mouse_click` only drives the host UI's screen-to-world picking;
        // it carries no further simulation state.
    }

    fn run_major_tick(&mut self, events: &mut Vec<Event>) {
        let collision_grid = grid::build_collision_grid(&mut self.arena, &self.scenario.base_objects);
        let awareness_grid = grid::build_awareness_grid(&mut self.arena);
        grid::update_visibility(&mut self.arena, &awareness_grid);

        let hits = collision::resolve_collisions(&mut self.arena, &self.beams, &collision_grid);
        for hit in hits {
            let attacker_base = self.arena.by_slot(hit.attacker).map(|o| o.base_type);
            let Some(attacker_base) = attacker_base.and_then(|id| self.scenario.base_objects.get(&id)) else {
                continue;
            };
            let damage = attacker_base.collide_damage;
            let collide_actions = attacker_base.collide.clone();
            let lethal = collision::apply_collide_damage(&mut self.arena, hit.victim, damage);
            let attacker_handle = self.arena.handle_of(hit.attacker);
            let victim_handle = self.arena.handle_of(hit.victim);
            self.run_actions(&collide_actions, attacker_handle, victim_handle, events);
            if lethal {
                self.destroy_with_actions(victim_handle, events);
            }
        }

        ai_think::run_think(&mut self.arena, &self.scenario.base_objects, &mut self.rng);

        self.run_presence_and_weapons(events);

        let arena = &self.arena;
        let due = self.action_queue.advance_and_drain(MAJOR_TICK_TICKS, |h| {
            if h.is_none() {
                None
            } else {
                arena.get(h).map(|o| o.id)
            }
        });
        for dispatch in due {
            for id in dispatch.actions.into_iter().flatten() {
                self.dispatch_action(id, dispatch.subject, dispatch.direct, events);
            }
        }

        self.run_age_sweep(events);
    }

    /// Decrement every active object's age by one major tick and expire
    /// whoever reaches zero or below; a negative starting age never
    /// ages (mirrors the `age -= 3`/`age >= 0` guard in `Motion.cpp`).
    fn run_age_sweep(&mut self, events: &mut Vec<Event>) {
        let slots = self.arena.active_slots();
        for slot in slots {
            let expired = match self.arena.by_slot_mut(slot) {
                Some(o) if o.age >= 0 => {
                    o.age -= MAJOR_TICK_TICKS as i32;
                    o.age <= 0
                }
                _ => false,
            };
            if !expired {
                continue;
            }
            let base_type = self.arena.by_slot(slot).map(|o| o.base_type);
            let expire_actions = base_type.and_then(|id| self.scenario.base_objects.get(&id)).map(|b| b.expire.clone());
            let handle = self.arena.handle_of(slot);
            if let Some(expire_actions) = expire_actions {
                self.run_actions(&expire_actions, handle, Handle::NONE, events);
            }
            self.arena.destroy(handle);
        }
    }

    fn run_presence_and_weapons(&mut self, events: &mut Vec<Event>) {
        let slots = self.arena.active_slots();
        for slot in slots {
            let base_type = match self.arena.by_slot(slot) {
                Some(o) => o.base_type,
                None => continue,
            };
            let Some(base) = self.scenario.base_objects.get(&base_type).cloned() else { continue };

            let (location, direction, owner) = match self.arena.by_slot(slot) {
                Some(o) => (o.location, o.direction, o.owner),
                None => continue,
            };
            let ev = if let Some(o) = self.arena.by_slot_mut(slot) {
                let ev = presence::step_presence(o, &base, MAJOR_TICK_TICKS as i32);
                if let Some(sound) = ev.warp_in_step_sound {
                    events.push(Event::PlaySound { id: sound as u32 });
                }
                weapons::recharge(o, &base);
                ev
            } else {
                continue;
            };
            if ev.spawn_warp_in_flare {
                if let Some(flare) = self.scenario.warp_in_flare {
                    self.spawn_object(flare, location, direction, owner, events);
                }
            }
            if ev.spawn_warp_out_flare {
                if let Some(flare) = self.scenario.warp_out_flare {
                    self.spawn_object(flare, location, direction, owner, events);
                }
            }
            if ev.landed_and_expired {
                let expire = base.expire.clone();
                let handle = self.arena.handle_of(slot);
                self.run_actions(&expire, handle, Handle::NONE, events);
            }

            let fired = {
                let o = match self.arena.by_slot_mut(slot) {
                    Some(o) => o,
                    None => continue,
                };
                weapons::fire_requested_weapons(o, &base, self.tick)
            };
            if fired.is_empty() {
                continue;
            }
            let (owner, location, direction) = match self.arena.by_slot(slot) {
                Some(o) => (o.owner, o.location, o.direction),
                None => continue,
            };
            for result in fired {
                let Some(device) = base.weapon(result.slot) else { continue };
                let spawn_at = UniverseCoord::new(
                    location.h.wrapping_add(result.rotated_position.0.to_long()),
                    location.v.wrapping_add(result.rotated_position.1.to_long()),
                );
                if let Some(projectile) = self.spawn_object(device.fires, spawn_at, direction, owner, events) {
                    let activate = device.activate.clone();
                    let subject = self.arena.handle_of(slot);
                    self.run_actions(&activate, subject, projectile, events);
                }
            }
        }
    }

    fn run_conditions(&mut self, events: &mut Vec<Event>) {
        let tick = self.tick;
        let arena = &self.arena;
        let initial_handles = &self.initial_handles;
        let admirals = &self.admirals;
        let resolve_initial = |idx: u32| -> ObjectFacts {
            let Some(&handle) = initial_handles.get(idx as usize) else {
                return ObjectFacts::default();
            };
            match arena.get(handle) {
                Some(o) => ObjectFacts {
                    alive: true,
                    location: o.location,
                    owner: o.owner,
                    health: o.health,
                    max_health: o.max_health,
                    velocity: o.velocity,
                    dest_object_id: if o.dest_object.is_none() { None } else { Some(o.dest_object.id) },
                    id: Some(o.id),
                },
                None => ObjectFacts::default(),
            }
        };
        let admiral_scores = |admiral: i32, counter: u32| -> i32 {
            admirals
                .get(admiral.max(0) as usize)
                .and_then(|a| a.scores.get(&counter))
                .copied()
                .unwrap_or(0)
        };
        let admiral_ships_left = |admiral: i32| -> i32 {
            admirals.get(admiral.max(0) as usize).map(|a| a.ships_left).unwrap_or(0)
        };
        let world = ConditionWorld {
            game_time_ticks: tick,
            admiral_scores: &admiral_scores,
            admiral_ships_left: &admiral_ships_left,
            resolve_initial: &resolve_initial,
            current_message_id: 0,
            current_computer: (0, 0),
            zoom_level: 0,
            player_autopilot: false,
            auxiliary_initial_index: None,
            target_initial_index: None,
            being_built_initial_index: None,
            subject_is_player_initial_index: None,
        };
        let fired = condition::evaluate_conditions(&mut self.conditions, &world);
        for idx in fired {
            let (actions, subject_idx, direct_idx) = {
                let cond = &self.conditions[idx];
                (cond.actions.clone(), cond.subject_initial_index, cond.direct_initial_index)
            };
            let subject = subject_idx.and_then(|i| self.initial_handles.get(i as usize).copied()).unwrap_or(Handle::NONE);
            let direct = direct_idx.and_then(|i| self.initial_handles.get(i as usize).copied()).unwrap_or(Handle::NONE);
            self.run_actions(&actions, subject, direct, events);
        }
    }

    fn admiral_mut(&mut self, admiral: i32) -> &mut Admiral {
        let idx = admiral.max(0) as usize;
        if idx >= self.admirals.len() {
            self.admirals.resize_with(idx + 1, Admiral::default);
        }
        &mut self.admirals[idx]
    }

    fn run_actions(&mut self, ids: &[ActionId], subject: Handle, direct: Handle, events: &mut Vec<Event>) {
        for id in ids {
            self.dispatch_action(*id, subject, direct, events);
        }
    }

    /// Either execute immediately or enqueue for later, per the
    /// action's `delay_ticks`.
    fn dispatch_action(&mut self, id: ActionId, subject: Handle, direct: Handle, events: &mut Vec<Event>) {
        let Some(action) = self.scenario.action(id).cloned() else {
            debug!(action = id.0, "dispatch of unknown action id ignored");
            return;
        };
        if action.delay_ticks > 0 {
            let subject_id = self.arena.get(subject).map(|o| o.id).unwrap_or(0);
            let direct_id = self.arena.get(direct).map(|o| o.id).unwrap_or(0);
            self.action_queue.enqueue(QueuedDispatch {
                scheduled_time: action.delay_ticks as i64,
                actions: [Some(id)],
                subject,
                subject_id_at_enqueue: subject_id,
                direct,
                direct_id_at_enqueue: direct_id,
            });
            return;
        }
        self.apply_action(&action, subject, direct, events);
    }

    fn apply_action(&mut self, action: &Action, subject: Handle, direct: Handle, events: &mut Vec<Event>) {
        let (subject_owner, direct_attrs, direct_owner) = {
            let s = self.arena.get(subject);
            let d = self.arena.get(direct);
            (s.and_then(|o| o.owner), d.map(|o| o.attributes.bits()).unwrap_or(0), d.and_then(|o| o.owner))
        };
        if !action.predicate_allows(direct_attrs, 0) {
            return;
        }
        if !action.owner_allows(subject_owner, direct_owner) {
            return;
        }

        let target = match action.direct_override {
            SubjectOverride::Subject => subject,
            SubjectOverride::Direct | SubjectOverride::None => direct,
        };

        match &action.verb {
            Verb::PlaySound { id } => events.push(Event::PlaySound { id: *id }),
            Verb::DisplayMessage { id } => events.push(Event::DisplayMessage { id: *id, text: None }),
            Verb::ChangeScore { admiral, which, delta } => {
                self.admiral_mut(*admiral).scores.entry(*which as u32).and_modify(|v| *v += *delta).or_insert(*delta);
                events.push(Event::ChangeScore { admiral: *admiral, which: *which, delta: *delta });
            }
            Verb::DeclareWinner { admiral, next_chapter } => {
                self.game_over = true;
                self.winner = Some(*admiral);
                events.push(Event::DeclareWinner { admiral: *admiral, next_chapter: *next_chapter });
            }
            Verb::ColorFlash { color, shade } => events.push(Event::ColorFlash { color: *color, shade: *shade }),
            Verb::SetZoom(level) => events.push(Event::ZoomChanged { level: *level }),
            Verb::Die { expire } => {
                if *expire {
                    if let Some(o) = self.arena.get_mut(target) {
                        o.active = Active::ToBeFreed;
                    }
                } else {
                    self.destroy_with_actions(target, events);
                }
            }
            Verb::NilTarget => {
                if let Some(o) = self.arena.get_mut(subject) {
                    o.target_object = Handle::NONE;
                }
            }
            Verb::LandAt { speed } => {
                if let Some(o) = self.arena.get_mut(target) {
                    o.presence = Presence::Landing { scale: antares_core::fixed::Fixed::ONE, speed: *speed };
                }
            }
            Verb::EnterWarp => {
                if let Some(o) = self.arena.get_mut(target) {
                    o.presence = Presence::WarpIn { progress: 0 };
                }
            }
            Verb::EnableKeys(mask) => {
                if let Some(o) = self.arena.get_mut(target) {
                    o.keys_down |= KeysDown::from_bits_truncate(*mask);
                }
            }
            Verb::DisableKeys(mask) => {
                if let Some(o) = self.arena.get_mut(target) {
                    o.keys_down.remove(KeysDown::from_bits_truncate(*mask));
                }
            }
            Verb::CreateObject { what, count, .. } => {
                let roll = self.rng.next_in_range(count.range.max(1));
                let n = (count.min + roll).max(0);
                let (loc, dir, owner) = self
                    .arena
                    .get(subject)
                    .map(|o| (o.location, o.direction, o.owner))
                    .unwrap_or((UniverseCoord::ORIGIN, Angle::new(0), None));
                for _ in 0..n {
                    self.spawn_object(*what, loc, dir, owner, events);
                }
            }
            Verb::Alter(alter) => self.apply_alter(alter, target),
            Verb::SetDestination => self.set_object_destination(subject, target),
            Verb::CreateObjectSetDest { what, count } => {
                let roll = self.rng.next_in_range(count.range.max(1));
                let n = (count.min + roll).max(0);
                let (loc, dir, owner, chained_dest) = self
                    .arena
                    .get(subject)
                    .map(|o| (o.location, o.direction, o.owner, o.dest_object))
                    .unwrap_or((UniverseCoord::ORIGIN, Angle::new(0), None, Handle::NONE));
                for _ in 0..n {
                    if let Some(spawned) = self.spawn_object(*what, loc, dir, owner, events) {
                        if !chained_dest.is_none() {
                            self.set_object_destination(spawned, chained_dest);
                        }
                    }
                }
            }
            // Same persistent-key-down mechanism `EnableKeys` already uses:
            // the next `fire_requested_weapons` pass picks the bit up and
            // fires subject to its normal energy/ammo/fire-time gating.
            // The original ties `kActivateSpecial` to an immediate,
            // synchronous fire and never wires `kActivatePulse`/
            // `kActivateBeam` into its action-execution switch at all
            // (only into action-record (de)serialization) — so routing
            // all three through keys_down is a one-tick-delayed superset
            // of the original's behavior, not a narrower one.
            Verb::ActivateSpecial => {
                if let Some(o) = self.arena.get_mut(target) {
                    o.keys_down |= KeysDown::SPECIAL;
                }
            }
            Verb::ActivatePulse => {
                if let Some(o) = self.arena.get_mut(target) {
                    o.keys_down |= KeysDown::PULSE;
                }
            }
            Verb::ActivateBeam => {
                if let Some(o) = self.arena.get_mut(target) {
                    o.keys_down |= KeysDown::BEAM;
                }
            }
            // `kComputerSelect`/`kAssumeInitialObject` drive the mini-computer
            // screen and per-admiral initial-object respawn bookkeeping in
            // the original client; this engine carries no mini-computer UI
            // state and no initial-object identity table to write into.
            other @ (Verb::ComputerSelect { .. } | Verb::AssumeInitialObject { .. }) => {
                debug!(verb = ?other, "action verb has no state to act on in this engine pass")
            }
            // Cosmetic-only verbs: no simulation state to mutate.
            other @ (Verb::MakeSparks { .. } | Verb::ReleaseEnergy { .. }) => {
                debug!(verb = ?other, "action verb not handled by this engine pass")
            }
        }
    }

    /// Point `subject`'s destination at `dest`, chaining through `dest`'s
    /// own destination and clearing arrival state, mirroring
    /// `SetObjectDestination` in `Motion.cpp`.
    fn set_object_destination(&mut self, subject: Handle, dest: Handle) {
        let (dest_dest, dest_loc) = match self.arena.get(dest) {
            Some(o) => (o.dest_object, o.location),
            None => (Handle::NONE, UniverseCoord::ORIGIN),
        };
        if let Some(o) = self.arena.get_mut(subject) {
            o.dest_object = dest;
            o.dest_object_dest = dest_dest;
            o.destination_location = dest_loc;
            o.time_from_origin = 0;
            o.runtime_flags.remove(RuntimeFlags::HAS_ARRIVED);
        }
    }

    fn apply_alter(&mut self, alter: &AlterVerb, target: Handle) {
        let Some(o) = self.arena.get_mut(target) else { return };
        match *alter {
            AlterVerb::Damage(amount) => o.health -= amount,
            AlterVerb::Energy(amount) => o.energy = (o.energy + amount).clamp(0, o.max_energy),
            AlterVerb::Hidden(on) => {
                if on {
                    o.runtime_flags.insert(RuntimeFlags::IS_HIDDEN);
                } else {
                    o.runtime_flags.remove(RuntimeFlags::IS_HIDDEN);
                }
            }
            AlterVerb::Cloak(on) => {
                if on {
                    o.runtime_flags.insert(RuntimeFlags::IS_CLOAKED);
                    o.cloak_state = 1;
                } else {
                    o.runtime_flags.remove(RuntimeFlags::IS_CLOAKED);
                    o.cloak_state = -1;
                }
            }
            AlterVerb::Spin(v) => o.turn_velocity = v,
            AlterVerb::Offline(v) => o.offline_time = v,
            AlterVerb::VelocityAbsolute(h, v) => o.velocity = (h, v),
            AlterVerb::VelocityRelative(h, v) => o.velocity = (o.velocity.0 + h, o.velocity.1 + v),
            AlterVerb::MaxVelocity(v) => o.max_velocity = v,
            AlterVerb::Thrust(v) => o.thrust = v,
            AlterVerb::BaseType(id) => o.base_type = id,
            AlterVerb::Owner(admiral) => o.owner = Some(admiral),
            AlterVerb::Age(v) => o.age = v,
            AlterVerb::Location(h, v) => {
                o.location.h = o.location.h.wrapping_add(h.to_long());
                o.location.v = o.location.v.wrapping_add(v.to_long());
            }
            AlterVerb::AbsoluteLocation(h, v) => {
                o.location.h = h.to_long();
                o.location.v = v.to_long();
            }
            AlterVerb::LevelKeyTag(tag) => o.engage_key_tag = tag,
            // Cash/build/weapon-reassignment/condition-latch alters have
            // no reader in this engine pass yet.
            AlterVerb::ConditionTrueYet(_, _) | AlterVerb::Occupation(_) | AlterVerb::AbsoluteCash(_, _)
            | AlterVerb::Weapon1(_) | AlterVerb::Weapon2(_) | AlterVerb::Special(_) => {}
        }
    }

    fn destroy_with_actions(&mut self, handle: Handle, events: &mut Vec<Event>) {
        let base_type = self.arena.get(handle).map(|o| o.base_type);
        self.arena.destroy(handle);
        if let Some(destroy_actions) = base_type.and_then(|id| self.scenario.base_objects.get(&id)).map(|b| b.destroy.clone()) {
            self.run_actions(&destroy_actions, handle, Handle::NONE, events);
        }
    }

    fn spawn_object(
        &mut self,
        base_type: BaseObjectId,
        location: UniverseCoord,
        direction: Angle,
        owner: Option<i32>,
        events: &mut Vec<Event>,
    ) -> Option<Handle> {
        let base = self.scenario.base_objects.get(&base_type)?.clone();
        let mut obj = SpaceObject::nil_target();
        obj.base_type = base_type;
        obj.attributes = base.attributes;
        obj.owner = owner;
        obj.my_player_flag =
            owner.map(|o| antares_core::flags::PlayerFlags::for_admiral(o.max(0) as u8)).unwrap_or_default();
        obj.location = location;
        obj.direction = direction;
        obj.max_velocity = base.max_velocity;
        obj.thrust = base.thrust;
        obj.health = base.max_health;
        obj.max_health = base.max_health;
        obj.energy = base.max_energy;
        obj.max_energy = base.max_energy;
        obj.battery = base.max_energy * 5;
        obj.random_seed = self.rng.next_in_range(i32::MAX);
        obj.active = Active::InUse;
        obj.age = base.roll_initial_age(&mut self.rng);
        let seed = self.rng.next_in_range(u16::MAX as i32) as u16;
        let handle = self.arena.create(obj, seed)?;
        self.run_actions(&base.create.clone(), handle, handle, events);
        Some(handle)
    }

    #[cfg(test)]
    pub fn checksum_snapshot(&self, local_player: antares_core::flags::PlayerFlags) -> String {
        use sha2::{Digest, Sha256};
        let snapshot = crate::snapshot::build_snapshot(&self.arena, self.tick, local_player);
        let bytes = serde_json::to_vec(&snapshot).expect("snapshot serializes");
        let digest = Sha256::digest(&bytes);
        format!("{:x}", digest)
    }
}
