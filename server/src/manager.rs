//! Session registry: the single owner of every live session, its target claims and restore points.
//!
//! All state changes happen inside one `&mut self` call, so a tick can never observe a
//! half-registered or half-removed session. `close` is the only teardown path.

use std::{collections::HashMap, sync::Arc};

use grip_shared::{
    ActorId, EntityId, Vec3, constants::ITEM_RETURN_DELAY, inverse_transform_point,
};

use crate::{
    config::{Configuration, Ruleset},
    error::{StartError, StopReason, UndoError},
    hooks::{Observers, SessionObserver, TargetPair, Verdict},
    host::{ActorView, HeldItem, Host, World},
    lang::{Message, format_message},
    restore::{RestoreStore, RestoreTicket},
    rigid_body::RigidBodyGuard,
    session::{ControlSession, TickOutcome},
    stopwatch::TickProfiler,
    time::{FrameTime, after},
    timer::TimerQueue,
};

/// Work scheduled for a later frame.
#[derive(Debug)]
enum Deferred {
    /// Give back the item taken from the actor's hands, or drop it where they stood.
    ReturnItem {
        actor: ActorId,
        item: HeldItem,
        fallback: Vec3,
    },
}

struct ActiveSession {
    session: ControlSession,
    guard: Option<RigidBodyGuard>,
    ticket: RestoreTicket,
}

pub struct SessionManager {
    config: Arc<Configuration>,
    sessions: HashMap<ActorId, ActiveSession>,
    /// Move and rotate targets of live sessions, keyed to their controlling actor.
    claims: HashMap<EntityId, ActorId>,
    restore: RestoreStore,
    deferred: TimerQueue<Deferred>,
    observers: Observers,
    profiler: TickProfiler,
}

impl SessionManager {
    pub fn new(config: Arc<Configuration>) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
            claims: HashMap::new(),
            restore: RestoreStore::default(),
            deferred: TimerQueue::new(),
            observers: Observers::default(),
            profiler: TickProfiler::default(),
        }
    }

    /// Profiles one `update` in `every` (0 turns profiling off).
    pub fn set_profiling(&mut self, every: u32) {
        self.profiler.set_sampling(every);
    }

    pub fn config(&self) -> &Arc<Configuration> {
        &self.config
    }

    pub fn register_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.register(observer);
    }

    pub fn observers_mut(&mut self) -> &mut Observers {
        &mut self.observers
    }

    /// True if `target` exists and is the move or rotate target of a live session.
    pub fn is_controlled(&self, world: &impl World, target: EntityId) -> bool {
        world.is_valid(target) && self.claims.contains_key(&target)
    }

    pub fn is_active(&self, actor: ActorId) -> bool {
        self.sessions.contains_key(&actor)
    }

    pub fn session(&self, actor: ActorId) -> Option<&ControlSession> {
        self.sessions.get(&actor).map(|a| &a.session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn restore_points(&self) -> &RestoreStore {
        &self.restore
    }

    /// Starts a session for `actor` on `target` under `ruleset`.
    ///
    /// # Errors
    ///
    /// Returns the first failed check. Nothing is registered, captured or suspended on error.
    pub fn start(
        &mut self,
        host: &mut impl Host,
        actor: ActorId,
        target: EntityId,
        ruleset: Ruleset,
        now: f64,
    ) -> Result<TargetPair, StartError> {
        if self.is_controlled(&*host, target) {
            return Err(StartError::AlreadyControlled);
        }
        if self.is_active(actor) {
            return Err(StartError::AlreadyActive);
        }
        let view = host
            .actor(actor)
            .filter(ActorView::is_able)
            .ok_or(StartError::ActorUnavailable)?;
        if !host.is_valid(target) {
            return Err(StartError::NoTargetFound);
        }

        let targets = self.observers.substitute(actor, target);
        if targets.entities().any(|e| self.is_controlled(&*host, e)) {
            return Err(StartError::AlreadyControlled);
        }
        if targets.entities().any(|e| !host.is_valid(e)) {
            return Err(StartError::NoTargetFound);
        }
        if let Verdict::Deny(message) = self.observers.can_start(actor, targets) {
            log::info!("start of {actor} on {targets:?} denied by an observer");
            return Err(StartError::PolicyDenied(message));
        }

        let position = host
            .position(targets.move_target)
            .ok_or(StartError::NoTargetFound)?;
        let ticket = self
            .restore
            .capture(&*host, actor, targets)
            .ok_or(StartError::NoTargetFound)?;
        let guard = RigidBodyGuard::suspend(host, targets.move_target);
        let head_offset = inverse_transform_point(view.eye_position, position, view.eye_rotation);

        let session = ControlSession::new(
            actor,
            targets,
            ruleset,
            self.config.clone(),
            head_offset,
            now,
        );
        for entity in targets.entities() {
            self.claims.insert(entity, actor);
        }
        self.sessions.insert(
            actor,
            ActiveSession {
                session,
                guard,
                ticket,
            },
        );

        self.put_away_active_item(host, actor, view.position, now);

        log::info!("{actor} started controlling {targets:?}");
        self.observers.on_started(actor, targets);
        Ok(targets)
    }

    /// Ends the actor's session, if any. Sends no message.
    pub fn stop(&mut self, host: &mut impl Host, actor: ActorId, now: f64) -> bool {
        self.close(host, actor, StopReason::Explicit, now)
    }

    /// Ends whichever session controls `target`, if any.
    pub fn stop_target(&mut self, host: &mut impl Host, target: EntityId, now: f64) -> bool {
        match self.claims.get(&target).copied() {
            Some(actor) => self.close(host, actor, StopReason::Explicit, now),
            None => false,
        }
    }

    /// Ends every session. Returns how many were stopped.
    pub fn stop_all(&mut self, host: &mut impl Host, now: f64) -> usize {
        let mut actors: Vec<ActorId> = self.sessions.keys().copied().collect();
        actors.sort_unstable();
        let mut stopped = 0;
        for actor in actors {
            if self.close(host, actor, StopReason::Explicit, now) {
                stopped += 1;
            }
        }
        stopped
    }

    /// Stops any session of the actor, then restores its last restore point.
    ///
    /// # Errors
    ///
    /// [`UndoError::NotFound`] if there is no restore point, it expired, or a target is gone.
    /// Also when another actor's session controls one of the targets; the point is kept then.
    pub fn undo(
        &mut self,
        host: &mut impl Host,
        actor: ActorId,
        now: f64,
    ) -> Result<TargetPair, UndoError> {
        self.close(host, actor, StopReason::Undo, now);

        if let Some(point) = self.restore.get(actor) {
            let claimed_by = point
                .targets
                .entities()
                .find_map(|e| self.claims.get(&e).filter(|owner| **owner != actor));
            if let Some(owner) = claimed_by {
                log::debug!("undo of {actor} refused: {owner} controls {:?}", point.targets);
                return Err(UndoError::NotFound);
            }
        }

        let targets = self
            .restore
            .try_undo(host, actor)
            .ok_or(UndoError::NotFound)?;
        self.observers.on_stopped(actor, targets);
        Ok(targets)
    }

    /// Runs one host loop iteration: due timers first, then one tick per live session.
    pub fn update(&mut self, host: &mut impl Host, frame: FrameTime) {
        let mut stopwatch = self.profiler.begin("grip update");

        stopwatch.span("timers");
        self.restore.expire_due(frame.now);
        self.run_deferred(host, frame.now);

        stopwatch.span("sessions");
        let mut actors: Vec<ActorId> = self.sessions.keys().copied().collect();
        actors.sort_unstable();

        for actor in actors {
            let Some(active) = self.sessions.get_mut(&actor) else {
                continue;
            };
            if let TickOutcome::Terminate(reason) = active.session.tick(host, frame) {
                self.close(host, actor, reason, frame.now);
            }
        }
    }

    /// Stops everything and settles pending work. Restore points are dropped.
    pub fn shutdown(&mut self, host: &mut impl Host, now: f64) {
        let stopped = self.stop_all(host, now);
        self.run_deferred(host, f64::INFINITY);
        self.restore.clear();
        log::info!("session manager shut down ({stopped} sessions stopped)");
    }

    /// Tears a session down. Returns false if the actor had none.
    fn close(&mut self, host: &mut impl Host, actor: ActorId, reason: StopReason, now: f64) -> bool {
        let Some(active) = self.sessions.remove(&actor) else {
            return false;
        };
        let targets = active.session.targets();
        for entity in targets.entities() {
            self.claims.remove(&entity);
        }

        if let Some(guard) = active.guard {
            guard.restore(host);
        }
        self.restore.arm_expiry(&*host, active.ticket, now);
        host.wake_buoyancy(targets.move_target);

        log::info!("{actor} stopped controlling {targets:?} ({reason})");
        self.observers.on_stopped(actor, targets);

        if let Some(message) = disabled_message(reason) {
            let text = format_message(&self.config, message, None);
            host.send_message(actor, &text);
        }
        true
    }

    fn put_away_active_item(&mut self, host: &mut impl Host, actor: ActorId, fallback: Vec3, now: f64) {
        if let Some(item) = host.take_active_item(actor) {
            self.deferred.schedule_at(
                after(now, ITEM_RETURN_DELAY),
                Deferred::ReturnItem {
                    actor,
                    item,
                    fallback,
                },
            );
        }
    }

    fn run_deferred(&mut self, host: &mut impl Host, now: f64) {
        while let Some((_, work)) = self.deferred.pop_due(now) {
            match work {
                Deferred::ReturnItem {
                    actor,
                    item,
                    fallback,
                } => {
                    if let Err(item) = host.return_item(actor, item) {
                        log::debug!("could not return item {} to {actor}; dropping", item.item_id);
                        host.drop_item(item, fallback);
                    }
                }
            }
        }
    }
}

/// The chat line sent when a session ends on its own. Explicit stops are silent.
fn disabled_message(reason: StopReason) -> Option<Message> {
    match reason {
        StopReason::Explicit | StopReason::Undo => None,
        StopReason::Inactivity => Some(Message::InfoDisabledInactivity),
        StopReason::BuildingBlocked => Some(Message::InfoDisabledBuildingBlocked),
        StopReason::ActorLost | StopReason::TargetLost => Some(Message::InfoDisabled),
    }
}
