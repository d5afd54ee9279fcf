//! One-level undo: a snapshot of each actor's last target, taken when a session starts.
//!
//! Lifecycle of a restore point
//! - Created by [`RestoreStore::capture`] when a session starts. A successful capture discards
//!   any older point of the same actor (never restored).
//! - Armed by [`RestoreStore::arm_expiry`] when that session ends: it now expires after the TTL.
//! - Consumed by [`RestoreStore::try_undo`], discarded by expiry, or superseded by a new capture.
//!
//! Expiry timers carry a generation number. A timer whose point was consumed or superseded
//! finds a different (or no) generation and does nothing.

use std::{collections::HashMap, time::Duration};

use grip_shared::{ActorId, Quat, Vec3, constants::RESTORE_POINT_TTL};

use crate::{
    hooks::TargetPair,
    host::World,
    time::after,
    timer::{TimerId, TimerQueue},
};

/// Identifies one specific restore point of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RestoreTicket {
    pub actor: ActorId,
    generation: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RestorePoint {
    pub actor: ActorId,
    pub targets: TargetPair,
    /// Local position of the move target at capture time.
    pub local_position: Vec3,
    /// Local rotation of the rotate target at capture time.
    pub local_rotation: Quat,
    generation: u64,
    expiry: Option<TimerId>,
}

impl RestorePoint {
    /// Both captured entities still exist.
    pub fn is_valid(&self, world: &impl World) -> bool {
        world.is_valid(self.targets.move_target) && world.is_valid(self.targets.rotate_target)
    }

    pub fn is_armed(&self) -> bool {
        self.expiry.is_some()
    }
}

pub struct RestoreStore {
    points: HashMap<ActorId, RestorePoint>,
    timers: TimerQueue<RestoreTicket>,
    next_generation: u64,
    ttl: Duration,
}

impl Default for RestoreStore {
    fn default() -> Self {
        Self::with_ttl(RESTORE_POINT_TTL)
    }
}

impl RestoreStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            points: HashMap::new(),
            timers: TimerQueue::new(),
            next_generation: 0,
            ttl,
        }
    }

    /// Snapshots the current local transform of `targets` for `actor`.
    ///
    /// On success any previous point of the actor is dropped without being restored. Returns
    /// `None`, and leaves the previous point in place, if either target has no transform.
    pub fn capture(
        &mut self,
        world: &impl World,
        actor: ActorId,
        targets: TargetPair,
    ) -> Option<RestoreTicket> {
        let local_position = world.local_position(targets.move_target)?;
        let local_rotation = world.local_rotation(targets.rotate_target)?;

        self.discard(actor);
        let generation = self.next_generation;
        self.next_generation += 1;

        self.points.insert(
            actor,
            RestorePoint {
                actor,
                targets,
                local_position,
                local_rotation,
                generation,
                expiry: None,
            },
        );
        Some(RestoreTicket { actor, generation })
    }

    pub fn get(&self, actor: ActorId) -> Option<&RestorePoint> {
        self.points.get(&actor)
    }

    /// True if the ticket still names the actor's current point.
    pub fn is_current(&self, ticket: RestoreTicket) -> bool {
        self.points
            .get(&ticket.actor)
            .is_some_and(|p| p.generation == ticket.generation)
    }

    /// Restores the actor's captured transform and consumes the point.
    ///
    /// Returns the restored pair, or `None` if there is no point or a captured entity is gone
    /// (in which case the point is dropped).
    pub fn try_undo(&mut self, world: &mut impl World, actor: ActorId) -> Option<TargetPair> {
        let point = self.remove(actor)?;
        if !point.is_valid(world) {
            log::debug!("restore point of {actor} dropped: target no longer exists");
            return None;
        }

        let targets = point.targets;
        world.set_local_position(targets.move_target, point.local_position);
        world.set_local_rotation(targets.rotate_target, point.local_rotation);
        for entity in targets.entities() {
            world.broadcast_transform(entity);
        }

        log::info!("restored {targets:?} for {actor}");
        Some(targets)
    }

    /// Starts the expiry countdown of the ticket's point. Called once, when its session ends.
    ///
    /// A point whose targets are already gone is dropped instead. Returns true if armed.
    pub fn arm_expiry(&mut self, world: &impl World, ticket: RestoreTicket, now: f64) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let valid = self
            .points
            .get(&ticket.actor)
            .is_some_and(|p| p.is_valid(world));
        if !valid {
            self.discard(ticket.actor);
            return false;
        }

        let due = after(now, self.ttl);
        let Some(point) = self.points.get_mut(&ticket.actor) else {
            return false;
        };
        if point.expiry.is_some() {
            return false;
        }
        point.expiry = Some(self.timers.schedule_at(due, ticket));
        true
    }

    /// Drops every point whose expiry is due. Returns how many expired.
    pub fn expire_due(&mut self, now: f64) -> usize {
        let mut expired = 0;
        while let Some((_, ticket)) = self.timers.pop_due(now) {
            if self.is_current(ticket) {
                self.points.remove(&ticket.actor);
                log::debug!("restore point of {} expired", ticket.actor);
                expired += 1;
            }
        }
        expired
    }

    /// Drops the actor's point, if any, without restoring it.
    pub fn discard(&mut self, actor: ActorId) -> bool {
        self.remove(actor).is_some()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.timers.clear();
    }

    fn remove(&mut self, actor: ActorId) -> Option<RestorePoint> {
        let point = self.points.remove(&actor)?;
        if let Some(timer) = point.expiry {
            self.timers.cancel(timer);
        }
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;

    const ACTOR: ActorId = 42;

    fn moved(host: &mut FakeHost, entity: grip_shared::EntityId) {
        host.set_local_position(entity, Vec3::new(9.0, 9.0, 9.0));
        host.set_local_rotation(
            entity,
            Quat::from_axis_angle(&Vec3::y_axis(), 1.0),
        );
    }

    #[test]
    fn undo_restores_captured_transform_once() {
        let mut host = FakeHost::new();
        let target = host.spawn_deployable(1);
        let start = host.local_position(target).unwrap();
        let mut store = RestoreStore::default();

        store.capture(&host, ACTOR, TargetPair::single(target)).unwrap();
        moved(&mut host, target);
        host.broadcasts.clear();

        assert_eq!(store.try_undo(&mut host, ACTOR), Some(TargetPair::single(target)));
        assert_eq!(host.local_position(target), Some(start));
        assert_eq!(host.local_rotation(target), Some(Quat::identity()));
        assert_eq!(host.broadcasts, vec![target]);
        assert!(
            !host.take_transform_changed(target),
            "the broadcast already published the restored transform"
        );

        assert_eq!(store.try_undo(&mut host, ACTOR), None);
    }

    #[test]
    fn split_pair_restores_and_broadcasts_both() {
        let mut host = FakeHost::new();
        let base = host.spawn_deployable(1);
        let turret = host.spawn_deployable(2);
        let mut store = RestoreStore::default();

        store
            .capture(&host, ACTOR, TargetPair::new(base, turret))
            .unwrap();
        moved(&mut host, base);
        moved(&mut host, turret);
        host.broadcasts.clear();

        store.try_undo(&mut host, ACTOR).unwrap();
        assert_eq!(host.local_rotation(turret), Some(Quat::identity()));
        // Only the rotation of the rotate target and the position of the move target are restored.
        assert_eq!(host.local_position(turret), Some(Vec3::new(9.0, 9.0, 9.0)));
        assert_eq!(host.broadcasts, vec![base, turret]);
    }

    #[test]
    fn new_capture_supersedes_without_restoring() {
        let mut host = FakeHost::new();
        let first = host.spawn_deployable(1);
        let second = host.spawn_deployable(2);
        let mut store = RestoreStore::default();

        let old = store.capture(&host, ACTOR, TargetPair::single(first)).unwrap();
        moved(&mut host, first);
        store.capture(&host, ACTOR, TargetPair::single(second)).unwrap();

        assert!(!store.is_current(old));
        assert_eq!(host.local_position(first), Some(Vec3::new(9.0, 9.0, 9.0)));
        assert_eq!(
            store.get(ACTOR).map(|p| p.targets),
            Some(TargetPair::single(second))
        );
    }

    #[test]
    fn failed_capture_keeps_previous_point() {
        let mut host = FakeHost::new();
        let first = host.spawn_deployable(1);
        let gone = host.spawn_deployable(2);
        host.destroy(gone);
        let mut store = RestoreStore::default();

        let ticket = store.capture(&host, ACTOR, TargetPair::single(first)).unwrap();
        assert_eq!(store.capture(&host, ACTOR, TargetPair::single(gone)), None);

        assert!(store.is_current(ticket));
        assert!(store.arm_expiry(&host, ticket, 0.0));
        assert_eq!(store.try_undo(&mut host, ACTOR), Some(TargetPair::single(first)));
    }

    #[test]
    fn armed_point_expires_after_ttl() {
        let mut host = FakeHost::new();
        let target = host.spawn_deployable(1);
        let mut store = RestoreStore::default();

        let ticket = store.capture(&host, ACTOR, TargetPair::single(target)).unwrap();
        assert_eq!(store.expire_due(10_000.0), 0, "unarmed points never expire");

        assert!(store.arm_expiry(&host, ticket, 100.0));
        assert!(!store.arm_expiry(&host, ticket, 100.0), "arming is once only");

        assert_eq!(store.expire_due(399.0), 0);
        assert_eq!(store.expire_due(400.0), 1);
        assert_eq!(store.try_undo(&mut host, ACTOR), None);
    }

    #[test]
    fn stale_expiry_does_not_remove_newer_point() {
        let mut host = FakeHost::new();
        let target = host.spawn_deployable(1);
        let mut store = RestoreStore::with_ttl(Duration::from_secs(10));

        let old = store.capture(&host, ACTOR, TargetPair::single(target)).unwrap();
        store.arm_expiry(&host, old, 0.0);
        store.capture(&host, ACTOR, TargetPair::single(target)).unwrap();

        assert_eq!(store.expire_due(20.0), 0);
        assert!(store.get(ACTOR).is_some());
    }

    #[test]
    fn undo_cancels_pending_expiry() {
        let mut host = FakeHost::new();
        let target = host.spawn_deployable(1);
        let mut store = RestoreStore::default();

        let ticket = store.capture(&host, ACTOR, TargetPair::single(target)).unwrap();
        store.arm_expiry(&host, ticket, 0.0);
        assert!(store.try_undo(&mut host, ACTOR).is_some());
        assert_eq!(store.expire_due(1_000.0), 0);
    }

    #[test]
    fn destroyed_target_invalidates_point() {
        let mut host = FakeHost::new();
        let target = host.spawn_deployable(1);
        let mut store = RestoreStore::default();

        let ticket = store.capture(&host, ACTOR, TargetPair::single(target)).unwrap();
        host.destroy(target);

        assert!(!store.arm_expiry(&host, ticket, 0.0));
        assert!(store.is_empty());
        assert_eq!(store.try_undo(&mut host, ACTOR), None);
    }
}
