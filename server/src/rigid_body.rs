//! Suspends the physics of a controlled entity for the length of a session.

use grip_shared::{BodyFlags, EntityId};

use crate::host::World;

/// The original flags of a suspended body. Consumed exactly once by [`RigidBodyGuard::restore`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a suspended body stays suspended until the guard is restored"]
pub struct RigidBodyGuard {
    entity: EntityId,
    original: BodyFlags,
}

impl RigidBodyGuard {
    /// Turns gravity off and makes the body kinematic.
    ///
    /// Returns `None` when there is nothing to restore later: the entity has no rigid body, or
    /// its body is already gravity-free and kinematic.
    pub fn suspend(world: &mut impl World, entity: EntityId) -> Option<Self> {
        let original = world.body_flags(entity)?;
        if original.is_suspended() {
            return None;
        }

        world.set_body_flags(entity, BodyFlags::SUSPENDED);
        log::trace!("suspended rigid body of {entity} (was {original:?})");
        Some(Self { entity, original })
    }

    /// Writes the captured flags back. Does nothing if the entity was destroyed meanwhile.
    pub fn restore(self, world: &mut impl World) {
        if !world.is_valid(self.entity) {
            return;
        }
        world.set_body_flags(self.entity, self.original);
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn original(&self) -> BodyFlags {
        self.original
    }
}
