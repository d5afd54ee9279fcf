//! Capabilities the engine needs from the game host.
//!
//! The engine never owns game objects. Everything it reads or writes about entities and players
//! goes through these traits, keyed by id. Getters return `None` for ids that are no longer
//! valid (destroyed entities, disconnected players); setters on invalid ids do nothing.

use grip_shared::{ActorId, BodyFlags, EntityId, InputState, OrientedBox, Quat, Vec3};

/// Transform, physics and replication access for world entities.
pub trait World {
    /// True if the entity exists and is not destroyed.
    fn is_valid(&self, entity: EntityId) -> bool;

    /// World-space position.
    fn position(&self, entity: EntityId) -> Option<Vec3>;
    fn set_position(&mut self, entity: EntityId, position: Vec3);

    /// World-space rotation.
    fn rotation(&self, entity: EntityId) -> Option<Quat>;

    /// Position relative to the parent (world space for unparented entities).
    fn local_position(&self, entity: EntityId) -> Option<Vec3>;
    fn set_local_position(&mut self, entity: EntityId, position: Vec3);

    fn local_rotation(&self, entity: EntityId) -> Option<Quat>;
    fn set_local_rotation(&mut self, entity: EntityId, rotation: Quat);

    /// Returns whether the entity's transform changed since the last call, and clears the flag.
    fn take_transform_changed(&mut self, entity: EntityId) -> bool;

    /// Half-extents of the entity's bounds in its local frame, already scaled (meters).
    fn half_extents(&self, entity: EntityId) -> Option<Vec3>;

    /// Simulation flags of the attached rigid body, or `None` if it has none.
    fn body_flags(&self, entity: EntityId) -> Option<BodyFlags>;
    fn set_body_flags(&mut self, entity: EntityId, flags: BodyFlags);

    /// Wakes floating/buoyancy behaviour so normal physics resumes after release.
    fn wake_buoyancy(&mut self, entity: EntityId);

    /// Pushes the entity's transform to observers immediately, including its children, and
    /// clears its changed flag.
    fn broadcast_transform(&mut self, entity: EntityId);

    /// The player who owns the entity, if any.
    fn owner(&self, entity: EntityId) -> Option<ActorId>;

    /// The vehicle a module entity is attached to, if any.
    fn parent_vehicle(&self, entity: EntityId) -> Option<EntityId>;
}

/// What the engine needs to know about a player this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorView {
    pub eye_position: Vec3,
    pub eye_rotation: Quat,
    /// Body position, used to drop items at the player's feet.
    pub position: Vec3,
    pub alive: bool,
    pub connected: bool,
}

impl ActorView {
    /// A player who can keep driving a session.
    #[inline]
    pub fn is_able(&self) -> bool {
        self.alive && self.connected
    }
}

/// An item taken out of a player's hands, and where it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeldItem {
    pub item_id: u64,
    pub slot: i32,
}

/// Player state, input, privilege, messaging and inventory access.
pub trait Players {
    /// `None` if the player is not present in the world.
    fn actor(&self, actor: ActorId) -> Option<ActorView>;

    /// Buttons held this frame.
    fn input(&self, actor: ActorId) -> InputState;

    /// True if the player lacks building privilege anywhere inside `volume`.
    fn is_building_blocked(&self, actor: ActorId, volume: &OrientedBox) -> bool;

    /// Entity under the player's crosshair within `max_distance`, if any.
    fn look_target(&self, actor: ActorId, max_distance: f32) -> Option<EntityId>;

    /// Delivers a chat line to the player. No-op for absent players.
    fn send_message(&mut self, actor: ActorId, text: &str);

    /// Takes the active item out of the player's hands.
    fn take_active_item(&mut self, actor: ActorId) -> Option<HeldItem>;

    /// Puts the item back into its slot or anywhere in the inventory.
    ///
    /// Returns the item if it could not be placed.
    fn return_item(&mut self, actor: ActorId, item: HeldItem) -> Result<(), HeldItem>;

    /// Drops the item into the world at `position`.
    fn drop_item(&mut self, item: HeldItem, position: Vec3);
}

/// The whole host surface. Implemented automatically for anything providing both halves.
pub trait Host: World + Players {}

impl<T: World + Players> Host for T {}
