//! In-memory host used by unit tests.
//!
//! Entities are unparented, so local and world transforms are the same values.

use std::collections::HashMap;

use grip_shared::{
    ActorId, BodyFlags, EntityId, EntityKind, InputState, OrientedBox, PrivilegeZoneDef,
    PrivilegeZones, Quat, Vec3, pack_entity, player_entity,
};

use crate::host::{ActorView, HeldItem, Players, World};

/// Eye height of fake players standing at the origin.
pub const EYE_HEIGHT: f32 = 1.5;

#[derive(Clone, Debug)]
pub struct FakeEntity {
    pub position: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
    pub body: Option<BodyFlags>,
    pub owner: Option<ActorId>,
    pub parent_vehicle: Option<EntityId>,
    pub changed: bool,
    pub buoyancy_wakes: u32,
}

impl FakeEntity {
    fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::identity(),
            half_extents: Vec3::new(0.5, 0.5, 0.5),
            body: Some(BodyFlags::SIMULATED),
            owner: None,
            parent_vehicle: None,
            changed: false,
            buoyancy_wakes: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FakePlayer {
    pub view: ActorView,
    pub input: InputState,
    pub look_target: Option<EntityId>,
    pub held: Option<HeldItem>,
    pub inventory: Vec<HeldItem>,
    pub inventory_full: bool,
    pub messages: Vec<String>,
}

pub struct FakeHost {
    entities: HashMap<EntityId, FakeEntity>,
    players: HashMap<ActorId, FakePlayer>,
    zones: PrivilegeZones,
    pub broadcasts: Vec<EntityId>,
    pub dropped: Vec<(HeldItem, Vec3)>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            players: HashMap::new(),
            zones: PrivilegeZones::build(Vec::new()),
            broadcasts: Vec::new(),
            dropped: Vec::new(),
        }
    }

    /// A deployable two meters in front of a player standing at the origin.
    pub fn spawn_deployable(&mut self, net_id: u64) -> EntityId {
        self.spawn(
            pack_entity(net_id, EntityKind::Deployable),
            Vec3::new(0.0, EYE_HEIGHT, 2.0),
        )
    }

    pub fn spawn(&mut self, id: EntityId, position: Vec3) -> EntityId {
        self.entities.insert(id, FakeEntity::at(position));
        id
    }

    /// Adds a connected, living player at the origin looking down +Z, and their body entity.
    pub fn add_player(&mut self, actor: ActorId) -> EntityId {
        self.players.insert(
            actor,
            FakePlayer {
                view: ActorView {
                    eye_position: Vec3::new(0.0, EYE_HEIGHT, 0.0),
                    eye_rotation: Quat::identity(),
                    position: Vec3::zeros(),
                    alive: true,
                    connected: true,
                },
                input: InputState::default(),
                look_target: None,
                held: None,
                inventory: Vec::new(),
                inventory_full: false,
                messages: Vec::new(),
            },
        );
        self.spawn(player_entity(actor), Vec3::zeros())
    }

    pub fn entity(&self, id: EntityId) -> &FakeEntity {
        &self.entities[&id]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut FakeEntity {
        self.entities.get_mut(&id).unwrap()
    }

    pub fn destroy(&mut self, id: EntityId) {
        self.entities.remove(&id);
    }

    pub fn player_mut(&mut self, actor: ActorId) -> &mut FakePlayer {
        self.players.get_mut(&actor).unwrap()
    }

    pub fn remove_player(&mut self, actor: ActorId) {
        self.players.remove(&actor);
    }

    pub fn set_zones(&mut self, defs: Vec<PrivilegeZoneDef>) {
        self.zones = PrivilegeZones::build(defs);
    }

    pub fn messages(&self, actor: ActorId) -> &[String] {
        self.players
            .get(&actor)
            .map(|p| p.messages.as_slice())
            .unwrap_or_default()
    }

    pub fn last_message(&self, actor: ActorId) -> Option<&str> {
        self.messages(actor).last().map(String::as_str)
    }
}

impl World for FakeHost {
    fn is_valid(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.entities.get(&entity).map(|e| e.position)
    }

    fn set_position(&mut self, entity: EntityId, position: Vec3) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.changed |= e.position != position;
            e.position = position;
        }
    }

    fn rotation(&self, entity: EntityId) -> Option<Quat> {
        self.entities.get(&entity).map(|e| e.rotation)
    }

    fn local_position(&self, entity: EntityId) -> Option<Vec3> {
        self.position(entity)
    }

    fn set_local_position(&mut self, entity: EntityId, position: Vec3) {
        self.set_position(entity, position);
    }

    fn local_rotation(&self, entity: EntityId) -> Option<Quat> {
        self.rotation(entity)
    }

    fn set_local_rotation(&mut self, entity: EntityId, rotation: Quat) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.changed |= e.rotation != rotation;
            e.rotation = rotation;
        }
    }

    fn take_transform_changed(&mut self, entity: EntityId) -> bool {
        self.entities
            .get_mut(&entity)
            .is_some_and(|e| std::mem::take(&mut e.changed))
    }

    fn half_extents(&self, entity: EntityId) -> Option<Vec3> {
        self.entities.get(&entity).map(|e| e.half_extents)
    }

    fn body_flags(&self, entity: EntityId) -> Option<BodyFlags> {
        self.entities.get(&entity).and_then(|e| e.body)
    }

    fn set_body_flags(&mut self, entity: EntityId, flags: BodyFlags) {
        if let Some(body) = self.entities.get_mut(&entity).and_then(|e| e.body.as_mut()) {
            *body = flags;
        }
    }

    fn wake_buoyancy(&mut self, entity: EntityId) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.buoyancy_wakes += 1;
        }
    }

    fn broadcast_transform(&mut self, entity: EntityId) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.changed = false;
        }
        self.broadcasts.push(entity);
    }

    fn owner(&self, entity: EntityId) -> Option<ActorId> {
        self.entities.get(&entity).and_then(|e| e.owner)
    }

    fn parent_vehicle(&self, entity: EntityId) -> Option<EntityId> {
        self.entities.get(&entity).and_then(|e| e.parent_vehicle)
    }
}

impl Players for FakeHost {
    fn actor(&self, actor: ActorId) -> Option<ActorView> {
        self.players.get(&actor).map(|p| p.view)
    }

    fn input(&self, actor: ActorId) -> InputState {
        self.players
            .get(&actor)
            .map(|p| p.input)
            .unwrap_or_default()
    }

    fn is_building_blocked(&self, actor: ActorId, volume: &OrientedBox) -> bool {
        self.zones.is_blocked(actor, volume)
    }

    fn look_target(&self, actor: ActorId, max_distance: f32) -> Option<EntityId> {
        let player = self.players.get(&actor)?;
        let target = player.look_target?;
        let position = self.position(target)?;
        ((position - player.view.eye_position).norm() <= max_distance).then_some(target)
    }

    fn send_message(&mut self, actor: ActorId, text: &str) {
        if let Some(p) = self.players.get_mut(&actor) {
            p.messages.push(text.to_string());
        }
    }

    fn take_active_item(&mut self, actor: ActorId) -> Option<HeldItem> {
        self.players.get_mut(&actor)?.held.take()
    }

    fn return_item(&mut self, actor: ActorId, item: HeldItem) -> Result<(), HeldItem> {
        match self.players.get_mut(&actor) {
            Some(p) if !p.inventory_full => {
                p.inventory.push(item);
                Ok(())
            }
            _ => Err(item),
        }
    }

    fn drop_item(&mut self, item: HeldItem, position: Vec3) {
        self.dropped.push((item, position));
    }
}
