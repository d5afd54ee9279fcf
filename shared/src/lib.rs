pub mod constants;
pub mod entity;
pub mod input;
pub mod physics;
pub mod privilege;
pub mod utils;

pub use entity::{
    ActorId, EntityId, EntityKind, NetId, is_player, pack_entity, player_entity,
    try_unpack_entity_kind, validate_entity_id,
};
pub use input::{Button, InputState, Sensitivity};
pub use physics::BodyFlags;
pub use privilege::{OrientedBox, PrivilegeZoneDef, PrivilegeZones, ZoneShapeDef};
pub use utils::{Axis, Quat, Vec3, approach, inverse_transform_point, transform_point};
