/// Identifier of a connected player acting as a session driver (their user id).
pub type ActorId = u64;

/// Per-kind network id of a world entity.
pub type NetId = u64;

/// Globally-unique identifier for any entity that can be moved or rotated.
///
/// # Why this exists
/// Sessions register targets by id, and a few checks (e.g. "can this ruleset move players?")
/// need to know what kind of thing an id refers to without asking the host. The kind is
/// therefore packed next to the network id in a single `u128`.
///
/// # Bit layout
/// Least-significant bit = bit 0:
///
/// - bits 0..=63   : `net_id` (u64)
/// - bits 64..=71  : `EntityKind` tag (u8)
/// - bits 72..=127 : reserved (must be zero)
///
/// # Invariants
/// - Two different `(net_id, kind)` pairs never produce the same `EntityId`.
/// - Reserved bits stay zero.
pub type EntityId = u128;

/// Discriminator for the kind of entity referenced by an [`EntityId`].
///
/// The numeric values are part of the packed-id format. Do not reorder or reuse values.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player = 1,
    Deployable = 2,
    Vehicle = 3,
    /// A module attached to a modular vehicle; sessions move the whole vehicle instead.
    VehicleModule = 4,
}

/// Packs an [`EntityKind`] and a per-kind `net_id` into a globally-unique [`EntityId`].
pub fn pack_entity(net_id: NetId, kind: EntityKind) -> EntityId {
    (net_id as u128) | ((kind as u128) << NetId::BITS)
}

/// Extracts the [`EntityKind`] from an [`EntityId`].
///
/// Returns `None` if the tag is unknown (corrupted input, or an id minted by a newer build).
pub fn try_unpack_entity_kind(id: EntityId) -> Option<EntityKind> {
    const KIND_MASK: u128 = u8::MAX as u128;
    let tag = ((id >> NetId::BITS) & KIND_MASK) as u8;

    match tag {
        1u8 => Some(EntityKind::Player),
        2u8 => Some(EntityKind::Deployable),
        3u8 => Some(EntityKind::Vehicle),
        4u8 => Some(EntityKind::VehicleModule),
        _ => None,
    }
}

/// True if `id` refers to a player.
#[inline]
pub fn is_player(id: EntityId) -> bool {
    try_unpack_entity_kind(id) == Some(EntityKind::Player)
}

/// The entity id of a player's own body, for checks like "is the target a player".
#[inline]
pub fn player_entity(actor: ActorId) -> EntityId {
    pack_entity(actor, EntityKind::Player)
}

/// Validates that an [`EntityId`] conforms to the packing contract.
///
/// Use at boundaries (ids coming from the host or from plugins) to fail fast.
pub fn validate_entity_id(id: EntityId) -> Result<(), &'static str> {
    const RESERVED_MASK: u128 = !0u128 << 72;
    if (id & RESERVED_MASK) != 0 {
        return Err("EntityId reserved bits are non-zero");
    }
    if try_unpack_entity_kind(id).is_none() {
        return Err("EntityId has unknown kind tag");
    }
    Ok(())
}
