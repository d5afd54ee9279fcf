//! Building privilege zones.
//!
//! A zone is an immutable volume (typically the coverage of a tool cupboard) that authorizes a
//! list of players. A player is "building blocked" at a volume when that volume overlaps any
//! zone that does not list them.
//!
//! Design
//! - Deterministic: zones are sorted by `id` at build time, so queries visit them in a stable order.
//! - Query-only: zones never move after construction. Rebuild the set when they change.
//! - Narrow phase only: the exact overlap test uses parry's `intersection_test` through Rapier.
//!   The zone count per server is small, so a bounding-sphere reject is the only pruning.

use rapier3d::parry::{
    query::intersection_test,
    shape::{Ball, Cuboid, Shape},
};

use crate::{
    entity::ActorId,
    utils::{Iso, Quat, Vec3},
};

/// An oriented box in world space: the query volume for privilege checks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub rotation: Quat,
    /// Half-extents along the box's local axes (meters).
    pub half_extents: Vec3,
}

impl OrientedBox {
    pub fn new(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            center,
            rotation,
            half_extents: half_extents.abs(),
        }
    }

    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(self.center.into(), self.rotation)
    }

    /// Radius of the sphere enclosing the box.
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.half_extents.norm()
    }
}

/// Supported zone shapes.
#[derive(Clone, Debug)]
pub enum ZoneShapeDef {
    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },
    /// Sphere (meters).
    Sphere { radius: f32 },
}

/// Definition of one privilege zone, as loaded by the host.
#[derive(Clone, Debug)]
pub struct PrivilegeZoneDef {
    /// Stable unique identifier used for deterministic ordering.
    pub id: u32,
    /// World-space translation.
    pub translation: Vec3,
    /// World-space rotation.
    pub rotation: Quat,
    pub shape: ZoneShapeDef,
    /// Players allowed to build inside this zone.
    pub authorized: Vec<ActorId>,
}

struct Zone {
    id: u32,
    pose: Iso,
    shape: Box<dyn Shape>,
    bounding_radius: f32,
    authorized: Vec<ActorId>,
}

/// Immutable set of privilege zones answering "is this player blocked here".
pub struct PrivilegeZones {
    zones: Vec<Zone>,
}

impl PrivilegeZones {
    pub fn build(mut defs: Vec<PrivilegeZoneDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let zones = defs
            .into_iter()
            .map(|def| {
                let (shape, bounding_radius): (Box<dyn Shape>, f32) = match def.shape {
                    ZoneShapeDef::Cuboid { half_extents } => {
                        let half_extents = half_extents.abs();
                        (Box::new(Cuboid::new(half_extents)), half_extents.norm())
                    }
                    ZoneShapeDef::Sphere { radius } => {
                        let radius = radius.abs();
                        (Box::new(Ball::new(radius)), radius)
                    }
                };
                Zone {
                    id: def.id,
                    pose: Iso::from_parts(def.translation.into(), def.rotation),
                    shape,
                    bounding_radius,
                    authorized: def.authorized,
                }
            })
            .collect();

        Self { zones }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Returns the id of the first zone (by id) that overlaps `volume` and does not authorize
    /// `actor`.
    pub fn blocking_zone(&self, actor: ActorId, volume: &OrientedBox) -> Option<u32> {
        let volume_iso = volume.iso();
        let volume_shape = Cuboid::new(volume.half_extents);
        let volume_radius = volume.bounding_radius();

        self.zones
            .iter()
            .filter(|zone| !zone.authorized.contains(&actor))
            .filter(|zone| {
                let reach = zone.bounding_radius + volume_radius;
                (zone.pose.translation.vector - volume.center).norm_squared() <= reach * reach
            })
            .find(|zone| {
                // Unsupported shape pairs cannot occur for cuboid/ball; treat them as no overlap.
                intersection_test(&zone.pose, zone.shape.as_ref(), &volume_iso, &volume_shape)
                    .unwrap_or(false)
            })
            .map(|zone| zone.id)
    }

    /// True if `actor` may not build at `volume`.
    pub fn is_blocked(&self, actor: ActorId, volume: &OrientedBox) -> bool {
        self.blocking_zone(actor, volume).is_some()
    }
}
