use nalgebra as na;

use crate::constants::{POSITION_BLEND_RATE, SNAP_DISTANCE_SQ};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Local axis a rotate mode spins the target around.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn unit(self) -> na::Unit<Vec3> {
        match self {
            Axis::X => Vec3::x_axis(),
            Axis::Y => Vec3::y_axis(),
            Axis::Z => Vec3::z_axis(),
        }
    }
}

/// Maps a point expressed in the frame `(origin, rotation)` into world space.
#[inline]
pub fn transform_point(origin: Vec3, local: Vec3, rotation: Quat) -> Vec3 {
    origin + rotation * local
}

/// Maps a world-space point into the frame `(origin, rotation)`.
///
/// Inverse of [`transform_point`].
#[inline]
pub fn inverse_transform_point(origin: Vec3, world: Vec3, rotation: Quat) -> Vec3 {
    rotation.inverse() * (world - origin)
}

/// Applies a rotation of `degrees` around the object's own `axis`.
///
/// The delta is post-multiplied so the spin happens in the object's local frame.
#[inline]
pub fn rotate_local(rotation: Quat, axis: Axis, degrees: f32) -> Quat {
    rotation * Quat::from_axis_angle(&axis.unit(), degrees.to_radians())
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
#[inline]
pub fn lerp_clamped(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from.lerp(&to, t.clamp(0.0, 1.0))
}

/// One tick of easing from `current` toward `desired`.
///
/// Far targets blend by `dt * POSITION_BLEND_RATE`; once within 1cm the result snaps
/// exactly onto `desired` so the object converges instead of approaching forever.
#[inline]
pub fn approach(current: Vec3, desired: Vec3, dt: f32) -> Vec3 {
    if (desired - current).norm_squared() > SNAP_DISTANCE_SQ {
        lerp_clamped(current, desired, dt * POSITION_BLEND_RATE)
    } else {
        desired
    }
}

/// Returns true if `offset` is an allowed head offset under `max_distance` (0 = unlimited).
#[inline]
pub fn within_max_distance(offset: Vec3, max_distance: f32) -> bool {
    max_distance <= 0.0 || offset.norm_squared() <= max_distance * max_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-5;

    #[test]
    fn transform_point_inverts() {
        let origin = Vec3::new(3.0, 1.5, -2.0);
        let rotation = Quat::from_euler_angles(0.3, -1.1, 0.7);
        let world = Vec3::new(5.0, 2.0, 4.0);

        let local = inverse_transform_point(origin, world, rotation);
        let back = transform_point(origin, local, rotation);

        assert!((back - world).norm() < EPS);
    }

    #[test]
    fn looking_straight_ahead_keeps_forward_offset_on_z() {
        let origin = Vec3::new(0.0, 1.8, 0.0);
        let world = transform_point(origin, Vec3::new(0.0, 0.0, 2.0), Quat::identity());
        assert!((world - Vec3::new(0.0, 1.8, 2.0)).norm() < EPS);
    }

    #[test]
    fn rotate_local_spins_around_own_axis() {
        // Start yawed 90 degrees; a local X spin must not change the yaw axis.
        let start = Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        let spun = rotate_local(start, Axis::X, 30.0);

        let local_x = spun * Vec3::x();
        let expected_x = start * Vec3::x();
        assert!((local_x - expected_x).norm() < EPS);
        assert!((spun.angle_to(&start) - 30f32.to_radians()).abs() < EPS);
    }

    #[test]
    fn approach_blends_when_far_and_snaps_when_close() {
        let current = Vec3::zeros();
        let desired = Vec3::new(1.0, 0.0, 0.0);

        let step = approach(current, desired, 0.02);
        assert!((step.x - 0.3).abs() < EPS);

        let near = Vec3::new(0.995, 0.0, 0.0);
        assert_eq!(approach(near, desired, 0.02), desired);
    }

    #[test]
    fn approach_never_overshoots_on_long_frames() {
        let desired = Vec3::new(0.0, 4.0, 0.0);
        assert_eq!(approach(Vec3::zeros(), desired, 1.0), desired);
    }

    #[test]
    fn max_distance_zero_is_unlimited() {
        assert!(within_max_distance(Vec3::new(1.0e4, 0.0, 0.0), 0.0));
        assert!(within_max_distance(Vec3::new(0.0, 0.0, 3.0), 3.0));
        assert!(!within_max_distance(Vec3::new(0.0, 0.0, 3.01), 3.0));
    }
}
