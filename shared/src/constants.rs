use std::time::Duration;

/// Minimum time between two mode changes (seconds).
///
/// Holding the cycle button advances the mode once per this interval.
pub const MODE_CHANGE_DELAY: f64 = 0.25;

/// Base angular speed for the rotate modes, in degrees per second at sensitivity 1.0.
pub const ROTATE_DEGREES_PER_SECOND: f32 = 50.0;

/// Blend rate used when easing the target toward its desired position.
///
/// The per-tick blend factor is `dt * POSITION_BLEND_RATE`, clamped to 1.
pub const POSITION_BLEND_RATE: f32 = 15.0;

/// Squared distance (m^2) under which the target snaps to its desired position
/// instead of easing toward it. 1cm.
pub const SNAP_DISTANCE_SQ: f32 = 1.0e-4;

/// How long a restore point stays available after its session ends.
pub const RESTORE_POINT_TTL: Duration = Duration::from_secs(300);

/// Delay before a held item taken away at session start is handed back.
pub const ITEM_RETURN_DELAY: Duration = Duration::from_millis(200);

/// Maximum range of the look ray used to pick a target (meters).
pub const LOOK_DISTANCE: f32 = 15.0;

/// Default idle timeout (seconds) before an unmoving session is closed.
pub const DEFAULT_IDLE_TIMEOUT: f32 = 60.0;

/// Default interval (seconds) between building privilege re-checks.
pub const DEFAULT_BUILDING_CHECK_INTERVAL: f32 = 0.25;
