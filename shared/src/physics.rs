//! Physics suspension flags for a controlled object's rigid body.
//!
//! A controlled object must not be simulated while a player holds it: gravity is turned off
//! and the body is made kinematic. Hosts report and accept these two flags.

/// The two simulation switches a session suspends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyFlags {
    pub gravity_enabled: bool,
    pub kinematic: bool,
}

impl BodyFlags {
    /// Gravity off, driven by position only.
    pub const SUSPENDED: Self = Self {
        gravity_enabled: false,
        kinematic: true,
    };

    /// Default dynamic body: falls and reacts to contacts.
    pub const SIMULATED: Self = Self {
        gravity_enabled: true,
        kinematic: false,
    };

    /// True if the body is already both gravity-free and kinematic.
    #[inline]
    pub fn is_suspended(&self) -> bool {
        !self.gravity_enabled && self.kinematic
    }
}
