//! Per-frame button state of a player, as reported by the host.
//!
//! Buttons are stored as bits in a small integer. The container is generic over the
//! backing integer so hosts with wider button sets can reuse it.

use num_traits::{One, PrimInt};

/// Trait implemented by flag enums whose discriminant is a bit index.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask of flags.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits | flag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits & !flag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, flag: U) -> bool {
        (self.bits & flag.mask()) != T::zero()
    }

    pub fn clear(&mut self) {
        self.bits = T::zero();
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($(#[$meta:meta])* $variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$meta])* $variant),*
        }

        impl $crate::input::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

define_bitmask_flags!(Button, u16, {
    /// Pushes away / rotates forward.
    FirePrimary,
    /// Pulls closer / rotates backward.
    FireSecondary,
    /// Cycles the control mode.
    Reload,
    /// Fast sensitivity; reverses mode cycling.
    Sprint,
    /// Slow sensitivity.
    Duck,
});

/// Sensitivity multipliers for one kind of motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sensitivity {
    pub slow: f32,
    pub normal: f32,
    pub fast: f32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            slow: 0.2,
            normal: 1.0,
            fast: 5.0,
        }
    }
}

/// Buttons held by a player during the current frame.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct InputState {
    pub buttons: BitmaskFlags<u16>,
}

impl InputState {
    pub fn with(buttons: &[Button]) -> Self {
        let mut state = Self::default();
        for &button in buttons {
            state.press(button);
        }
        state
    }

    pub fn press(&mut self, button: Button) {
        self.buttons.add(button);
    }

    pub fn release(&mut self, button: Button) {
        self.buttons.remove(button);
    }

    #[inline]
    pub fn is_down(&self, button: Button) -> bool {
        self.buttons.has(button)
    }

    /// +1 while primary is held, -1 while secondary is held, 0 for neither or both.
    pub fn direction(&self) -> f32 {
        match (
            self.is_down(Button::FirePrimary),
            self.is_down(Button::FireSecondary),
        ) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn wants_mode_cycle(&self) -> bool {
        self.is_down(Button::Reload)
    }

    /// Holding sprint while cycling walks the mode list backward.
    #[inline]
    pub fn cycles_backward(&self) -> bool {
        self.is_down(Button::Sprint)
    }

    /// Picks the multiplier for the held modifier. Sprint wins over duck.
    pub fn sensitivity(&self, settings: &Sensitivity) -> f32 {
        if self.is_down(Button::Sprint) {
            settings.fast
        } else if self.is_down(Button::Duck) {
            settings.slow
        } else {
            settings.normal
        }
    }
}
