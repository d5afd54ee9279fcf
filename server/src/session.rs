//! The per-actor control session: turns held buttons into transform updates every host tick.

use std::sync::Arc;

use grip_shared::{
    ActorId, Axis, InputState, OrientedBox, Vec3, approach,
    constants::{MODE_CHANGE_DELAY, ROTATE_DEGREES_PER_SECOND},
    transform_point,
    utils::{rotate_local, within_max_distance},
};

use crate::{
    config::{Configuration, Ruleset},
    error::StopReason,
    hooks::TargetPair,
    host::{ActorView, Host},
    lang::{Message, format_message},
    time::FrameTime,
};

/// What directional input currently drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Toward or away from the eyes.
    #[default]
    MoveAxial,
    /// World up or down, wherever the actor looks.
    MoveVertical,
    RotateX,
    RotateY,
    RotateZ,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::MoveAxial,
        Mode::MoveVertical,
        Mode::RotateX,
        Mode::RotateY,
        Mode::RotateZ,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::MoveAxial => "Move away/toward",
            Mode::MoveVertical => "Move up/down",
            Mode::RotateX => "Rotate around X axis (pitch)",
            Mode::RotateY => "Rotate around Y axis (yaw)",
            Mode::RotateZ => "Rotate around Z axis (roll)",
        }
    }

    /// The local axis a rotate mode spins around.
    pub fn rotation_axis(self) -> Option<Axis> {
        match self {
            Mode::RotateX => Some(Axis::X),
            Mode::RotateY => Some(Axis::Y),
            Mode::RotateZ => Some(Axis::Z),
            Mode::MoveAxial | Mode::MoveVertical => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Terminate(StopReason),
}

/// Live control state of one actor over one target pair.
///
/// A session never tears itself down: [`ControlSession::tick`] reports a termination and the
/// owner runs teardown.
#[derive(Debug)]
pub struct ControlSession {
    actor: ActorId,
    targets: TargetPair,
    ruleset: Ruleset,
    config: Arc<Configuration>,
    mode: Mode,
    /// Move target position in the actor's eye frame.
    head_offset: Vec3,
    last_mode_change: f64,
    last_movement: f64,
    last_building_check: f64,
}

impl ControlSession {
    pub fn new(
        actor: ActorId,
        targets: TargetPair,
        ruleset: Ruleset,
        config: Arc<Configuration>,
        head_offset: Vec3,
        now: f64,
    ) -> Self {
        Self {
            actor,
            targets,
            ruleset,
            config,
            mode: Mode::default(),
            head_offset,
            last_mode_change: now,
            last_movement: now,
            last_building_check: now,
        }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn targets(&self) -> TargetPair {
        self.targets
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn head_offset(&self) -> Vec3 {
        self.head_offset
    }

    pub fn tick(&mut self, host: &mut impl Host, frame: FrameTime) -> TickOutcome {
        let view = match self.check_liveness(&*host) {
            Ok(view) => view,
            Err(reason) => return TickOutcome::Terminate(reason),
        };
        let input = host.input(self.actor);

        self.maybe_cycle_mode(host, &input, frame.now);
        self.apply_input(host, &input, &view, frame.dt);

        let desired = transform_point(view.eye_position, self.head_offset, view.eye_rotation);

        if self.building_blocked_at(&*host, desired, frame.now) {
            return TickOutcome::Terminate(StopReason::BuildingBlocked);
        }

        let move_target = self.targets.move_target;
        if let Some(current) = host.position(move_target) {
            if current != desired {
                host.set_position(move_target, approach(current, desired, frame.dt));
            }
        }

        let mut moved = false;
        for entity in self.targets.entities() {
            if host.take_transform_changed(entity) {
                host.broadcast_transform(entity);
                moved = true;
            }
        }

        if moved {
            self.last_movement = frame.now;
        } else if self.last_movement + f64::from(self.config.idle_timeout) < frame.now {
            return TickOutcome::Terminate(StopReason::Inactivity);
        }

        TickOutcome::Continue
    }

    fn check_liveness(&self, host: &impl Host) -> Result<ActorView, StopReason> {
        let view = host
            .actor(self.actor)
            .filter(ActorView::is_able)
            .ok_or(StopReason::ActorLost)?;

        if self.targets.entities().any(|e| !host.is_valid(e)) {
            return Err(StopReason::TargetLost);
        }
        Ok(view)
    }

    fn maybe_cycle_mode(&mut self, host: &mut impl Host, input: &InputState, now: f64) {
        if !input.wants_mode_cycle() || self.last_mode_change + MODE_CHANGE_DELAY > now {
            return;
        }

        self.last_mode_change = now;
        self.mode = if input.cycles_backward() {
            self.mode.previous()
        } else {
            self.mode.next()
        };

        log::debug!("{} switched to {:?}", self.actor, self.mode);
        let text = format_message(&self.config, Message::ModeChanged, Some(self.mode.label()));
        host.send_message(self.actor, &text);
    }

    fn apply_input(&mut self, host: &mut impl Host, input: &InputState, view: &ActorView, dt: f32) {
        let direction = input.direction();
        if direction == 0.0 {
            return;
        }
        let step = dt * direction;

        match self.mode {
            Mode::MoveAxial => {
                let delta = step * input.sensitivity(&self.config.move_sensitivity.into());
                self.set_head_offset(self.head_offset + Vec3::new(0.0, 0.0, delta));
            }
            Mode::MoveVertical => {
                let delta = step * input.sensitivity(&self.config.move_sensitivity.into());
                let up = view.eye_rotation.inverse() * Vec3::new(0.0, delta, 0.0);
                self.set_head_offset(self.head_offset + up);
            }
            Mode::RotateX | Mode::RotateY | Mode::RotateZ => {
                let Some(axis) = self.mode.rotation_axis() else {
                    return;
                };
                let mut degrees = ROTATE_DEGREES_PER_SECOND
                    * step
                    * input.sensitivity(&self.config.rotate_sensitivity.into());
                // Primary input yaws clockwise seen from above.
                if axis == Axis::Y {
                    degrees = -degrees;
                }

                let target = self.targets.rotate_target;
                if let Some(rotation) = host.local_rotation(target) {
                    host.set_local_rotation(target, rotate_local(rotation, axis, degrees));
                }
            }
        }
    }

    /// Rejects offsets beyond the ruleset's max distance; the old offset is kept.
    fn set_head_offset(&mut self, offset: Vec3) {
        if within_max_distance(offset, self.ruleset.max_distance) {
            self.head_offset = offset;
        }
    }

    fn building_blocked_at(&mut self, host: &impl Host, desired: Vec3, now: f64) -> bool {
        if self.ruleset.can_use_while_building_blocked
            || self.last_building_check + f64::from(self.config.building_check_interval) >= now
        {
            return false;
        }
        self.last_building_check = now;

        let move_target = self.targets.move_target;
        let (Some(rotation), Some(half_extents)) =
            (host.rotation(move_target), host.half_extents(move_target))
        else {
            return false;
        };
        host.is_building_blocked(self.actor, &OrientedBox::new(desired, rotation, half_extents))
    }
}
