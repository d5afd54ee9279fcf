//! The `grip` chat command: resolves what the actor looks at, runs the start checks that need
//! the actor's ruleset, and reports every outcome back to them.
//!
//! - `grip` starts a session on the looked-at entity, or stops the running one.
//! - `grip undo` stops any running session and undoes the last one.

use grip_shared::{
    ActorId, EntityId, EntityKind, OrientedBox, constants::LOOK_DISTANCE, is_player,
    try_unpack_entity_kind, validate_entity_id,
};

use crate::{
    config::{Permissions, Ruleset},
    error::StartError,
    hooks::TargetPair,
    host::Host,
    lang::{Message, format_message, mode_line},
    manager::SessionManager,
    session::Mode,
};

pub const COMMAND: &str = "grip";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    NoPermission,
    Started(TargetPair),
    Stopped,
    Undone(TargetPair),
    NothingToUndo,
    Rejected(StartError),
}

pub fn handle_command(
    manager: &mut SessionManager,
    host: &mut impl Host,
    permissions: &impl Permissions,
    actor: ActorId,
    args: &[&str],
    now: f64,
) -> CommandOutcome {
    let config = manager.config().clone();
    let Some(ruleset) = config.ruleset_for(permissions, actor) else {
        reply(manager, host, actor, Message::ErrorNoPermission);
        return CommandOutcome::NoPermission;
    };

    if args.first().is_some_and(|arg| arg.eq_ignore_ascii_case("undo")) {
        return match manager.undo(host, actor, now) {
            Ok(targets) => {
                reply(manager, host, actor, Message::UndoSuccess);
                CommandOutcome::Undone(targets)
            }
            Err(_) => {
                reply(manager, host, actor, Message::UndoErrorNotFound);
                CommandOutcome::NothingToUndo
            }
        };
    }

    if manager.is_active(actor) {
        manager.stop(host, actor, now);
        reply(manager, host, actor, Message::InfoDisabled);
        return CommandOutcome::Stopped;
    }

    let started = find_target(manager, &*host, actor)
        .and_then(|target| preflight(&*host, actor, target, &ruleset))
        .and_then(|target| manager.start(host, actor, target, ruleset, now));

    match started {
        Ok(targets) => {
            let text = format_message(
                &config,
                Message::InfoEnabled,
                Some(&mode_line(Mode::default())),
            );
            host.send_message(actor, &text);
            CommandOutcome::Started(targets)
        }
        Err(err) => {
            log::debug!("{actor} could not start: {err}");
            match &err {
                // Observer messages are sent as written.
                StartError::PolicyDenied(Some(text)) => host.send_message(actor, text),
                other => reply(manager, host, actor, rejection_message(other)),
            }
            CommandOutcome::Rejected(err)
        }
    }
}

fn find_target(
    manager: &mut SessionManager,
    host: &impl Host,
    actor: ActorId,
) -> Result<EntityId, StartError> {
    let target = host
        .look_target(actor, LOOK_DISTANCE)
        .or_else(|| manager.observers_mut().find_fallback_target(actor))
        .ok_or(StartError::NoTargetFound)?;
    if let Err(err) = validate_entity_id(target) {
        log::warn!("{actor} looked at malformed entity id {target:#x}: {err}");
        return Err(StartError::NoTargetFound);
    }
    Ok(target)
}

/// Ruleset checks on the proposed target. Returns the entity to start on, which is the owning
/// vehicle when the target is a vehicle module.
fn preflight(
    host: &impl Host,
    actor: ActorId,
    target: EntityId,
    ruleset: &Ruleset,
) -> Result<EntityId, StartError> {
    if !ruleset.can_move_players && is_player(target) {
        return Err(StartError::CannotMovePlayers);
    }

    let view = host.actor(actor).ok_or(StartError::ActorUnavailable)?;
    let position = host.position(target).ok_or(StartError::NoTargetFound)?;

    if ruleset.max_distance > 0.0 && (position - view.eye_position).norm() > ruleset.max_distance {
        return Err(StartError::TooFar);
    }
    if ruleset.requires_ownership && host.owner(target) != Some(actor) {
        return Err(StartError::NotOwned);
    }
    if !ruleset.can_use_while_building_blocked {
        let (Some(rotation), Some(half_extents)) = (host.rotation(target), host.half_extents(target))
        else {
            return Err(StartError::NoTargetFound);
        };
        if host.is_building_blocked(actor, &OrientedBox::new(position, rotation, half_extents)) {
            return Err(StartError::BuildingBlocked);
        }
    }

    if try_unpack_entity_kind(target) == Some(EntityKind::VehicleModule) {
        if let Some(vehicle) = host.parent_vehicle(target) {
            return Ok(vehicle);
        }
    }
    Ok(target)
}

fn rejection_message(err: &StartError) -> Message {
    match err {
        StartError::AlreadyControlled => Message::ErrorAlreadyBeingControlled,
        StartError::AlreadyActive => Message::ErrorAlreadyActive,
        StartError::PolicyDenied(_) => Message::ErrorBlockedByPlugin,
        StartError::NotOwned => Message::ErrorNotOwned,
        StartError::BuildingBlocked => Message::ErrorBuildingBlocked,
        StartError::CannotMovePlayers => Message::ErrorCannotMovePlayers,
        StartError::TooFar => Message::ErrorMaxDistance,
        StartError::NoTargetFound => Message::ErrorNoEntityFound,
        StartError::ActorUnavailable => Message::ErrorActorUnavailable,
    }
}

fn reply(manager: &SessionManager, host: &mut impl Host, actor: ActorId, message: Message) {
    let text = format_message(manager.config(), message, None);
    host.send_message(actor, &text);
}
