//! Player-facing message catalog.
//!
//! Each message has a stable key (for hosts that localize) and an English default.

use crate::{config::Configuration, session::Mode};

pub const MESSAGE_PREFIX: &str = "<color=#0ff>[Grip]</color>: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    ErrorNoPermission,
    ErrorNoEntityFound,
    ErrorAlreadyBeingControlled,
    ErrorAlreadyActive,
    ErrorBlockedByPlugin,
    ErrorCannotMovePlayers,
    ErrorNotOwned,
    ErrorBuildingBlocked,
    ErrorMaxDistance,
    ErrorActorUnavailable,

    InfoEnabled,
    InfoDisabled,
    InfoDisabledInactivity,
    InfoDisabledBuildingBlocked,

    UndoErrorNotFound,
    UndoSuccess,

    ModeChanged,
}

impl Message {
    pub fn key(self) -> &'static str {
        match self {
            Message::ErrorNoPermission => "Error.NoPermission",
            Message::ErrorNoEntityFound => "Error.NoEntityFound",
            Message::ErrorAlreadyBeingControlled => "Error.AlreadyBeingControlled",
            Message::ErrorAlreadyActive => "Error.AlreadyActive",
            Message::ErrorBlockedByPlugin => "Error.BlockedByPlugin",
            Message::ErrorCannotMovePlayers => "Error.CannotMovePlayers",
            Message::ErrorNotOwned => "Error.NotOwned",
            Message::ErrorBuildingBlocked => "Error.BuildingBlocked",
            Message::ErrorMaxDistance => "Error.MaxDistance",
            Message::ErrorActorUnavailable => "Error.ActorUnavailable",
            Message::InfoEnabled => "Info.Enabled",
            Message::InfoDisabled => "Info.Disabled",
            Message::InfoDisabledInactivity => "Info.Disabled.Inactivity",
            Message::InfoDisabledBuildingBlocked => "Info.Disabled.BuildingBlocked",
            Message::UndoErrorNotFound => "Undo.Error.NotFound",
            Message::UndoSuccess => "Undo.Success",
            Message::ModeChanged => "Mode.Changed",
        }
    }

    /// English text. `{0}` is substituted by [`format_message`].
    pub fn text(self) -> &'static str {
        match self {
            Message::ErrorNoPermission => "You don't have permission to do that.",
            Message::ErrorNoEntityFound => "No entity found.",
            Message::ErrorAlreadyBeingControlled => "That entity is already being controlled.",
            Message::ErrorAlreadyActive => "You are already controlling something.",
            Message::ErrorBlockedByPlugin => "Another plugin blocked this.",
            Message::ErrorCannotMovePlayers => "You are not allowed to move players.",
            Message::ErrorNotOwned => "You do not own that entity.",
            Message::ErrorBuildingBlocked => {
                "You are not allowed to move objects while building blocked."
            }
            Message::ErrorMaxDistance => "You are not allowed to move objects that far away.",
            Message::ErrorActorUnavailable => "You cannot do that right now.",
            Message::InfoEnabled => "Remote control has been enabled.\n{0}",
            Message::InfoDisabled => "Remote control has been disabled.",
            Message::InfoDisabledInactivity => "Remote control has been disabled due to inactivity.",
            Message::InfoDisabledBuildingBlocked => {
                "Remote control has been disabled because you are building blocked."
            }
            Message::UndoErrorNotFound => "No undo data found.",
            Message::UndoSuccess => "Your last movement was undone.",
            Message::ModeChanged => "Current mode: {0}",
        }
    }
}

/// Renders `message` with an optional `{0}` argument and the configured prefix.
pub fn format_message(config: &Configuration, message: Message, arg: Option<&str>) -> String {
    let body = match arg {
        Some(arg) => message.text().replace("{0}", arg),
        None => message.text().to_string(),
    };
    with_prefix(config, body)
}

pub fn with_prefix(config: &Configuration, body: String) -> String {
    if config.enable_message_prefix {
        format!("{MESSAGE_PREFIX}{body}")
    } else {
        body
    }
}

/// "Current mode: <name>" without the prefix, for embedding in other messages.
pub fn mode_line(mode: Mode) -> String {
    Message::ModeChanged.text().replace("{0}", mode.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_follows_configuration() {
        let mut config = Configuration::default();
        assert_eq!(
            format_message(&config, Message::UndoSuccess, None),
            format!("{MESSAGE_PREFIX}Your last movement was undone.")
        );

        config.enable_message_prefix = false;
        assert_eq!(
            format_message(&config, Message::ModeChanged, Some("Move up/down")),
            "Current mode: Move up/down"
        );
    }

    #[test]
    fn enabled_message_embeds_mode() {
        let config = Configuration {
            enable_message_prefix: false,
            ..Configuration::default()
        };
        let text = format_message(
            &config,
            Message::InfoEnabled,
            Some(&mode_line(Mode::MoveAxial)),
        );
        assert_eq!(
            text,
            "Remote control has been enabled.\nCurrent mode: Move away/toward"
        );
    }
}
