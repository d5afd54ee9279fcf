use thiserror::Error;

/// Why a session could not be started. Nothing is created when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("target is already being controlled")]
    AlreadyControlled,

    #[error("actor already has an active session")]
    AlreadyActive,

    /// An observer vetoed the start, optionally with a message for the actor.
    #[error("start denied by policy{}", .0.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    PolicyDenied(Option<String>),

    #[error("actor does not own the target")]
    NotOwned,

    #[error("actor is building blocked at the target")]
    BuildingBlocked,

    #[error("ruleset does not allow moving players")]
    CannotMovePlayers,

    #[error("target is beyond the ruleset's max distance")]
    TooFar,

    #[error("no target found")]
    NoTargetFound,

    /// The actor is not present in the host world (disconnected or despawned).
    #[error("actor is not available")]
    ActorUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UndoError {
    #[error("no restore point found")]
    NotFound,
}

/// Why a live session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// `stop`, `stop_target` or `stop_all`.
    Explicit,
    /// Stopped as the first step of an undo.
    Undo,
    /// The actor disconnected, died or despawned.
    ActorLost,
    /// The move or rotate target was destroyed.
    TargetLost,
    /// The periodic privilege re-check failed at the desired position.
    BuildingBlocked,
    /// No movement was observed for the idle timeout.
    Inactivity,
}

impl StopReason {
    /// True for causes detected by the tick rather than requested by someone.
    pub fn is_automatic(self) -> bool {
        !matches!(self, StopReason::Explicit | StopReason::Undo)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StopReason::Explicit => "explicit",
            StopReason::Undo => "undo",
            StopReason::ActorLost => "actor lost",
            StopReason::TargetLost => "target lost",
            StopReason::BuildingBlocked => "building blocked",
            StopReason::Inactivity => "inactivity",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
