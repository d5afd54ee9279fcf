//! Remote control of world entities by players: move and rotate what you look at, then undo it.
//!
//! The host game drives everything through [`SessionManager`]:
//! - [`command::handle_command`] for the player chat command,
//! - [`SessionManager::update`] once per host loop iteration,
//! - [`SessionManager::shutdown`] when the plugin unloads.

pub mod command;
pub mod config;
pub mod error;
pub mod hooks;
pub mod host;
pub mod lang;
pub mod manager;
pub mod restore;
pub mod rigid_body;
pub mod session;
pub mod stopwatch;
pub mod time;
pub mod timer;

#[cfg(test)]
mod testing;

pub use command::{CommandOutcome, handle_command};
pub use config::{Configuration, Permissions, Ruleset};
pub use error::{ConfigError, StartError, StopReason, UndoError};
pub use hooks::{SessionObserver, TargetPair, Verdict};
pub use host::{ActorView, HeldItem, Host, Players, World};
pub use manager::SessionManager;
pub use session::{ControlSession, Mode};
pub use time::FrameTime;
