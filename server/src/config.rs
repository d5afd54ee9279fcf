//! Server configuration.
//!
//! Stored as JSON with human-readable keys so server owners can edit it by hand. Missing keys
//! are filled from defaults on load and written back, so upgrading never loses edits.

use std::{fs, path::Path};

use grip_shared::{
    ActorId, Sensitivity,
    constants::{DEFAULT_BUILDING_CHECK_INTERVAL, DEFAULT_IDLE_TIMEOUT},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

pub const PERMISSION_ADMIN: &str = "grip.admin";
const PERMISSION_RULESET_PREFIX: &str = "grip.ruleset.";

/// Answers permission lookups for a user. Implemented by the host's permission system.
pub trait Permissions {
    fn has_permission(&self, actor: ActorId, permission: &str) -> bool;
}

/// Slow/normal/fast multipliers as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSettings {
    #[serde(rename = "Slow")]
    pub slow: f32,
    #[serde(rename = "Normal")]
    pub normal: f32,
    #[serde(rename = "Fast")]
    pub fast: f32,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        let defaults = Sensitivity::default();
        Self {
            slow: defaults.slow,
            normal: defaults.normal,
            fast: defaults.fast,
        }
    }
}

impl From<SpeedSettings> for Sensitivity {
    fn from(s: SpeedSettings) -> Self {
        Sensitivity {
            slow: s.slow,
            normal: s.normal,
            fast: s.fast,
        }
    }
}

/// Constraint profile applied to a session. Immutable once the session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Permission suffix; the granted permission is `grip.ruleset.<suffix>`.
    #[serde(rename = "Permission suffix", default)]
    pub permission_suffix: Option<String>,

    #[serde(rename = "Can move players", default)]
    pub can_move_players: bool,

    #[serde(rename = "Can use while building blocked", default)]
    pub can_use_while_building_blocked: bool,

    #[serde(rename = "Requires ownership", default)]
    pub requires_ownership: bool,

    /// Maximum head offset in meters. 0 means unlimited.
    #[serde(rename = "Max distance", default)]
    pub max_distance: f32,
}

impl Ruleset {
    /// Everything allowed, no distance limit. Granted by the admin permission.
    pub fn admin() -> Self {
        Self {
            permission_suffix: None,
            can_move_players: true,
            can_use_while_building_blocked: true,
            requires_ownership: false,
            max_distance: 0.0,
        }
    }

    /// The permission that grants this ruleset, if it has a usable suffix.
    pub fn permission(&self) -> Option<String> {
        self.permission_suffix
            .as_deref()
            .map(str::trim)
            .filter(|suffix| !suffix.is_empty())
            .map(|suffix| format!("{PERMISSION_RULESET_PREFIX}{suffix}"))
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(rename = "Enable message prefix")]
    pub enable_message_prefix: bool,

    #[serde(rename = "Idle timeout (seconds)")]
    pub idle_timeout: f32,

    #[serde(rename = "Building privilege check frequency (seconds)")]
    pub building_check_interval: f32,

    #[serde(rename = "Move sensitivity")]
    pub move_sensitivity: SpeedSettings,

    #[serde(rename = "Rotate sensitivity")]
    pub rotate_sensitivity: SpeedSettings,

    /// Ordered by priority: later entries win when a user holds several.
    #[serde(rename = "Rulesets")]
    pub rulesets: Vec<Ruleset>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            enable_message_prefix: true,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            building_check_interval: DEFAULT_BUILDING_CHECK_INTERVAL,
            move_sensitivity: SpeedSettings::default(),
            rotate_sensitivity: SpeedSettings::default(),
            rulesets: vec![Ruleset {
                permission_suffix: Some("restricted".to_string()),
                can_move_players: false,
                can_use_while_building_blocked: false,
                requires_ownership: true,
                max_distance: 3.0,
            }],
        }
    }
}

impl Configuration {
    /// Parse configuration from a JSON string. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a value is out of range.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write configuration to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        log::info!("Configuration changes saved to {}", path.display());
        Ok(())
    }

    /// Load configuration, repairing the file where possible.
    ///
    /// - Missing file: defaults are written and returned.
    /// - File missing keys: the defaults are merged in and the file is rewritten.
    /// - Unreadable or invalid file: the error is logged and defaults are returned, leaving the
    ///   file untouched so the owner can fix it.
    pub fn load_or_default(path: &Path) -> Self {
        let config = Self::load_or_create(path);
        log::info!("Permissions: {}", config.permissions().join(", "));
        config
    }

    fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            if let Err(err) = config.save(path) {
                log::error!("Failed to write default configuration: {err}");
            }
            return config;
        }

        match Self::load_and_upgrade(path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{err}");
                log::warn!(
                    "Configuration file {} is invalid; using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    fn load_and_upgrade(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut raw: Value = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        let defaults = serde_json::to_value(Self::default()).map_err(ConfigError::Serialize)?;

        let outdated = merge_missing(&mut raw, &defaults);
        let config: Self = serde_json::from_value(raw).map_err(ConfigError::Parse)?;
        config.validate()?;

        if outdated {
            log::warn!("Configuration appears to be outdated; updating and saving");
            config.save(path)?;
        }
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.idle_timeout > 0.0) {
            return Err(ConfigError::Validation(
                "idle timeout must be positive".to_string(),
            ));
        }
        if !(self.building_check_interval >= 0.0) {
            return Err(ConfigError::Validation(
                "building privilege check frequency must not be negative".to_string(),
            ));
        }
        for (name, speeds) in [
            ("move", &self.move_sensitivity),
            ("rotate", &self.rotate_sensitivity),
        ] {
            if [speeds.slow, speeds.normal, speeds.fast]
                .iter()
                .any(|v| !v.is_finite() || *v < 0.0)
            {
                return Err(ConfigError::Validation(format!(
                    "{name} sensitivity values must be finite and not negative"
                )));
            }
        }
        if let Some(ruleset) = self
            .rulesets
            .iter()
            .find(|r| !r.max_distance.is_finite() || r.max_distance < 0.0)
        {
            return Err(ConfigError::Validation(format!(
                "ruleset {:?} has a negative max distance",
                ruleset.permission_suffix.as_deref().unwrap_or("<none>")
            )));
        }
        Ok(())
    }

    /// Every permission the configuration defines, admin first.
    pub fn permissions(&self) -> Vec<String> {
        std::iter::once(PERMISSION_ADMIN.to_string())
            .chain(self.rulesets.iter().filter_map(Ruleset::permission))
            .collect()
    }

    /// Resolves the ruleset that applies to `actor`.
    ///
    /// Admins get [`Ruleset::admin`]. Otherwise the last configured ruleset whose permission
    /// the actor holds wins. `None` means the actor may not use the feature at all.
    pub fn ruleset_for(&self, permissions: &impl Permissions, actor: ActorId) -> Option<Ruleset> {
        if permissions.has_permission(actor, PERMISSION_ADMIN) {
            return Some(Ruleset::admin());
        }

        self.rulesets
            .iter()
            .rev()
            .find(|ruleset| {
                ruleset
                    .permission()
                    .is_some_and(|perm| permissions.has_permission(actor, &perm))
            })
            .cloned()
    }
}

/// Copies keys present in `defaults` but missing from `current`, recursing into objects.
///
/// Returns true if anything was added or replaced. Values the owner set are never changed,
/// except that an object-typed default replaces a non-object value.
fn merge_missing(current: &mut Value, defaults: &Value) -> bool {
    let (Value::Object(current), Value::Object(defaults)) = (current, defaults) else {
        return false;
    };

    let mut changed = false;
    for (key, default_value) in defaults {
        match current.get_mut(key) {
            Some(existing) => {
                if default_value.is_object() {
                    if existing.is_object() {
                        changed |= merge_missing(existing, default_value);
                    } else {
                        *existing = default_value.clone();
                        changed = true;
                    }
                }
            }
            None => {
                current.insert(key.clone(), default_value.clone());
                changed = true;
            }
        }
    }
    changed
}
