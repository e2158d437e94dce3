//! Global configuration types.
//!
//! `GlobalConfig` represents the top-level `config.toml` in the data
//! directory. All fields have sensible defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded from `~/.convs/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub modules: ModuleConfig,
}

/// Settings for module saves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// What to do when a parent bot cannot be found while attaching or
    /// detaching a module.
    #[serde(default)]
    pub missing_parent: MissingParentPolicy,

    /// Capacity of the module event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    256
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            missing_parent: MissingParentPolicy::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

/// Handling of a parent bot that is absent during attach/detach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingParentPolicy {
    /// Log a warning and leave all module lists untouched.
    #[default]
    Skip,
    /// Abort the save with an integrity error.
    Fail,
}
