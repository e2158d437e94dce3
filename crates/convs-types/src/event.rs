//! Event types for the module event bus.
//!
//! `ModuleEvent` is broadcast after a module save chain completes. All
//! variants are Clone + Send + Sync for use with tokio broadcast channels.

use serde::{Deserialize, Serialize};

use crate::bot::BotId;
use crate::module::{BotModule, BotModuleId};

/// Completion signals of the module save and delete flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModuleEvent {
    /// A new module was persisted and attached to its parent.
    ModuleCreated { module: BotModule },

    /// An existing module was persisted. `previous_parent` is set when the
    /// module moved to a different bot.
    ModuleUpdated {
        module: BotModule,
        previous_parent: Option<BotId>,
    },

    /// A module was detached from its parent and deleted.
    ModuleDeleted {
        module_id: BotModuleId,
        parent_bot: BotId,
    },
}

impl ModuleEvent {
    /// Id of the module the event is about.
    pub fn module_id(&self) -> &BotModuleId {
        match self {
            ModuleEvent::ModuleCreated { module } | ModuleEvent::ModuleUpdated { module, .. } => {
                &module.id
            }
            ModuleEvent::ModuleDeleted { module_id, .. } => module_id,
        }
    }
}
