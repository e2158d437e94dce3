//! Bot modules: named groups of conversation stories owned by one bot.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::bot::BotId;

/// Unique identifier for a bot module (UUID v7).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BotModuleId(pub Uuid);

impl BotModuleId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for BotModuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BotModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BotModuleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Discriminator written as `"type": "BotModule"` on every module record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleKind {
    #[default]
    BotModule,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleKind::BotModule => write!(f, "BotModule"),
        }
    }
}

impl FromStr for ModuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BotModule" => Ok(ModuleKind::BotModule),
            other => Err(format!("invalid module type: '{other}'")),
        }
    }
}

/// A named group of conversation stories belonging to exactly one bot.
///
/// `parent_bot` is the owning side of the relation. The parent's
/// `Bot::modules` list mirrors it and is kept in sync by the module service,
/// not by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotModule {
    pub id: BotModuleId,
    pub name: String,
    pub description: String,
    /// Ids of the stories grouped under this module.
    #[serde(default)]
    pub stories: Vec<String>,
    pub parent_bot: BotId,
    #[serde(rename = "type", default)]
    pub kind: ModuleKind,
}
