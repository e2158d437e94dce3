use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::module::BotModuleId;

/// Unique identifier for a bot, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BotId(pub Uuid);

impl BotId {
    /// Create a new BotId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a BotId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for BotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BotId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A conversational bot managed from the console.
///
/// A bot owns zero or more modules. Ownership is recorded on the module
/// (`BotModule::parent_bot`); `modules` is the back-reference list kept in
/// sync by the module service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub id: BotId,
    /// URL-safe unique slug derived from name ("Support Bot" -> "support-bot").
    pub slug: String,
    /// Freeform display name (duplicates allowed across bots).
    pub name: String,
    /// Short description (1-2 sentences for listings).
    pub description: String,
    /// Current lifecycle state.
    pub status: BotStatus,
    /// Ids of the modules this bot owns, in attach order.
    pub modules: Vec<BotModuleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bot {
    /// Whether `module_id` is listed in this bot's module list.
    pub fn has_module(&self, module_id: &BotModuleId) -> bool {
        self.modules.contains(module_id)
    }

    /// Append `module_id` unless it is already listed. Returns `true` if the
    /// list changed.
    pub fn attach_module(&mut self, module_id: &BotModuleId) -> bool {
        if self.has_module(module_id) {
            return false;
        }
        self.modules.push(module_id.clone());
        true
    }

    /// Remove every occurrence of `module_id`. Returns `true` if the list
    /// changed.
    pub fn detach_module(&mut self, module_id: &BotModuleId) -> bool {
        let before = self.modules.len();
        self.modules.retain(|id| id != module_id);
        self.modules.len() != before
    }
}

/// Bot lifecycle states.
///
/// - Active: fully functional, modules can be attached
/// - Disabled: paused, visible but not served
/// - Archived: hidden from default views, all data preserved, restorable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    #[default]
    Active,
    Disabled,
    Archived,
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotStatus::Active => write!(f, "active"),
            BotStatus::Disabled => write!(f, "disabled"),
            BotStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for BotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(BotStatus::Active),
            "disabled" => Ok(BotStatus::Disabled),
            "archived" => Ok(BotStatus::Archived),
            other => Err(format!("invalid bot status: '{other}'")),
        }
    }
}

/// Request to create a new bot. Only `name` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBotRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update of a bot's mutable fields. The module list is not
/// editable here; it is maintained by the module service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBotRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<BotStatus>,
}

/// Generate a URL-safe slug from a display name.
///
/// ```
/// use convs_types::bot::slugify;
///
/// assert_eq!(slugify("Support Bot"), "support-bot");
/// assert_eq!(slugify("My  Cool  Bot!"), "my-cool-bot");
/// assert_eq!(slugify("---hello---world---"), "hello-world");
/// ```
pub fn slugify(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_hyphen = true; // treat start as hyphen to trim leading
    for c in name.to_lowercase().chars() {
        if c.is_alphanumeric() {
            result.push(c);
            prev_was_hyphen = false;
        } else if !prev_was_hyphen {
            result.push('-');
            prev_was_hyphen = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}
