use thiserror::Error;

use crate::bot::BotId;
use crate::module::BotModuleId;

/// Errors related to bot operations.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("bot not found")]
    NotFound,

    #[error("slug '{0}' already exists")]
    SlugConflict(String),

    #[error("invalid bot status: '{0}'")]
    InvalidStatus(String),

    #[error("invalid bot name: {0}")]
    InvalidName(String),

    #[error("bot still owns {0} module(s)")]
    HasModules(usize),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to bot module operations.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module not found")]
    NotFound,

    #[error("invalid module name: {0}")]
    InvalidName(String),

    #[error("a parent bot must be selected")]
    MissingParent,

    /// A persistence call failed. Recoverable: the user may retry.
    #[error("failed to save module: {0}")]
    SaveFailed(String),

    /// The parent relation could not be kept consistent.
    #[error("integrity error: parent bot {bot_id} of module {module_id} not found")]
    Integrity {
        bot_id: BotId,
        module_id: BotModuleId,
    },

    #[error("module save cancelled")]
    Cancelled,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from repository operations (used by trait definitions in convs-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_error_display() {
        let err = BotError::SlugConflict("luna".to_string());
        assert_eq!(err.to_string(), "slug 'luna' already exists");
    }

    #[test]
    fn test_integrity_error_names_both_ids() {
        let bot_id = BotId::new();
        let module_id = BotModuleId::new();
        let err = ModuleError::Integrity {
            bot_id: bot_id.clone(),
            module_id: module_id.clone(),
        };
        let msg = err.to_string();
        assert!(msg.contains(&bot_id.to_string()));
        assert!(msg.contains(&module_id.to_string()));
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }
}
