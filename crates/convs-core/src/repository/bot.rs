//! Bot repository trait definition.

use convs_types::bot::{Bot, BotId, BotStatus};
use convs_types::error::RepositoryError;
use convs_types::module::BotModuleId;

use super::SortOrder;

/// Filter criteria for listing bots.
#[derive(Debug, Clone, Default)]
pub struct BotFilter {
    /// Filter by lifecycle status.
    pub status: Option<BotStatus>,
    /// Field to sort by (e.g., "created_at", "name", "updated_at").
    pub sort_by: Option<String>,
    /// Sort direction.
    pub sort_order: Option<SortOrder>,
    /// Maximum number of results.
    pub limit: Option<i64>,
    /// Number of results to skip (offset pagination).
    pub offset: Option<i64>,
}

/// Result of an atomic edit to a bot's module list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleListChange {
    /// The list was rewritten.
    Changed,
    /// The list already had the requested shape; nothing was written.
    Unchanged,
    /// No bot with the given id exists.
    BotMissing,
}

/// Repository trait for bot persistence.
///
/// The module list is never written by `update`. It only changes through
/// `attach_module` and `detach_module`, each of which reads and rewrites the
/// list in a single write transaction so concurrent edits cannot drop ids.
///
/// Implementations live in convs-infra (e.g., SqliteBotRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait BotRepository: Send + Sync {
    /// Create a new bot. Returns the created bot.
    fn create(
        &self,
        bot: &Bot,
    ) -> impl std::future::Future<Output = Result<Bot, RepositoryError>> + Send;

    /// Get a bot by its unique ID.
    fn get_by_id(
        &self,
        id: &BotId,
    ) -> impl std::future::Future<Output = Result<Option<Bot>, RepositoryError>> + Send;

    /// Get a bot by its unique slug.
    fn get_by_slug(
        &self,
        slug: &str,
    ) -> impl std::future::Future<Output = Result<Option<Bot>, RepositoryError>> + Send;

    /// List bots with optional filtering, sorting, and pagination.
    fn list(
        &self,
        filter: Option<BotFilter>,
    ) -> impl std::future::Future<Output = Result<Vec<Bot>, RepositoryError>> + Send;

    /// Replace a bot's name, description, status and slug. The stored module
    /// list is kept. Returns the bot as stored.
    fn update(
        &self,
        bot: &Bot,
    ) -> impl std::future::Future<Output = Result<Bot, RepositoryError>> + Send;

    /// Append `module` to the bot's module list unless it is already listed.
    fn attach_module(
        &self,
        bot: &BotId,
        module: &BotModuleId,
    ) -> impl std::future::Future<Output = Result<ModuleListChange, RepositoryError>> + Send;

    /// Remove every occurrence of `module` from the bot's module list.
    fn detach_module(
        &self,
        bot: &BotId,
        module: &BotModuleId,
    ) -> impl std::future::Future<Output = Result<ModuleListChange, RepositoryError>> + Send;

    /// Permanently delete a bot by ID.
    fn delete(
        &self,
        id: &BotId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
