//! Bot module repository trait definition.

use convs_types::bot::BotId;
use convs_types::error::RepositoryError;
use convs_types::module::{BotModule, BotModuleId};

/// Repository trait for bot module persistence.
///
/// Stores module records only. Keeping `Bot::modules` in step with
/// `BotModule::parent_bot` is the job of the module service.
pub trait BotModuleRepository: Send + Sync {
    /// Persist a new module. Returns the stored module.
    fn create(
        &self,
        module: &BotModule,
    ) -> impl std::future::Future<Output = Result<BotModule, RepositoryError>> + Send;

    /// Replace an existing module. Returns `NotFound` if the id is unknown.
    fn update(
        &self,
        module: &BotModule,
    ) -> impl std::future::Future<Output = Result<BotModule, RepositoryError>> + Send;

    /// Get a module by its unique ID.
    fn get_by_id(
        &self,
        id: &BotModuleId,
    ) -> impl std::future::Future<Output = Result<Option<BotModule>, RepositoryError>> + Send;

    /// List the modules whose `parent_bot` is `bot_id`, ordered by name.
    fn list_by_bot(
        &self,
        bot_id: &BotId,
    ) -> impl std::future::Future<Output = Result<Vec<BotModule>, RepositoryError>> + Send;

    /// Permanently delete a module by ID.
    fn delete(
        &self,
        id: &BotModuleId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
