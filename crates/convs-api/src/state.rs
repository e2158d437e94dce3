//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository traits; AppState pins them to the
//! SQLite implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use convs_core::event::bus::ModuleEventBus;
use convs_core::service::bot::BotService;
use convs_core::service::editor::{ModuleEditContext, ModuleEditor};
use convs_core::service::module::BotModuleService;
use convs_infra::config::load_global_config;
use convs_infra::filesystem::{database_url, resolve_data_dir};
use convs_infra::sqlite::bot::SqliteBotRepository;
use convs_infra::sqlite::module::SqliteBotModuleRepository;
use convs_infra::sqlite::pool::DatabasePool;
use convs_types::config::GlobalConfig;
use convs_types::error::ModuleError;

pub type ConcreteBotService = BotService<SqliteBotRepository, SqliteBotModuleRepository>;

pub type ConcreteModuleService = BotModuleService<SqliteBotRepository, SqliteBotModuleRepository>;

pub type ConcreteModuleEditor = ModuleEditor<SqliteBotRepository, SqliteBotModuleRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub bot_service: Arc<ConcreteBotService>,
    pub module_service: Arc<ConcreteModuleService>,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state from the resolved data directory.
    pub async fn init() -> anyhow::Result<Self> {
        Self::open(&resolve_data_dir()).await
    }

    /// Connect to the database under `data_dir`, load config and wire services.
    pub async fn open(data_dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;

        let config = load_global_config(data_dir).await;
        let db_pool = DatabasePool::new(&database_url(data_dir)).await?;

        let bot_service = BotService::new(
            SqliteBotRepository::new(db_pool.clone()),
            SqliteBotModuleRepository::new(db_pool.clone()),
        );

        let module_service = BotModuleService::new(
            SqliteBotRepository::new(db_pool.clone()),
            SqliteBotModuleRepository::new(db_pool.clone()),
            ModuleEventBus::new(config.modules.event_capacity),
        )
        .with_missing_parent(config.modules.missing_parent);

        tracing::debug!(
            data_dir = %data_dir.display(),
            missing_parent = ?config.modules.missing_parent,
            "application state initialized"
        );

        Ok(Self {
            bot_service: Arc::new(bot_service),
            module_service: Arc::new(module_service),
            config,
            data_dir: data_dir.to_path_buf(),
            db_pool,
        })
    }

    /// Open a module edit session bound to this state's module service.
    pub fn module_editor(
        &self,
        context: ModuleEditContext,
    ) -> Result<ConcreteModuleEditor, ModuleError> {
        ModuleEditor::open(Arc::clone(&self.module_service), context)
    }
}
