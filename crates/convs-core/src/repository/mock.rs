//! In-memory repositories for service tests.
//!
//! Both repositories share one `MockStore` so a test can seed bots, hand
//! the repositories to a service, and inspect the resulting state and the
//! ordered call log afterwards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use convs_types::bot::{Bot, BotId, BotStatus};
use convs_types::error::RepositoryError;
use convs_types::module::{BotModule, BotModuleId};

use super::bot::{BotFilter, BotRepository, ModuleListChange};
use super::module::BotModuleRepository;

#[derive(Default)]
struct Inner {
    bots: HashMap<BotId, Bot>,
    modules: HashMap<BotModuleId, BotModule>,
    calls: Vec<&'static str>,
    fail_module_writes: bool,
}

#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<Mutex<Inner>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bot_repo(&self) -> MockBotRepository {
        MockBotRepository(self.clone())
    }

    pub fn module_repo(&self) -> MockModuleRepository {
        MockModuleRepository(self.clone())
    }

    /// Seed a bot with the given slug and no modules.
    pub fn seed_bot(&self, slug: &str) -> Bot {
        let now = Utc::now();
        let bot = Bot {
            id: BotId::new(),
            slug: slug.to_string(),
            name: slug.to_string(),
            description: String::new(),
            status: BotStatus::Active,
            modules: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.lock().bots.insert(bot.id.clone(), bot.clone());
        bot
    }

    /// Store a module record directly, bypassing the call log.
    pub fn seed_module(&self, module: &BotModule) {
        self.lock().modules.insert(module.id.clone(), module.clone());
    }

    /// Overwrite a bot's module list directly, bypassing the call log.
    pub fn set_bot_modules(&self, bot_id: &BotId, modules: Vec<BotModuleId>) {
        if let Some(bot) = self.lock().bots.get_mut(bot_id) {
            bot.modules = modules;
        }
    }

    pub fn bot(&self, id: &BotId) -> Option<Bot> {
        self.lock().bots.get(id).cloned()
    }

    pub fn module(&self, id: &BotModuleId) -> Option<BotModule> {
        self.lock().modules.get(id).cloned()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn fail_module_writes(&self) {
        self.lock().fail_module_writes = true;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn record(&self, call: &'static str) {
        self.lock().calls.push(call);
    }

    fn edit_modules(&self, bot_id: &BotId, edit: impl FnOnce(&mut Bot) -> bool) -> ModuleListChange {
        let mut inner = self.lock();
        let Some(bot) = inner.bots.get_mut(bot_id) else {
            return ModuleListChange::BotMissing;
        };
        if edit(bot) {
            ModuleListChange::Changed
        } else {
            ModuleListChange::Unchanged
        }
    }
}

pub struct MockBotRepository(MockStore);

impl BotRepository for MockBotRepository {
    async fn create(&self, bot: &Bot) -> Result<Bot, RepositoryError> {
        self.0.record("bot.create");
        let mut inner = self.0.lock();
        if inner.bots.values().any(|b| b.slug == bot.slug) {
            return Err(RepositoryError::Conflict(bot.slug.clone()));
        }
        inner.bots.insert(bot.id.clone(), bot.clone());
        Ok(bot.clone())
    }

    async fn get_by_id(&self, id: &BotId) -> Result<Option<Bot>, RepositoryError> {
        self.0.record("bot.get_by_id");
        Ok(self.0.bot(id))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Bot>, RepositoryError> {
        self.0.record("bot.get_by_slug");
        Ok(self.0.lock().bots.values().find(|b| b.slug == slug).cloned())
    }

    async fn list(&self, filter: Option<BotFilter>) -> Result<Vec<Bot>, RepositoryError> {
        self.0.record("bot.list");
        let filter = filter.unwrap_or_default();
        let mut bots: Vec<Bot> = self
            .0
            .lock()
            .bots
            .values()
            .filter(|b| filter.status.as_ref().is_none_or(|s| &b.status == s))
            .cloned()
            .collect();
        bots.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(bots)
    }

    async fn update(&self, bot: &Bot) -> Result<Bot, RepositoryError> {
        self.0.record("bot.update");
        let mut inner = self.0.lock();
        match inner.bots.get_mut(&bot.id) {
            Some(stored) => {
                let modules = std::mem::take(&mut stored.modules);
                *stored = Bot {
                    modules,
                    ..bot.clone()
                };
                Ok(stored.clone())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn attach_module(
        &self,
        bot: &BotId,
        module: &BotModuleId,
    ) -> Result<ModuleListChange, RepositoryError> {
        self.0.record("bot.attach_module");
        Ok(self.0.edit_modules(bot, |b| b.attach_module(module)))
    }

    async fn detach_module(
        &self,
        bot: &BotId,
        module: &BotModuleId,
    ) -> Result<ModuleListChange, RepositoryError> {
        self.0.record("bot.detach_module");
        Ok(self.0.edit_modules(bot, |b| b.detach_module(module)))
    }

    async fn delete(&self, id: &BotId) -> Result<(), RepositoryError> {
        self.0.record("bot.delete");
        self.0
            .lock()
            .bots
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

pub struct MockModuleRepository(MockStore);

impl BotModuleRepository for MockModuleRepository {
    async fn create(&self, module: &BotModule) -> Result<BotModule, RepositoryError> {
        self.0.record("module.create");
        let mut inner = self.0.lock();
        if inner.fail_module_writes {
            return Err(RepositoryError::Connection);
        }
        inner.modules.insert(module.id.clone(), module.clone());
        Ok(module.clone())
    }

    async fn update(&self, module: &BotModule) -> Result<BotModule, RepositoryError> {
        self.0.record("module.update");
        let mut inner = self.0.lock();
        if inner.fail_module_writes {
            return Err(RepositoryError::Connection);
        }
        match inner.modules.get_mut(&module.id) {
            Some(stored) => {
                *stored = module.clone();
                Ok(module.clone())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn get_by_id(&self, id: &BotModuleId) -> Result<Option<BotModule>, RepositoryError> {
        self.0.record("module.get_by_id");
        Ok(self.0.module(id))
    }

    async fn list_by_bot(&self, bot_id: &BotId) -> Result<Vec<BotModule>, RepositoryError> {
        self.0.record("module.list_by_bot");
        let mut modules: Vec<BotModule> = self
            .0
            .lock()
            .modules
            .values()
            .filter(|m| &m.parent_bot == bot_id)
            .cloned()
            .collect();
        modules.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(modules)
    }

    async fn delete(&self, id: &BotModuleId) -> Result<(), RepositoryError> {
        self.0.record("module.delete");
        self.0
            .lock()
            .modules
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
