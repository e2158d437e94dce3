//! Bot module service.
//!
//! Persists modules and keeps each parent bot's module list consistent
//! with `BotModule::parent_bot`. A submit is planned by
//! [`plan_module_save`] and executed step by step here: persist the module,
//! then detach from the old parent and attach to the new one as the plan
//! dictates. Steps run strictly in order and a cancelled token stops the
//! chain before the next step starts.
//!
//! List edits go through [`BotRepository::attach_module`] and
//! [`BotRepository::detach_module`], which are atomic per bot, so concurrent
//! saves aimed at one parent never lose each other's ids.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use convs_types::bot::{Bot, BotId};
use convs_types::config::MissingParentPolicy;
use convs_types::error::{ModuleError, RepositoryError};
use convs_types::event::ModuleEvent;
use convs_types::module::{BotModule, BotModuleId, ModuleKind};

use crate::event::bus::ModuleEventBus;
use crate::repository::bot::{BotRepository, ModuleListChange};
use crate::repository::module::BotModuleRepository;
use crate::service::plan::{ModuleEffect, ModuleMutation, detached_parent, plan_module_save};

/// Values submitted by the module edit form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleForm {
    /// Set when editing; a fresh id is generated on create.
    #[serde(default)]
    pub id: Option<BotModuleId>,
    #[serde(default)]
    pub module_name: String,
    #[serde(default)]
    pub module_desc: String,
    /// The selected parent bot.
    #[serde(default)]
    pub parent_bot: Option<BotId>,
    #[serde(default)]
    pub stories: Vec<String>,
}

impl ModuleForm {
    /// Blank form for create mode.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Form patched with an existing module's values (edit mode).
    pub fn from_module(module: &BotModule) -> Self {
        Self {
            id: Some(module.id.clone()),
            module_name: module.name.clone(),
            module_desc: module.description.clone(),
            parent_bot: Some(module.parent_bot.clone()),
            stories: module.stories.clone(),
        }
    }

    /// Build the module record from the form values.
    pub fn into_module(self) -> Result<BotModule, ModuleError> {
        let name = self.module_name.trim().to_string();
        if name.is_empty() {
            return Err(ModuleError::InvalidName("name cannot be empty".to_string()));
        }
        let parent_bot = self.parent_bot.ok_or(ModuleError::MissingParent)?;

        Ok(BotModule {
            id: self.id.unwrap_or_default(),
            name,
            description: self.module_desc,
            stories: self.stories,
            parent_bot,
            kind: ModuleKind::BotModule,
        })
    }
}

/// Result of a completed submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// A new module was created; hand it on to the next step of the flow.
    Created(BotModule),
    /// An existing module was saved; the edit session is finished.
    Updated(BotModule),
}

impl SaveOutcome {
    pub fn module(&self) -> &BotModule {
        match self {
            SaveOutcome::Created(m) | SaveOutcome::Updated(m) => m,
        }
    }

    pub fn into_module(self) -> BotModule {
        match self {
            SaveOutcome::Created(m) | SaveOutcome::Updated(m) => m,
        }
    }
}

/// Bots offered as parents by the edit form.
#[derive(Debug, Clone)]
pub struct ParentCandidates {
    pub bots: Vec<Bot>,
    /// The preselected bot, if it was found among `bots`.
    pub selected: Option<Bot>,
}

#[derive(Debug, Clone, Copy)]
enum ListEdit {
    Attach,
    Detach,
}

/// Service orchestrating module persistence and parent bookkeeping.
///
/// Generic over repository traits -- convs-core never depends on convs-infra.
pub struct BotModuleService<B: BotRepository, M: BotModuleRepository> {
    bot_repo: B,
    module_repo: M,
    events: ModuleEventBus,
    missing_parent: MissingParentPolicy,
}

impl<B: BotRepository, M: BotModuleRepository> BotModuleService<B, M> {
    pub fn new(bot_repo: B, module_repo: M, events: ModuleEventBus) -> Self {
        Self {
            bot_repo,
            module_repo,
            events,
            missing_parent: MissingParentPolicy::default(),
        }
    }

    /// Set how an absent parent bot is handled during attach/detach.
    pub fn with_missing_parent(mut self, policy: MissingParentPolicy) -> Self {
        self.missing_parent = policy;
        self
    }

    pub fn events(&self) -> &ModuleEventBus {
        &self.events
    }

    /// Save a module from submitted form values.
    pub async fn submit(
        &self,
        mode: ModuleMutation,
        original: Option<&BotModule>,
        form: ModuleForm,
    ) -> Result<SaveOutcome, ModuleError> {
        self.submit_until_cancelled(mode, original, form, &CancellationToken::new())
            .await
    }

    /// Save a module, stopping before the next step once `cancel` fires.
    ///
    /// Steps already completed are not rolled back.
    pub async fn submit_until_cancelled(
        &self,
        mode: ModuleMutation,
        original: Option<&BotModule>,
        form: ModuleForm,
        cancel: &CancellationToken,
    ) -> Result<SaveOutcome, ModuleError> {
        let module = form.into_module()?;
        let plan = plan_module_save(mode, original, &module);
        let previous_parent = detached_parent(&plan).cloned();

        tracing::debug!(
            module_id = %module.id,
            ?mode,
            steps = plan.len(),
            "executing module save plan"
        );

        if self.missing_parent == MissingParentPolicy::Fail {
            self.ensure_parents_exist(&plan).await?;
        }

        let mut saved = module;
        for effect in plan {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!(module_id = %saved.id, "module save cancelled");
                    return Err(ModuleError::Cancelled);
                }
                result = self.apply(effect) => {
                    if let Some(module) = result? {
                        saved = module;
                    }
                }
            }
        }

        let outcome = match mode {
            ModuleMutation::Create => {
                tracing::info!(module_id = %saved.id, bot_id = %saved.parent_bot, "module created");
                self.events.publish(ModuleEvent::ModuleCreated {
                    module: saved.clone(),
                });
                SaveOutcome::Created(saved)
            }
            ModuleMutation::Update => {
                tracing::info!(module_id = %saved.id, bot_id = %saved.parent_bot, "module updated");
                self.events.publish(ModuleEvent::ModuleUpdated {
                    module: saved.clone(),
                    previous_parent,
                });
                SaveOutcome::Updated(saved)
            }
        };

        Ok(outcome)
    }

    /// Get a module by ID.
    pub async fn get_module(&self, id: &BotModuleId) -> Result<BotModule, ModuleError> {
        self.module_repo
            .get_by_id(id)
            .await
            .map_err(|e| ModuleError::StorageError(e.to_string()))?
            .ok_or(ModuleError::NotFound)
    }

    /// List the modules owned by a bot.
    pub async fn list_modules(&self, bot_id: &BotId) -> Result<Vec<BotModule>, ModuleError> {
        self.module_repo
            .list_by_bot(bot_id)
            .await
            .map_err(|e| ModuleError::StorageError(e.to_string()))
    }

    /// Load the bots a module can be attached to, resolving `preselect` among them.
    pub async fn list_parent_candidates(
        &self,
        preselect: Option<&BotId>,
    ) -> Result<ParentCandidates, ModuleError> {
        let bots = self
            .bot_repo
            .list(None)
            .await
            .map_err(|e| ModuleError::StorageError(e.to_string()))?;

        let selected = preselect.and_then(|id| bots.iter().find(|b| &b.id == id).cloned());

        Ok(ParentCandidates { bots, selected })
    }

    /// Detach a module from its parent, then delete the record.
    ///
    /// A missing parent never blocks the delete, whatever the policy: there
    /// is no list left to keep consistent.
    pub async fn delete_module(&self, id: &BotModuleId) -> Result<(), ModuleError> {
        let module = self.get_module(id).await?;

        self.edit_parent(
            &module.parent_bot,
            &module.id,
            ListEdit::Detach,
            MissingParentPolicy::Skip,
        )
        .await?;

        self.module_repo
            .delete(id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ModuleError::NotFound,
                other => ModuleError::SaveFailed(other.to_string()),
            })?;

        tracing::info!(module_id = %module.id, bot_id = %module.parent_bot, "module deleted");
        self.events.publish(ModuleEvent::ModuleDeleted {
            module_id: module.id,
            parent_bot: module.parent_bot,
        });

        Ok(())
    }

    /// Execute one plan step. Returns the stored module for persist steps.
    async fn apply(&self, effect: ModuleEffect) -> Result<Option<BotModule>, ModuleError> {
        match effect {
            ModuleEffect::Create(module) => self
                .module_repo
                .create(&module)
                .await
                .map(Some)
                .map_err(|e| ModuleError::SaveFailed(e.to_string())),
            ModuleEffect::Update(module) => self
                .module_repo
                .update(&module)
                .await
                .map(Some)
                .map_err(|e| match e {
                    RepositoryError::NotFound => ModuleError::NotFound,
                    other => ModuleError::SaveFailed(other.to_string()),
                }),
            ModuleEffect::Detach { bot, module } => {
                self.edit_parent(&bot, &module, ListEdit::Detach, self.missing_parent)
                    .await?;
                Ok(None)
            }
            ModuleEffect::Attach { bot, module } => {
                self.edit_parent(&bot, &module, ListEdit::Attach, self.missing_parent)
                    .await?;
                Ok(None)
            }
        }
    }

    /// Refuse a plan naming a bot that does not exist, before anything is
    /// written.
    async fn ensure_parents_exist(&self, plan: &[ModuleEffect]) -> Result<(), ModuleError> {
        for effect in plan {
            let (ModuleEffect::Attach { bot, module } | ModuleEffect::Detach { bot, module }) =
                effect
            else {
                continue;
            };

            let found = self
                .bot_repo
                .get_by_id(bot)
                .await
                .map_err(|e| ModuleError::StorageError(e.to_string()))?;

            if found.is_none() {
                tracing::warn!(bot_id = %bot, module_id = %module, "parent bot not found, save refused");
                return Err(ModuleError::Integrity {
                    bot_id: bot.clone(),
                    module_id: module.clone(),
                });
            }
        }
        Ok(())
    }

    /// Atomically add or remove `module_id` in `bot_id`'s module list.
    async fn edit_parent(
        &self,
        bot_id: &BotId,
        module_id: &BotModuleId,
        edit: ListEdit,
        missing_parent: MissingParentPolicy,
    ) -> Result<(), ModuleError> {
        let change = match edit {
            ListEdit::Attach => self.bot_repo.attach_module(bot_id, module_id).await,
            ListEdit::Detach => self.bot_repo.detach_module(bot_id, module_id).await,
        }
        .map_err(|e| ModuleError::SaveFailed(e.to_string()))?;

        match (change, missing_parent) {
            (ModuleListChange::Changed, _) => Ok(()),
            (ModuleListChange::Unchanged, _) => {
                tracing::debug!(bot_id = %bot_id, module_id = %module_id, ?edit, "module list already up to date");
                Ok(())
            }
            (ModuleListChange::BotMissing, MissingParentPolicy::Skip) => {
                tracing::warn!(
                    bot_id = %bot_id,
                    module_id = %module_id,
                    ?edit,
                    "parent bot not found, module list left unchanged"
                );
                Ok(())
            }
            (ModuleListChange::BotMissing, MissingParentPolicy::Fail) => {
                Err(ModuleError::Integrity {
                    bot_id: bot_id.clone(),
                    module_id: module_id.clone(),
                })
            }
        }
    }
}
