//! Module edit session.
//!
//! A `ModuleEditor` is opened with the mode and (for edits) the module being
//! edited, holds the form while the user fills it in, and submits it through
//! the module service. Every submit chain is scoped to the session: closing
//! or dropping the editor cancels a chain that is still running.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use convs_types::bot::{Bot, BotId};
use convs_types::error::ModuleError;
use convs_types::module::BotModule;

use crate::repository::bot::BotRepository;
use crate::repository::module::BotModuleRepository;
use crate::service::module::{BotModuleService, ModuleForm, SaveOutcome};
use crate::service::plan::ModuleMutation;

/// Data an edit session is opened with.
#[derive(Debug, Clone)]
pub struct ModuleEditContext {
    pub mode: ModuleMutation,
    /// The module being edited. Required in update mode.
    pub module: Option<BotModule>,
}

impl ModuleEditContext {
    pub fn create() -> Self {
        Self {
            mode: ModuleMutation::Create,
            module: None,
        }
    }

    pub fn edit(module: BotModule) -> Self {
        Self {
            mode: ModuleMutation::Update,
            module: Some(module),
        }
    }
}

pub struct ModuleEditor<B: BotRepository, M: BotModuleRepository> {
    service: Arc<BotModuleService<B, M>>,
    context: ModuleEditContext,
    form: ModuleForm,
    bots: Vec<Bot>,
    selected_bot: Option<Bot>,
    saving: bool,
    cancel: CancellationToken,
}

impl<B: BotRepository, M: BotModuleRepository> ModuleEditor<B, M> {
    /// Open an edit session. The form starts blank in create mode and is
    /// patched from the module in update mode.
    pub fn open(
        service: Arc<BotModuleService<B, M>>,
        context: ModuleEditContext,
    ) -> Result<Self, ModuleError> {
        let form = match (&context.mode, &context.module) {
            (ModuleMutation::Create, _) => ModuleForm::empty(),
            (ModuleMutation::Update, Some(module)) => ModuleForm::from_module(module),
            (ModuleMutation::Update, None) => return Err(ModuleError::NotFound),
        };

        Ok(Self {
            service,
            context,
            form,
            bots: Vec::new(),
            selected_bot: None,
            saving: false,
            cancel: CancellationToken::new(),
        })
    }

    pub fn is_create_mode(&self) -> bool {
        self.context.mode == ModuleMutation::Create
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn form(&self) -> &ModuleForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ModuleForm {
        &mut self.form
    }

    /// Bots loaded by the last [`load_bots`](Self::load_bots) call.
    pub fn bots(&self) -> &[Bot] {
        &self.bots
    }

    pub fn selected_bot(&self) -> Option<&Bot> {
        self.selected_bot.as_ref()
    }

    /// Load the parent candidates. A preselected bot that is found becomes
    /// the form's parent.
    pub async fn load_bots(&mut self, preselect: Option<&BotId>) -> Result<(), ModuleError> {
        let candidates = self.service.list_parent_candidates(preselect).await?;

        if let Some(bot) = &candidates.selected {
            self.form.parent_bot = Some(bot.id.clone());
        }
        self.bots = candidates.bots;
        self.selected_bot = candidates.selected;
        Ok(())
    }

    /// Submit the current form.
    pub async fn submit(&mut self) -> Result<SaveOutcome, ModuleError> {
        self.saving = true;
        let result = self
            .service
            .submit_until_cancelled(
                self.context.mode,
                self.context.module.as_ref(),
                self.form.clone(),
                &self.cancel,
            )
            .await;
        self.saving = false;

        // An edit session ends once its module is saved.
        if let Ok(SaveOutcome::Updated(module)) = &result {
            self.context.module = Some(module.clone());
            self.close();
        }

        result
    }

    /// Close the session, cancelling any submit chain still in flight.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// A token cancelled when this session closes.
    pub fn closed_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }
}

impl<B: BotRepository, M: BotModuleRepository> Drop for ModuleEditor<B, M> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
