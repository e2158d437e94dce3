//! Module handlers for the REST API.
//!
//! Creates and updates go through the module service, so the parent bots'
//! module lists are kept in step with each module's `parent_bot`.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use convs_core::service::module::ModuleForm;
use convs_core::service::plan::ModuleMutation;
use convs_types::bot::BotId;
use convs_types::error::ModuleError;
use convs_types::module::{BotModule, BotModuleId};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::{ApiResponse, RequestTiming};
use crate::state::AppState;

/// Body of `PUT /modules/{id}`. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateModuleRequest {
    pub module_name: Option<String>,
    pub module_desc: Option<String>,
    pub parent_bot: Option<BotId>,
    pub stories: Option<Vec<String>>,
}

impl UpdateModuleRequest {
    fn apply_to(self, form: &mut ModuleForm) {
        if let Some(name) = self.module_name {
            form.module_name = name;
        }
        if let Some(desc) = self.module_desc {
            form.module_desc = desc;
        }
        if let Some(parent) = self.parent_bot {
            form.parent_bot = Some(parent);
        }
        if let Some(stories) = self.stories {
            form.stories = stories;
        }
    }
}

fn parse_module_id(id: &str) -> Result<BotModuleId, AppError> {
    id.parse()
        .map_err(|_| AppError::Module(ModuleError::NotFound))
}

fn module_links(resp: ApiResponse<BotModule>) -> ApiResponse<BotModule> {
    let Some(module) = resp.data.as_ref() else {
        return resp;
    };
    let self_link = format!("/api/v1/modules/{}", module.id);
    let bot_link = format!("/api/v1/bots/{}", module.parent_bot);
    resp.with_link("self", self_link).with_link("bot", bot_link)
}

/// POST /api/v1/modules - Create a module and attach it to its parent bot.
pub async fn create_module(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(mut form): Json<ModuleForm>,
) -> Result<ApiResponse<BotModule>, AppError> {
    let timing = RequestTiming::start();

    // Ids are always generated server-side.
    form.id = None;
    let module = state
        .module_service
        .submit(ModuleMutation::Create, None, form)
        .await?
        .into_module();

    Ok(module_links(timing.created(module)))
}

/// GET /api/v1/modules/{id} - Get a module.
pub async fn get_module(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<BotModule>, AppError> {
    let timing = RequestTiming::start();
    let module = state.module_service.get_module(&parse_module_id(&id)?).await?;
    Ok(module_links(timing.ok(module)))
}

/// PUT /api/v1/modules/{id} - Update a module, moving it if `parent_bot` changes.
pub async fn update_module(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<String>,
    Json(body): Json<UpdateModuleRequest>,
) -> Result<ApiResponse<BotModule>, AppError> {
    let timing = RequestTiming::start();
    let original = state.module_service.get_module(&parse_module_id(&id)?).await?;

    let mut form = ModuleForm::from_module(&original);
    body.apply_to(&mut form);

    let module = state
        .module_service
        .submit(ModuleMutation::Update, Some(&original), form)
        .await?
        .into_module();

    Ok(module_links(timing.ok(module)))
}

/// DELETE /api/v1/modules/{id} - Detach a module from its bot and delete it.
pub async fn delete_module(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let timing = RequestTiming::start();
    let id = parse_module_id(&id)?;
    state.module_service.delete_module(&id).await?;

    Ok(timing.ok(serde_json::json!({"deleted": true, "id": id.to_string()})))
}
