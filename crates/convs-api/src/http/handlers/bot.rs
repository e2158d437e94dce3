//! Bot CRUD handlers for the REST API.

use axum::Json;
use axum::extract::{Path, Query, State};

use convs_types::bot::{Bot, CreateBotRequest, UpdateBotRequest};
use convs_types::module::BotModule;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::query::BotListQuery;
use crate::http::response::{ApiResponse, RequestTiming};
use crate::state::AppState;

fn bot_links(resp: ApiResponse<Bot>) -> ApiResponse<Bot> {
    let Some(bot) = resp.data.as_ref() else {
        return resp;
    };
    let self_link = format!("/api/v1/bots/{}", bot.id);
    let modules_link = format!("/api/v1/bots/{}/modules", bot.id);
    resp.with_link("self", self_link)
        .with_link("modules", modules_link)
}

/// POST /api/v1/bots - Create a new bot.
pub async fn create_bot(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(body): Json<CreateBotRequest>,
) -> Result<ApiResponse<Bot>, AppError> {
    let timing = RequestTiming::start();
    let bot = state.bot_service.create_bot(body).await?;
    Ok(bot_links(timing.created(bot)))
}

/// GET /api/v1/bots - List bots with filtering and sorting.
pub async fn list_bots(
    State(state): State<AppState>,
    _auth: Authenticated,
    Query(query): Query<BotListQuery>,
) -> Result<ApiResponse<Vec<Bot>>, AppError> {
    let timing = RequestTiming::start();
    let bots = state.bot_service.list_bots(Some(query.into_filter()?)).await?;
    Ok(timing.ok(bots).with_link("self", "/api/v1/bots"))
}

/// GET /api/v1/bots/{id} - Get a bot by ID or slug.
pub async fn get_bot(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
) -> Result<ApiResponse<Bot>, AppError> {
    let timing = RequestTiming::start();
    let bot = state.bot_service.find_bot(&id_or_slug).await?;
    Ok(bot_links(timing.ok(bot)))
}

/// PUT /api/v1/bots/{id} - Update a bot's name, description or status.
pub async fn update_bot(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
    Json(body): Json<UpdateBotRequest>,
) -> Result<ApiResponse<Bot>, AppError> {
    let timing = RequestTiming::start();
    let bot = state.bot_service.find_bot(&id_or_slug).await?;
    let updated = state.bot_service.update_bot(&bot.id, body).await?;
    Ok(bot_links(timing.ok(updated)))
}

/// DELETE /api/v1/bots/{id} - Delete a bot that owns no modules.
pub async fn delete_bot(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let timing = RequestTiming::start();
    let bot = state.bot_service.find_bot(&id_or_slug).await?;
    state.bot_service.delete_bot(&bot.id).await?;

    Ok(timing.ok(serde_json::json!({"deleted": true, "slug": bot.slug})))
}

/// GET /api/v1/bots/{id}/modules - List the modules owned by a bot.
pub async fn list_bot_modules(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
) -> Result<ApiResponse<Vec<BotModule>>, AppError> {
    let timing = RequestTiming::start();
    let bot = state.bot_service.find_bot(&id_or_slug).await?;
    let modules = state.module_service.list_modules(&bot.id).await?;

    Ok(timing
        .ok(modules)
        .with_link("self", format!("/api/v1/bots/{}/modules", bot.id))
        .with_link("bot", format!("/api/v1/bots/{}", bot.id)))
}
