//! Bot management service.
//!
//! Creates, looks up, updates and deletes bots. A bot's module list is not
//! edited here; see [`crate::service::module`].

use convs_types::bot::{Bot, BotId, BotStatus, CreateBotRequest, UpdateBotRequest, slugify};
use convs_types::error::{BotError, RepositoryError};

use crate::repository::bot::{BotFilter, BotRepository};
use crate::repository::module::BotModuleRepository;

/// Upper bound on `-N` suffixes tried when a slug is taken.
const MAX_SLUG_ATTEMPTS: u32 = 100;

/// Service orchestrating the bot lifecycle.
///
/// Reads module records only to refuse deleting a bot that still owns some.
pub struct BotService<B: BotRepository, M: BotModuleRepository> {
    bot_repo: B,
    module_repo: M,
}

impl<B: BotRepository, M: BotModuleRepository> BotService<B, M> {
    pub fn new(bot_repo: B, module_repo: M) -> Self {
        Self {
            bot_repo,
            module_repo,
        }
    }

    /// Create a new bot with a unique slug and an empty module list.
    pub async fn create_bot(&self, request: CreateBotRequest) -> Result<Bot, BotError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(BotError::InvalidName("name cannot be empty".to_string()));
        }

        let base_slug = slugify(&name);
        if base_slug.is_empty() {
            return Err(BotError::InvalidName(
                "name must contain at least one alphanumeric character".to_string(),
            ));
        }

        let slug = self.ensure_unique_slug(&base_slug).await?;
        let now = chrono::Utc::now();

        let bot = Bot {
            id: BotId::new(),
            slug,
            name: name.clone(),
            description: request
                .description
                .unwrap_or_else(|| format!("A bot named {name}")),
            status: BotStatus::Active,
            modules: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let bot = self.bot_repo.create(&bot).await.map_err(|e| match e {
            RepositoryError::Conflict(msg) => BotError::SlugConflict(msg),
            other => BotError::StorageError(other.to_string()),
        })?;

        tracing::info!(bot_id = %bot.id, slug = %bot.slug, "bot created");
        Ok(bot)
    }

    /// Ensure a slug is unique by appending -2, -3, etc. if needed.
    async fn ensure_unique_slug(&self, base_slug: &str) -> Result<String, BotError> {
        let mut slug = base_slug.to_string();

        for counter in 2..=MAX_SLUG_ATTEMPTS + 1 {
            let existing = self
                .bot_repo
                .get_by_slug(&slug)
                .await
                .map_err(|e| BotError::StorageError(e.to_string()))?;

            if existing.is_none() {
                return Ok(slug);
            }

            slug = format!("{base_slug}-{counter}");
        }

        Err(BotError::SlugConflict(format!(
            "could not generate unique slug from '{base_slug}'"
        )))
    }

    /// Get a bot by ID.
    pub async fn get_bot(&self, id: &BotId) -> Result<Bot, BotError> {
        self.bot_repo
            .get_by_id(id)
            .await
            .map_err(|e| BotError::StorageError(e.to_string()))?
            .ok_or(BotError::NotFound)
    }

    /// Get a bot by slug.
    pub async fn get_bot_by_slug(&self, slug: &str) -> Result<Bot, BotError> {
        self.bot_repo
            .get_by_slug(slug)
            .await
            .map_err(|e| BotError::StorageError(e.to_string()))?
            .ok_or(BotError::NotFound)
    }

    /// Resolve a bot by slug first, then by ID.
    pub async fn find_bot(&self, id_or_slug: &str) -> Result<Bot, BotError> {
        match self.get_bot_by_slug(id_or_slug).await {
            Ok(bot) => Ok(bot),
            Err(BotError::NotFound) => {
                let id = id_or_slug.parse::<BotId>().map_err(|_| BotError::NotFound)?;
                self.get_bot(&id).await
            }
            Err(e) => Err(e),
        }
    }

    /// List bots with optional filtering.
    pub async fn list_bots(&self, filter: Option<BotFilter>) -> Result<Vec<Bot>, BotError> {
        self.bot_repo
            .list(filter)
            .await
            .map_err(|e| BotError::StorageError(e.to_string()))
    }

    /// Update a bot's mutable fields. The module list is left as stored.
    pub async fn update_bot(&self, id: &BotId, request: UpdateBotRequest) -> Result<Bot, BotError> {
        let mut bot = self.get_bot(id).await?;

        if let Some(name) = request.name {
            let trimmed = name.trim().to_string();
            if trimmed.is_empty() {
                return Err(BotError::InvalidName("name cannot be empty".to_string()));
            }
            bot.name = trimmed;
        }
        if let Some(description) = request.description {
            bot.description = description;
        }
        if let Some(status) = request.status {
            bot.status = status;
        }

        bot.updated_at = chrono::Utc::now();

        self.bot_repo
            .update(&bot)
            .await
            .map_err(|e| BotError::StorageError(e.to_string()))
    }

    /// Delete a bot. Refused while its module list is non-empty or any
    /// module record still names it as parent.
    pub async fn delete_bot(&self, id: &BotId) -> Result<(), BotError> {
        let bot = self.get_bot(id).await?;
        let records = self
            .module_repo
            .list_by_bot(id)
            .await
            .map_err(|e| BotError::StorageError(e.to_string()))?;

        let owned = bot.modules.len().max(records.len());
        if owned > 0 {
            return Err(BotError::HasModules(owned));
        }

        self.bot_repo
            .delete(id)
            .await
            .map_err(|e| BotError::StorageError(e.to_string()))?;

        tracing::info!(bot_id = %bot.id, slug = %bot.slug, "bot deleted");
        Ok(())
    }
}
