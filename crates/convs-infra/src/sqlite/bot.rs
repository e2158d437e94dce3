//! SQLite bot repository implementation.
//!
//! The module list is stored as a JSON array of module ids in `bots.modules`.
//! Only `attach_module`/`detach_module` write that column, each inside one
//! writer transaction.

use chrono::{DateTime, Utc};
use convs_core::repository::SortOrder;
use convs_core::repository::bot::{BotFilter, BotRepository, ModuleListChange};
use convs_types::bot::{Bot, BotId, BotStatus};
use convs_types::error::RepositoryError;
use convs_types::module::BotModuleId;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `BotRepository`.
pub struct SqliteBotRepository {
    pool: DatabasePool,
}

impl SqliteBotRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Bot.
struct BotRow {
    id: String,
    slug: String,
    name: String,
    description: String,
    status: String,
    modules: String,
    created_at: String,
    updated_at: String,
}

impl BotRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            modules: row.try_get("modules")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_bot(self) -> Result<Bot, RepositoryError> {
        let id = self
            .id
            .parse::<BotId>()
            .map_err(|e| RepositoryError::Query(format!("invalid bot id: {e}")))?;

        let status: BotStatus = self.status.parse().map_err(RepositoryError::Query)?;

        let modules: Vec<BotModuleId> = serde_json::from_str(&self.modules)
            .map_err(|e| RepositoryError::Query(format!("invalid modules JSON: {e}")))?;

        Ok(Bot {
            id,
            slug: self.slug,
            name: self.name,
            description: self.description,
            status,
            modules,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn modules_json(modules: &[BotModuleId]) -> Result<String, RepositoryError> {
    serde_json::to_string(modules).map_err(|e| RepositoryError::Query(e.to_string()))
}

impl SqliteBotRepository {
    /// Read, edit and rewrite one bot's module list in a single transaction.
    ///
    /// `edit` returns whether it changed the list; an unchanged list is not
    /// written back.
    async fn edit_module_list(
        &self,
        bot_id: &BotId,
        edit: impl FnOnce(&mut Vec<BotModuleId>) -> bool,
    ) -> Result<ModuleListChange, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let stored: Option<String> = sqlx::query_scalar("SELECT modules FROM bots WHERE id = ?")
            .bind(bot_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(stored) = stored else {
            return Ok(ModuleListChange::BotMissing);
        };

        let mut modules: Vec<BotModuleId> = serde_json::from_str(&stored)
            .map_err(|e| RepositoryError::Query(format!("invalid modules JSON: {e}")))?;

        if !edit(&mut modules) {
            return Ok(ModuleListChange::Unchanged);
        }

        sqlx::query("UPDATE bots SET modules = ?, updated_at = ? WHERE id = ?")
            .bind(modules_json(&modules)?)
            .bind(Utc::now().to_rfc3339())
            .bind(bot_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(ModuleListChange::Changed)
    }
}

impl BotRepository for SqliteBotRepository {
    async fn create(&self, bot: &Bot) -> Result<Bot, RepositoryError> {
        let modules = modules_json(&bot.modules)?;

        let result = sqlx::query(
            "INSERT INTO bots (id, slug, name, description, status, modules, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(bot.id.to_string())
        .bind(&bot.slug)
        .bind(&bot.name)
        .bind(&bot.description)
        .bind(bot.status.to_string())
        .bind(&modules)
        .bind(bot.created_at.to_rfc3339())
        .bind(bot.updated_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(bot.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("slug '{}' already exists", bot.slug)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_by_id(&self, id: &BotId) -> Result<Option<Bot>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM bots WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| {
            BotRow::from_row(&row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_bot()
        })
        .transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Bot>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM bots WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| {
            BotRow::from_row(&row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_bot()
        })
        .transpose()
    }

    async fn list(&self, filter: Option<BotFilter>) -> Result<Vec<Bot>, RepositoryError> {
        let filter = filter.unwrap_or_default();
        let mut sql = String::from("SELECT * FROM bots");

        if filter.status.is_some() {
            sql.push_str(" WHERE status = ?");
        }

        // Whitelist allowed sort fields to prevent SQL injection
        let safe_sort = match filter.sort_by.as_deref().unwrap_or("created_at") {
            field @ ("name" | "slug" | "status" | "created_at" | "updated_at") => field,
            _ => "created_at",
        };
        let order = match filter.sort_order.unwrap_or_default() {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        sql.push_str(&format!(" ORDER BY {safe_sort} {order}"));

        // SQLite requires a LIMIT before OFFSET; -1 means unbounded.
        if filter.limit.is_some() || filter.offset.is_some() {
            sql.push_str(&format!(
                " LIMIT {} OFFSET {}",
                filter.limit.unwrap_or(-1),
                filter.offset.unwrap_or(0)
            ));
        }

        let mut query = sqlx::query(&sql);
        if let Some(status) = &filter.status {
            query = query.bind(status.to_string());
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                BotRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_bot()
            })
            .collect()
    }

    async fn update(&self, bot: &Bot) -> Result<Bot, RepositoryError> {
        let row = sqlx::query(
            "UPDATE bots SET slug = ?, name = ?, description = ?, status = ?, updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&bot.slug)
        .bind(&bot.name)
        .bind(&bot.description)
        .bind(bot.status.to_string())
        .bind(bot.updated_at.to_rfc3339())
        .bind(bot.id.to_string())
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        BotRow::from_row(&row)
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .into_bot()
    }

    async fn attach_module(
        &self,
        bot: &BotId,
        module: &BotModuleId,
    ) -> Result<ModuleListChange, RepositoryError> {
        self.edit_module_list(bot, |modules| {
            if modules.contains(module) {
                return false;
            }
            modules.push(module.clone());
            true
        })
        .await
    }

    async fn detach_module(
        &self,
        bot: &BotId,
        module: &BotModuleId,
    ) -> Result<ModuleListChange, RepositoryError> {
        self.edit_module_list(bot, |modules| {
            let before = modules.len();
            modules.retain(|id| id != module);
            modules.len() != before
        })
        .await
    }

    async fn delete(&self, id: &BotId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bots WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sqlite::pool::temp_pool;
    use convs_types::bot::slugify;

    pub(crate) fn make_bot(name: &str) -> Bot {
        let now = Utc::now();
        Bot {
            id: BotId::new(),
            slug: slugify(name),
            name: name.to_string(),
            description: format!("A {name} bot"),
            status: BotStatus::Active,
            modules: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_id() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotRepository::new(pool);
        let bot = make_bot("Luna");

        repo.create(&bot).await.unwrap();

        let found = repo.get_by_id(&bot.id).await.unwrap().unwrap();
        assert_eq!(found.slug, "luna");
        assert!(found.modules.is_empty());
    }

    #[tokio::test]
    async fn test_attach_and_detach_keep_list_order() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotRepository::new(pool);
        let bot = make_bot("Owner");
        repo.create(&bot).await.unwrap();

        let first = BotModuleId::new();
        let second = BotModuleId::new();
        assert_eq!(
            repo.attach_module(&bot.id, &first).await.unwrap(),
            ModuleListChange::Changed
        );
        repo.attach_module(&bot.id, &second).await.unwrap();
        assert_eq!(
            repo.attach_module(&bot.id, &first).await.unwrap(),
            ModuleListChange::Unchanged
        );

        let found = repo.get_by_slug("owner").await.unwrap().unwrap();
        assert_eq!(found.modules, vec![first.clone(), second.clone()]);

        assert_eq!(
            repo.detach_module(&bot.id, &first).await.unwrap(),
            ModuleListChange::Changed
        );
        assert_eq!(
            repo.detach_module(&bot.id, &first).await.unwrap(),
            ModuleListChange::Unchanged
        );
        let found = repo.get_by_id(&bot.id).await.unwrap().unwrap();
        assert_eq!(found.modules, vec![second]);
    }

    #[tokio::test]
    async fn test_list_edits_on_missing_bot() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotRepository::new(pool);
        let ghost = BotId::new();
        let module = BotModuleId::new();

        assert_eq!(
            repo.attach_module(&ghost, &module).await.unwrap(),
            ModuleListChange::BotMissing
        );
        assert_eq!(
            repo.detach_module(&ghost, &module).await.unwrap(),
            ModuleListChange::BotMissing
        );
    }

    #[tokio::test]
    async fn test_update_leaves_module_list_alone() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotRepository::new(pool);
        let bot = make_bot("Keeper");
        repo.create(&bot).await.unwrap();

        // A stale copy read before the attach must not erase it.
        let mut stale = repo.get_by_id(&bot.id).await.unwrap().unwrap();
        let module = BotModuleId::new();
        repo.attach_module(&bot.id, &module).await.unwrap();

        stale.name = "Keeper Renamed".to_string();
        let returned = repo.update(&stale).await.unwrap();
        assert_eq!(returned.name, "Keeper Renamed");
        assert_eq!(returned.modules, vec![module.clone()]);

        let found = repo.get_by_id(&bot.id).await.unwrap().unwrap();
        assert_eq!(found.modules, vec![module]);
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotRepository::new(pool);

        let alpha = make_bot("Alpha");
        let mut beta = make_bot("Beta");
        beta.status = BotStatus::Disabled;
        let gamma = make_bot("Gamma");

        for bot in [&alpha, &beta, &gamma] {
            repo.create(bot).await.unwrap();
        }

        assert_eq!(repo.list(None).await.unwrap().len(), 3);

        let active = repo
            .list(Some(BotFilter {
                status: Some(BotStatus::Active),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(active.len(), 2);

        let page = repo
            .list(Some(BotFilter {
                offset: Some(1),
                sort_by: Some("name".to_string()),
                sort_order: Some(SortOrder::Asc),
                ..Default::default()
            }))
            .await
            .unwrap();
        let names: Vec<&str> = page.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Gamma"]);
    }

    #[tokio::test]
    async fn test_slug_conflict() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotRepository::new(pool);

        repo.create(&make_bot("Conflict")).await.unwrap();
        let err = repo.create(&make_bot("Conflict")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_nonexistent() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotRepository::new(pool);
        let ghost = make_bot("Ghost");

        assert!(matches!(
            repo.update(&ghost).await.unwrap_err(),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            repo.delete(&ghost.id).await.unwrap_err(),
            RepositoryError::NotFound
        ));
    }
}
