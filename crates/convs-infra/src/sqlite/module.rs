//! SQLite bot module repository implementation.

use convs_core::repository::module::BotModuleRepository;
use convs_types::bot::BotId;
use convs_types::error::RepositoryError;
use convs_types::module::{BotModule, BotModuleId, ModuleKind};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `BotModuleRepository`.
pub struct SqliteBotModuleRepository {
    pool: DatabasePool,
}

impl SqliteBotModuleRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn query_error(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

fn module_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<BotModule, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_error)?;
    let parent_bot: String = row.try_get("parent_bot").map_err(query_error)?;
    let stories: String = row.try_get("stories").map_err(query_error)?;
    let kind: String = row.try_get("kind").map_err(query_error)?;

    Ok(BotModule {
        id: id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid module id: {e}")))?,
        name: row.try_get("name").map_err(query_error)?,
        description: row.try_get("description").map_err(query_error)?,
        stories: serde_json::from_str(&stories)
            .map_err(|e| RepositoryError::Query(format!("invalid stories JSON: {e}")))?,
        parent_bot: parent_bot
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid parent bot id: {e}")))?,
        kind: kind.parse::<ModuleKind>().map_err(RepositoryError::Query)?,
    })
}

impl BotModuleRepository for SqliteBotModuleRepository {
    async fn create(&self, module: &BotModule) -> Result<BotModule, RepositoryError> {
        let stories = serde_json::to_string(&module.stories).map_err(query_error)?;

        let result = sqlx::query(
            "INSERT INTO bot_modules (id, name, description, stories, parent_bot, kind)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(module.id.to_string())
        .bind(&module.name)
        .bind(&module.description)
        .bind(&stories)
        .bind(module.parent_bot.to_string())
        .bind(module.kind.to_string())
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(module.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("module '{}' already exists", module.id)),
            ),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn update(&self, module: &BotModule) -> Result<BotModule, RepositoryError> {
        let stories = serde_json::to_string(&module.stories).map_err(query_error)?;

        let result = sqlx::query(
            "UPDATE bot_modules SET name = ?, description = ?, stories = ?, parent_bot = ?, kind = ?
             WHERE id = ?",
        )
        .bind(&module.name)
        .bind(&module.description)
        .bind(&stories)
        .bind(module.parent_bot.to_string())
        .bind(module.kind.to_string())
        .bind(module.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(module.clone())
    }

    async fn get_by_id(&self, id: &BotModuleId) -> Result<Option<BotModule>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM bot_modules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(module_from_row).transpose()
    }

    async fn list_by_bot(&self, bot_id: &BotId) -> Result<Vec<BotModule>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM bot_modules WHERE parent_bot = ? ORDER BY name ASC")
            .bind(bot_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter().map(module_from_row).collect()
    }

    async fn delete(&self, id: &BotModuleId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bot_modules WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::bot::SqliteBotRepository;
    use crate::sqlite::bot::tests::make_bot;
    use crate::sqlite::pool::temp_pool;
    use convs_core::event::bus::ModuleEventBus;
    use convs_core::repository::bot::BotRepository;
    use convs_core::service::module::{BotModuleService, ModuleForm, SaveOutcome};
    use convs_core::service::plan::ModuleMutation;
    use convs_types::config::MissingParentPolicy;
    use convs_types::error::ModuleError;
    use std::sync::Arc;

    fn make_module(name: &str, parent: &BotId) -> BotModule {
        BotModule {
            id: BotModuleId::new(),
            name: name.to_string(),
            description: format!("{name} stories"),
            stories: vec!["intro".to_string(), "outro".to_string()],
            parent_bot: parent.clone(),
            kind: ModuleKind::BotModule,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_id() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotModuleRepository::new(pool);
        let module = make_module("Welcome", &BotId::new());

        repo.create(&module).await.unwrap();

        let found = repo.get_by_id(&module.id).await.unwrap().unwrap();
        assert_eq!(found, module);
    }

    #[tokio::test]
    async fn test_update_changes_parent() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotModuleRepository::new(pool);
        let old_parent = BotId::new();
        let new_parent = BotId::new();
        let mut module = make_module("Mover", &old_parent);
        repo.create(&module).await.unwrap();

        module.parent_bot = new_parent.clone();
        repo.update(&module).await.unwrap();

        assert!(repo.list_by_bot(&old_parent).await.unwrap().is_empty());
        assert_eq!(repo.list_by_bot(&new_parent).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_bot_is_ordered_by_name() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotModuleRepository::new(pool);
        let parent = BotId::new();

        for name in ["Zeta", "Alpha", "Mu"] {
            repo.create(&make_module(name, &parent)).await.unwrap();
        }
        repo.create(&make_module("Elsewhere", &BotId::new()))
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list_by_bot(&parent)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Mu", "Zeta"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_nonexistent() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteBotModuleRepository::new(pool);
        let ghost = make_module("Ghost", &BotId::new());

        assert!(matches!(
            repo.update(&ghost).await.unwrap_err(),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            repo.delete(&ghost.id).await.unwrap_err(),
            RepositoryError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_service_create_then_move_against_sqlite() {
        let (pool, _dir) = temp_pool().await;
        let bots = SqliteBotRepository::new(pool.clone());
        let bot_a = make_bot("Bot A");
        let bot_b = make_bot("Bot B");
        bots.create(&bot_a).await.unwrap();
        bots.create(&bot_b).await.unwrap();

        let service = BotModuleService::new(
            SqliteBotRepository::new(pool.clone()),
            SqliteBotModuleRepository::new(pool.clone()),
            ModuleEventBus::new(4),
        );

        let outcome = service
            .submit(
                ModuleMutation::Create,
                None,
                ModuleForm {
                    module_name: "M1".to_string(),
                    parent_bot: Some(bot_a.id.clone()),
                    ..ModuleForm::empty()
                },
            )
            .await
            .unwrap();
        let SaveOutcome::Created(created) = outcome else {
            panic!("expected Created outcome");
        };

        let stored_a = bots.get_by_id(&bot_a.id).await.unwrap().unwrap();
        assert_eq!(stored_a.modules, vec![created.id.clone()]);

        let mut moved = ModuleForm::from_module(&created);
        moved.parent_bot = Some(bot_b.id.clone());
        service
            .submit(ModuleMutation::Update, Some(&created), moved)
            .await
            .unwrap();

        let stored_a = bots.get_by_id(&bot_a.id).await.unwrap().unwrap();
        let stored_b = bots.get_by_id(&bot_b.id).await.unwrap().unwrap();
        assert!(stored_a.modules.is_empty());
        assert_eq!(stored_b.modules, vec![created.id.clone()]);

        let stored_module = service.get_module(&created.id).await.unwrap();
        assert_eq!(stored_module.parent_bot, bot_b.id);
    }

    fn sqlite_service(
        pool: &DatabasePool,
    ) -> BotModuleService<SqliteBotRepository, SqliteBotModuleRepository> {
        BotModuleService::new(
            SqliteBotRepository::new(pool.clone()),
            SqliteBotModuleRepository::new(pool.clone()),
            ModuleEventBus::new(64),
        )
    }

    fn named_form(name: &str, parent: &BotId) -> ModuleForm {
        ModuleForm {
            module_name: name.to_string(),
            parent_bot: Some(parent.clone()),
            ..ModuleForm::empty()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_list_every_module_once() {
        let (pool, _dir) = temp_pool().await;
        let bots = SqliteBotRepository::new(pool.clone());
        let bot = make_bot("Busy");
        bots.create(&bot).await.unwrap();

        let service = Arc::new(sqlite_service(&pool));
        let handles: Vec<_> = (0..20)
            .map(|i| {
                let service = service.clone();
                let parent = bot.id.clone();
                tokio::spawn(async move {
                    service
                        .submit(ModuleMutation::Create, None, named_form(&format!("M{i:02}"), &parent))
                        .await
                        .unwrap()
                        .into_module()
                })
            })
            .collect();

        let mut created = Vec::new();
        for handle in handles {
            created.push(handle.await.unwrap().id);
        }

        let records = service.list_modules(&bot.id).await.unwrap();
        let stored = bots.get_by_id(&bot.id).await.unwrap().unwrap();
        assert_eq!(records.len(), 20);
        assert_eq!(stored.modules.len(), 20);
        for id in &created {
            assert_eq!(stored.modules.iter().filter(|m| *m == id).count(), 1);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_bot_update_during_attach_keeps_module_ids() {
        let (pool, _dir) = temp_pool().await;
        let bots = Arc::new(SqliteBotRepository::new(pool.clone()));
        let bot = make_bot("Renamed");
        bots.create(&bot).await.unwrap();

        let service = Arc::new(sqlite_service(&pool));
        let mut handles = Vec::new();
        for i in 0..10 {
            let service = service.clone();
            let parent = bot.id.clone();
            handles.push(tokio::spawn(async move {
                service
                    .submit(ModuleMutation::Create, None, named_form(&format!("M{i}"), &parent))
                    .await
                    .map(|_| ())
                    .unwrap();
            }));

            let bots = bots.clone();
            let mut stale = bot.clone();
            stale.description = format!("revision {i}");
            handles.push(tokio::spawn(async move {
                bots.update(&stale).await.map(|_| ()).unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = bots.get_by_id(&bot.id).await.unwrap().unwrap();
        assert_eq!(stored.modules.len(), 10);
    }

    #[tokio::test]
    async fn test_fail_policy_leaves_no_orphan_record() {
        let (pool, _dir) = temp_pool().await;
        let service = sqlite_service(&pool).with_missing_parent(MissingParentPolicy::Fail);
        let ghost = BotId::new();

        let err = service
            .submit(ModuleMutation::Create, None, named_form("Orphan", &ghost))
            .await
            .unwrap_err();

        assert!(matches!(err, ModuleError::Integrity { .. }));
        assert!(service.list_modules(&ghost).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fail_policy_move_from_missing_parent_keeps_record() {
        let (pool, _dir) = temp_pool().await;
        let bots = SqliteBotRepository::new(pool.clone());
        let bot_b = make_bot("Target");
        bots.create(&bot_b).await.unwrap();

        let ghost = BotId::new();
        let original = make_module("Stranded", &ghost);
        SqliteBotModuleRepository::new(pool.clone())
            .create(&original)
            .await
            .unwrap();

        let service = sqlite_service(&pool).with_missing_parent(MissingParentPolicy::Fail);
        let mut moved = ModuleForm::from_module(&original);
        moved.parent_bot = Some(bot_b.id.clone());
        let err = service
            .submit(ModuleMutation::Update, Some(&original), moved)
            .await
            .unwrap_err();

        assert!(matches!(err, ModuleError::Integrity { ref bot_id, .. } if bot_id == &ghost));
        assert_eq!(service.get_module(&original.id).await.unwrap().parent_bot, ghost);
        assert!(bots.get_by_id(&bot_b.id).await.unwrap().unwrap().modules.is_empty());

        // Deleting the stranded module still works.
        service.delete_module(&original.id).await.unwrap();
        assert!(service.list_modules(&ghost).await.unwrap().is_empty());
    }
}
