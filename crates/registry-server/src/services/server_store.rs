//! Хранилище серверов: чтение, постраничный список, поиск, создание, изменение, удаление.
//!
//! Единственный владелец таблицы `servers`. Уникальность имени обеспечивает
//! уникальный индекс в базе, а не блокировки в приложении.

use registry_entities::servers::{ActiveModel, Column, Entity as ServerEntity, Model};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    SqlErr,
};
use thiserror::Error;

/// Ошибки хранилища. Различаются только «не найдено» и «дубликат имени».
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("server not found")]
    NotFound,

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Io(String),
}

impl From<DbErr> for StoreError {
    fn from(e: DbErr) -> Self {
        StoreError::Io(e.to_string())
    }
}

/// Нарушение уникального ключа (MySQL 1062, SQLite UNIQUE constraint и т.п.).
pub fn is_duplicate_key(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Получить сервер по id.
pub async fn get_server(db: &DatabaseConnection, id: i64) -> Result<Model, StoreError> {
    ServerEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

/// Страница серверов, отсортированных по имени.
pub async fn get_servers(
    db: &DatabaseConnection,
    start: u64,
    count: u64,
) -> Result<Vec<Model>, StoreError> {
    let servers = ServerEntity::find()
        .order_by_asc(Column::Name)
        .limit(count)
        .offset(start)
        .all(db)
        .await?;
    Ok(servers)
}

/// Страница серверов, чьё имя подходит под LIKE-шаблон. Шаблон не экранируется.
pub async fn search_servers(
    db: &DatabaseConnection,
    start: u64,
    count: u64,
    pattern: &str,
) -> Result<Vec<Model>, StoreError> {
    let servers = ServerEntity::find()
        .filter(Column::Name.like(pattern))
        .order_by_asc(Column::Name)
        .limit(count)
        .offset(start)
        .all(db)
        .await?;
    Ok(servers)
}

/// Создать сервер. id назначает база.
pub async fn create_server(db: &DatabaseConnection, name: String) -> Result<Model, StoreError> {
    let model = ActiveModel {
        id: NotSet,
        name: Set(name),
    };
    model.insert(db).await.map_err(|e| {
        if is_duplicate_key(&e) {
            StoreError::Duplicate(e.to_string())
        } else {
            StoreError::Io(e.to_string())
        }
    })
}

/// Переименовать сервер. Возвращает число изменённых строк (0, если id нет).
pub async fn update_server(
    db: &DatabaseConnection,
    id: i64,
    name: String,
) -> Result<u64, StoreError> {
    let result = ServerEntity::update_many()
        .col_expr(Column::Name, Expr::value(name))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Удалить сервер. Возвращает число удалённых строк (0, если id нет).
pub async fn delete_server(db: &DatabaseConnection, id: i64) -> Result<u64, StoreError> {
    let result = ServerEntity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let db = test_db().await;

        let first = create_server(&db, "a.example.com".into()).await.unwrap();
        let second = create_server(&db, "b.example.com".into()).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(get_server(&db, 2).await.unwrap().name, "b.example.com");
    }

    #[tokio::test]
    async fn test_create_duplicate_name() {
        let db = test_db().await;

        create_server(&db, "dup".into()).await.unwrap();
        let err = create_server(&db, "dup".into()).await.unwrap_err();

        assert!(matches!(err, StoreError::Duplicate(_)), "получено: {err:?}");
    }

    #[tokio::test]
    async fn test_get_missing_server() {
        let db = test_db().await;
        assert_eq!(get_server(&db, 42).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_paged() {
        let db = test_db().await;
        for name in ["charlie", "alpha", "delta", "bravo"] {
            create_server(&db, name.into()).await.unwrap();
        }

        let names = |servers: Vec<Model>| servers.into_iter().map(|s| s.name).collect::<Vec<_>>();

        assert_eq!(
            names(get_servers(&db, 0, 25).await.unwrap()),
            ["alpha", "bravo", "charlie", "delta"]
        );
        assert_eq!(names(get_servers(&db, 1, 2).await.unwrap()), ["bravo", "charlie"]);
        assert!(get_servers(&db, 10, 25).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_uses_like_pattern() {
        let db = test_db().await;
        for name in ["web.a.com", "web.b.com", "db.a.com"] {
            create_server(&db, name.into()).await.unwrap();
        }

        let found = search_servers(&db, 0, 25, "web.%").await.unwrap();
        assert_eq!(found.len(), 2);

        let found = search_servers(&db, 0, 25, "__.a.com").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "db.a.com");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows_are_not_errors() {
        let db = test_db().await;
        let created = create_server(&db, "old".into()).await.unwrap();

        assert_eq!(update_server(&db, created.id, "new".into()).await.unwrap(), 1);
        assert_eq!(get_server(&db, created.id).await.unwrap().name, "new");
        assert_eq!(update_server(&db, 999, "x".into()).await.unwrap(), 0);

        assert_eq!(delete_server(&db, created.id).await.unwrap(), 1);
        assert_eq!(delete_server(&db, created.id).await.unwrap(), 0);
        assert_eq!(get_server(&db, created.id).await, Err(StoreError::NotFound));
    }
}
