//! Миграция: создание таблицы servers.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

/// Максимальная длина имени сервера.
pub const NAME_MAX_LEN: u32 = 50;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_create_servers"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite допускает AUTOINCREMENT только на INTEGER PRIMARY KEY,
        // а INTEGER там и так 64-битный
        let mut id = ColumnDef::new(Servers::Id);
        match manager.get_database_backend() {
            DatabaseBackend::Sqlite => id.integer(),
            _ => id.big_integer(),
        };
        id.not_null().auto_increment().primary_key();

        manager
            .create_table(
                Table::create()
                    .table(Servers::Table)
                    .if_not_exists()
                    .col(&mut id)
                    .col(
                        ColumnDef::new(Servers::Name)
                            .string_len(NAME_MAX_LEN)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Servers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Servers {
    Table,
    Id,
    Name,
}
