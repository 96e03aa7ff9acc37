use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateConversations)]
    }
}

struct CreateConversations;

impl MigrationName for CreateConversations {
    fn name(&self) -> &str {
        "m20241211_000001_create_conversations"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateConversations {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Conversations::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Conversations::DeviceId).string().not_null().default(""))
                    .col(ColumnDef::new(Conversations::Title).string().not_null().default(""))
                    .col(ColumnDef::new(Conversations::Messages).json().not_null())
                    .col(ColumnDef::new(Conversations::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Conversations::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conversations_device_id")
                    .table(Conversations::Table)
                    .col(Conversations::DeviceId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conversations_created_at")
                    .table(Conversations::Table)
                    .col(Conversations::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Conversations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Conversations {
    Table,
    Id,
    DeviceId,
    Title,
    Messages,
    CreatedAt,
    UpdatedAt,
}
