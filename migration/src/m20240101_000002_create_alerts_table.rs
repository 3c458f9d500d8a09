use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Alerts::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Alerts::Id).integer().not_null().auto_increment().primary_key()
                )
                .col(ColumnDef::new(Alerts::UserId).integer().not_null())
                .col(ColumnDef::new(Alerts::CryptoId).integer().not_null())
                .col(ColumnDef::new(Alerts::ThresholdPrice).double())
                .col(ColumnDef::new(Alerts::ThresholdPercentage).double())
                .col(ColumnDef::new(Alerts::Method).string().not_null().default("Threshold"))
                .col(ColumnDef::new(Alerts::NotificationMethod).string().not_null())
                .col(ColumnDef::new(Alerts::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Alerts::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alerts_user_id")
                .table(Alerts::Table)
                .col(Alerts::UserId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Alerts::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Alerts {
    Table,
    Id,
    UserId,
    CryptoId,
    ThresholdPrice,
    ThresholdPercentage,
    Method,
    NotificationMethod,
    CreatedAt,
    UpdatedAt,
}
