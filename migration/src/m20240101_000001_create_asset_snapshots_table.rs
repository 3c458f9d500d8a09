use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(AssetSnapshots::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(AssetSnapshots::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key()
                )
                .col(ColumnDef::new(AssetSnapshots::Name).string_len(100).not_null())
                .col(ColumnDef::new(AssetSnapshots::MarketCap).double())
                .col(ColumnDef::new(AssetSnapshots::Price).double())
                .col(ColumnDef::new(AssetSnapshots::PercentChange).double())
                .col(ColumnDef::new(AssetSnapshots::UpdatedAt).timestamp())
                .to_owned()
        ).await?;

        // One row per upstream asset id
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_asset_snapshots_name")
                .table(AssetSnapshots::Table)
                .col(AssetSnapshots::Name)
                .unique()
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AssetSnapshots::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum AssetSnapshots {
    Table,
    Id,
    Name,
    MarketCap,
    Price,
    PercentChange,
    UpdatedAt,
}
