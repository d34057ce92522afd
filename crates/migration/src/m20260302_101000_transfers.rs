use sea_orm_migration::prelude::*;

use crate::m20260301_090500_wallets::Wallets;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Transfers {
    Table,
    Id,
    SourceWalletId,
    TargetWalletId,
    AmountMinor,
    Description,
    OccurredAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transfers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transfers::SourceWalletId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transfers::TargetWalletId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transfers::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transfers::Description).string())
                    .col(
                        ColumnDef::new(Transfers::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transfers::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-source_wallet_id")
                            .from(Transfers::Table, Transfers::SourceWalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-target_wallet_id")
                            .from(Transfers::Table, Transfers::TargetWalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-source_wallet_id")
                    .table(Transfers::Table)
                    .col(Transfers::SourceWalletId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-target_wallet_id")
                    .table(Transfers::Table)
                    .col(Transfers::TargetWalletId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        Ok(())
    }
}
