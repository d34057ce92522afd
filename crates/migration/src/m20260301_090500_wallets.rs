use sea_orm_migration::prelude::*;

use crate::m20260301_090000_budgets::Budgets;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Wallets {
    Table,
    Id,
    Name,
    BalanceMinor,
    PartOfGeneralBalance,
    BudgetId,
    Currency,
    Status,
    Kind,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wallets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Wallets::Name).string().not_null())
                    .col(
                        ColumnDef::new(Wallets::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Wallets::PartOfGeneralBalance)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Wallets::BudgetId).string().not_null())
                    .col(ColumnDef::new(Wallets::Currency).string().not_null())
                    .col(ColumnDef::new(Wallets::Status).string().not_null())
                    .col(ColumnDef::new(Wallets::Kind).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallets-budget_id")
                            .from(Wallets::Table, Wallets::BudgetId)
                            .to(Budgets::Table, Budgets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallets-budget_id")
                    .table(Wallets::Table)
                    .col(Wallets::BudgetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Wallets::Table).to_owned())
            .await?;
        Ok(())
    }
}
