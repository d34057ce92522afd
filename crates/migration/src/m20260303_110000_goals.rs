use sea_orm_migration::prelude::*;

use crate::m20260301_091000_categories::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Goals {
    Table,
    Id,
    Name,
    Kind,
    PlannedAmountMinor,
    ActualAmountMinor,
    StartDate,
    EndDate,
    Status,
}

#[derive(Iden)]
enum GoalCategories {
    Table,
    GoalId,
    CategoryId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Goals::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Goals::Name).string().not_null())
                    .col(ColumnDef::new(Goals::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Goals::PlannedAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Goals::ActualAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Goals::StartDate).date().not_null())
                    .col(ColumnDef::new(Goals::EndDate).date().not_null())
                    .col(ColumnDef::new(Goals::Status).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GoalCategories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GoalCategories::GoalId).string().not_null())
                    .col(
                        ColumnDef::new(GoalCategories::CategoryId)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(GoalCategories::GoalId)
                            .col(GoalCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_categories-goal_id")
                            .from(GoalCategories::Table, GoalCategories::GoalId)
                            .to(Goals::Table, Goals::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_categories-category_id")
                            .from(GoalCategories::Table, GoalCategories::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goal_categories-category_id")
                    .table(GoalCategories::Table)
                    .col(GoalCategories::CategoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GoalCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;
        Ok(())
    }
}
