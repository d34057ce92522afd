pub use sea_orm_migration::prelude::*;

mod m20260301_090000_budgets;
mod m20260301_090500_wallets;
mod m20260301_091000_categories;
mod m20260302_100000_transactions;
mod m20260302_101000_transfers;
mod m20260303_110000_goals;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_090000_budgets::Migration),
            Box::new(m20260301_090500_wallets::Migration),
            Box::new(m20260301_091000_categories::Migration),
            Box::new(m20260302_100000_transactions::Migration),
            Box::new(m20260302_101000_transfers::Migration),
            Box::new(m20260303_110000_goals::Migration),
        ]
    }
}
