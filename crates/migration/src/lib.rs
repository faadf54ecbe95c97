//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_project;
mod m20240301_000002_create_quotation;
mod m20240301_000003_create_contract;
mod m20240301_000004_create_maintenance_request;
mod m20240301_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_project::Migration),
            Box::new(m20240301_000002_create_quotation::Migration),
            Box::new(m20240301_000003_create_contract::Migration),
            Box::new(m20240301_000004_create_maintenance_request::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000010_add_indexes::Migration),
        ]
    }
}
