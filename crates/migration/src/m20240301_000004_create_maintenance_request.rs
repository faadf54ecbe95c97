//! Create `maintenance_request` table with FK to `contract`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceRequest::Table)
                    .if_not_exists()
                    .col(uuid(MaintenanceRequest::Id).primary_key())
                    .col(uuid(MaintenanceRequest::ContractId).not_null())
                    .col(string_len(MaintenanceRequest::Title, 200).not_null())
                    .col(string_len(MaintenanceRequest::Category, 64).not_null())
                    .col(integer(MaintenanceRequest::Priority).not_null())
                    .col(string_len(MaintenanceRequest::Status, 32).not_null())
                    .col(timestamp_with_time_zone(MaintenanceRequest::CreatedAt).not_null())
                    .col(
                        ColumnDef::new(MaintenanceRequest::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_request_contract")
                            .from(MaintenanceRequest::Table, MaintenanceRequest::ContractId)
                            .to(Contract::Table, Contract::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MaintenanceRequest::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MaintenanceRequest { Table, Id, ContractId, Title, Category, Priority, Status, CreatedAt, ClosedAt }

#[derive(DeriveIden)]
enum Contract { Table, Id }
